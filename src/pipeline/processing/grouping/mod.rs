use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{COMPOSITE_ID_PATTERN, JOIN_SEPARATOR};
use crate::domain::{MergedShipment, NormalizedOrderRow};
use crate::pipeline::processing::annotation::item_key;
use crate::pipeline::processing::packaging::LabelResolver;

static COMPOSITE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(COMPOSITE_ID_PATTERN).expect("composite id pattern is valid"));

/// Counters describing what the consolidation stages did to a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingStats {
    pub input_rows: usize,
    /// Continuation rows that inherited shipping details from the row above
    pub propagated_rows: usize,
    /// Order-level summary rows whose amount and quantity were zeroed
    pub nullified_rows: usize,
    pub shipments: usize,
}

/// Shipments of one batch in output order
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub shipments: Vec<MergedShipment>,
    pub stats: GroupingStats,
}

/// Consolidates normalized order rows into labeled shipments.
///
/// Stages run in a fixed order, each producing a new collection:
/// clean rows -> nullified rows -> grouped shipments -> labeled and ordered shipments.
pub struct OrderGroupingEngine<'a> {
    labels: &'a dyn LabelResolver,
}

impl<'a> OrderGroupingEngine<'a> {
    pub fn new(labels: &'a dyn LabelResolver) -> Self {
        Self { labels }
    }

    pub fn consolidate(&self, rows: &[NormalizedOrderRow]) -> Consolidation {
        let (filled, propagated_rows) = fill_missing_details(rows);
        let (nullified, nullified_rows) = nullify_summary_rows(filled);

        let shipments: Vec<MergedShipment> = group_rows(&nullified)
            .into_iter()
            .map(|shipment| self.label(shipment))
            .collect();
        let shipments = order_shipments(shipments);

        let stats = GroupingStats {
            input_rows: rows.len(),
            propagated_rows,
            nullified_rows,
            shipments: shipments.len(),
        };
        info!(
            "Consolidated {} rows into {} shipments ({} propagated, {} summary rows nullified)",
            stats.input_rows, stats.shipments, stats.propagated_rows, stats.nullified_rows
        );

        Consolidation { shipments, stats }
    }

    fn label(&self, shipment: MergedShipment) -> MergedShipment {
        // Shipments without any label stay blank for manual review
        if shipment.annotation.trim().is_empty() {
            return shipment;
        }
        let outcome = self.labels.resolve_label(&shipment.annotation);
        MergedShipment {
            annotation: outcome.annotation,
            ..shipment
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Copies shipping details into continuation rows that left them blank.
///
/// Rows are partitioned by platform and sorted by (id, address) with blank addresses after
/// filled ones, so a continuation row directly follows the row it belongs to. A blank row
/// only inherits when the row above has the same id. Returns the rows in partition order
/// and the number of rows that inherited details.
pub fn fill_missing_details(rows: &[NormalizedOrderRow]) -> (Vec<NormalizedOrderRow>, usize) {
    let mut partitions: BTreeMap<&str, Vec<&NormalizedOrderRow>> = BTreeMap::new();
    for row in rows {
        partitions.entry(row.platform.as_str()).or_default().push(row);
    }

    let mut filled = Vec::with_capacity(rows.len());
    let mut propagated = 0;

    for (_, mut partition) in partitions {
        partition.sort_by(|a, b| {
            a.id.cmp(&b.id)
                .then_with(|| is_blank(&a.address).cmp(&is_blank(&b.address)))
                .then_with(|| a.address.cmp(&b.address))
        });

        let start = filled.len();
        for row in partition {
            let mut row = row.clone();
            if is_blank(&row.address) && filled.len() > start {
                let previous: &NormalizedOrderRow = &filled[filled.len() - 1];
                if previous.id == row.id {
                    row.address = previous.address.clone();
                    row.recipient = previous.recipient.clone();
                    row.city = previous.city.clone();
                    row.zip = previous.zip.clone();
                    row.state = previous.state.clone();
                    propagated += 1;
                }
            }
            filled.push(row);
        }
    }

    (filled, propagated)
}

/// Zeroes the order-level summary row some marketplaces emit next to their line items.
///
/// Only ids shaped like `12-34567-89012` that occur on more than one row are affected; the
/// row with the highest amount (first one on ties) keeps its place for address propagation
/// but stops contributing amount and quantity.
pub fn nullify_summary_rows(mut rows: Vec<NormalizedOrderRow>) -> (Vec<NormalizedOrderRow>, usize) {
    let summary_rows = summary_row_indices(&rows);

    for &index in &summary_rows {
        let row = &mut rows[index];
        debug!("Nullifying summary row for order {} (amount {})", row.id, row.amount);
        row.amount = 0.0;
        row.quantity = 0;
    }

    let count = summary_rows.len();
    (rows, count)
}

fn summary_row_indices(rows: &[NormalizedOrderRow]) -> Vec<usize> {
    let mut by_id: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        if COMPOSITE_ID.is_match(&row.id) {
            by_id.entry(row.id.as_str()).or_default().push(index);
        }
    }

    let mut indices: Vec<usize> = by_id
        .values()
        .filter(|indices| indices.len() > 1)
        .filter_map(|indices| {
            indices.iter().copied().reduce(|best, index| {
                if rows[index].amount > rows[best].amount {
                    index
                } else {
                    best
                }
            })
        })
        .collect();
    indices.sort_unstable();
    indices
}

#[derive(Default)]
struct ShipmentAccumulator {
    ids: BTreeSet<String>,
    labels: BTreeSet<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    quantity: i64,
    amount: f64,
}

fn keep_first(slot: &mut Option<String>, value: &str) {
    if slot.is_none() && !is_blank(value) {
        *slot = Some(value.to_string());
    }
}

/// Merges rows sharing (address, recipient, platform). Shipments come out sorted by that
/// key; their annotation is the sorted unique row labels joined by `", "`, not yet resolved.
pub fn group_rows(rows: &[NormalizedOrderRow]) -> Vec<MergedShipment> {
    let mut groups: BTreeMap<(String, String, String), ShipmentAccumulator> = BTreeMap::new();

    for row in rows {
        let key = (row.address.clone(), row.recipient.clone(), row.platform.clone());
        let acc = groups.entry(key).or_default();

        if !is_blank(&row.id) {
            acc.ids.insert(row.id.clone());
        }
        if !is_blank(&row.annotation) {
            acc.labels.insert(row.annotation.clone());
        }
        keep_first(&mut acc.city, &row.city);
        keep_first(&mut acc.state, &row.state);
        keep_first(&mut acc.zip, &row.zip);
        acc.quantity += row.quantity;
        acc.amount += row.amount;
    }

    groups
        .into_iter()
        .map(|((address, recipient, platform), acc)| MergedShipment {
            ids: acc.ids.into_iter().collect(),
            recipient,
            address,
            city: acc.city.unwrap_or_default(),
            state: acc.state.unwrap_or_default(),
            zip: acc.zip.unwrap_or_default(),
            platform,
            annotation: acc.labels.into_iter().collect::<Vec<_>>().join(JOIN_SEPARATOR),
            quantity: acc.quantity,
            amount: acc.amount,
        })
        .collect()
}

/// Shipments whose item key looks like a SKU (two or more hyphens) come first in
/// lexicographic order; the rest follow in their existing order.
pub fn order_shipments(shipments: Vec<MergedShipment>) -> Vec<MergedShipment> {
    let (mut skus, rest): (Vec<_>, Vec<_>) = shipments
        .into_iter()
        .map(|shipment| (item_key(&shipment.annotation), shipment))
        .partition(|(key, _)| key.matches('-').count() >= 2);

    skus.sort_by(|(a, _), (b, _)| a.cmp(b));

    skus.into_iter()
        .chain(rest)
        .map(|(_, shipment)| shipment)
        .collect()
}
