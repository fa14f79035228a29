use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ERROR_PREFIX, EXPRESS_KEYWORD, TRACKED_KEYWORDS, UNKNOWN_TAG};
use crate::error::{PackerError, Result};
use crate::pipeline::processing::annotation::PackagingCounts;

/// Delivery regime a shipment falls under, chosen from the size tags it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Standard,
    Tracked,
    Express,
}

impl DeliveryMode {
    /// Mode implied by a single size tag
    pub fn of_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.contains(EXPRESS_KEYWORD) {
            DeliveryMode::Express
        } else if TRACKED_KEYWORDS.iter().any(|k| tag.contains(k)) {
            DeliveryMode::Tracked
        } else {
            DeliveryMode::Standard
        }
    }

    /// Express wins over tracked, tracked over standard
    pub fn detect<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        tags.into_iter()
            .map(Self::of_tag)
            .fold(DeliveryMode::Standard, |mode, tag_mode| match (mode, tag_mode) {
                (DeliveryMode::Express, _) | (_, DeliveryMode::Express) => DeliveryMode::Express,
                (DeliveryMode::Tracked, _) | (_, DeliveryMode::Tracked) => DeliveryMode::Tracked,
                _ => DeliveryMode::Standard,
            })
    }
}

/// One rung of a capacity ladder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub size: String,
    pub capacity: u32,
}

impl Tier {
    pub fn new(size: &str, capacity: u32) -> Self {
        Self {
            size: size.to_string(),
            capacity,
        }
    }
}

/// Capacity configuration for packaging selection.
///
/// `unit_capacity` is what one item of a size occupies when summing a shipment; the ladders
/// are the thresholds a shipment's total is compared against. The two are kept apart on
/// purpose: express `Parcel-Express` counts 36 units per item but its ladder rung is 9.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityTables {
    pub unit_capacity: BTreeMap<String, u32>,
    pub standard: Vec<Tier>,
    pub tracked: Vec<Tier>,
    pub express: Vec<Tier>,
}

impl Default for CapacityTables {
    fn default() -> Self {
        let unit_capacity = [
            ("Small", 1),
            ("C5", 3),
            ("C4", 6),
            ("Parcel-Medium", 18),
            ("Parcel-ExLarge", 36),
            ("TMP-Small", 1),
            ("TMP-C5", 3),
            ("TMP-Large", 12),
            ("Express", 3),
            ("Parcel-Express", 36),
        ]
        .into_iter()
        .map(|(size, units)| (size.to_string(), units))
        .collect();

        Self {
            unit_capacity,
            standard: vec![
                Tier::new("Small", 1),
                Tier::new("C5", 3),
                Tier::new("C4", 6),
                Tier::new("Parcel-Medium", 18),
                Tier::new("Parcel-ExLarge", 36),
            ],
            tracked: vec![
                Tier::new("TMP-Small", 1),
                Tier::new("TMP-C5", 3),
                Tier::new("TMP-Large", 12),
                Tier::new("Parcel-Medium", 18),
                Tier::new("Parcel-ExLarge", 36),
            ],
            express: vec![Tier::new("Express", 3), Tier::new("Parcel-Express", 9)],
        }
    }
}

impl CapacityTables {
    pub fn ladder(&self, mode: DeliveryMode) -> &[Tier] {
        match mode {
            DeliveryMode::Standard => &self.standard,
            DeliveryMode::Tracked => &self.tracked,
            DeliveryMode::Express => &self.express,
        }
    }

    /// Every ladder must be non-empty and strictly increasing
    pub fn validate(&self) -> Result<()> {
        for mode in [DeliveryMode::Standard, DeliveryMode::Tracked, DeliveryMode::Express] {
            let ladder = self.ladder(mode);
            if ladder.is_empty() {
                return Err(PackerError::Config(format!("{:?} capacity ladder is empty", mode)));
            }
            if ladder.windows(2).any(|pair| pair[0].capacity >= pair[1].capacity) {
                return Err(PackerError::Config(format!(
                    "{:?} capacity ladder must be strictly increasing",
                    mode
                )));
            }
        }
        if let Some((size, _)) = self.unit_capacity.iter().find(|(size, _)| size.is_empty()) {
            return Err(PackerError::Config(format!("empty size name in unit capacities: {:?}", size)));
        }
        Ok(())
    }
}

/// Outcome of packaging selection for one shipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackagingDecision {
    /// A concrete packaging size
    Size(String),
    /// A `?` size was present; the shipment needs manual review
    Indeterminate,
    /// A size tag missing from the capacity table
    UnknownTag(String),
}

impl PackagingDecision {
    pub fn size(&self) -> Option<&str> {
        match self {
            PackagingDecision::Size(size) => Some(size.as_str()),
            _ => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, PackagingDecision::Size(_))
    }
}

impl fmt::Display for PackagingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagingDecision::Size(size) => write!(f, "{}", size),
            PackagingDecision::Indeterminate => write!(f, "{}", UNKNOWN_TAG),
            PackagingDecision::UnknownTag(tag) => write!(f, "{}{}", ERROR_PREFIX, tag),
        }
    }
}

/// Picks the smallest packaging whose capacity holds every item of a shipment
#[derive(Debug, Clone)]
pub struct CapacityPackagingResolver {
    tables: CapacityTables,
    units_by_tag: HashMap<String, u32>,
}

impl CapacityPackagingResolver {
    pub fn new(tables: CapacityTables) -> Result<Self> {
        tables.validate()?;
        let units_by_tag = tables
            .unit_capacity
            .iter()
            .map(|(size, units)| (size.to_lowercase(), *units))
            .collect();
        Ok(Self {
            tables,
            units_by_tag,
        })
    }

    pub fn resolve(&self, counts: &PackagingCounts) -> PackagingDecision {
        // A single item already names its own packaging
        if counts.len() == 1 {
            if let Some((tag, &1)) = counts.iter().next() {
                return if tag == UNKNOWN_TAG {
                    PackagingDecision::Indeterminate
                } else {
                    PackagingDecision::Size(tag.clone())
                };
            }
        }

        if counts.contains_key(UNKNOWN_TAG) {
            return PackagingDecision::Indeterminate;
        }

        let mode = DeliveryMode::detect(counts.keys().map(String::as_str));

        let mut total: u64 = 0;
        for (tag, multiplier) in counts {
            match self.units_by_tag.get(&tag.to_lowercase()) {
                Some(units) => total += u64::from(*units) * u64::from(*multiplier),
                None => return PackagingDecision::UnknownTag(tag.clone()),
            }
        }

        PackagingDecision::Size(self.walk_ladder(mode, total).size.clone())
    }

    /// Smallest tier holding `total`; the largest tier when nothing holds it or it is zero
    fn walk_ladder(&self, mode: DeliveryMode, total: u64) -> &Tier {
        let ladder = self.tables.ladder(mode);
        // validate() guarantees at least one tier
        let largest = &ladder[ladder.len() - 1];
        if total == 0 {
            return largest;
        }
        ladder
            .iter()
            .find(|tier| u64::from(tier.capacity) >= total)
            .unwrap_or(largest)
    }
}
