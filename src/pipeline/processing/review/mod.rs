use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{ERROR_PREFIX, UNKNOWN_TAG};
use crate::domain::MergedShipment;
use crate::pipeline::processing::annotation::parse;

/// Why a shipment needs a human to look at its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ReviewReason {
    /// No line of the shipment carried a label
    MissingLabel,
    /// At least one line had an unknown `?` size
    IndeterminateSize,
    /// A size tag is not in the capacity table
    UnknownSize(String),
}

/// A shipment flagged for manual review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub ids: String,
    pub recipient: String,
    pub annotation: String,
    pub reason: ReviewReason,
}

/// Reason a composed label needs review, if any
pub fn review_reason(annotation: &str) -> Option<ReviewReason> {
    if annotation.trim().is_empty() {
        return Some(ReviewReason::MissingLabel);
    }

    let parsed = parse(annotation);
    let size = parsed.entries.first().map(|entry| entry.size_tag.as_str());
    match size {
        None => Some(ReviewReason::IndeterminateSize),
        Some(UNKNOWN_TAG) => Some(ReviewReason::IndeterminateSize),
        Some(tag) => tag
            .strip_prefix(ERROR_PREFIX)
            .map(|unknown| ReviewReason::UnknownSize(unknown.to_string())),
    }
}

/// Collects every shipment whose label carries a sentinel or is missing
pub fn assess(shipments: &[MergedShipment]) -> Vec<ReviewItem> {
    shipments
        .iter()
        .filter_map(|shipment| {
            let reason = review_reason(&shipment.annotation)?;
            warn!(
                ids = %shipment.joined_ids(),
                recipient = %shipment.recipient,
                "Shipment needs review: {:?}",
                reason
            );
            Some(ReviewItem {
                ids: shipment.joined_ids(),
                recipient: shipment.recipient.clone(),
                annotation: shipment.annotation.clone(),
                reason,
            })
        })
        .collect()
}
