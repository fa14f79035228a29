use serde::{Deserialize, Serialize};

use crate::constants::JOIN_SEPARATOR;

/// One marketplace line item (or whole order, for some marketplaces) after column mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOrderRow {
    pub id: String,
    pub recipient: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Packed `[platform]/[size]items` annotation for this line
    pub annotation: String,
    pub quantity: i64,
    pub amount: f64,
    pub platform: String,
}

/// All line items bound for one (address, recipient, platform), merged into a single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedShipment {
    /// Sorted, deduplicated order ids
    pub ids: Vec<String>,
    pub recipient: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub platform: String,
    /// Composed annotation carrying the resolved packaging size
    pub annotation: String,
    pub quantity: i64,
    pub amount: f64,
}

impl MergedShipment {
    /// Ids as written to the output table
    pub fn joined_ids(&self) -> String {
        self.ids.join(JOIN_SEPARATOR)
    }
}
