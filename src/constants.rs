//! Column names and fixed tokens shared across the batch pipeline.

// Input table columns (output of the marketplace normalizer)
pub const COL_ID: &str = "id";
pub const COL_RECIPIENT: &str = "rname";
pub const COL_ADDRESS: &str = "address";
pub const COL_CITY: &str = "city";
pub const COL_STATE: &str = "state";
pub const COL_ZIP: &str = "zip";
pub const COL_LABEL: &str = "custom_label";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_AMOUNT: &str = "amt";
pub const COL_PLATFORM: &str = "source_platform";

pub const INPUT_COLUMNS: [&str; 10] = [
    COL_ID,
    COL_RECIPIENT,
    COL_ADDRESS,
    COL_CITY,
    COL_STATE,
    COL_ZIP,
    COL_LABEL,
    COL_QUANTITY,
    COL_AMOUNT,
    COL_PLATFORM,
];

pub const OUTPUT_COLUMNS: [&str; 8] = [
    COL_ID,
    COL_RECIPIENT,
    COL_ADDRESS,
    COL_CITY,
    COL_STATE,
    COL_ZIP,
    COL_LABEL,
    COL_AMOUNT,
];

/// Placeholder tag for an unknown platform or packaging size
pub const UNKNOWN_TAG: &str = "?";

/// Prefix of the sentinel emitted for an unrecognized size tag
pub const ERROR_PREFIX: &str = "Error:";

// Delivery mode keywords, matched case-insensitively against size tags
pub const EXPRESS_KEYWORD: &str = "express";
pub const TRACKED_KEYWORDS: [&str; 2] = ["tmp", "parcel"];

/// Marketplace order ids shaped like `12-34567-89012` carry an order-level summary row
pub const COMPOSITE_ID_PATTERN: &str = r"^\d{2}-\d{5}-\d{5}$";

/// Separator used when joining ids and labels of one shipment
pub const JOIN_SEPARATOR: &str = ", ";

// Default file names, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "packer.toml";
pub const DEFAULT_INPUT_FILE: &str = "standardized_columns.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "merged_labels.csv";
pub const DEFAULT_CABLES_FILE: &str = "cables.csv";

/// Orders at or above this amount ship tracked unless the marketplace says otherwise
pub const DEFAULT_TRACKING_AMOUNT: f64 = 15.0;
