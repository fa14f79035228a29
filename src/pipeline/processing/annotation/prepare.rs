//! Line-level label preparation applied to raw marketplace SKUs before batching.
//!
//! Marketplaces export free-form SKU text such as `(C5) Cable x2 + Adapter`. These helpers
//! turn it into the `[platform]/[size]item*qty` form the batch parser expects and pick the
//! packaging variant that matches the order's shipping method.

use serde::{Deserialize, Serialize};

use crate::constants::{JOIN_SEPARATOR, UNKNOWN_TAG};

/// Shipping service requested for a single order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    Untracked,
    Tracking,
    Express,
}

impl ShippingMethod {
    /// Reads the marketplace's shipping service text, then upgrades untracked orders whose
    /// amount reaches the tracking threshold.
    pub fn from_marketplace(service: &str, amount: f64, tracking_amount: f64) -> Self {
        let service = service.to_lowercase();
        let method = if service.contains("untracked") {
            ShippingMethod::Untracked
        } else if service.contains("tracked") || service.contains("tracking") {
            ShippingMethod::Tracking
        } else if service.contains("express") {
            ShippingMethod::Express
        } else {
            ShippingMethod::Untracked
        };

        if method == ShippingMethod::Untracked && amount >= tracking_amount {
            ShippingMethod::Tracking
        } else {
            method
        }
    }
}

/// Normalizes SKU punctuation: `+` separates items, parentheses become brackets and
/// `" x"` becomes a multiplier.
pub fn clean_label(label: &str) -> String {
    label
        .replace('+', ",")
        .replace('(', "[")
        .replace(')', "]")
        .replace(" x", "*")
        .replace(' ', "")
        .trim_matches('.')
        .trim_matches('/')
        .trim()
        .to_string()
}

/// Prefixes the platform tag unless the label is already fully annotated.
pub fn add_platform(label: &str, platform: &str) -> String {
    let brackets = label.matches('[').count();
    if brackets > 1 {
        label.to_string()
    } else if label.trim().is_empty() {
        String::new()
    } else if brackets == 0 {
        format!("[{}]/[{}]{}", platform, UNKNOWN_TAG, label)
    } else {
        format!("[{}]/{}", platform, label)
    }
}

/// Size named by the label: the second tag of `[a]/[b]`, or the only tag present.
pub fn extract_size(label: &str) -> Option<&str> {
    let open = label.find('[')?;
    let close = open + label[open..].find(']')?;
    let first = &label[open + 1..close];

    let rest = &label[close + 1..];
    if let Some(second) = rest.strip_prefix("/[") {
        if let Some(end) = second.find(']') {
            return Some(&second[..end]);
        }
    }
    Some(first)
}

fn tracking_size(size: &str) -> &str {
    match size {
        "C5" => "TMP-C5",
        "C4" => "Parcel-Medium",
        "Small" => "TMP-Small",
        "Parcel" => "Parcel-Medium",
        other => other,
    }
}

fn express_size(size: &str) -> &'static str {
    if size == "C4" || size.to_lowercase().contains("parcel") {
        "Parcel-Express"
    } else {
        "Express"
    }
}

/// Swaps the label's size tag for the variant its shipping method requires.
pub fn upgrade_for_shipping(label: &str, method: ShippingMethod) -> String {
    let Some(size) = extract_size(label) else {
        return label.to_string();
    };
    if size.is_empty() {
        return label.to_string();
    }

    let upgraded = match method {
        ShippingMethod::Express => express_size(size),
        ShippingMethod::Tracking => tracking_size(size),
        ShippingMethod::Untracked if size == "Parcel" => "Parcel-Medium",
        ShippingMethod::Untracked => size,
    };

    label.replace(&format!("[{}]", size), &format!("[{}]", upgraded))
}

/// Gives every item lacking an explicit multiplier the line quantity.
pub fn apply_quantity(label: &str, quantity: i64) -> String {
    if label.trim().is_empty() {
        return label.to_string();
    }
    label
        .split(',')
        .map(|item| {
            if item.contains('*') {
                item.to_string()
            } else {
                format!("{}*{}", item, quantity)
            }
        })
        .collect::<Vec<_>>()
        .join(JOIN_SEPARATOR)
}

/// Full preparation of one raw marketplace label.
pub fn prepare_label(raw: &str, platform: &str, method: ShippingMethod, quantity: i64) -> String {
    let cleaned = clean_label(raw);
    let own_prefix = format!("[{}]/", platform);
    let unprefixed = cleaned.strip_prefix(&own_prefix).unwrap_or(&cleaned);

    let annotated = add_platform(unprefixed, platform);
    let upgraded = upgrade_for_shipping(&annotated, method);
    apply_quantity(&upgraded, quantity)
}
