use std::collections::HashSet;

use super::capacity::{DeliveryMode, PackagingDecision};

/// Item codes classified as cables, loaded once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CableCodeSet {
    codes: HashSet<String>,
}

impl CableCodeSet {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes = codes
            .into_iter()
            .map(|code| code.as_ref().trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();
        Self { codes }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

}

/// Packaging override for shipments made up solely of cables
#[derive(Debug, Clone)]
pub struct CableOverrideResolver {
    cables: CableCodeSet,
}

impl CableOverrideResolver {
    pub fn new(cables: CableCodeSet) -> Self {
        Self { cables }
    }

    /// Size for an all-cable item list, `None` when any item is not a cable.
    pub fn resolve(&self, items: &str) -> Option<&'static str> {
        let mut cable_quantity: u64 = 0;

        for (code, quantity) in split_items(items) {
            if !self.cables.contains(&code) {
                return None;
            }
            cable_quantity = cable_quantity.saturating_add(quantity);
        }

        if cable_quantity == 0 {
            return None;
        }

        Some(match cable_quantity {
            0..=2 => "C5",
            3..=4 => "C4",
            5..=10 => "Parcel-Medium",
            _ => "Parcel-ExLarge",
        })
    }

    /// Replaces a standard-mode decision with the cable size. Tracked, express and sentinel
    /// decisions pass through untouched.
    pub fn apply(&self, decision: PackagingDecision, items: &str) -> PackagingDecision {
        let is_standard = decision
            .size()
            .is_some_and(|size| DeliveryMode::of_tag(size) == DeliveryMode::Standard);
        if !is_standard {
            return decision;
        }
        match self.resolve(items) {
            Some(size) => PackagingDecision::Size(size.to_string()),
            None => decision,
        }
    }
}

/// `code*qty` pairs of a comma-separated item list; quantity 1 when no `*` is present.
/// Digit runs too long for `u64` saturate.
fn split_items(items: &str) -> impl Iterator<Item = (String, u64)> + '_ {
    items.split(',').filter_map(|item| {
        let item: String = item.chars().filter(|c| !c.is_whitespace()).collect();
        if item.is_empty() {
            return None;
        }
        match item.split_once('*') {
            Some((code, quantity)) => Some((code.to_string(), parse_quantity(quantity))),
            None => Some((item, 1)),
        }
    })
}

fn parse_quantity(text: &str) -> u64 {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return 1;
    }
    text.parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> CableOverrideResolver {
        CableOverrideResolver::new(CableCodeSet::new(["CableA", "CableB", "CableC"]))
    }

    #[test]
    fn test_cable_tiers() {
        let r = resolver();
        assert_eq!(r.resolve("CableA*2"), Some("C5"));
        assert_eq!(r.resolve("CableA*2, CableB*1"), Some("C4"));
        assert_eq!(r.resolve("CableA*4"), Some("C4"));
        assert_eq!(r.resolve("CableA*5"), Some("Parcel-Medium"));
        assert_eq!(r.resolve("CableA*6, CableC*4"), Some("Parcel-Medium"));
        assert_eq!(r.resolve("CableB*11"), Some("Parcel-ExLarge"));
    }

    #[test]
    fn test_missing_quantity_counts_as_one() {
        assert_eq!(resolver().resolve("CableA, CableB"), Some("C5"));
    }

    #[test]
    fn test_any_non_cable_blocks_override() {
        let r = resolver();
        assert_eq!(r.resolve("CableA*9, Charger*1"), None);
        assert_eq!(r.resolve("Charger*1"), None);
        assert_eq!(r.resolve(""), None);
    }

    #[test]
    fn test_apply_only_to_standard_sizes() {
        let r = resolver();
        let small = PackagingDecision::Size("Small".to_string());
        assert_eq!(r.apply(small, "CableA*1"), PackagingDecision::Size("C5".to_string()));

        let tracked = PackagingDecision::Size("TMP-C5".to_string());
        assert_eq!(r.apply(tracked.clone(), "CableA*1"), tracked);

        let express = PackagingDecision::Size("Express".to_string());
        assert_eq!(r.apply(express.clone(), "CableA*8"), express);

        assert_eq!(
            r.apply(PackagingDecision::Indeterminate, "CableA*1"),
            PackagingDecision::Indeterminate
        );
    }

    #[test]
    fn test_oversized_quantities_saturate() {
        let r = resolver();
        assert_eq!(r.resolve("CableA*18446744073709551615, CableA*1"), Some("Parcel-ExLarge"));
        assert_eq!(r.resolve("CableA*99999999999999999999999"), Some("Parcel-ExLarge"));
        assert_eq!(r.resolve("CableA*18446744073709551615, Charger*1"), None);
    }

    #[test]
    fn test_code_set_trims_and_skips_blanks() {
        let set = CableCodeSet::new([" CableA ", "", "CableB"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("CableA"));
    }
}
