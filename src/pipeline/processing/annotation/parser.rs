use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{JOIN_SEPARATOR, UNKNOWN_TAG};

/// One `[size]items` segment of an annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    /// Packaging size named inside the segment's size bracket
    pub size_tag: String,
    /// Item list text of the segment with its bracket prefix removed
    pub item_tag: String,
    /// Sum of every `*N` in the segment, 1 when none is present. The item text then
    /// carries an explicit `*1` so a recomposed label keeps the same demand.
    pub multiplier: u32,
}

/// Size tag -> summed multiplier for one shipment. Absent keys mean zero demand.
pub type PackagingCounts = BTreeMap<String, u32>;

/// Everything the resolver and composer need from one shipment's annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAnnotation {
    /// Platform tag from the first bracket, `?` when there is none
    pub platform: String,
    pub entries: Vec<AnnotationEntry>,
    /// Item lists of all segments joined by `", "`, without any bracket prefixes
    pub items: String,
}

impl ParsedAnnotation {
    /// Total multiplier per size tag
    pub fn counts(&self) -> PackagingCounts {
        let mut counts = PackagingCounts::new();
        for entry in &self.entries {
            let total = counts.entry(entry.size_tag.clone()).or_insert(0);
            *total = total.saturating_add(entry.multiplier);
        }
        counts
    }
}

/// Parses `[PLATFORM]/[SIZE]ITEM*N,ITEM*N,[PLATFORM]/[SIZE]...`.
///
/// A comma directly followed by `[` opens a new segment; any other comma belongs to the
/// current item list. Segments without a size bracket contribute their text to the item
/// list but no packaging demand.
pub fn parse(raw: &str) -> ParsedAnnotation {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let platform = first_bracket(&compact)
        .map(|(content, _, _)| content)
        .filter(|content| !content.is_empty())
        .unwrap_or(UNKNOWN_TAG)
        .to_string();

    let mut entries = Vec::new();
    let mut items = Vec::new();

    for segment in split_segments(&compact) {
        let SegmentTokens { size_tag, mut item_text } = tokenize_segment(segment);
        let Some(size_tag) = size_tag else {
            if !item_text.is_empty() {
                items.push(item_text);
            }
            continue;
        };

        let multiplier = match sum_multipliers(segment) {
            Some(total) => total,
            None => {
                if !item_text.is_empty() {
                    item_text.push_str("*1");
                }
                1
            }
        };
        if !item_text.is_empty() {
            items.push(item_text.clone());
        }
        entries.push(AnnotationEntry {
            size_tag,
            item_tag: item_text,
            multiplier,
        });
    }

    ParsedAnnotation {
        platform,
        entries,
        items: items.join(JOIN_SEPARATOR),
    }
}

/// Splits at every `,[` boundary. The `[` stays with the segment it opens.
fn split_segments(compact: &str) -> Vec<&str> {
    let bytes = compact.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;

    for i in 0..bytes.len() {
        if bytes[i] == b',' && bytes.get(i + 1) == Some(&b'[') {
            segments.push(&compact[start..i]);
            start = i + 1;
        }
    }
    segments.push(&compact[start..]);

    segments.into_iter().filter(|s| !s.is_empty()).collect()
}

struct SegmentTokens {
    size_tag: Option<String>,
    item_text: String,
}

fn tokenize_segment(segment: &str) -> SegmentTokens {
    // The platform tag sits before the first `/`
    let body = match segment.split_once('/') {
        Some((_, rest)) => rest,
        None => segment,
    };

    match first_bracket(body) {
        Some((content, open, close)) if !content.is_empty() => {
            let mut item_text = String::with_capacity(body.len());
            item_text.push_str(&body[..open]);
            item_text.push_str(&body[close + 1..]);
            SegmentTokens {
                size_tag: Some(content.to_string()),
                item_text,
            }
        }
        _ => SegmentTokens {
            size_tag: None,
            item_text: strip_leading_brackets(segment).to_string(),
        },
    }
}

/// Content of the first `[...]` pair plus the byte offsets of both brackets
fn first_bracket(text: &str) -> Option<(&str, usize, usize)> {
    let open = text.find('[')?;
    let close = open + text[open..].find(']')?;
    Some((&text[open + 1..close], open, close))
}

fn strip_leading_brackets(segment: &str) -> &str {
    let mut rest = segment;
    while rest.starts_with('[') {
        match rest.find(']') {
            Some(close) => rest = rest[close + 1..].trim_start_matches('/'),
            None => break,
        }
    }
    rest
}

/// Saturating sum of every `*<digits>` run in the segment, `None` when there is none
fn sum_multipliers(segment: &str) -> Option<u32> {
    let mut total: u32 = 0;
    let mut found = false;
    let mut chars = segment.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '*' {
            continue;
        }
        let mut value: Option<u32> = None;
        while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit));
            chars.next();
        }
        if let Some(value) = value {
            total = total.saturating_add(value);
            found = true;
        }
    }

    found.then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_segment() {
        let parsed = parse("[SP]/[C5]USB-C-1M*2");

        assert_eq!(parsed.platform, "SP");
        assert_eq!(parsed.items, "USB-C-1M*2");
        assert_eq!(parsed.counts().get("C5"), Some(&2));
    }

    #[test]
    fn test_parse_joined_segments_accumulate_per_size() {
        let parsed = parse("[SP]/[Small]CableA*2, [SP]/[C5]CableB*1, [SP]/[Small]CableC*3");
        let counts = parsed.counts();

        assert_eq!(parsed.entries.len(), 3);
        assert_eq!(counts.get("Small"), Some(&5));
        assert_eq!(counts.get("C5"), Some(&1));
        assert_eq!(parsed.items, "CableA*2, CableB*1, CableC*3");
    }

    #[test]
    fn test_item_list_commas_stay_in_one_segment() {
        let parsed = parse("[NG]/[C4]A*1,B*2,C*4");

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].multiplier, 7);
        assert_eq!(parsed.entries[0].item_tag, "A*1,B*2,C*4");
    }

    #[test]
    fn test_missing_multiplier_defaults_to_one() {
        let parsed = parse("[KG]/[Small]ABC-123");
        assert_eq!(parsed.counts().get("Small"), Some(&1));
        assert_eq!(parsed.items, "ABC-123*1");
    }

    #[test]
    fn test_default_multiplier_survives_merge_with_counted_segment() {
        let parsed = parse("[SP]/[Small]A,[SP]/[C5]B*2");
        assert_eq!(parsed.items, "A*1, B*2");

        let merged = parse(&format!("[SP]/[Parcel-Medium]{}", parsed.items));
        assert_eq!(merged.counts().get("Parcel-Medium"), Some(&3));
    }

    #[test]
    fn test_counts_saturate_across_segments() {
        let parsed = parse("[SP]/[C5]A*4294967295,[SP]/[C5]B*1");
        assert_eq!(parsed.counts().get("C5"), Some(&u32::MAX));

        let parsed = parse("[SP]/[C5]A*99999999999999999999");
        assert_eq!(parsed.counts().get("C5"), Some(&u32::MAX));
    }

    #[test]
    fn test_segment_without_bracket_is_skipped() {
        let parsed = parse("[SP]/[C5]A*1,[broken");
        assert_eq!(parsed.counts().len(), 1);

        let parsed = parse("plain-text*4");
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.platform, "?");
        assert_eq!(parsed.items, "plain-text*4");
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let parsed = parse("  [SP]/[C5] Cable A * 3 ");
        assert_eq!(parsed.items, "CableA*3");
        assert_eq!(parsed.counts().get("C5"), Some(&3));
    }

    #[test]
    fn test_unknown_size_placeholder_is_kept() {
        let parsed = parse("[SP]/[?]Widget*1");
        assert_eq!(parsed.counts().get("?"), Some(&1));
    }

    #[test]
    fn test_empty_annotation() {
        let parsed = parse("");
        assert_eq!(parsed.platform, "?");
        assert!(parsed.entries.is_empty());
        assert!(parsed.items.is_empty());
    }
}
