use shipment_packer::domain::NormalizedOrderRow;
use shipment_packer::pipeline::processing::annotation::{compose, parse};
use shipment_packer::pipeline::processing::grouping::{group_rows, nullify_summary_rows};
use shipment_packer::pipeline::processing::packaging::{
    CableCodeSet, CableOverrideResolver, CapacityPackagingResolver, CapacityTables, LabelResolver,
    PackagingDecision, PackagingEngine,
};
use shipment_packer::pipeline::process_rows;

fn engine(cables: &[&str]) -> PackagingEngine {
    PackagingEngine::new(
        CapacityPackagingResolver::new(CapacityTables::default()).unwrap(),
        CableOverrideResolver::new(CableCodeSet::new(cables)),
    )
}

fn row(id: &str, address: &str, annotation: &str, quantity: i64, amount: f64) -> NormalizedOrderRow {
    NormalizedOrderRow {
        id: id.to_string(),
        recipient: if address.is_empty() { String::new() } else { "Jo Citizen".to_string() },
        address: address.to_string(),
        city: "Melbourne".to_string(),
        state: "VIC".to_string(),
        zip: "3000".to_string(),
        annotation: annotation.to_string(),
        quantity,
        amount,
        platform: "ebay".to_string(),
    }
}

#[test]
fn test_all_cable_shipment_keeps_capacity_result_when_tiers_agree() {
    let raw = "[SP]/[Small]CableA*2,[SP]/[C5]CableB*1";
    let parsed = parse(raw);
    let counts = parsed.counts();
    assert_eq!(counts.get("Small"), Some(&2));
    assert_eq!(counts.get("C5"), Some(&1));

    let capacity = CapacityPackagingResolver::new(CapacityTables::default()).unwrap();
    assert_eq!(capacity.resolve(&counts), PackagingDecision::Size("C4".to_string()));

    let outcome = engine(&["CableA", "CableB"]).resolve_label(raw);
    assert_eq!(outcome.decision, PackagingDecision::Size("C4".to_string()));
}

#[test]
fn test_single_cable_is_overridden_to_c5() {
    let outcome = engine(&["CableA", "CableB"]).resolve_label("[SP]/[Small]CableA*1");
    assert_eq!(outcome.decision, PackagingDecision::Size("C5".to_string()));
    assert_eq!(outcome.annotation, "[SP]/[C5] CableA *1");
}

#[test]
fn test_non_cable_item_blocks_override_regardless_of_quantity() {
    let engine = engine(&["CableA"]);
    for raw in [
        "[SP]/[Small]CableA*1,[SP]/[Small]Charger*1",
        "[SP]/[Small]CableA*40,[SP]/[Small]Charger*1",
    ] {
        let parsed = parse(raw);
        let capacity = CapacityPackagingResolver::new(CapacityTables::default()).unwrap();
        let expected = capacity.resolve(&parsed.counts());
        assert_eq!(engine.resolve_label(raw).decision, expected);
    }
}

#[test]
fn test_parse_is_stable_on_composed_output() {
    let engine = engine(&[]);
    for raw in [
        "[SP]/[Small]CableA*2,[SP]/[C5]CableB*1",
        "[NG]/[C4]A*1,B*2,C*4, [NG]/[C5]D*1",
        "[KG]/[TMP-Small] X-1-2 *3",
        "[SP]/[Small]A,[SP]/[C5]B*2",
        "[NG]/[C4]Plug, [NG]/[C5]Lead*3, [NG]/[Small]Clip",
    ] {
        let first = parse(raw);
        let composed = engine.resolve_label(raw).annotation;
        let second = parse(&composed);

        let total = |p: &shipment_packer::pipeline::processing::annotation::ParsedAnnotation| {
            p.entries.iter().map(|e| e.multiplier).sum::<u32>()
        };
        assert_eq!(total(&first), total(&second), "totals differ for {}", raw);
        assert_eq!(first.items.replace(' ', ""), second.items.replace(' ', ""));
        assert_eq!(first.platform, second.platform);
    }
}

#[test]
fn test_composer_output_reparses_to_same_items() {
    let composed = compose("SP", "C4", "CableA*2, CableB*1");
    let parsed = parse(&composed);
    assert_eq!(parsed.counts().get("C4"), Some(&3));
}

#[test]
fn test_summary_row_scenario() {
    let rows = vec![
        row("11-22222-33333", "1 Main St", "[NG]/[C5]A*2", 2, 50.0),
        row("11-22222-33333", "", "[NG]/[C5]A*1", 1, 10.0),
    ];

    let outcome = process_rows(&rows, &engine(&[]));

    assert_eq!(outcome.shipments.len(), 1);
    let shipment = &outcome.shipments[0];
    assert_eq!(shipment.address, "1 Main St");
    assert_eq!(shipment.ids, vec!["11-22222-33333"]);
    assert_eq!(shipment.amount, 10.0);
    assert_eq!(shipment.quantity, 1);
    assert_eq!(outcome.stats.propagated_rows, 1);
    assert_eq!(outcome.stats.nullified_rows, 1);
}

#[test]
fn test_group_quantity_and_ids_are_unions_of_members() {
    let rows = vec![
        row("B2", "1 Main St", "[NG]/[C5]X*1", 4, 1.0),
        row("A1", "1 Main St", "[NG]/[C5]Y*1", 3, 1.0),
        row("A1", "1 Main St", "[NG]/[C5]Z*1", 2, 1.0),
    ];
    let (rows, nullified) = nullify_summary_rows(rows);
    assert_eq!(nullified, 0);

    let shipments = group_rows(&rows);
    assert_eq!(shipments.len(), 1);
    assert_eq!(shipments[0].quantity, 9);
    assert_eq!(shipments[0].ids, vec!["A1", "B2"]);
}

#[test]
fn test_sku_labels_sort_before_unknown_and_empty() {
    let rows = vec![
        row("A1", "1 Main St", "[SP]/[?]Mystery*2", 1, 1.0),
        row("B2", "2 Main St", "", 1, 1.0),
        row("C3", "3 Main St", "[SP]/[C5]ABC-123-45*1", 1, 1.0),
    ];

    let outcome = process_rows(&rows, &engine(&[]));
    let ids: Vec<String> = outcome.shipments.iter().map(|s| s.joined_ids()).collect();

    assert_eq!(ids, vec!["C3", "A1", "B2"]);
    assert_eq!(outcome.shipments[0].annotation, "[SP]/[C5] ABC-123-45 *1");
    assert_eq!(outcome.review.len(), 2);
}
