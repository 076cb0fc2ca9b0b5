use stockmatch::{compose, BoundingBox, ComposeConfig, DigitDetection, Glyph, QuantityComposer};

fn glyph_at(glyph: Glyph, x: u32, y: u32) -> DigitDetection {
    let name = format!("num{}", glyph.symbol());
    DigitDetection::new(glyph, name, 0.97, BoundingBox::new(x, y, 16, 32))
}

fn digits(text: &str, x0: u32, y: u32, step: u32) -> Vec<DigitDetection> {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let glyph = Glyph::from_template_name(&c.to_string()).unwrap();
            glyph_at(glyph, x0 + i as u32 * step, y)
        })
        .collect()
}

#[test]
fn reads_two_digits_next_to_reference() {
    let dets = digits("42", 140, 100, 16);
    assert_eq!(compose(&dets, 132, 100, 150), Some(42));
}

#[test]
fn input_order_does_not_matter() {
    let mut dets = digits("907", 140, 100, 18);
    dets.reverse();
    assert_eq!(compose(&dets, 132, 100, 150), Some(907));
}

#[test]
fn nearest_group_wins() {
    let mut dets = digits("17", 140, 100, 16);
    dets.extend(digits("55", 230, 100, 16));
    assert_eq!(compose(&dets, 132, 100, 150), Some(17));

    let composer = QuantityComposer::default();
    let group = composer.group(&dets, 132, 100).unwrap();
    assert_eq!(group.text(), "17");
    assert_eq!(group.digits().len(), 2);
}

#[test]
fn far_group_is_used_when_alone_in_window() {
    let dets = digits("55", 230, 100, 16);
    assert_eq!(compose(&dets, 132, 100, 150), Some(55));
}

#[test]
fn empty_input_has_no_quantity() {
    assert_eq!(compose(&[], 132, 100, 150), None);
}

#[test]
fn horizontal_window_bounds() {
    // Starts exactly at the reference: included.
    assert_eq!(compose(&digits("3", 132, 100, 16), 132, 100, 150), Some(3));
    // Left of the reference: excluded.
    assert_eq!(compose(&digits("3", 131, 100, 16), 132, 100, 150), None);
    // At reference + distance: excluded.
    assert_eq!(compose(&digits("3", 282, 100, 16), 132, 100, 150), None);
    assert_eq!(compose(&digits("3", 281, 100, 16), 132, 100, 150), Some(3));
}

#[test]
fn vertical_tolerance_is_relative_to_glyph_height() {
    // 32 px glyphs tolerate an offset below 48 px.
    assert_eq!(compose(&digits("8", 140, 147, 16), 132, 100, 150), Some(8));
    assert_eq!(compose(&digits("8", 140, 148, 16), 132, 100, 150), None);
    assert_eq!(compose(&digits("8", 140, 53, 16), 132, 100, 150), Some(8));
    assert_eq!(compose(&digits("8", 140, 52, 16), 132, 100, 150), None);
}

#[test]
fn other_rows_are_ignored() {
    let mut dets = digits("12", 140, 100, 16);
    dets.extend(digits("99", 140, 160, 16));
    assert_eq!(compose(&dets, 132, 100, 150), Some(12));
    assert_eq!(compose(&dets, 132, 160, 150), Some(99));
}

#[test]
fn gap_splits_groups() {
    let composer = QuantityComposer::new(ComposeConfig {
        max_digit_gap: 20,
        ..ComposeConfig::default()
    });
    let dets = digits("12", 140, 100, 21);
    assert_eq!(composer.compose(&dets, 132, 100), Some(1));
    let dets = digits("12", 140, 100, 20);
    assert_eq!(composer.compose(&dets, 132, 100), Some(12));
}

#[test]
fn trailing_thousands_marker_scales() {
    assert_eq!(compose(&digits("12k", 140, 100, 16), 132, 100, 150), Some(12_000));
    assert_eq!(compose(&digits("0k", 140, 100, 16), 132, 100, 150), Some(0));
}

#[test]
fn misplaced_thousands_marker_is_unreadable() {
    assert_eq!(compose(&digits("1k2", 140, 100, 16), 132, 100, 150), None);
    assert_eq!(compose(&digits("k", 140, 100, 16), 132, 100, 150), None);
    assert_eq!(compose(&digits("5kk", 140, 100, 16), 132, 100, 150), None);
}

#[test]
fn overflow_is_unreadable() {
    let composer = QuantityComposer::new(ComposeConfig {
        max_digit_distance: 1000,
        ..ComposeConfig::default()
    });
    let dets = digits("99999999999999999999", 140, 100, 16);
    assert_eq!(composer.compose(&dets, 132, 100), None);
    let dets = digits("18446744073709552k", 140, 100, 16);
    assert_eq!(composer.compose(&dets, 132, 100), None);
}

#[test]
fn config_validation() {
    assert!(ComposeConfig::default().validate().is_ok());
    let cfg = ComposeConfig {
        vertical_tolerance: 0.0,
        ..ComposeConfig::default()
    };
    assert!(cfg.validate().is_err());
}
