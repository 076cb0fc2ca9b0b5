use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use stockmatch::{
    CancelToken, IconDetector, MatchConfig, SearchImage, StockMatchError, Template, TemplateKey,
    TemplateStore, VariantKey,
};

fn random_patch(seed: u64, width: usize, height: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.random_range(0..=255)).collect()
}

fn paste(canvas: &mut [u8], canvas_width: usize, patch: &[u8], width: usize, x0: usize, y0: usize) {
    for (row, chunk) in patch.chunks(width).enumerate() {
        let start = (y0 + row) * canvas_width + x0;
        canvas[start..start + width].copy_from_slice(chunk);
    }
}

fn variant(code: &str, set: u16, ordinal: u16, data: Vec<u8>, side: usize) -> Template {
    Template::from_luma(
        TemplateKey::Variant(VariantKey::new(code, set, ordinal)),
        data,
        side,
        side,
    )
    .unwrap()
}

fn single_worker(templates: Vec<Template>) -> IconDetector {
    IconDetector::with_workers(
        TemplateStore::from_templates(templates),
        MatchConfig::default(),
        Some(1),
    )
    .unwrap()
}

#[test]
fn finds_each_item_once_at_its_location() {
    let rifle = random_patch(1, 32, 32);
    let ammo = random_patch(2, 32, 32);
    let mut canvas = vec![0u8; 240 * 160];
    paste(&mut canvas, 240, &rifle, 32, 20, 30);
    paste(&mut canvas, 240, &ammo, 32, 150, 90);
    let image = SearchImage::from_luma(canvas, 240, 160).unwrap();

    let detector = IconDetector::new(
        TemplateStore::from_templates(vec![
            variant("Rifle", 0, 0, rifle, 32),
            variant("Ammo23C", 0, 0, ammo, 32),
            variant("Absent", 0, 0, random_patch(3, 32, 32), 32),
        ]),
        MatchConfig::default(),
    )
    .unwrap();
    let items = detector.detect_items(&image).unwrap();

    let found: Vec<(&str, u32, u32)> = items
        .iter()
        .map(|d| (d.item_code.as_str(), d.bbox.x, d.bbox.y))
        .collect();
    assert_eq!(found, vec![("Rifle", 20, 30), ("Ammo23C", 150, 90)]);
    assert!(items.iter().all(|d| d.confidence > 0.99));
}

#[test]
fn repeated_icon_yields_one_detection() {
    let rifle = random_patch(4, 24, 24);
    let mut canvas = vec![0u8; 200 * 100];
    paste(&mut canvas, 200, &rifle, 24, 10, 50);
    paste(&mut canvas, 200, &rifle, 24, 150, 20);
    let image = SearchImage::from_luma(canvas, 200, 100).unwrap();

    let detector = single_worker(vec![variant("Rifle", 0, 0, rifle, 24)]);
    let items = detector.detect_items(&image).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!((items[0].bbox.x, items[0].bbox.y), (150, 20));
}

#[test]
fn overlapping_items_keep_the_stronger_one() {
    let exact = random_patch(5, 32, 32);
    // Darken bright pixels without crossing the binary cutoff: the binary
    // plane still matches perfectly, the grayscale plane slightly less.
    let mut similar = exact.clone();
    for value in similar.iter_mut().filter(|v| **v >= 128).take(100) {
        *value -= 64;
    }
    let mut canvas = vec![0u8; 120 * 120];
    paste(&mut canvas, 120, &exact, 32, 40, 40);
    let image = SearchImage::from_luma(canvas, 120, 120).unwrap();

    let detector = single_worker(vec![
        variant("Alpha", 0, 0, similar, 32),
        variant("Bravo", 0, 0, exact, 32),
    ]);
    let (items, stats) = detector.detect_items_with_stats(&image).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_code, "Bravo");
    assert_eq!(stats.groups_evaluated, 2);
    assert_eq!(stats.suppressed, 1);
}

#[test]
fn largest_variant_first_and_early_exit() {
    let large = random_patch(6, 32, 32);
    let small = random_patch(7, 20, 20);
    let mut canvas = vec![0u8; 100 * 100];
    paste(&mut canvas, 100, &large, 32, 30, 30);
    let image = SearchImage::from_luma(canvas, 100, 100).unwrap();

    let detector = single_worker(vec![
        variant("Rifle", 0, 0, small, 20),
        variant("Rifle", 0, 1, large, 32),
    ]);
    let (items, stats) = detector.detect_items_with_stats(&image).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].ordinal, 1);
    assert_eq!(stats.variants_tried, 1);
    assert_eq!(stats.early_exits, 1);
}

#[test]
fn confident_item_skips_its_other_template_sets() {
    let rifle = random_patch(8, 24, 24);
    let mut canvas = vec![0u8; 90 * 90];
    paste(&mut canvas, 90, &rifle, 24, 33, 21);
    let image = SearchImage::from_luma(canvas, 90, 90).unwrap();

    let detector = single_worker(vec![
        variant("Rifle", 0, 0, rifle.clone(), 24),
        variant("Rifle", 1, 0, rifle, 24),
    ]);
    assert_eq!(detector.group_count(), 2);
    let (items, stats) = detector.detect_items_with_stats(&image).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].set, 0);
    assert_eq!(stats.groups_evaluated, 1);
    assert_eq!(stats.groups_skipped, 1);
}

#[test]
fn repeated_runs_are_identical() {
    let mut canvas = random_patch(9, 256, 192);
    let mut templates = Vec::new();
    for i in 0..12u64 {
        let patch = random_patch(100 + i, 24, 24);
        if i % 3 != 0 {
            let x = 8 + (i as usize % 6) * 40;
            let y = 8 + (i as usize / 6) * 80;
            paste(&mut canvas, 256, &patch, 24, x, y);
        }
        templates.push(variant(&format!("Item{i:02}"), 0, 0, patch, 24));
    }
    let image = SearchImage::from_luma(canvas, 256, 192).unwrap();
    let detector =
        IconDetector::new(TemplateStore::from_templates(templates), MatchConfig::default())
            .unwrap();

    let first = detector.detect_items(&image).unwrap();
    assert_eq!(first.len(), 8);
    let codes: HashSet<&str> = first.iter().map(|d| d.item_code.as_str()).collect();
    assert_eq!(codes.len(), first.len());
    for _ in 0..3 {
        assert_eq!(detector.detect_items(&image).unwrap(), first);
    }
}

#[test]
fn cancelled_search_fails() {
    let image = SearchImage::from_luma(random_patch(10, 64, 64), 64, 64).unwrap();
    let detector = single_worker(vec![variant("Rifle", 0, 0, random_patch(11, 16, 16), 16)]);
    let cancel = CancelToken::new();
    assert!(detector.detect_items_cancellable(&image, &cancel).is_ok());
    cancel.cancel();
    assert_eq!(
        detector.detect_items_cancellable(&image, &cancel),
        Err(StockMatchError::Cancelled)
    );
}

#[test]
fn store_without_variants_is_rejected() {
    let glyph =
        Template::from_luma(TemplateKey::Glyph("num1".into()), (0..64).collect(), 8, 8).unwrap();
    let err = IconDetector::new(TemplateStore::from_templates(vec![glyph]), MatchConfig::default())
        .err()
        .unwrap();
    assert_eq!(err, StockMatchError::EmptyTemplateSet { kind: "icon" });
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = MatchConfig {
        confidence_threshold: 1.5,
        ..MatchConfig::default()
    };
    let store =
        TemplateStore::from_templates(vec![variant("Rifle", 0, 0, random_patch(12, 8, 8), 8)]);
    assert!(matches!(
        IconDetector::new(store, cfg),
        Err(StockMatchError::Configuration { .. })
    ));
}
