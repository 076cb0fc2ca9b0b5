use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use stockmatch::{
    DigitDetector, IconDetector, MatchConfig, SearchImage, Template, TemplateKey, TemplateStore,
    VariantKey,
};

fn random_patch(rng: &mut StdRng, width: usize, height: usize) -> Vec<u8> {
    (0..width * height).map(|_| rng.random_range(0..=255)).collect()
}

fn paste(canvas: &mut [u8], canvas_width: usize, patch: &[u8], width: usize, x0: usize, y0: usize) {
    for (row, chunk) in patch.chunks(width).enumerate() {
        let start = (y0 + row) * canvas_width + x0;
        canvas[start..start + width].copy_from_slice(chunk);
    }
}

/// A 640x360 inventory screen with a 10x4 grid of 32 px icons, half of which
/// appear in the screenshot, and a two-digit count next to each shown icon.
fn make_scene(rng: &mut StdRng) -> (Vec<u8>, TemplateStore, TemplateStore) {
    let (width, height) = (640usize, 360usize);
    let mut canvas: Vec<u8> = (0..width * height).map(|_| rng.random_range(0..24)).collect();

    let glyphs: Vec<Vec<u8>> = (0..10).map(|_| random_patch(rng, 12, 20)).collect();
    let glyph_store = TemplateStore::from_templates(
        glyphs
            .iter()
            .enumerate()
            .map(|(d, data)| {
                Template::from_luma(TemplateKey::Glyph(format!("num{d}")), data.clone(), 12, 20)
                    .unwrap()
            })
            .collect(),
    );

    let mut icons = Vec::new();
    for i in 0..40usize {
        let data = random_patch(rng, 32, 32);
        if i % 2 == 0 {
            let x = 8 + (i % 10) * 62;
            let y = 8 + (i / 10) * 86;
            paste(&mut canvas, width, &data, 32, x, y);
            paste(&mut canvas, width, &glyphs[i % 10], 12, x + 32, y);
            paste(&mut canvas, width, &glyphs[(i / 10) % 10], 12, x + 44, y);
        }
        let key = TemplateKey::Variant(VariantKey::new(format!("Item{i:02}"), 0, 0));
        icons.push(Template::from_luma(key, data, 32, 32).unwrap());
    }
    (canvas, TemplateStore::from_templates(icons), glyph_store)
}

fn bench_detection(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let (canvas, icon_store, glyph_store) = make_scene(&mut rng);
    let image = SearchImage::from_luma(canvas.clone(), 640, 360).unwrap();

    c.bench_function("prepare_search_image", |b| {
        b.iter(|| black_box(SearchImage::from_luma(canvas.clone(), 640, 360).unwrap()));
    });

    let sequential =
        IconDetector::with_workers(icon_store.clone(), MatchConfig::default(), Some(1)).unwrap();
    c.bench_function("detect_items_single_worker", |b| {
        b.iter(|| black_box(sequential.detect_items(&image).unwrap()));
    });

    if cfg!(feature = "rayon") {
        let pooled = IconDetector::new(icon_store, MatchConfig::default()).unwrap();
        c.bench_function("detect_items_pool", |b| {
            b.iter(|| black_box(pooled.detect_items(&image).unwrap()));
        });
    }

    let digits = DigitDetector::new(glyph_store, MatchConfig::default()).unwrap();
    c.bench_function("detect_numbers", |b| {
        b.iter(|| black_box(digits.detect_numbers(&image)));
    });
}

criterion_group!(benches, bench_detection);
criterion_main!(benches);
