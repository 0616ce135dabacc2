use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sign_recog_core::GrayImage;
use sign_recog_matcher::{
    FeatureExtractor, FeatureParams, HarrisExtractor, MatcherParams, TemplateLibrary,
    TemplateMatcher,
};

fn blocks(size: usize, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = GrayImage::new(size, size);
    for y in 0..size {
        for x in 0..size {
            img.data[y * size + x] = (60 + x / 3 + y / 5).min(255) as u8;
        }
    }
    for _ in 0..24 {
        let w = rng.gen_range(8..size / 4);
        let h = rng.gen_range(8..size / 4);
        let x0 = rng.gen_range(0..size - w);
        let y0 = rng.gen_range(0..size - h);
        let v = if rng.gen_bool(0.5) { 20 } else { 230 };
        for y in y0..y0 + h {
            img.data[y * size + x0..y * size + x0 + w].fill(v);
        }
    }
    img
}

fn bench_features(c: &mut Criterion) {
    let img = blocks(160, 1);
    let extractor = HarrisExtractor::new(FeatureParams::default());
    c.bench_function("features_160", |b| {
        b.iter(|| extractor.extract(black_box(&img.view())))
    });
}

fn bench_predict(c: &mut Criterion) {
    let library = TemplateLibrary::build(
        [
            ("left", blocks(128, 11)),
            ("right", blocks(128, 22)),
            ("uturn", blocks(128, 33)),
        ],
        FeatureParams::default(),
    )
    .expect("library");
    let query = blocks(128, 22);

    let mut group = c.benchmark_group("predict");
    for parallel in [false, true] {
        let matcher = TemplateMatcher::new(MatcherParams {
            parallel,
            ..MatcherParams::default()
        });
        let name = if parallel { "parallel" } else { "sequential" };
        group.bench_function(name, |b| {
            b.iter(|| matcher.predict(black_box(&query.view()), &library))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_features, bench_predict);
criterion_main!(benches);
