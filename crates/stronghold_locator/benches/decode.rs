mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use stronghold_locator::glyph::{DecoderConfig, GlyphDecoder, SyntheticHud};

fn decode_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("glyph/decode");
    let decoder = GlyphDecoder::default();

    for scale in [1usize, 2, 4] {
        let hud = SyntheticHud::render("-1570/64/2231", scale, &DecoderConfig::default());
        group.throughput(common::elements_throughput(hud.width() * hud.height()));
        group.bench_with_input(BenchmarkId::new("scale", scale), &hud, |b, hud| {
            b.iter(|| {
                let decoded = hud
                    .view()
                    .and_then(|view| decoder.decode(&view, view.full_region()));
                black_box(decoded.ok());
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = decode_benches
}
criterion_main!(benches);
