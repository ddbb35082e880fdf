use criterion::{Criterion, criterion_group, criterion_main};
use storyloom_engine::render::{StreamRenderer, render_markdown};
mod common;

fn bench_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream");
    group.sample_size(10);

    let text = common::generate_chapter(50);

    group.bench_function("one_fragment", |b| {
        b.iter(|| render_markdown(std::hint::black_box(&text)));
    });

    // character-sized fragments with a markup read after each, as a live view does
    group.bench_function("char_fragments", |b| {
        b.iter(|| {
            let mut renderer = StreamRenderer::new();
            for ch in text.chars() {
                renderer.feed(ch.encode_utf8(&mut [0; 4]));
                std::hint::black_box(renderer.current_markup());
            }
            renderer.finish()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_streaming);
criterion_main!(benches);
