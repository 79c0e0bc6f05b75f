use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use glitch_spotter::{AnomalyKind, DetectorSet, PixelBuffer, detection::pipeline::Pipeline};

fn synthetic(size: u32) -> PixelBuffer {
    PixelBuffer::from_fn(size, size, |x, y| {
        let v = ((x * 7 + y * 13) % 256) as u8;
        let block = if (x / 32 + y / 32) % 3 == 0 { 0 } else { v };
        [block, v / 2, 255 - v, 255]
    })
    .unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let buffer = synthetic(512);
    let parallel = Pipeline::new();
    let sequential = Pipeline::new().with_parallel(false);

    c.bench_function("pipeline_all_parallel_512", |b| {
        b.iter(|| parallel.run(black_box(&buffer), &DetectorSet::all()))
    });

    c.bench_function("pipeline_all_sequential_512", |b| {
        b.iter(|| sequential.run(black_box(&buffer), &DetectorSet::all()))
    });

    for kind in AnomalyKind::ALL {
        let set = DetectorSet::empty().with(kind);
        c.bench_function(&format!("detector_{:?}_512", kind), |b| {
            b.iter(|| sequential.run(black_box(&buffer), &set))
        });
    }
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
