use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use micro_press::encoding::ContentCoding;
use micro_press::filter::CompressingFilter;
use micro_press::pipeline::{OutputStage, SinkStage};

const CODINGS: [ContentCoding; 4] =
    [ContentCoding::Gzip, ContentCoding::Deflate, ContentCoding::Zstd, ContentCoding::Br];

/// A body with realistic text redundancy, built deterministically.
fn payload() -> Vec<u8> {
    let paragraph = "<p>The quick brown fox jumps over the lazy dog; \
                     pack my box with five dozen liquor jugs.</p>\n";
    paragraph.repeat(2048).into_bytes()
}

fn benchmark_compressing_filter(criterion: &mut Criterion) {
    let payload = payload();
    let mut group = criterion.benchmark_group("compressing_filter");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for coding in CODINGS {
        group.bench_with_input(BenchmarkId::from_parameter(coding.name()), &payload, |b, payload| {
            b.iter_batched_ref(
                || {
                    let mut filter = CompressingFilter::new(coding, coding.default_quality());
                    filter.set_next_stage(SinkStage::new(Vec::with_capacity(payload.len())));
                    filter
                },
                |filter| {
                    filter.write(black_box(payload)).expect("write should succeed");
                    black_box(filter.end().expect("end should succeed"));
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_compressing_filter);
criterion_main!(benches);
