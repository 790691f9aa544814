//! Performance benchmarks for the change-stream frame decoder
//!
//! Tests decode throughput for different event counts, whole-stream and
//! one line per chunk.
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use community_client::sse::FrameDecoder;

/// Generate a change stream with one announcement and `events` payload lines
fn generate_stream(events: usize) -> Vec<u8> {
    let mut stream = String::from(":ok\n\nevent: data\n");
    for i in 0..events {
        stream.push_str(&format!(
            "data: {{\"target\":{},\"type\":\"create\",\"data\":{{\"id\":{},\"title\":\"Post number {}\"}}}}\n",
            i, i, i
        ));
    }
    stream.into_bytes()
}

/// Benchmark decoding a stream delivered in one chunk
fn bench_decode_single_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_single_chunk");

    for size in [10, 100, 1000].iter() {
        let stream = generate_stream(*size);
        group.throughput(Throughput::Bytes(stream.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_events", size)),
            &stream,
            |b, stream| {
                b.iter(|| {
                    let mut decoder = FrameDecoder::new();
                    black_box(decoder.feed_chunk(black_box(stream)))
                });
            },
        );
    }

    group.finish();
}

/// Benchmark decoding a stream delivered one line per chunk
fn bench_decode_line_chunks(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_line_chunks");

    for size in [10, 100, 1000].iter() {
        let stream = generate_stream(*size);
        let chunks: Vec<&[u8]> = stream.split(|b| *b == b'\n').collect();
        group.throughput(Throughput::Bytes(stream.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_events", size)),
            &chunks,
            |b, chunks| {
                b.iter(|| {
                    let mut decoder = FrameDecoder::new();
                    let mut frames = 0;
                    for chunk in chunks {
                        frames += decoder.feed_chunk(black_box(chunk)).len();
                    }
                    black_box(frames)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_decode_single_chunk, bench_decode_line_chunks);
criterion_main!(benches);
