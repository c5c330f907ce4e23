//! Benchmark suite for SIF encoding and decoding
//!
//! Measures compression and decompression throughput over synthetic
//! rasters with very different statistics, across the codec's flag
//! combinations.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml
//!
//! For flamegraph profiling:
//! cargo bench --manifest-path benches/Cargo.toml -- --profile-time=5

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sif_benches::{flat_raster, gradient_raster, noise_raster, sizes};
use sif_types::prelude::*;
use std::hint::black_box;

fn content_variants() -> Vec<(&'static str, Vec<u8>)> {
	let (width, height) = sizes::MEDIUM;
	vec![
		("flat", flat_raster(width, height)),
		("gradient", gradient_raster(width, height)),
		("noise", noise_raster(width, height)),
	]
}

fn flag_variants() -> Vec<(&'static str, Flags)> {
	vec![
		("direct", Flags::default()),
		(
			"green_2d",
			Flags::default()
				.with_predictor(Predictor::DecorrelateFromGreen)
				.with_2d_prediction(true),
		),
		(
			"green_2d_dict",
			Flags::default()
				.with_predictor(Predictor::DecorrelateFromGreen)
				.with_2d_prediction(true)
				.with_contextual_dict(true),
		),
	]
}

/// Benchmark compression across content types
fn bench_compress(c: &mut Criterion) {
	let (width, height) = sizes::MEDIUM;
	let mut group = c.benchmark_group("sif_compress");
	group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));

	for (content_name, pixels) in content_variants() {
		for (flags_name, flags) in flag_variants() {
			let descriptor = ContentDescriptor::new(width, height, flags);
			let id = BenchmarkId::new(content_name, flags_name);
			group.bench_with_input(id, &pixels, |b, pixels| {
				b.iter(|| {
					let encoded = compress_image(&descriptor, black_box(pixels));
					black_box(encoded)
				});
			});
		}
	}

	group.finish();
}

/// Benchmark decompression across content types
fn bench_decompress(c: &mut Criterion) {
	let (width, height) = sizes::MEDIUM;
	let mut group = c.benchmark_group("sif_decompress");
	group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));

	for (content_name, pixels) in content_variants() {
		for (flags_name, flags) in flag_variants() {
			let descriptor = ContentDescriptor::new(width, height, flags);
			let encoded = compress_image(&descriptor, &pixels).expect("bench encode failed");
			let id = BenchmarkId::new(content_name, flags_name);
			group.bench_with_input(id, &encoded, |b, encoded| {
				b.iter(|| {
					let decoded = decompress_image(black_box(encoded));
					black_box(decoded)
				});
			});
		}
	}

	group.finish();
}

/// Benchmark header probing separately
fn bench_probe(c: &mut Criterion) {
	let (width, height) = sizes::TINY;
	let descriptor = ContentDescriptor::new(width, height, Flags::default());
	let encoded =
		compress_image(&descriptor, &gradient_raster(width, height)).expect("bench encode failed");

	let mut group = c.benchmark_group("sif_probe");
	group.bench_function("probe", |b| {
		b.iter(|| {
			let info = probe(black_box(&encoded));
			black_box(info)
		});
	});
	group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress, bench_probe);
criterion_main!(benches);
