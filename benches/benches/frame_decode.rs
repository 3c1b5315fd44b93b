//! Benchmark suite for KWZ frame decoding
//!
//! This benchmark measures line table construction, container parsing and
//! frame decompression with synthetic files, and helps identify hot paths in
//! the decoder.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml
//!
//! For flamegraph profiling:
//! cargo bench --manifest-path benches/Cargo.toml -- --profile-time=5

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kwz_benches::{generate_common_layer, generate_raw_layer, generate_test_kwz_data};
use kwz_types::file::kwz::{DecodeCache, File, constants::LAYER_PIXELS, decoder};
use std::hint::black_box;

/// Benchmark decompressing a single layer with different tile mixes
fn bench_decompress_layer(c: &mut Criterion) {
	let mut group = c.benchmark_group("kwz_decompress_layer");
	group.throughput(Throughput::Elements(LAYER_PIXELS as u64));

	let layers = [("common", generate_common_layer(1)), ("raw", generate_raw_layer(0))];
	for (name, data) in &layers {
		group.bench_with_input(BenchmarkId::new("layer", name), data, |b, data| {
			let mut layer = Box::new([0u8; LAYER_PIXELS]);
			b.iter(|| {
				let result = decoder::decompress_layer(black_box(data), &mut layer);
				black_box(result)
			});
		});
	}

	group.finish();
}

/// Benchmark parsing the container without decoding frames
fn bench_parse_file(c: &mut Criterion) {
	let data = generate_test_kwz_data(16, true);
	c.bench_function("kwz_parse_file", |b| {
		b.iter(|| {
			let result = File::from_bytes(black_box(&data));
			black_box(result)
		});
	});
}

/// Benchmark decoding every frame in order versus the last frame directly
fn bench_decode_frames(c: &mut Criterion) {
	let mut group = c.benchmark_group("kwz_decode_frames");

	for frames in [4usize, 16] {
		let data = generate_test_kwz_data(frames, false);
		let file = File::from_bytes(&data).expect("generated file parses");

		group.bench_with_input(BenchmarkId::new("sequential", frames), &file, |b, file| {
			b.iter(|| {
				let decoder = file.decoder().expect("decoder");
				for frame in decoder.frames() {
					black_box(frame.expect("frame decodes"));
				}
			});
		});

		group.bench_with_input(BenchmarkId::new("last_frame_cold", frames), &file, |b, file| {
			let decoder = file.decoder().expect("decoder");
			b.iter(|| {
				let mut cache = DecodeCache::new();
				let raster = decoder.decode_frame(&mut cache, frames - 1).map(|r| r.as_bytes()[0]);
				black_box(raster)
			});
		});
	}

	group.finish();
}

/// Benchmark the lookup table accessors (first call builds the tables)
fn bench_line_tables(c: &mut Criterion) {
	c.bench_function("kwz_line_lookup", |b| {
		b.iter(|| {
			let mut sum = 0u32;
			for index in (0..6561u16).step_by(7) {
				let line = decoder::tables::line(black_box(index)).map(|l| l[0]).unwrap_or(0);
				let shifted = decoder::tables::shifted_index(index).unwrap_or(0);
				sum += u32::from(line) + u32::from(shifted);
			}
			black_box(sum)
		});
	});
}

criterion_group!(
	benches,
	bench_decompress_layer,
	bench_parse_file,
	bench_decode_frames,
	bench_line_tables
);
criterion_main!(benches);
