//! Benchmark helper utilities for kwz-rs
//!
//! This module provides utilities for generating synthetic `.KWZ` data for
//! the benchmark suite. Layer streams are packed with the same bit layout the
//! decoder reads: little-endian 16-bit words, least significant bit first.

use kwz_types::file::kwz::{File, FrameData, FrameMeta, FrameMetaTable, Header};

/// Number of tiles in one 320x240 layer
pub const TILES_PER_LAYER: usize = 1200;

/// Minimal LSB-first bit packer
#[derive(Debug, Default)]
pub struct BitWriter {
	bytes: Vec<u8>,
	acc: u64,
	bits: u32,
}

impl BitWriter {
	/// Appends the low `n` bits of `value`.
	pub fn write(&mut self, value: u16, n: u32) {
		self.acc |= (u64::from(value) & ((1u64 << n) - 1)) << self.bits;
		self.bits += n;
		while self.bits >= 8 {
			self.bytes.push(self.acc as u8);
			self.acc >>= 8;
			self.bits -= 8;
		}
	}

	/// Flushes pending bits and pads the stream to a whole number of words.
	pub fn finish(mut self) -> Vec<u8> {
		if self.bits > 0 {
			self.bytes.push(self.acc as u8);
		}
		if self.bytes.len() % 2 == 1 {
			self.bytes.push(0);
		}
		self.bytes
	}
}

/// Generates a layer where every tile is a raw 13-bit line (the slowest path).
///
/// `seed` varies the line indices between layers.
pub fn generate_raw_layer(seed: u16) -> Vec<u8> {
	let mut writer = BitWriter::default();
	let mut index = seed % 6561;
	for _ in 0..TILES_PER_LAYER {
		// tile type 4: per-row selection, all rows raw
		writer.write(4, 3);
		writer.write(0, 8);
		for _ in 0..8 {
			writer.write(index, 13);
			index = (index * 7 + 13) % 6561;
		}
	}
	writer.finish()
}

/// Generates a layer of 5-bit common lines (the cheapest drawing tile).
pub fn generate_common_layer(common_index: u16) -> Vec<u8> {
	let mut writer = BitWriter::default();
	for _ in 0..TILES_PER_LAYER {
		writer.write(0, 3);
		writer.write(common_index % 32, 5);
	}
	writer.finish()
}

/// Generates a complete file with `frame_count` frames.
///
/// Every frame redraws all three layers, so decoding a frame never needs the
/// previous one unless `diffing` is `false`, in which case each frame depends
/// on its predecessor and the whole chain is decoded from frame 0.
///
/// # Panics
///
/// Panics if `frame_count` does not fit the 16-bit header frame count.
pub fn generate_test_kwz_data(frame_count: usize, diffing: bool) -> Vec<u8> {
	let mut payload = Vec::new();
	let mut entries = Vec::with_capacity(frame_count);

	for frame in 0..frame_count {
		let layers = [
			generate_raw_layer(frame as u16),
			generate_common_layer(frame as u16),
			generate_raw_layer(frame as u16 + 1000),
		];

		let mut entry = FrameMeta::default();
		for (i, layer) in layers.iter().enumerate() {
			entry.layer_sizes[i] = layer.len() as u16;
			entry.flags.set_layer_diffing(i, diffing);
			payload.extend_from_slice(layer);
		}
		entries.push(entry);
	}

	let mut file = File::new(Header::new());
	file.set_meta(FrameMetaTable::new(entries)).expect("frame count fits in the header");
	file.set_frame_data(Some(FrameData::new(payload)));
	file.to_bytes()
}
