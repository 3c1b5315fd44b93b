//! Synthetic `.KWZ` files built through the public API.

use kwz_rs::prelude::file::kwz::{FrameData, Thumbnail};
use kwz_rs::prelude::*;

/// Tiles in one macro-tile row segment of the canvas
const SEGMENTS: usize = 90;

/// LSB-first bit packer for layer streams
#[derive(Default)]
pub struct BitWriter {
	bytes: Vec<u8>,
	acc: u64,
	bits: u32,
}

impl BitWriter {
	pub fn write(&mut self, value: u16, n: u32) {
		self.acc |= (u64::from(value) & ((1 << n) - 1)) << self.bits;
		self.bits += n;
		while self.bits >= 8 {
			self.bytes.push(self.acc as u8);
			self.acc >>= 8;
			self.bits -= 8;
		}
	}

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

/// A layer where every tile is common line `index`.
pub fn solid_layer(index: u16) -> Vec<u8> {
	let mut writer = BitWriter::default();
	for _ in 0..1200 {
		writer.write(0, 3);
		writer.write(index, 5);
	}
	writer.finish()
}

/// A layer that draws raw line `index` into the top-left tile and skips
/// every other tile.
pub fn corner_layer(index: u16) -> Vec<u8> {
	let mut writer = BitWriter::default();
	writer.write(1, 3);
	writer.write(index, 13);
	writer.write(5, 3);
	writer.write(14, 5);
	for _ in 1..SEGMENTS {
		writer.write(5, 3);
		writer.write(15, 5);
	}
	writer.finish()
}

/// Layer stream placeholder for a layer that does not change
pub fn unchanged() -> Vec<u8> {
	vec![0; 38]
}

/// Three frames:
/// - frame 0 fills layer A with pixel value 1
/// - frame 1 draws a tile of pixel value 2 at the origin of layer B
/// - frame 2 redraws layer C with pixel value 2
pub fn three_frame_file() -> KwzFile {
	let mut header = KwzHeader::new();
	header.set_author_name(AuthorRole::Root, "tester").unwrap();
	header.set_author_name(AuthorRole::Current, "tester").unwrap();
	header.set_author_id(AuthorRole::Root, &[0x14, 0, 0, 0, 0x10, 0, 0, 0, 0, 0]).unwrap();
	header.set_creation_timestamp(420_000_000);
	header.set_last_edit_timestamp(420_000_600);
	header.set_frame_speed(8);
	header.set_loop_playback(true);

	let frames = [
		([solid_layer(1), unchanged(), unchanged()], 0b000),
		([unchanged(), corner_layer(6560), unchanged()], 0b000),
		([unchanged(), unchanged(), solid_layer(2)], 0b100),
	];

	let mut payload = Vec::new();
	let mut entries = Vec::new();
	for (index, (layers, diffing)) in frames.into_iter().enumerate() {
		let mut entry = FrameMeta::default();
		for (i, layer) in layers.iter().enumerate() {
			entry.layer_sizes[i] = layer.len() as u16;
			entry.flags.set_layer_diffing(i, diffing & (1 << i) != 0);
			payload.extend_from_slice(layer);
		}
		entry.flags.set_paper_color_index(1);
		entry.flags.set_color_index(ColorRole::LayerAFirst, 2);
		entry.flags.set_based_on_prev_frame(index > 0);
		entry.layer_depths = [0, 1, 2];
		entries.push(entry);
	}

	let mut file = KwzFile::new(header);
	file.set_thumbnail(Some(Thumbnail::new(vec![0xFF, 0xD8, 0xFF, 0xD9])));
	file.set_meta(FrameMetaTable::new(entries)).unwrap();
	file.set_frame_data(Some(FrameData::new(payload)));
	file
}
