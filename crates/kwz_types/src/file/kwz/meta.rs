//! `KMI\x05` per-frame metadata table.
//!
//! # Record layout (28 bytes, little-endian)
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  ------------------------------------------
//! +0x00   4     flags (see FrameFlags)
//! +0x04   2     layer A compressed size
//! +0x06   2     layer B compressed size
//! +0x08   2     layer C compressed size
//! +0x0A   10    frame author id
//! +0x14   1     layer A depth
//! +0x15   1     layer B depth
//! +0x16   1     layer C depth
//! +0x17   1     sound effect flags
//! +0x18   2     reserved
//! +0x1A   2     camera flags
//! ```
//!
//! # Flags word
//!
//! ```text
//! bits 0-3    paper color index
//! bits 4-6    per-layer diffing flags (A, B, C)
//! bit  7      frame is built on top of the previous frame
//! bits 8-15   layer A first / second color index
//! bits 16-23  layer B first / second color index
//! bits 24-31  layer C first / second color index
//! ```

use serde::Serialize;

use crate::file::KwzError;

use super::{
	chunk::{ChunkKind, expect_chunk, read_array},
	constants::{
		AUTHOR_ID_SIZE, CHUNK_PREFIX_SIZE, FRAME_META_SIZE, LAYER_COUNT, META_MAGIC,
		UNCHANGED_LAYER_SIZE,
	},
	field,
	palette::{Color, ColorRole, palette_color},
};

const DIFFING_SHIFT: u32 = 4;
const BASED_ON_PREV_SHIFT: u32 = 7;

/// Packed 32-bit frame flags with read-modify-write accessors.
///
/// Setting one sub-field never touches the other bits of the word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FrameFlags(u32);

impl FrameFlags {
	/// Wraps a raw flags word.
	pub const fn from_bits(bits: u32) -> Self {
		Self(bits)
	}

	/// Returns the raw flags word.
	pub const fn bits(self) -> u32 {
		self.0
	}

	const fn field(self, shift: u32, mask: u32) -> u32 {
		(self.0 >> shift) & mask
	}

	fn set_field(&mut self, shift: u32, mask: u32, value: u32) {
		self.0 = (self.0 & !(mask << shift)) | ((value & mask) << shift);
	}

	/// Returns the paper color palette index.
	pub fn paper_color_index(self) -> u8 {
		self.color_index(ColorRole::Paper)
	}

	/// Sets the paper color palette index (low 4 bits are kept).
	pub fn set_paper_color_index(&mut self, value: u8) {
		self.set_color_index(ColorRole::Paper, value);
	}

	/// Returns the palette index assigned to `role`.
	pub fn color_index(self, role: ColorRole) -> u8 {
		self.field(role.shift(), 0xF) as u8
	}

	/// Assigns a palette index to `role` (low 4 bits are kept).
	pub fn set_color_index(&mut self, role: ColorRole, value: u8) {
		self.set_field(role.shift(), 0xF, u32::from(value));
	}

	/// Returns the diffing flag of `layer` (0 = A, 1 = B, 2 = C).
	pub fn layer_diffing(self, layer: usize) -> bool {
		layer < LAYER_COUNT && self.field(DIFFING_SHIFT + layer as u32, 1) == 1
	}

	/// Sets the diffing flag of `layer`. Indices past the last layer are ignored.
	pub fn set_layer_diffing(&mut self, layer: usize, value: bool) {
		if layer < LAYER_COUNT {
			self.set_field(DIFFING_SHIFT + layer as u32, 1, u32::from(value));
		}
	}

	/// The three diffing flags as a mask (bit 0 = layer A).
	pub fn diffing_mask(self) -> u8 {
		self.field(DIFFING_SHIFT, 0x7) as u8
	}

	/// Returns `true` if the frame is built on top of the previous frame.
	pub fn based_on_prev_frame(self) -> bool {
		self.field(BASED_ON_PREV_SHIFT, 1) == 1
	}

	/// Sets the "built on previous frame" flag.
	pub fn set_based_on_prev_frame(&mut self, value: bool) {
		self.set_field(BASED_ON_PREV_SHIFT, 1, u32::from(value));
	}
}

/// Metadata record of a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FrameMeta {
	/// Packed flags word
	pub flags: FrameFlags,
	/// Compressed byte size of layers A, B and C
	pub layer_sizes: [u16; LAYER_COUNT],
	/// Id of the author who drew this frame
	pub author_id: [u8; AUTHOR_ID_SIZE],
	/// Depth of layers A, B and C
	pub layer_depths: [u8; LAYER_COUNT],
	/// Sound effect trigger flags
	pub sound_effect_flags: u8,
	/// Reserved, purpose unknown
	pub unknown: u16,
	/// Camera flags
	pub camera_flags: u16,
}

impl FrameMeta {
	/// Size of the record in bytes
	pub const SIZE: usize = FRAME_META_SIZE;

	/// Parses a record from the first 28 bytes of `data`.
	///
	/// # Errors
	///
	/// [`KwzError::MalformedContainer`] if `data` is shorter than one record.
	pub fn from_bytes(data: &[u8]) -> Result<Self, KwzError> {
		let raw: [u8; FRAME_META_SIZE] = read_array(data, 0)?;
		let u16_at = |offset: usize| u16::from_le_bytes([raw[offset], raw[offset + 1]]);

		let mut author_id = [0u8; AUTHOR_ID_SIZE];
		author_id.copy_from_slice(&raw[10..20]);

		Ok(Self {
			flags: FrameFlags(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
			layer_sizes: [u16_at(4), u16_at(6), u16_at(8)],
			author_id,
			layer_depths: [raw[20], raw[21], raw[22]],
			sound_effect_flags: raw[23],
			unknown: u16_at(24),
			camera_flags: u16_at(26),
		})
	}

	/// Serializes the record.
	pub fn to_bytes(&self) -> [u8; FRAME_META_SIZE] {
		let mut bytes = [0u8; FRAME_META_SIZE];
		bytes[0..4].copy_from_slice(&self.flags.bits().to_le_bytes());
		for (i, size) in self.layer_sizes.iter().enumerate() {
			bytes[4 + i * 2..6 + i * 2].copy_from_slice(&size.to_le_bytes());
		}
		bytes[10..20].copy_from_slice(&self.author_id);
		bytes[20..23].copy_from_slice(&self.layer_depths);
		bytes[23] = self.sound_effect_flags;
		bytes[24..26].copy_from_slice(&self.unknown.to_le_bytes());
		bytes[26..28].copy_from_slice(&self.camera_flags.to_le_bytes());
		bytes
	}

	/// Sets the frame author id, zero-padding short values.
	///
	/// # Errors
	///
	/// [`KwzError::FieldTooLong`] if `value` is longer than 10 bytes.
	pub fn set_author_id(&mut self, value: &[u8]) -> Result<(), KwzError> {
		field::write_padded(&mut self.author_id, value, "frame_author_id")
	}

	/// Compressed size of `layer`, 0 for indices past the last layer.
	pub fn layer_size(&self, layer: usize) -> u16 {
		self.layer_sizes.get(layer).copied().unwrap_or(0)
	}

	/// Returns `true` if `layer` carries the "unchanged" sentinel size.
	pub fn is_layer_unchanged(&self, layer: usize) -> bool {
		self.layer_size(layer) == UNCHANGED_LAYER_SIZE
	}

	/// Total compressed bytes of the three layers.
	pub fn total_size(&self) -> usize {
		self.layer_sizes.iter().map(|&s| usize::from(s)).sum()
	}

	/// Resolves the palette color assigned to `role`.
	pub fn color(&self, role: ColorRole) -> Option<Color> {
		palette_color(self.flags.color_index(role))
	}

	/// Layer indices in drawing order, back to front: descending depth, ties
	/// kept in A, B, C order.
	pub fn layer_draw_order(&self) -> [usize; LAYER_COUNT] {
		let mut order = [0, 1, 2];
		order.sort_by(|&a, &b| self.layer_depths[b].cmp(&self.layer_depths[a]));
		order
	}
}

/// Metadata records for every frame of a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FrameMetaTable {
	entries: Vec<FrameMeta>,
}

impl FrameMetaTable {
	/// Creates a table from existing records.
	pub fn new(entries: Vec<FrameMeta>) -> Self {
		Self {
			entries,
		}
	}

	/// Parses `frame_count` consecutive records from a chunk payload.
	///
	/// # Errors
	///
	/// [`KwzError::MalformedContainer`] if the payload holds fewer records.
	pub fn from_payload(payload: &[u8], frame_count: usize) -> Result<Self, KwzError> {
		let expected = frame_count * FRAME_META_SIZE;
		if payload.len() < expected {
			return Err(KwzError::truncated(0, expected, payload));
		}

		let entries = payload
			.chunks_exact(FRAME_META_SIZE)
			.take(frame_count)
			.map(FrameMeta::from_bytes)
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self {
			entries,
		})
	}

	/// Parses a whole `KMI\x05` chunk.
	///
	/// # Errors
	///
	/// - [`KwzError::InvalidMagic`] if the tag is not `KMI\x05`
	/// - [`KwzError::MalformedContainer`] if the chunk or its records are truncated
	pub fn from_bytes(data: &[u8], frame_count: usize) -> Result<Self, KwzError> {
		let size = expect_chunk(data, ChunkKind::Meta)? as usize;
		let end = CHUNK_PREFIX_SIZE + size;
		let payload = data
			.get(CHUNK_PREFIX_SIZE..end)
			.ok_or_else(|| KwzError::truncated(0, end, data))?;
		Self::from_payload(payload, frame_count)
	}

	/// Serializes the chunk: tag, size, then every record.
	pub fn to_bytes(&self) -> Vec<u8> {
		let payload_len = self.entries.len() * FRAME_META_SIZE;
		let mut bytes = Vec::with_capacity(CHUNK_PREFIX_SIZE + payload_len);
		bytes.extend_from_slice(&META_MAGIC);
		bytes.extend_from_slice(&(payload_len as u32).to_le_bytes());
		for entry in &self.entries {
			bytes.extend_from_slice(&entry.to_bytes());
		}
		bytes
	}

	/// Returns the record of frame `index`, or `None` when out of range.
	pub fn get(&self, index: usize) -> Option<&FrameMeta> {
		self.entries.get(index)
	}

	/// Returns a mutable record of frame `index`, or `None` when out of range.
	pub fn get_mut(&mut self, index: usize) -> Option<&mut FrameMeta> {
		self.entries.get_mut(index)
	}

	/// Number of records.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if the table holds no records.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// All records in frame order.
	pub fn entries(&self) -> &[FrameMeta] {
		&self.entries
	}

	/// Iterates over records in frame order.
	pub fn iter(&self) -> std::slice::Iter<'_, FrameMeta> {
		self.entries.iter()
	}

	/// Appends a record.
	pub fn push(&mut self, entry: FrameMeta) {
		self.entries.push(entry);
	}
}

impl<'a> IntoIterator for &'a FrameMetaTable {
	type Item = &'a FrameMeta;
	type IntoIter = std::slice::Iter<'a, FrameMeta>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}
