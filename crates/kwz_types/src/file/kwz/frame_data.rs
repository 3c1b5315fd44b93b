//! `KMC\x02` compressed frame data chunk.
//!
//! The payload following the CRC field is the concatenation, frame by frame,
//! of each frame's layer A, B and C streams. Sizes come from the metadata
//! table, so the chunk itself is kept opaque until a decoder slices it.

use log::warn;

use crate::file::KwzError;

use super::{
	chunk::{ChunkKind, expect_chunk, read_u32},
	constants::{CHECKSUMMED_PAYLOAD_OFFSET, CHUNK_PREFIX_SIZE, CRC_SIZE, FRAME_DATA_MAGIC},
	meta::FrameMetaTable,
};

/// Frame data chunk: stored CRC32 plus the compressed layer streams
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FrameData {
	crc32: u32,
	payload: Vec<u8>,
}

impl FrameData {
	/// Wraps compressed layer streams; the checksum is computed on write.
	pub fn new(payload: Vec<u8>) -> Self {
		Self {
			crc32: crc32fast::hash(&payload),
			payload,
		}
	}

	/// Parses a frame data chunk (tag, size, CRC32, `size - 4` payload bytes).
	///
	/// # Errors
	///
	/// - [`KwzError::InvalidMagic`] if the tag is not `KMC\x02`
	/// - [`KwzError::MalformedContainer`] if the declared size is shorter than
	///   the CRC field or runs past the data
	pub fn from_bytes(data: &[u8]) -> Result<Self, KwzError> {
		let size = expect_chunk(data, ChunkKind::FrameData)? as usize;
		if size < CRC_SIZE {
			return Err(KwzError::MalformedContainer {
				offset: CHUNK_PREFIX_SIZE,
				expected: CRC_SIZE,
				available: size,
			});
		}
		let crc32 = read_u32(data, CHUNK_PREFIX_SIZE)?;
		let end = CHUNK_PREFIX_SIZE + size;
		let payload = data
			.get(CHECKSUMMED_PAYLOAD_OFFSET..end)
			.ok_or_else(|| KwzError::truncated(0, end, data))?;

		Ok(Self {
			crc32,
			payload: payload.to_vec(),
		})
	}

	/// Serializes the chunk with a freshly computed CRC32.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(CHECKSUMMED_PAYLOAD_OFFSET + self.payload.len());
		bytes.extend_from_slice(&FRAME_DATA_MAGIC);
		bytes.extend_from_slice(&((CRC_SIZE + self.payload.len()) as u32).to_le_bytes());
		bytes.extend_from_slice(&crc32fast::hash(&self.payload).to_le_bytes());
		bytes.extend_from_slice(&self.payload);
		bytes
	}

	/// Returns the stored CRC32.
	pub fn crc32(&self) -> u32 {
		self.crc32
	}

	/// Returns the CRC32 of the current payload.
	pub fn computed_crc32(&self) -> u32 {
		crc32fast::hash(&self.payload)
	}

	/// Compressed layer streams of every frame.
	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	/// Computes per-frame offsets into [`payload`](Self::payload).
	///
	/// # Errors
	///
	/// See [`FrameOffsets::compute`].
	pub fn frame_offsets(&self, meta: &FrameMetaTable) -> Result<FrameOffsets, KwzError> {
		FrameOffsets::compute(meta, self.payload.len())
	}
}

/// Byte offset and length of every frame inside the frame data payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FrameOffsets {
	offsets: Vec<usize>,
	lengths: Vec<usize>,
	payload_len: usize,
}

impl FrameOffsets {
	/// Accumulates the layer sizes of each metadata record.
	///
	/// Frame `i` starts where frame `i - 1` ends; frame 0 starts at 0.
	///
	/// # Errors
	///
	/// [`KwzError::MalformedContainer`] if the frames need more bytes than the
	/// payload holds. Unused bytes after the last frame are only logged, see
	/// [`FrameOffsets::check_exact`].
	pub fn compute(meta: &FrameMetaTable, payload_len: usize) -> Result<Self, KwzError> {
		let mut offsets = Vec::with_capacity(meta.len());
		let mut lengths = Vec::with_capacity(meta.len());
		let mut running = 0usize;
		for entry in meta {
			let len = entry.total_size();
			offsets.push(running);
			lengths.push(len);
			running += len;
		}

		if running > payload_len {
			return Err(KwzError::MalformedContainer {
				offset: 0,
				expected: running,
				available: payload_len,
			});
		}

		if running < payload_len {
			warn!("Frame data has {} bytes after the last frame", payload_len - running);
		}

		Ok(Self {
			offsets,
			lengths,
			payload_len,
		})
	}

	/// Checks that the frames use the payload exactly.
	///
	/// # Errors
	///
	/// [`KwzError::FrameDataSizeMismatch`] if bytes are left over after the
	/// last frame.
	pub fn check_exact(&self) -> Result<(), KwzError> {
		let expected = self.total_len();
		if expected != self.payload_len {
			return Err(KwzError::FrameDataSizeMismatch {
				expected,
				actual: self.payload_len,
			});
		}
		Ok(())
	}

	/// Payload bytes not covered by any frame.
	pub fn trailing_len(&self) -> usize {
		self.payload_len.saturating_sub(self.total_len())
	}

	/// Start of frame `index`, or `None` when out of range.
	pub fn offset(&self, index: usize) -> Option<usize> {
		self.offsets.get(index).copied()
	}

	/// Total compressed bytes of frame `index`, or `None` when out of range.
	pub fn len(&self, index: usize) -> Option<usize> {
		self.lengths.get(index).copied()
	}

	/// Number of frames.
	pub fn frame_count(&self) -> usize {
		self.offsets.len()
	}

	/// Returns `true` if no frames are described.
	pub fn is_empty(&self) -> bool {
		self.offsets.is_empty()
	}

	/// Bytes used by all frames together.
	pub fn total_len(&self) -> usize {
		self.lengths.iter().sum()
	}
}
