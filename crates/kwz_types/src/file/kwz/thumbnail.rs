//! `KTN\x02` thumbnail chunk.
//!
//! The payload is an opaque image blob; it is copied verbatim and never decoded.

use crate::file::KwzError;

use super::{
	chunk::{ChunkKind, expect_chunk, read_u32},
	constants::{CHECKSUMMED_PAYLOAD_OFFSET, CHUNK_PREFIX_SIZE, CRC_SIZE, THUMBNAIL_MAGIC},
};

/// Thumbnail chunk with its stored checksum
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Thumbnail {
	crc32: u32,
	data: Vec<u8>,
}

impl Thumbnail {
	/// Wraps an image blob; the checksum is computed on write.
	pub fn new(data: Vec<u8>) -> Self {
		Self {
			crc32: crc32fast::hash(&data),
			data,
		}
	}

	/// Parses a thumbnail chunk (tag, size, CRC32, `size - 4` payload bytes).
	///
	/// # Errors
	///
	/// - [`KwzError::InvalidMagic`] if the tag is not `KTN\x02`
	/// - [`KwzError::MalformedContainer`] if the declared size is shorter than
	///   the CRC field or runs past the data
	pub fn from_bytes(data: &[u8]) -> Result<Self, KwzError> {
		let size = expect_chunk(data, ChunkKind::Thumbnail)? as usize;
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
			data: payload.to_vec(),
		})
	}

	/// Serializes the chunk with a freshly computed CRC32.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(CHECKSUMMED_PAYLOAD_OFFSET + self.data.len());
		bytes.extend_from_slice(&THUMBNAIL_MAGIC);
		bytes.extend_from_slice(&((CRC_SIZE + self.data.len()) as u32).to_le_bytes());
		bytes.extend_from_slice(&crc32fast::hash(&self.data).to_le_bytes());
		bytes.extend_from_slice(&self.data);
		bytes
	}

	/// Returns the stored CRC32.
	pub fn crc32(&self) -> u32 {
		self.crc32
	}

	/// Returns the CRC32 of the current payload.
	pub fn computed_crc32(&self) -> u32 {
		crc32fast::hash(&self.data)
	}

	/// Returns the opaque image payload.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Replaces the image payload.
	pub fn set_data(&mut self, data: Vec<u8>) {
		self.data = data;
	}
}
