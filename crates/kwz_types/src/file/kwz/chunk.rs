//! Sequential chunk scanner for the `.KWZ` container.
//!
//! Every chunk starts with a 4-byte tag and a little-endian `u32` declared
//! size, followed by `size` payload bytes. The scanner only splits the file;
//! each chunk kind is parsed by its own module.

use std::fmt::Display;

use log::debug;
use serde::Serialize;

use crate::file::KwzError;

use super::constants::{
	CHUNK_PREFIX_SIZE, FRAME_DATA_MAGIC, HEADER_MAGIC, META_MAGIC, THUMBNAIL_MAGIC,
};

/// The chunk kinds understood by the container parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChunkKind {
	/// File header (`KFH\x14`)
	Header,
	/// Thumbnail image (`KTN\x02`), kept as an opaque blob
	Thumbnail,
	/// Per-frame metadata table (`KMI\x05`)
	Meta,
	/// Compressed frame data (`KMC\x02`)
	FrameData,
}

impl ChunkKind {
	/// All recognized chunk kinds
	pub const ALL: [ChunkKind; 4] =
		[ChunkKind::Header, ChunkKind::Thumbnail, ChunkKind::Meta, ChunkKind::FrameData];

	/// Returns the 4-byte tag identifying this chunk kind.
	pub const fn magic(self) -> [u8; 4] {
		match self {
			ChunkKind::Header => HEADER_MAGIC,
			ChunkKind::Thumbnail => THUMBNAIL_MAGIC,
			ChunkKind::Meta => META_MAGIC,
			ChunkKind::FrameData => FRAME_DATA_MAGIC,
		}
	}

	/// Looks up the chunk kind for a tag.
	pub fn from_magic(tag: [u8; 4]) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.magic() == tag)
	}
}

impl Display for ChunkKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ChunkKind::Header => write!(f, "Header"),
			ChunkKind::Thumbnail => write!(f, "Thumbnail"),
			ChunkKind::Meta => write!(f, "Meta"),
			ChunkKind::FrameData => write!(f, "FrameData"),
		}
	}
}

/// A chunk located in the container, borrowing the file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
	/// Kind of the chunk, from its tag
	pub kind: ChunkKind,
	/// Offset of the tag within the file
	pub offset: usize,
	/// Size declared after the tag
	pub declared_size: u32,
	/// The whole chunk: tag, size and payload
	pub bytes: &'a [u8],
}

impl<'a> RawChunk<'a> {
	/// Payload bytes following the tag and size.
	pub fn payload(&self) -> &'a [u8] {
		&self.bytes[CHUNK_PREFIX_SIZE..]
	}
}

/// Reads an `N`-byte array at `offset`, failing with [`KwzError::MalformedContainer`].
pub(crate) fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], KwzError> {
	data.get(offset..offset + N)
		.and_then(|slice| slice.try_into().ok())
		.ok_or_else(|| KwzError::truncated(offset, N, data))
}

/// Reads a little-endian `u32` at `offset`.
pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32, KwzError> {
	read_array::<4>(data, offset).map(u32::from_le_bytes)
}

/// Checks that `data` starts with the tag of `kind` and returns the declared size.
pub(crate) fn expect_chunk(data: &[u8], kind: ChunkKind) -> Result<u32, KwzError> {
	let tag = read_array::<4>(data, 0)?;
	if tag != kind.magic() {
		return Err(KwzError::InvalidMagic {
			expected: kind.magic(),
			actual: tag,
		});
	}
	read_u32(data, 4)
}

/// Sequential scanner splitting file bytes into chunks
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
	data: &'a [u8],
	offset: usize,
}

impl<'a> ChunkReader<'a> {
	/// Creates a scanner positioned at the start of `data`.
	pub fn new(data: &'a [u8]) -> Self {
		Self {
			data,
			offset: 0,
		}
	}

	/// Current read offset.
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Number of bytes not consumed yet.
	pub fn remaining(&self) -> usize {
		self.data.len() - self.offset
	}

	/// Returns the next tag without consuming it.
	pub fn peek_tag(&self) -> Option<[u8; 4]> {
		read_array::<4>(self.data, self.offset).ok()
	}

	/// Reads the next chunk.
	///
	/// Returns `Ok(None)` at the end of the data. An unrecognized tag yields
	/// [`KwzError::UnknownChunk`] without consuming anything, so the caller can
	/// stop scanning and keep what it has.
	///
	/// # Errors
	///
	/// [`KwzError::MalformedContainer`] if the tag, the size field or the
	/// declared payload runs past the end of the data.
	pub fn next_chunk(&mut self) -> Result<Option<RawChunk<'a>>, KwzError> {
		if self.remaining() == 0 {
			return Ok(None);
		}

		let tag = read_array::<4>(self.data, self.offset)?;
		let Some(kind) = ChunkKind::from_magic(tag) else {
			return Err(KwzError::UnknownChunk(tag));
		};

		let declared_size = read_u32(self.data, self.offset + 4)?;
		let total = CHUNK_PREFIX_SIZE + declared_size as usize;
		let bytes = self
			.data
			.get(self.offset..self.offset + total)
			.ok_or_else(|| KwzError::truncated(self.offset, total, self.data))?;

		debug!("{kind} chunk at {:#X}, {declared_size} bytes", self.offset);

		let chunk = RawChunk {
			kind,
			offset: self.offset,
			declared_size,
			bytes,
		};
		self.offset += total;
		Ok(Some(chunk))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chunk(tag: [u8; 4], payload: &[u8]) -> Vec<u8> {
		let mut out = tag.to_vec();
		out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
		out.extend_from_slice(payload);
		out
	}

	#[test]
	fn test_reads_chunks_in_order() {
		let mut data = chunk(META_MAGIC, &[1, 2, 3]);
		data.extend(chunk(FRAME_DATA_MAGIC, &[9; 8]));

		let mut reader = ChunkReader::new(&data);
		let first = reader.next_chunk().unwrap().unwrap();
		assert_eq!(first.kind, ChunkKind::Meta);
		assert_eq!(first.offset, 0);
		assert_eq!(first.declared_size, 3);
		assert_eq!(first.payload(), &[1, 2, 3]);

		let second = reader.next_chunk().unwrap().unwrap();
		assert_eq!(second.kind, ChunkKind::FrameData);
		assert_eq!(second.offset, 11);
		assert_eq!(second.bytes.len(), 16);

		assert!(reader.next_chunk().unwrap().is_none());
	}

	#[test]
	fn test_unknown_tag_is_not_consumed() {
		let mut data = chunk(META_MAGIC, &[]);
		data.extend(chunk(*b"KSN\x01", &[0; 4]));

		let mut reader = ChunkReader::new(&data);
		reader.next_chunk().unwrap().unwrap();
		let err = reader.next_chunk().unwrap_err();
		assert!(matches!(err, KwzError::UnknownChunk(tag) if &tag == b"KSN\x01"));
		assert_eq!(reader.offset(), 8);
		assert_eq!(reader.peek_tag(), Some(*b"KSN\x01"));
	}

	#[test]
	fn test_declared_size_past_end() {
		let mut data = chunk(THUMBNAIL_MAGIC, &[0; 4]);
		data[4] = 100;

		let err = ChunkReader::new(&data).next_chunk().unwrap_err();
		assert!(matches!(
			err,
			KwzError::MalformedContainer {
				offset: 0,
				expected: 108,
				available: 12
			}
		));
	}

	#[test]
	fn test_truncated_size_field() {
		let data = [0x4B, 0x4D, 0x49, 0x05, 0x01];
		assert!(matches!(
			ChunkReader::new(&data).next_chunk(),
			Err(KwzError::MalformedContainer { .. })
		));
	}

	#[test]
	fn test_kind_magic_roundtrip() {
		for kind in ChunkKind::ALL {
			assert_eq!(ChunkKind::from_magic(kind.magic()), Some(kind));
		}
		assert_eq!(ChunkKind::from_magic(*b"KSN\x01"), None);
	}
}
