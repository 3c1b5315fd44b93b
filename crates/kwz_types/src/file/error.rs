//! Error types for `.KWZ` parsing, writing and frame decoding.

use thiserror::Error;

use super::kwz::ChunkKind;

/// Errors that can occur when parsing, writing or decoding `.KWZ` files
#[derive(Debug, Error)]
pub enum KwzError {
	/// The container ended before a declared chunk or field was complete
	#[error(
		"Malformed container at offset {offset:#X}: expected {expected} bytes, only {available} available"
	)]
	MalformedContainer {
		/// Byte offset where the read started
		offset: usize,
		/// Number of bytes required
		expected: usize,
		/// Number of bytes actually available
		available: usize,
	},

	/// A chunk tag outside the recognized set was found, scanning stops here
	#[error("Unknown chunk tag {0:02X?}")]
	UnknownChunk([u8; 4]),

	/// A chunk parser was handed bytes starting with the wrong tag
	#[error("Invalid magic: expected {expected:02X?}, got {actual:02X?}")]
	InvalidMagic {
		/// Expected tag
		expected: [u8; 4],
		/// Tag found in the data
		actual: [u8; 4],
	},

	/// A base-32 string contains a character outside the custom alphabet
	#[error("Invalid base32 character {character:?} at position {position}")]
	InvalidBase32Character {
		/// Offending character
		character: char,
		/// Character position within the input
		position: usize,
	},

	/// A value assigned to a fixed-width field does not fit
	#[error("Field `{field}` is too long: at most {max} units allowed, got {actual}")]
	FieldTooLong {
		/// Name of the field being written
		field: &'static str,
		/// Capacity of the field
		max: usize,
		/// Length of the rejected value
		actual: usize,
	},

	/// A timestamp cannot be represented as seconds since 2000-01-01 in 32 bits
	#[error("Timestamp out of range: {seconds} seconds since 2000-01-01")]
	TimestampOutOfRange {
		/// Offset from the epoch that was rejected
		seconds: i64,
	},

	/// The bit reader needed a word past the end of the compressed layer
	#[error("Truncated bitstream: word at byte {offset} is past the layer length of {length} bytes")]
	TruncatedBitstream {
		/// Byte offset of the word that could not be fetched
		offset: usize,
		/// Length of the compressed layer
		length: usize,
	},

	/// The metadata layer sizes do not add up to the frame data payload
	#[error("Frame data size mismatch: frames use {expected} bytes, payload holds {actual}")]
	FrameDataSizeMismatch {
		/// Bytes described by the metadata table
		expected: usize,
		/// Bytes in the frame data payload
		actual: usize,
	},

	/// A raw line index does not address an entry of the line table
	#[error("Line index {0} is outside the line table")]
	InvalidLineIndex(u16),

	/// The requested frame is not described by the metadata table
	#[error("Frame index {index} out of range (frame count: {count})")]
	FrameOutOfRange {
		/// Requested frame
		index: usize,
		/// Number of frames available
		count: usize,
	},

	/// A chunk required for the operation is absent from the file
	#[error("Missing {0} chunk")]
	MissingChunk(ChunkKind),

	/// A stored CRC32 does not match the chunk payload
	#[error("{kind} chunk checksum mismatch: stored {stored:#010X}, computed {computed:#010X}")]
	ChecksumMismatch {
		/// Chunk whose checksum failed
		kind: ChunkKind,
		/// Checksum stored in the file
		stored: u32,
		/// Checksum computed over the payload
		computed: u32,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

impl KwzError {
	pub(crate) fn truncated(offset: usize, expected: usize, data: &[u8]) -> Self {
		Self::MalformedContainer {
			offset,
			expected,
			available: data.len().saturating_sub(offset),
		}
	}
}
