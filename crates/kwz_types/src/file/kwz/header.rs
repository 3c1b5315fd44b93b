//! `KFH\x14` file header chunk.
//!
//! # Layout (212 bytes, little-endian)
//!
//! | Offset | Size | Field                     |
//! |--------|------|---------------------------|
//! | 0x00   | 4    | tag `KFH\x14`             |
//! | 0x04   | 4    | declared size (`0xCC`)    |
//! | 0x08   | 4    | CRC32 of bytes 0x0C..0xD4 |
//! | 0x0C   | 4    | creation timestamp        |
//! | 0x10   | 4    | last edit timestamp       |
//! | 0x14   | 4    | app version               |
//! | 0x18   | 30   | root/parent/current author ids (10 bytes each) |
//! | 0x36   | 66   | root/parent/current author names (11 UTF-16LE units each) |
//! | 0x78   | 84   | root/parent/current filenames (28 ASCII bytes each) |
//! | 0xCC   | 2    | frame count               |
//! | 0xCE   | 2    | thumbnail frame index     |
//! | 0xD0   | 2    | flags                     |
//! | 0xD2   | 1    | frame speed               |
//! | 0xD3   | 1    | layer visibility flags    |
//!
//! Timestamps count seconds since 2000-01-01T00:00:00. Filenames are not
//! independent data: each one is the base-32 encoding of the matching author
//! id's first 9 bytes followed by both timestamps, and is regenerated on
//! every write.

use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::file::KwzError;

use super::{
	base32,
	chunk::{ChunkKind, expect_chunk, read_array},
	constants::{
		AUTHOR_ID_SIZE, AUTHOR_NAME_SIZE, CHECKSUMMED_PAYLOAD_OFFSET, FILENAME_AUTHOR_PREFIX,
		FILENAME_SIZE, FILENAME_SOURCE_SIZE, HEADER_DECLARED_SIZE, HEADER_MAGIC, HEADER_SIZE,
		LAYER_COUNT,
	},
	field,
};

mod offsets {
	pub const CREATION: usize = 0x0C;
	pub const LAST_EDIT: usize = 0x10;
	pub const APP_VERSION: usize = 0x14;
	pub const AUTHOR_IDS: usize = 0x18;
	pub const AUTHOR_NAMES: usize = 0x36;
	pub const FILENAMES: usize = 0x78;
	pub const FRAME_COUNT: usize = 0xCC;
	pub const THUMBNAIL_FRAME: usize = 0xCE;
	pub const FLAGS: usize = 0xD0;
	pub const FRAME_SPEED: usize = 0xD2;
	pub const LAYER_VISIBILITY: usize = 0xD3;
}

mod flag_bits {
	pub const LOCKED: u16 = 0x1;
	pub const LOOP_PLAYBACK: u16 = 0x2;
	pub const TOOLSET: u16 = 0x4;
}

/// Which author in the edit chain a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AuthorRole {
	/// Original creator of the animation
	Root,
	/// Author of the version this one was derived from
	Parent,
	/// Author of this version
	Current,
}

impl AuthorRole {
	/// The three roles in storage order
	pub const ALL: [AuthorRole; 3] = [AuthorRole::Root, AuthorRole::Parent, AuthorRole::Current];

	const fn index(self) -> usize {
		self as usize
	}
}

impl Display for AuthorRole {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AuthorRole::Root => write!(f, "Root"),
			AuthorRole::Parent => write!(f, "Parent"),
			AuthorRole::Current => write!(f, "Current"),
		}
	}
}

/// Start of the timestamp epoch, 2000-01-01T00:00:00.
fn epoch() -> NaiveDateTime {
	NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default().and_time(NaiveTime::default())
}

fn timestamp_to_datetime(seconds: u32) -> NaiveDateTime {
	epoch() + TimeDelta::seconds(i64::from(seconds))
}

fn datetime_to_timestamp(value: NaiveDateTime) -> Result<u32, KwzError> {
	let seconds = (value - epoch()).num_seconds();
	u32::try_from(seconds).map_err(|_| KwzError::TimestampOutOfRange {
		seconds,
	})
}

/// Header of a `.KWZ` file
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Header {
	crc32: u32,
	creation_timestamp: u32,
	last_edit_timestamp: u32,
	app_version: u32,
	author_ids: [[u8; AUTHOR_ID_SIZE]; 3],
	author_names: [[u8; AUTHOR_NAME_SIZE]; 3],
	filenames: [[u8; FILENAME_SIZE]; 3],
	frame_count: u16,
	thumbnail_frame_index: u16,
	flags: u16,
	frame_speed: u8,
	layer_visibility_flags: u8,
}

impl Header {
	/// Size of the header chunk in bytes
	pub const SIZE: usize = HEADER_SIZE;

	/// Creates an empty header with all fields zeroed.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a header chunk from the given bytes.
	///
	/// The stored CRC and filenames are kept as read; nothing is verified here.
	///
	/// # Errors
	///
	/// - [`KwzError::InvalidMagic`] if the tag is not `KFH\x14`
	/// - [`KwzError::MalformedContainer`] if fewer than 212 bytes are available
	pub fn from_bytes(data: &[u8]) -> Result<Self, KwzError> {
		expect_chunk(data, ChunkKind::Header)?;
		if data.len() < HEADER_SIZE {
			return Err(KwzError::truncated(0, HEADER_SIZE, data));
		}

		let u16_at = |offset: usize| u16::from_le_bytes([data[offset], data[offset + 1]]);
		let u32_at = |offset: usize| {
			u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
		};

		let mut author_ids = [[0u8; AUTHOR_ID_SIZE]; 3];
		let mut author_names = [[0u8; AUTHOR_NAME_SIZE]; 3];
		let mut filenames = [[0u8; FILENAME_SIZE]; 3];
		for i in 0..3 {
			author_ids[i] = read_array(data, offsets::AUTHOR_IDS + i * AUTHOR_ID_SIZE)?;
			author_names[i] = read_array(data, offsets::AUTHOR_NAMES + i * AUTHOR_NAME_SIZE)?;
			filenames[i] = read_array(data, offsets::FILENAMES + i * FILENAME_SIZE)?;
		}

		Ok(Self {
			crc32: u32_at(8),
			creation_timestamp: u32_at(offsets::CREATION),
			last_edit_timestamp: u32_at(offsets::LAST_EDIT),
			app_version: u32_at(offsets::APP_VERSION),
			author_ids,
			author_names,
			filenames,
			frame_count: u16_at(offsets::FRAME_COUNT),
			thumbnail_frame_index: u16_at(offsets::THUMBNAIL_FRAME),
			flags: u16_at(offsets::FLAGS),
			frame_speed: data[offsets::FRAME_SPEED],
			layer_visibility_flags: data[offsets::LAYER_VISIBILITY],
		})
	}

	/// Serializes the header chunk.
	///
	/// The three filenames are re-derived from author ids and timestamps and
	/// the CRC32 is recomputed over the serialized payload, so the stored
	/// values of those fields are ignored.
	pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
		let mut bytes = [0u8; HEADER_SIZE];

		bytes[0..4].copy_from_slice(&HEADER_MAGIC);
		bytes[4..8].copy_from_slice(&HEADER_DECLARED_SIZE.to_le_bytes());
		bytes[offsets::CREATION..offsets::CREATION + 4]
			.copy_from_slice(&self.creation_timestamp.to_le_bytes());
		bytes[offsets::LAST_EDIT..offsets::LAST_EDIT + 4]
			.copy_from_slice(&self.last_edit_timestamp.to_le_bytes());
		bytes[offsets::APP_VERSION..offsets::APP_VERSION + 4]
			.copy_from_slice(&self.app_version.to_le_bytes());

		for role in AuthorRole::ALL {
			let i = role.index();
			let id = offsets::AUTHOR_IDS + i * AUTHOR_ID_SIZE;
			bytes[id..id + AUTHOR_ID_SIZE].copy_from_slice(&self.author_ids[i]);
			let name = offsets::AUTHOR_NAMES + i * AUTHOR_NAME_SIZE;
			bytes[name..name + AUTHOR_NAME_SIZE].copy_from_slice(&self.author_names[i]);
			let filename = offsets::FILENAMES + i * FILENAME_SIZE;
			bytes[filename..filename + FILENAME_SIZE].copy_from_slice(&self.derived_filename_bytes(role));
		}

		bytes[offsets::FRAME_COUNT..offsets::FRAME_COUNT + 2]
			.copy_from_slice(&self.frame_count.to_le_bytes());
		bytes[offsets::THUMBNAIL_FRAME..offsets::THUMBNAIL_FRAME + 2]
			.copy_from_slice(&self.thumbnail_frame_index.to_le_bytes());
		bytes[offsets::FLAGS..offsets::FLAGS + 2].copy_from_slice(&self.flags.to_le_bytes());
		bytes[offsets::FRAME_SPEED] = self.frame_speed;
		bytes[offsets::LAYER_VISIBILITY] = self.layer_visibility_flags;

		let crc = crc32fast::hash(&bytes[CHECKSUMMED_PAYLOAD_OFFSET..]);
		bytes[8..12].copy_from_slice(&crc.to_le_bytes());

		bytes
	}

	/// Recomputes the derived filenames and CRC32 in place, matching what
	/// [`Header::to_bytes`] would write.
	pub fn sync_derived_fields(&mut self) {
		for role in AuthorRole::ALL {
			self.filenames[role.index()] = self.derived_filename_bytes(role);
		}
		let bytes = self.to_bytes();
		self.crc32 = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
	}

	/// Builds the 17-byte filename source: author id prefix + creation + last edit.
	fn filename_source(&self, role: AuthorRole) -> [u8; FILENAME_SOURCE_SIZE] {
		let mut source = [0u8; FILENAME_SOURCE_SIZE];
		source[..FILENAME_AUTHOR_PREFIX]
			.copy_from_slice(&self.author_ids[role.index()][..FILENAME_AUTHOR_PREFIX]);
		source[FILENAME_AUTHOR_PREFIX..FILENAME_AUTHOR_PREFIX + 4]
			.copy_from_slice(&self.creation_timestamp.to_le_bytes());
		source[FILENAME_AUTHOR_PREFIX + 4..].copy_from_slice(&self.last_edit_timestamp.to_le_bytes());
		source
	}

	fn derived_filename_bytes(&self, role: AuthorRole) -> [u8; FILENAME_SIZE] {
		let mut out = [0u8; FILENAME_SIZE];
		let encoded = base32::encode(&self.filename_source(role));
		out.copy_from_slice(encoded.as_bytes());
		out
	}

	/// Returns the filename this header would write for `role`.
	pub fn derive_filename(&self, role: AuthorRole) -> String {
		base32::encode(&self.filename_source(role))
	}

	/// Checks that every stored filename decodes to its author id prefix and
	/// the current timestamps.
	///
	/// # Errors
	///
	/// [`KwzError::InvalidBase32Character`] if a stored filename is not valid base-32.
	pub fn filenames_consistent(&self) -> Result<bool, KwzError> {
		for role in AuthorRole::ALL {
			let decoded = base32::decode(&self.filename(role))?;
			if decoded.len() < FILENAME_SOURCE_SIZE
				|| decoded[..FILENAME_SOURCE_SIZE] != self.filename_source(role)
			{
				return Ok(false);
			}
		}
		Ok(true)
	}

	/// Returns the stored CRC32.
	pub fn crc32(&self) -> u32 {
		self.crc32
	}

	/// Returns the creation timestamp in seconds since 2000-01-01.
	pub fn creation_timestamp(&self) -> u32 {
		self.creation_timestamp
	}

	/// Sets the creation timestamp in seconds since 2000-01-01.
	pub fn set_creation_timestamp(&mut self, value: u32) {
		self.creation_timestamp = value;
	}

	/// Returns the last edit timestamp in seconds since 2000-01-01.
	pub fn last_edit_timestamp(&self) -> u32 {
		self.last_edit_timestamp
	}

	/// Sets the last edit timestamp in seconds since 2000-01-01.
	pub fn set_last_edit_timestamp(&mut self, value: u32) {
		self.last_edit_timestamp = value;
	}

	/// Returns the creation time as a calendar date.
	pub fn creation_datetime(&self) -> NaiveDateTime {
		timestamp_to_datetime(self.creation_timestamp)
	}

	/// Sets the creation time from a calendar date.
	///
	/// # Errors
	///
	/// [`KwzError::TimestampOutOfRange`] for dates before 2000 or past the `u32` range.
	pub fn set_creation_datetime(&mut self, value: NaiveDateTime) -> Result<(), KwzError> {
		self.creation_timestamp = datetime_to_timestamp(value)?;
		Ok(())
	}

	/// Returns the last edit time as a calendar date.
	pub fn last_edit_datetime(&self) -> NaiveDateTime {
		timestamp_to_datetime(self.last_edit_timestamp)
	}

	/// Sets the last edit time from a calendar date.
	///
	/// # Errors
	///
	/// [`KwzError::TimestampOutOfRange`] for dates before 2000 or past the `u32` range.
	pub fn set_last_edit_datetime(&mut self, value: NaiveDateTime) -> Result<(), KwzError> {
		self.last_edit_timestamp = datetime_to_timestamp(value)?;
		Ok(())
	}

	/// Returns the application version word.
	pub fn app_version(&self) -> u32 {
		self.app_version
	}

	/// Sets the application version word.
	pub fn set_app_version(&mut self, value: u32) {
		self.app_version = value;
	}

	/// Returns the 10-byte author id for `role`.
	pub fn author_id(&self, role: AuthorRole) -> &[u8; AUTHOR_ID_SIZE] {
		&self.author_ids[role.index()]
	}

	/// Sets the author id for `role`, zero-padding short values.
	///
	/// # Errors
	///
	/// [`KwzError::FieldTooLong`] if `value` is longer than 10 bytes.
	pub fn set_author_id(&mut self, role: AuthorRole, value: &[u8]) -> Result<(), KwzError> {
		field::write_padded(&mut self.author_ids[role.index()], value, "author_id")
	}

	/// Returns the author name for `role`, trimmed at the first NUL.
	pub fn author_name(&self, role: AuthorRole) -> String {
		field::decode_utf16(&self.author_names[role.index()])
	}

	/// Returns the raw UTF-16LE author name field for `role`.
	pub fn raw_author_name(&self, role: AuthorRole) -> &[u8; AUTHOR_NAME_SIZE] {
		&self.author_names[role.index()]
	}

	/// Sets the author name for `role`.
	///
	/// # Errors
	///
	/// [`KwzError::FieldTooLong`] if the name needs more than 11 UTF-16 code units.
	pub fn set_author_name(&mut self, role: AuthorRole, value: &str) -> Result<(), KwzError> {
		field::encode_utf16(&mut self.author_names[role.index()], value, "author_name")
	}

	/// Returns the stored filename for `role`.
	pub fn filename(&self, role: AuthorRole) -> String {
		String::from_utf8_lossy(field::trim_nul(&self.filenames[role.index()])).into_owned()
	}

	/// Overwrites the stored filename for `role`.
	///
	/// The value only lives until the next write, which re-derives it.
	///
	/// # Errors
	///
	/// [`KwzError::FieldTooLong`] if `value` is longer than 28 bytes.
	pub fn set_filename(&mut self, role: AuthorRole, value: &str) -> Result<(), KwzError> {
		field::write_padded(&mut self.filenames[role.index()], value.as_bytes(), "filename")
	}

	/// Returns the number of frames.
	pub fn frame_count(&self) -> u16 {
		self.frame_count
	}

	/// Sets the number of frames.
	pub fn set_frame_count(&mut self, value: u16) {
		self.frame_count = value;
	}

	/// Returns the index of the frame used as thumbnail.
	pub fn thumbnail_frame_index(&self) -> u16 {
		self.thumbnail_frame_index
	}

	/// Sets the index of the frame used as thumbnail.
	pub fn set_thumbnail_frame_index(&mut self, value: u16) {
		self.thumbnail_frame_index = value;
	}

	/// Returns the raw flags word.
	pub fn flags(&self) -> u16 {
		self.flags
	}

	/// Sets the raw flags word.
	pub fn set_flags(&mut self, value: u16) {
		self.flags = value;
	}

	fn set_flag(&mut self, bit: u16, value: bool) {
		if value {
			self.flags |= bit;
		} else {
			self.flags &= !bit;
		}
	}

	/// Returns `true` if the animation is locked against editing.
	pub fn locked(&self) -> bool {
		self.flags & flag_bits::LOCKED != 0
	}

	/// Sets the locked flag.
	pub fn set_locked(&mut self, value: bool) {
		self.set_flag(flag_bits::LOCKED, value);
	}

	/// Returns `true` if playback loops.
	pub fn loop_playback(&self) -> bool {
		self.flags & flag_bits::LOOP_PLAYBACK != 0
	}

	/// Sets the loop playback flag.
	pub fn set_loop_playback(&mut self, value: bool) {
		self.set_flag(flag_bits::LOOP_PLAYBACK, value);
	}

	/// Returns `true` if the animation was authored with the toolset.
	pub fn toolset(&self) -> bool {
		self.flags & flag_bits::TOOLSET != 0
	}

	/// Sets the toolset flag.
	pub fn set_toolset(&mut self, value: bool) {
		self.set_flag(flag_bits::TOOLSET, value);
	}

	/// Returns the frame speed byte.
	pub fn frame_speed(&self) -> u8 {
		self.frame_speed
	}

	/// Sets the frame speed byte.
	pub fn set_frame_speed(&mut self, value: u8) {
		self.frame_speed = value;
	}

	/// Returns the raw layer visibility byte (a set bit hides the layer).
	pub fn layer_visibility_flags(&self) -> u8 {
		self.layer_visibility_flags
	}

	/// Sets the raw layer visibility byte.
	pub fn set_layer_visibility_flags(&mut self, value: u8) {
		self.layer_visibility_flags = value;
	}

	/// Returns `true` if layer `layer` (0 = A, 1 = B, 2 = C) is visible.
	pub fn layer_visible(&self, layer: usize) -> bool {
		layer < LAYER_COUNT && self.layer_visibility_flags & (1 << layer) == 0
	}

	/// Shows or hides layer `layer`. Indices past the last layer are ignored.
	pub fn set_layer_visible(&mut self, layer: usize, visible: bool) {
		if layer >= LAYER_COUNT {
			return;
		}
		if visible {
			self.layer_visibility_flags &= !(1 << layer);
		} else {
			self.layer_visibility_flags |= 1 << layer;
		}
	}

	/// Visibility of layers A, B and C.
	pub fn layer_visibility(&self) -> [bool; LAYER_COUNT] {
		[self.layer_visible(0), self.layer_visible(1), self.layer_visible(2)]
	}
}

impl Display for Header {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			".KWZ File Header:\n\
			- CRC32: {:#010X}\n\
			- Created: {}\n\
			- Last Edit: {}\n\
			- App Version: {:#010X}\n\
			- Root Author: {} ({})\n\
			- Parent Author: {} ({})\n\
			- Current Author: {} ({})\n\
			- Frames: {}\n\
			- Thumbnail Frame: {}\n\
			- Locked: {}, Loop: {}, Toolset: {}\n\
			- Frame Speed: {}\n\
			- Layers Visible: {:?}",
			self.crc32,
			self.creation_datetime(),
			self.last_edit_datetime(),
			self.app_version,
			self.author_name(AuthorRole::Root),
			self.filename(AuthorRole::Root),
			self.author_name(AuthorRole::Parent),
			self.filename(AuthorRole::Parent),
			self.author_name(AuthorRole::Current),
			self.filename(AuthorRole::Current),
			self.frame_count,
			self.thumbnail_frame_index,
			self.locked(),
			self.loop_playback(),
			self.toolset(),
			self.frame_speed,
			self.layer_visibility(),
		)
	}
}
