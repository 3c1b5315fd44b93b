//! `.KWZ` file structure and I/O operations.

use std::io::Read;

use log::{debug, warn};
use serde::Serialize;

use crate::file::KwzError;

use super::{
	ParseConfig,
	chunk::{ChunkKind, ChunkReader, RawChunk},
	constants::{CHECKSUMMED_PAYLOAD_OFFSET, HEADER_SIZE},
	decoder::Decoder,
	frame_data::FrameData,
	header::Header,
	meta::FrameMetaTable,
	thumbnail::Thumbnail,
};

/// Stored and computed CRC32 of one checksummed chunk, recorded at parse time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChunkChecksum {
	/// Chunk the checksum belongs to
	pub kind: ChunkKind,
	/// Value stored in the file
	pub stored: u32,
	/// Value computed over the chunk payload
	pub computed: u32,
}

impl ChunkChecksum {
	/// Returns `true` if the stored value matches the payload.
	pub fn is_valid(&self) -> bool {
		self.stored == self.computed
	}

	fn to_error(self) -> KwzError {
		KwzError::ChecksumMismatch {
			kind: self.kind,
			stored: self.stored,
			computed: self.computed,
		}
	}
}

/// A parsed `.KWZ` file.
///
/// A file consists of:
/// - **Header** (`KFH\x14`, 212 bytes): timestamps, authors, derived filenames
/// - **Thumbnail** (`KTN\x02`): opaque image blob
/// - **Meta** (`KMI\x05`): one 28-byte record per frame
/// - **Frame data** (`KMC\x02`): compressed layer streams
///
/// Chunks are read in file order until the end of the data or the first
/// unrecognized tag; the rest of the file (sound data, for instance) is not
/// parsed.
///
/// # Examples
///
/// ```no_run
/// use kwz_types::file::kwz::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let kwz = File::open("animation.kwz")?;
/// println!("{}", kwz.header());
/// println!("Frames: {}", kwz.frame_count());
///
/// for frame in kwz.decoder()?.frames() {
///     let raster = frame?;
///     println!("layer A first pixel: {:?}", raster.pixel(0, 0, 0));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
	header: Header,
	thumbnail: Option<Thumbnail>,
	meta: Option<FrameMetaTable>,
	frame_data: Option<FrameData>,
	checksums: Vec<ChunkChecksum>,
	unknown_chunk: Option<[u8; 4]>,
}

impl File {
	/// Creates a file with the given header and no other chunks.
	pub fn new(header: Header) -> Self {
		Self {
			header,
			..Self::default()
		}
	}

	/// Opens a `.KWZ` file from the specified path.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or is not a valid `.KWZ` container.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, KwzError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Opens a `.KWZ` file with a custom parse configuration.
	///
	/// # Errors
	///
	/// See [`File::from_bytes_with_config`].
	pub fn open_with_config(
		path: impl AsRef<std::path::Path>,
		config: ParseConfig,
	) -> Result<Self, KwzError> {
		let data = std::fs::read(path)?;
		Self::from_bytes_with_config(&data, config)
	}

	/// Reads a `.KWZ` file from any reader.
	///
	/// # Errors
	///
	/// Returns an error if reading fails or the data is not a valid container.
	pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, KwzError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Parses a `.KWZ` file with the default configuration.
	///
	/// # Errors
	///
	/// See [`File::from_bytes_with_config`].
	pub fn from_bytes(data: &[u8]) -> Result<Self, KwzError> {
		Self::from_bytes_with_config(data, ParseConfig::default())
	}

	/// Parses a `.KWZ` file.
	///
	/// # Errors
	///
	/// - [`KwzError::MissingChunk`] if there is no header, or the meta chunk
	///   comes before it, or `config.require_frames` is set and the meta or
	///   frame data chunk is absent
	/// - [`KwzError::FrameDataSizeMismatch`] if `config.require_frames` is set
	///   and the layer sizes do not add up to the frame data payload
	/// - [`KwzError::MalformedContainer`] if any chunk runs past the data
	/// - [`KwzError::ChecksumMismatch`] if `config` rejects mismatching checksums
	pub fn from_bytes_with_config(data: &[u8], config: ParseConfig) -> Result<Self, KwzError> {
		let mut reader = ChunkReader::new(data);
		let mut header = None;
		let mut file = Self::default();

		loop {
			let chunk = match reader.next_chunk() {
				Ok(Some(chunk)) => chunk,
				Ok(None) => break,
				Err(KwzError::UnknownChunk(tag)) => {
					debug!(
						"Unknown chunk {tag:02X?} at {:#X}, skipping the remaining {} bytes",
						reader.offset(),
						reader.remaining()
					);
					file.unknown_chunk = Some(tag);
					break;
				}
				Err(err) => return Err(err),
			};

			match chunk.kind {
				ChunkKind::Header => {
					let parsed = Header::from_bytes(chunk.bytes)?;
					file.record_checksum(ChunkKind::Header, parsed.crc32(), header_checksum(&chunk));
					header = Some(parsed);
				}
				ChunkKind::Thumbnail => {
					let thumbnail = Thumbnail::from_bytes(chunk.bytes)?;
					file.record_checksum(
						ChunkKind::Thumbnail,
						thumbnail.crc32(),
						thumbnail.computed_crc32(),
					);
					file.thumbnail = Some(thumbnail);
				}
				ChunkKind::Meta => {
					let frame_count = header
						.as_ref()
						.map(Header::frame_count)
						.ok_or(KwzError::MissingChunk(ChunkKind::Header))?;
					file.meta =
						Some(FrameMetaTable::from_payload(chunk.payload(), usize::from(frame_count))?);
				}
				ChunkKind::FrameData => {
					let frame_data = FrameData::from_bytes(chunk.bytes)?;
					file.record_checksum(
						ChunkKind::FrameData,
						frame_data.crc32(),
						frame_data.computed_crc32(),
					);
					file.frame_data = Some(frame_data);
				}
			}
		}

		file.header = header.ok_or(KwzError::MissingChunk(ChunkKind::Header))?;

		if config.require_frames {
			if file.meta.is_none() {
				return Err(KwzError::MissingChunk(ChunkKind::Meta));
			}
			if file.frame_data.is_none() {
				return Err(KwzError::MissingChunk(ChunkKind::FrameData));
			}
			if let (Some(meta), Some(frame_data)) = (&file.meta, &file.frame_data) {
				frame_data.frame_offsets(meta)?.check_exact()?;
			}
		}

		if config.verify_checksums {
			for checksum in file.checksums.iter().filter(|c| !c.is_valid()) {
				if config.reject_checksum_mismatch {
					return Err(checksum.to_error());
				}
				warn!(
					"{} chunk checksum mismatch: stored {:#010X}, computed {:#010X}",
					checksum.kind, checksum.stored, checksum.computed
				);
			}
		}

		Ok(file)
	}

	fn record_checksum(&mut self, kind: ChunkKind, stored: u32, computed: u32) {
		self.checksums.retain(|c| c.kind != kind);
		self.checksums.push(ChunkChecksum {
			kind,
			stored,
			computed,
		});
	}

	/// Serializes the file: header, thumbnail, meta and frame data, in that order.
	///
	/// Filenames and checksums are regenerated; frame data is written verbatim.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = self.header.to_bytes().to_vec();
		if let Some(thumbnail) = &self.thumbnail {
			bytes.extend(thumbnail.to_bytes());
		}
		if let Some(meta) = &self.meta {
			bytes.extend(meta.to_bytes());
		}
		if let Some(frame_data) = &self.frame_data {
			bytes.extend(frame_data.to_bytes());
		}
		bytes
	}

	/// Writes the file to the specified path.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be written.
	pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), KwzError> {
		std::fs::write(path, self.to_bytes())?;
		Ok(())
	}

	/// Checksums recorded while parsing, in chunk order.
	pub fn checksums(&self) -> &[ChunkChecksum] {
		&self.checksums
	}

	/// Verifies the checksums recorded while parsing.
	///
	/// # Errors
	///
	/// [`KwzError::ChecksumMismatch`] for the first chunk whose stored CRC32
	/// does not match its payload.
	pub fn verify_checksums(&self) -> Result<(), KwzError> {
		match self.checksums.iter().find(|c| !c.is_valid()) {
			Some(checksum) => Err(checksum.to_error()),
			None => Ok(()),
		}
	}

	/// Tag of the chunk that stopped parsing, if any.
	pub fn unknown_chunk(&self) -> Option<[u8; 4]> {
		self.unknown_chunk
	}

	/// Returns the file header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Returns a mutable reference to the file header.
	pub fn header_mut(&mut self) -> &mut Header {
		&mut self.header
	}

	/// Returns the thumbnail chunk, if present.
	pub fn thumbnail(&self) -> Option<&Thumbnail> {
		self.thumbnail.as_ref()
	}

	/// Replaces the thumbnail chunk.
	pub fn set_thumbnail(&mut self, thumbnail: Option<Thumbnail>) {
		self.thumbnail = thumbnail;
	}

	/// Returns the frame metadata table, if present.
	pub fn meta(&self) -> Option<&FrameMetaTable> {
		self.meta.as_ref()
	}

	/// Returns a mutable frame metadata table, if present.
	pub fn meta_mut(&mut self) -> Option<&mut FrameMetaTable> {
		self.meta.as_mut()
	}

	/// Replaces the frame metadata table and updates the header frame count.
	///
	/// # Errors
	///
	/// [`KwzError::FieldTooLong`] if the table has more entries than the
	/// 16-bit frame count can express; the file is left unchanged.
	pub fn set_meta(&mut self, meta: FrameMetaTable) -> Result<(), KwzError> {
		let frame_count = u16::try_from(meta.len()).map_err(|_| KwzError::FieldTooLong {
			field: "frame_count",
			max: usize::from(u16::MAX),
			actual: meta.len(),
		})?;
		self.header.set_frame_count(frame_count);
		self.meta = Some(meta);
		Ok(())
	}

	/// Returns the frame data chunk, if present.
	pub fn frame_data(&self) -> Option<&FrameData> {
		self.frame_data.as_ref()
	}

	/// Replaces the frame data chunk.
	pub fn set_frame_data(&mut self, frame_data: Option<FrameData>) {
		self.frame_data = frame_data;
	}

	/// Number of frames declared by the header.
	pub fn frame_count(&self) -> usize {
		usize::from(self.header.frame_count())
	}

	/// Creates a frame decoder over this file.
	///
	/// # Errors
	///
	/// - [`KwzError::MissingChunk`] if the meta or frame data chunk is absent
	/// - [`KwzError::MalformedContainer`] if the frame data is shorter than
	///   the layer sizes in the meta table
	pub fn decoder(&self) -> Result<Decoder<'_>, KwzError> {
		let meta = self.meta.as_ref().ok_or(KwzError::MissingChunk(ChunkKind::Meta))?;
		let frame_data =
			self.frame_data.as_ref().ok_or(KwzError::MissingChunk(ChunkKind::FrameData))?;
		Decoder::new(frame_data.payload(), meta, self.header.layer_visibility())
	}
}

/// CRC32 over the raw header bytes following the CRC field.
fn header_checksum(chunk: &RawChunk<'_>) -> u32 {
	let end = chunk.bytes.len().min(HEADER_SIZE);
	crc32fast::hash(chunk.bytes.get(CHECKSUMMED_PAYLOAD_OFFSET..end).unwrap_or_default())
}
