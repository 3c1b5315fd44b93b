//! Parse configuration for `.KWZ` container parsing.
//!
//! Controls how strictly [`File::from_bytes_with_config`](super::File::from_bytes_with_config)
//! treats stored checksums and missing chunks.

/// Configuration for parsing `.KWZ` files.
///
/// # Presets
///
/// - `default()`: stored checksums are ignored, frame chunks are optional
/// - `lenient()`: checksum mismatches are logged as warnings, nothing is rejected
/// - `strict()`: checksum mismatches and missing meta or frame data chunks are errors
///
/// # Examples
///
/// ```
/// use kwz_types::file::kwz::ParseConfig;
///
/// let config = ParseConfig::default();
/// assert!(!config.verify_checksums);
///
/// let config = ParseConfig::strict();
/// assert!(config.verify_checksums && config.require_frames);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseConfig {
	/// Compare stored CRC32 values against the chunk payloads
	pub verify_checksums: bool,
	/// Reject mismatching checksums instead of only logging them
	pub reject_checksum_mismatch: bool,
	/// Fail unless both the meta and the frame data chunks are present and the
	/// layer sizes account for every frame data byte
	pub require_frames: bool,
}

impl ParseConfig {
	/// Create a new parse configuration.
	///
	/// # Arguments
	/// * `verify_checksums` - Check stored CRC32 values, rejecting mismatches
	/// * `require_frames` - Require the meta and frame data chunks
	pub fn new(verify_checksums: bool, require_frames: bool) -> Self {
		Self {
			verify_checksums,
			reject_checksum_mismatch: verify_checksums,
			require_frames,
		}
	}

	/// Create a lenient configuration.
	///
	/// Checksums are verified but mismatches only produce a warning.
	pub fn lenient() -> Self {
		Self {
			verify_checksums: true,
			reject_checksum_mismatch: false,
			require_frames: false,
		}
	}

	/// Create a strict configuration.
	///
	/// Any checksum mismatch or missing frame chunk fails the parse.
	pub fn strict() -> Self {
		Self {
			verify_checksums: true,
			reject_checksum_mismatch: true,
			require_frames: true,
		}
	}
}
