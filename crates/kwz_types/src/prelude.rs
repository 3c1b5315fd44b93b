//! Prelude module for `kwz_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use kwz_types::prelude::*;
//!
//! // Now you can use all common types directly
//! let header = KwzHeader::new();
//! let file = KwzFile::new(header);
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	AuthorRole, ChunkKind, DecodeCache, FrameMeta, FrameMetaTable, FrameRaster, KwzDecoder,
	KwzError, KwzFile, KwzHeader, KwzParseConfig,
};

// Palette types
#[doc(inline)]
pub use crate::file::kwz::{Color, ColorRole, FRAME_PALETTE};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
