//! This crate provides core data types and file format support for the `kwz-rs` project.
//!
//! # File Formats
//!
//! - **KWZ**: Chunked frame animation container with a header, thumbnail,
//!   per-frame metadata and compressed three-layer frames
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use kwz_types::prelude::*;
//!
//! # fn main() -> Result<(), KwzError> {
//! let kwz = KwzFile::open("animation.kwz")?;
//! let decoder = kwz.decoder()?;
//! let mut cache = DecodeCache::new();
//! let raster = decoder.decode_frame(&mut cache, 0)?;
//! # let _ = raster;
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use kwz_types::file::kwz::{File, ParseConfig};
//!
//! # fn main() -> Result<(), kwz_types::file::KwzError> {
//! let kwz = File::open_with_config("animation.kwz", ParseConfig::strict())?;
//! // ...
//! # let _ = kwz;
//! # Ok(())
//! # }
//! ```

pub mod file;

/// `use kwz_types::prelude::*;` to import commonly used items.
pub mod prelude;
