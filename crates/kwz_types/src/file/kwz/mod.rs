//! `.KWZ` frame animation support for `kwz-rs` project.
//!
//! This module provides support for reading and writing the `.KWZ` container
//! and for decoding its frames into indexed-color layers.
//!
//! # File Structure
//!
//! A `.KWZ` file is a sequence of tagged chunks. Each chunk starts with a
//! 4-byte tag and a little-endian `u32` size:
//!
//! | Tag        | Contents                                   | CRC32 |
//! |------------|--------------------------------------------|-------|
//! | `KFH\x14`  | file header, see [`Header`]                | yes   |
//! | `KTN\x02`  | thumbnail image, kept opaque               | yes   |
//! | `KMI\x05`  | per-frame metadata, see [`FrameMetaTable`] | no    |
//! | `KMC\x02`  | compressed frame layers, see [`Decoder`]   | yes   |
//!
//! Scanning stops at the first tag not listed here.
//!
//! # Features
//!
//! - **Reading**: parse the container, optionally verifying checksums
//! - **Writing**: re-serialize header, thumbnail and metadata with derived
//!   filenames and fresh checksums
//! - **Decoding**: decompress any frame into three 320x240 layers, resolving
//!   dependencies on earlier frames through an explicit [`DecodeCache`]
//!
//! # Examples
//!
//! ```no_run
//! use kwz_types::file::kwz::{AuthorRole, ColorRole, DecodeCache, File};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let kwz = File::open("animation.kwz")?;
//! let header = kwz.header();
//! println!("Created by {} on {}", header.author_name(AuthorRole::Root), header.creation_datetime());
//!
//! let decoder = kwz.decoder()?;
//! let mut cache = DecodeCache::new();
//! let raster = decoder.decode_frame(&mut cache, 0)?;
//!
//! let meta = kwz.meta().and_then(|meta| meta.get(0)).ok_or("no frames")?;
//! println!("Paper: {:?}", meta.color(ColorRole::Paper));
//! println!("Draw order: {:?}", meta.layer_draw_order());
//! println!("Layer A bytes: {}", raster.layer(0).map_or(0, <[u8]>::len));
//! # Ok(())
//! # }
//! ```

pub mod base32;
pub mod constants;
pub mod decoder;

mod chunk;
mod field;
mod file;
mod frame_data;
mod header;
mod meta;
mod palette;
mod parse_config;
mod thumbnail;


pub use chunk::{ChunkKind, ChunkReader, RawChunk};
pub use decoder::{DecodeCache, Decoder, FrameIter, FrameRaster};
pub use file::{ChunkChecksum, File};
pub use frame_data::{FrameData, FrameOffsets};
pub use header::{AuthorRole, Header};
pub use meta::{FrameFlags, FrameMeta, FrameMetaTable};
pub use palette::{Color, ColorRole, FRAME_PALETTE, palette_color};
pub use parse_config::ParseConfig;
pub use thumbnail::Thumbnail;
