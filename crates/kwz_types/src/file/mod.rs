//! File type support for `kwz-rs` project.

mod error;

pub mod kwz;

// Re-export unified error type
pub use error::KwzError;

// Re-export main file types
pub use kwz::{
	AuthorRole, ChunkKind, DecodeCache, Decoder as KwzDecoder, File as KwzFile, FrameMeta,
	FrameMetaTable, FrameRaster, Header as KwzHeader, ParseConfig as KwzParseConfig,
};
