//! This module is separated into its own crate so the `kwz-rs` facade stays a thin
//! re-export layer, and should not be used directly.

/// `use kwz_rs::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export kwz_types for convenience
pub use kwz_types;

// Re-export commonly used types at crate root
pub use kwz_types::file::{KwzDecoder, KwzError, KwzFile, KwzHeader};
