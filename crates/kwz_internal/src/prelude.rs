//! Prelude module for `kwz_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use kwz_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let mut header = KwzHeader::new();
//! header.set_loop_playback(true);
//! let file = KwzFile::new(header);
//! assert_eq!(file.frame_count(), 0);
//! assert_eq!(FRAME_PALETTE[0], Color::rgb(0xFF, 0xFF, 0xFF));
//! ```

// Re-export everything from kwz_types::prelude
#[doc(inline)]
pub use kwz_types::prelude::*;

// Re-export the entire kwz_types module for advanced usage
#[doc(inline)]
pub use kwz_types;
