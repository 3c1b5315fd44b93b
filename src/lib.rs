#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `kwz-rs` reads, writes and decodes `.KWZ` frame animation files.
//!
//! The container parser, writer and frame decoder live in `kwz_types`; this
//! crate re-exports them.
//!
pub use kwz_internal::*;
