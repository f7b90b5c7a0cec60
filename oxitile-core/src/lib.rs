//! # OxiTile Core
//!
//! Core components for the OxiTile codec library.
//!
//! This crate provides the building blocks shared by the tile codecs:
//!
//! - [`bitstream`]: MSB-first bit-level I/O for variable-length codes
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiTile is a layered stack:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ CLI                                          │
//! │     oxitile binary                           │
//! ├──────────────────────────────────────────────┤
//! │ Codec                                        │
//! │     Nemesis (run tokenizer + prefix codes)   │
//! ├──────────────────────────────────────────────┤
//! │ BitStream (this crate)                       │
//! │     BitReader/BitWriter, error types         │
//! └──────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{OxiTileError, Result};
