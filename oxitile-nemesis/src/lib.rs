//! # OxiTile Nemesis
//!
//! Pure Rust implementation of the Nemesis compression format, the
//! entropy-coded scheme the Sega Mega Drive uses to pack 8×8 tile
//! graphics.
//!
//! Nemesis splits tiles into 4-bit nybbles, groups consecutive equal
//! nybbles into runs of at most eight, and assigns each `(value, length)`
//! run a prefix code of one to eight bits. Runs too rare to deserve a code
//! ride inline behind the reserved six-bit escape `111111`. An optional
//! XOR filter differences each byte against the byte one tile row earlier,
//! which pays off on vertically repetitive art; the compressor tries both
//! and keeps whichever ends up smaller.
//!
//! Two compression modes are offered:
//!
//! - [`CompressionMode::Accurate`] reproduces Sega's original compressor —
//!   Fano coding plus its historical quirks — byte-for-byte on many
//!   inputs.
//! - [`CompressionMode::Optimal`] builds length-limited Huffman codes with
//!   the package-merge algorithm and produces smaller output.
//!
//! ## Example
//!
//! ```rust
//! use oxitile_nemesis::{CompressionMode, compress, decompress};
//!
//! let tiles = [0u8; 32];
//! let packed = compress(&tiles, CompressionMode::Optimal).unwrap();
//! let unpacked = decompress(&packed).unwrap();
//! assert_eq!(unpacked, tiles);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod decode;
mod encode;
mod fano;
mod huffman;
mod runs;
mod symbols;

pub use decode::{decompress, decompress_to};
pub use encode::{CompressionMode, compress, compress_to};

/// Size of one 8×8 tile in bytes.
pub const TILE_SIZE: usize = 32;

/// Largest tile count the 15-bit header field can carry.
pub const MAX_TILES: usize = 0x7FFF;
