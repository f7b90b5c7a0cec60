//! Error types for OxiTile operations.
//!
//! A single error enum covers every failure the codecs can report: I/O
//! errors from the underlying reader/writer, structural errors in the
//! compressed stream, and invalid inputs handed to a compressor.

use std::io;
use thiserror::Error;

/// The main error type for OxiTile operations.
#[derive(Debug, Error)]
pub enum OxiTileError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {expected} more byte(s)")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Input handed to a compressor has an unusable size.
    #[error("Input size {size} is not a positive multiple of the {tile_size}-byte tile")]
    InvalidInputSize {
        /// The offending input size in bytes.
        size: usize,
        /// Size of one tile in bytes.
        tile_size: usize,
    },

    /// Input holds more tiles than the stream header can describe.
    #[error("Input of {tiles} tiles exceeds the {max}-tile header limit")]
    TooManyTiles {
        /// Number of tiles in the input.
        tiles: usize,
        /// Largest representable tile count.
        max: usize,
    },

    /// The stream's code table is malformed.
    #[error("Malformed code table: {message}")]
    InvalidCodeTable {
        /// Description of the defect.
        message: String,
    },

    /// No code in the table matches the accumulated bits.
    #[error("Undecodable code at bit position {bit_position}")]
    InvalidCode {
        /// Bit position where decoding failed.
        bit_position: u64,
    },

    /// A decoded run is longer than the output the header declared.
    #[error("Run of {length} nybbles exceeds the {remaining} remaining in the stream")]
    OverlongRun {
        /// Length of the offending run in nybbles.
        length: u32,
        /// Nybbles left to emit.
        remaining: u64,
    },
}

/// Result type alias for OxiTile operations.
pub type Result<T> = std::result::Result<T, OxiTileError>;

impl OxiTileError {
    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid input size error.
    pub fn invalid_input_size(size: usize, tile_size: usize) -> Self {
        Self::InvalidInputSize { size, tile_size }
    }

    /// Create a too-many-tiles error.
    pub fn too_many_tiles(tiles: usize, max: usize) -> Self {
        Self::TooManyTiles { tiles, max }
    }

    /// Create a malformed code table error.
    pub fn invalid_code_table(message: impl Into<String>) -> Self {
        Self::InvalidCodeTable {
            message: message.into(),
        }
    }

    /// Create an undecodable code error.
    pub fn invalid_code(bit_position: u64) -> Self {
        Self::InvalidCode { bit_position }
    }

    /// Create an overlong run error.
    pub fn overlong_run(length: u32, remaining: u64) -> Self {
        Self::OverlongRun { length, remaining }
    }
}
