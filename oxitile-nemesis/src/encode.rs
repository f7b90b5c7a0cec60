//! Nemesis compression.
//!
//! Compression plans before it emits: the input is tokenized and costed
//! twice, once plain and once through the XOR filter, and the mode with the
//! smaller whole-byte total wins. Only then are the header, the code table
//! and the packed payload written.

use crate::fano;
use crate::huffman;
use crate::runs::RunScanner;
use crate::symbols::{ESCAPE_BITS, ESCAPE_PATTERN, RUN_LENGTHS, RUN_VALUES, SymbolTable};
use crate::{MAX_TILES, TILE_SIZE};
use oxitile_core::{BitWriter, OxiTileError, Result};
use std::io::Write;

/// Which code construction the compressor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Recursive Fano coding, reproducing Sega's original compressor
    /// byte-for-byte on many inputs — including its quirk of appending a
    /// zero byte to byte-aligned payloads.
    Accurate,
    /// Length-limited Huffman coding via package-merge; never larger than
    /// accurate mode and usually smaller.
    Optimal,
}

/// Compress `input` into a freshly allocated Nemesis stream.
///
/// The input must be a positive whole number of 32-byte tiles, at most
/// `0x7FFF` of them.
///
/// # Example
///
/// ```
/// use oxitile_nemesis::{CompressionMode, compress};
///
/// let tiles = [0u8; 64];
/// let packed = compress(&tiles, CompressionMode::Optimal).unwrap();
/// assert!(packed.len() < tiles.len());
/// ```
pub fn compress(input: &[u8], mode: CompressionMode) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(input.len() / 2 + 16);
    compress_to(input, mode, &mut output)?;
    Ok(output)
}

/// Compress `input`, writing the Nemesis stream to `writer`.
pub fn compress_to<W: Write>(input: &[u8], mode: CompressionMode, mut writer: W) -> Result<()> {
    if input.is_empty() || input.len() % TILE_SIZE != 0 {
        return Err(OxiTileError::invalid_input_size(input.len(), TILE_SIZE));
    }
    let total_tiles = input.len() / TILE_SIZE;
    if total_tiles > MAX_TILES {
        return Err(OxiTileError::too_many_tiles(total_tiles, MAX_TILES));
    }

    let mut table = SymbolTable::new();
    let xor_mode = plan_codes(&mut table, input, mode)?;

    emit_header(&mut writer, total_tiles, xor_mode)?;
    emit_code_table(&mut writer, &table)?;
    emit_payload(&mut writer, &table, input, xor_mode, mode)
}

/// Cost the input in both filter modes and leave the winner's codes in
/// `table`. Returns whether XOR mode won.
fn plan_codes(table: &mut SymbolTable, input: &[u8], mode: CompressionMode) -> Result<bool> {
    let regular_bytes = compute_codes(table, input, false, mode)?;
    let xor_bytes = compute_codes(table, input, true, mode)?;

    // The historical compressor compared whole bytes, rounding bits up;
    // ties go to regular mode, whose statistics must then be recomputed
    // since the table still holds the XOR pass.
    if regular_bytes <= xor_bytes {
        compute_codes(table, input, false, mode)?;
        Ok(false)
    } else {
        Ok(true)
    }
}

/// One full planning pass: count runs, build codes, cost the result in
/// whole bytes.
fn compute_codes(
    table: &mut SymbolTable,
    input: &[u8],
    xor_mode: bool,
    mode: CompressionMode,
) -> Result<u32> {
    table.reset();

    RunScanner::new(input, xor_mode).for_each_run(|value, length| {
        table.tally(value, length);
        Ok(())
    })?;

    match mode {
        CompressionMode::Accurate => fano::assign_codes(table),
        CompressionMode::Optimal => huffman::assign_codes(table),
    }

    Ok(table.total_encoded_bits().div_ceil(8))
}

fn emit_header<W: Write>(writer: &mut W, total_tiles: usize, xor_mode: bool) -> Result<()> {
    let header = total_tiles as u16 | if xor_mode { 0x8000 } else { 0 };
    writer.write_all(&header.to_be_bytes())?;
    Ok(())
}

/// Emit the code table in symbol order: outer loop over nybble values,
/// inner loop over run lengths, with a `0x80 | value` marker whenever the
/// value changes, and a `0xFF` terminator.
fn emit_code_table<W: Write>(writer: &mut W, table: &SymbolTable) -> Result<()> {
    let mut previous_value = 0xFF; // deliberately impossible
    for value in 0..RUN_VALUES as u8 {
        for length_minus_one in 0..RUN_LENGTHS as u8 {
            let symbol = table.get(value, length_minus_one);
            if symbol.code_bits == 0 {
                continue;
            }
            if value != previous_value {
                previous_value = value;
                writer.write_all(&[0x80 | value])?;
            }
            writer.write_all(&[length_minus_one << 4 | symbol.code_bits, symbol.code])?;
        }
    }
    writer.write_all(&[0xFF])?;
    Ok(())
}

/// Tokenize once more and emit each run as its code, or inline behind the
/// escape when it has none.
fn emit_payload<W: Write>(
    writer: &mut W,
    table: &SymbolTable,
    input: &[u8],
    xor_mode: bool,
    mode: CompressionMode,
) -> Result<()> {
    let mut bits = BitWriter::new(&mut *writer);

    RunScanner::new(input, xor_mode).for_each_run(|value, length| {
        let symbol = table.get(value, length - 1);
        if symbol.code_bits != 0 {
            bits.write_bits(symbol.code as u32, symbol.code_bits)
        } else {
            bits.write_bits(ESCAPE_PATTERN as u32, ESCAPE_BITS)?;
            bits.write_bits(length as u32 - 1, 3)?;
            bits.write_bits(value as u32, 4)
        }
    })?;

    let was_aligned = bits.pending_bits() == 0;
    bits.flush()?;
    drop(bits);

    // Sega's compressor wrote a spare zero byte whenever the payload ended
    // byte-aligned; accurate mode keeps the quirk, optimal mode drops it.
    if was_aligned && mode == CompressionMode::Accurate {
        writer.write_all(&[0])?;
    }

    Ok(())
}
