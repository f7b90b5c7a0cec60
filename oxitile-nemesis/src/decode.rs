//! Nemesis decompression.
//!
//! The decoder is fully streaming: it parses the two-byte header and the
//! code table straight off the reader, then accumulates payload bits
//! MSB-first, resolving each code through a 256-entry table keyed by the
//! code left-aligned to eight bits. Keying on the left-aligned code gives
//! every member of a prefix-free set its own slot, so a lookup is one
//! index and one width comparison.

use crate::TILE_SIZE;
use crate::symbols::{ESCAPE_BITS, ESCAPE_PATTERN, MAX_CODE_BITS};
use oxitile_core::{BitReader, OxiTileError, Result};
use std::io::{self, Cursor, Read, Write};

/// Nybbles per tile: 32 bytes, two nybbles each.
const NYBBLES_PER_TILE: u64 = TILE_SIZE as u64 * 2;

/// Slots in the code lookup table: one per left-aligned 8-bit pattern.
const TABLE_SIZE: usize = 1 << MAX_CODE_BITS;

/// One slot of the lookup table. `code_bits == 0` marks a vacant slot.
#[derive(Debug, Clone, Copy, Default)]
struct TableEntry {
    code_bits: u8,
    value: u8,
    length: u8,
}

/// Decompress a complete Nemesis stream from a byte slice.
///
/// # Example
///
/// ```
/// use oxitile_nemesis::{CompressionMode, compress, decompress};
///
/// let tiles = [0u8; 32];
/// let packed = compress(&tiles, CompressionMode::Accurate).unwrap();
/// assert_eq!(decompress(&packed).unwrap(), tiles);
/// ```
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    decompress_to(Cursor::new(input), &mut output)?;
    Ok(output)
}

/// Decompress a Nemesis stream from `reader`, writing tiles to `writer`.
pub fn decompress_to<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<()> {
    let header = read_header(&mut reader)?;
    let table = read_code_table(&mut reader)?;
    decode_payload(reader, &mut writer, &table, &header)
}

#[derive(Debug)]
struct Header {
    xor_mode: bool,
    total_tiles: u16,
}

fn read_byte<R: Read>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            OxiTileError::unexpected_eof(1)
        } else {
            OxiTileError::Io(e)
        }
    })?;
    Ok(byte[0])
}

/// Big-endian header word: XOR flag in the top bit, tile count below.
fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let word = u16::from_be_bytes([read_byte(reader)?, read_byte(reader)?]);
    Ok(Header {
        xor_mode: word & 0x8000 != 0,
        total_tiles: word & 0x7FFF,
    })
}

/// Parse code-table records up to the `0xFF` terminator.
///
/// A byte with the top bit set selects the nybble value for the entries
/// that follow; otherwise bits 6..4 hold the run length minus one, bits
/// 3..0 the code width, and the next byte the code itself.
fn read_code_table<R: Read>(reader: &mut R) -> Result<[TableEntry; TABLE_SIZE]> {
    let mut table = [TableEntry::default(); TABLE_SIZE];
    let mut current_value = 0u8;

    let mut byte = read_byte(reader)?;
    while byte != 0xFF {
        if byte & 0x80 != 0 {
            current_value = byte & 0xF;
        } else {
            let length = ((byte >> 4) & 7) + 1;
            let code_bits = byte & 0xF;
            if code_bits == 0 || code_bits > MAX_CODE_BITS {
                return Err(OxiTileError::invalid_code_table(format!(
                    "code width {code_bits} out of range"
                )));
            }
            let code = read_byte(reader)?;

            let slot = ((code as usize) << (MAX_CODE_BITS - code_bits)) & (TABLE_SIZE - 1);
            table[slot] = TableEntry {
                code_bits,
                value: current_value,
                length,
            };
        }
        byte = read_byte(reader)?;
    }

    Ok(table)
}

/// Accumulates decoded nybbles into 4-byte rows, undoing the XOR filter
/// against the previously emitted row.
#[derive(Debug)]
struct RowBuffer {
    xor_mode: bool,
    current: u32,
    previous: u32,
    nybbles_done: u8,
}

impl RowBuffer {
    fn new(xor_mode: bool) -> Self {
        Self {
            xor_mode,
            current: 0,
            previous: 0,
            nybbles_done: 0,
        }
    }

    fn push<W: Write>(&mut self, nybble: u8, writer: &mut W) -> Result<()> {
        self.current = self.current << 4 | nybble as u32;
        self.nybbles_done += 1;

        if self.nybbles_done == 8 {
            self.nybbles_done = 0;
            let emitted = if self.xor_mode {
                self.current ^ self.previous
            } else {
                self.current
            };
            writer.write_all(&emitted.to_be_bytes())?;
            self.previous = emitted;
        }

        Ok(())
    }
}

fn decode_payload<R: Read, W: Write>(
    reader: R,
    writer: &mut W,
    table: &[TableEntry; TABLE_SIZE],
    header: &Header,
) -> Result<()> {
    let mut bits = BitReader::new(reader);
    let mut row = RowBuffer::new(header.xor_mode);
    let mut nybbles_remaining = header.total_tiles as u64 * NYBBLES_PER_TILE;

    let mut code = 0u16;
    let mut code_bits = 0u8;

    while nybbles_remaining != 0 {
        code = code << 1 | bits.read_bit()? as u16;
        code_bits += 1;

        let run = if code_bits == ESCAPE_BITS && code == ESCAPE_PATTERN as u16 {
            // Inline escape: the run follows unencoded.
            let length = bits.read_bits(3)? as u8 + 1;
            let value = bits.read_bits(4)? as u8;
            Some((value, length))
        } else {
            let slot = (code as usize) << (MAX_CODE_BITS - code_bits);
            let entry = table[slot];
            (entry.code_bits == code_bits).then_some((entry.value, entry.length))
        };

        match run {
            Some((value, length)) => {
                if length as u64 > nybbles_remaining {
                    return Err(OxiTileError::overlong_run(
                        length as u32,
                        nybbles_remaining,
                    ));
                }
                for _ in 0..length {
                    row.push(value, writer)?;
                }
                nybbles_remaining -= length as u64;
                code = 0;
                code_bits = 0;
            }
            None => {
                if code_bits == MAX_CODE_BITS {
                    return Err(OxiTileError::invalid_code(bits.bit_position()));
                }
            }
        }
    }

    Ok(())
}
