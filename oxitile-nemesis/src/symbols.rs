//! The nybble-run symbol space shared by both code generators.
//!
//! Nemesis entropy-codes runs of identical nybbles. A symbol is a
//! `(value, length)` pair with `value` in `0..=15` and `length` in `1..=8`,
//! giving an alphabet of exactly 128 members. One [`RunSymbol`] record per
//! member lives in a [`SymbolTable`] for the whole of a compression pass.

/// Number of distinct nybble values.
pub(crate) const RUN_VALUES: usize = 16;

/// Number of distinct run lengths (`1..=8`).
pub(crate) const RUN_LENGTHS: usize = 8;

/// Size of the symbol alphabet.
pub(crate) const TOTAL_SYMBOLS: usize = RUN_VALUES * RUN_LENGTHS;

/// Longest assignable prefix code, in bits.
pub(crate) const MAX_CODE_BITS: u8 = 8;

/// Runs occurring fewer times than this are inlined rather than coded.
pub(crate) const MIN_OCCURRENCES: u32 = 3;

/// The six-bit pattern reserved to introduce an inlined run.
pub(crate) const ESCAPE_PATTERN: u8 = 0x3F;

/// Width of the escape pattern.
pub(crate) const ESCAPE_BITS: u8 = 6;

/// Cost of one inlined run: the escape, 3 bits of length and 4 of value.
pub(crate) const INLINE_RUN_BITS: u32 = ESCAPE_BITS as u32 + 3 + 4;

/// Per-symbol statistics and code assignment.
///
/// `code_bits == 0` means no code is assigned and occurrences of the symbol
/// are emitted inline. When `code_bits == n > 0`, only the low `n` bits of
/// `code` are significant and the rest are zero.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunSymbol {
    /// How many times the run appears in the input.
    pub occurrences: u32,
    /// Assigned code, right-aligned.
    pub code: u8,
    /// Width of the assigned code, or zero for "inline".
    pub code_bits: u8,
}

/// All 128 symbol records, addressable three ways: by `(value, length)`,
/// in value-major order (the code-table emission order), and by the flat
/// length-major index that seeds the sorting passes.
#[derive(Debug)]
pub(crate) struct SymbolTable {
    runs: [[RunSymbol; RUN_LENGTHS]; RUN_VALUES],
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            runs: [[RunSymbol::default(); RUN_LENGTHS]; RUN_VALUES],
        }
    }

    /// Zero every record, ready for a fresh counting pass.
    pub fn reset(&mut self) {
        self.runs = [[RunSymbol::default(); RUN_LENGTHS]; RUN_VALUES];
    }

    /// Clear only the code lengths, keeping occurrence counts.
    pub fn reset_code_lengths(&mut self) {
        for per_value in &mut self.runs {
            for symbol in per_value {
                symbol.code_bits = 0;
            }
        }
    }

    pub fn get(&self, value: u8, length_minus_one: u8) -> &RunSymbol {
        &self.runs[value as usize][length_minus_one as usize]
    }

    pub fn get_mut(&mut self, value: u8, length_minus_one: u8) -> &mut RunSymbol {
        &mut self.runs[value as usize][length_minus_one as usize]
    }

    /// Count one occurrence of a run of `length` nybbles of `value`.
    pub fn tally(&mut self, value: u8, length: u8) {
        self.runs[value as usize][length as usize - 1].occurrences += 1;
    }

    /// Look up by flat index: `i` maps to value `i % 16`, length `i / 16 + 1`.
    ///
    /// This length-major order is the tie order of the stable sorts, which
    /// accurate mode's byte-level fidelity depends on.
    pub fn flat(&self, index: u8) -> &RunSymbol {
        &self.runs[index as usize % RUN_VALUES][index as usize / RUN_VALUES]
    }

    pub fn flat_mut(&mut self, index: u8) -> &mut RunSymbol {
        &mut self.runs[index as usize % RUN_VALUES][index as usize / RUN_VALUES]
    }

    /// The identity permutation of flat indices, ready to be sorted.
    pub fn flat_order() -> [u8; TOTAL_SYMBOLS] {
        core::array::from_fn(|i| i as u8)
    }

    /// Exchange the code assignments of two symbols, leaving their
    /// occurrence counts in place.
    pub fn swap_codes(&mut self, a: u8, b: u8) {
        let (code_a, bits_a) = {
            let symbol = self.flat(a);
            (symbol.code, symbol.code_bits)
        };
        let (code_b, bits_b) = {
            let symbol = self.flat(b);
            (symbol.code, symbol.code_bits)
        };
        let symbol = self.flat_mut(a);
        symbol.code = code_b;
        symbol.code_bits = bits_b;
        let symbol = self.flat_mut(b);
        symbol.code = code_a;
        symbol.code_bits = bits_a;
    }

    /// Total encoded size of the stream body under the current assignment.
    ///
    /// A coded symbol costs its code width per occurrence plus the code
    /// table record: 24 bits for the first coded run of its nybble value
    /// (the extra byte is the nybble-change marker) and 16 bits for the
    /// rest. An uncoded symbol is inlined at [`INLINE_RUN_BITS`] per
    /// occurrence.
    pub fn total_encoded_bits(&self) -> u32 {
        let mut total = 0u32;
        for per_value in &self.runs {
            for (length_minus_one, symbol) in per_value.iter().enumerate() {
                if symbol.code_bits != 0 {
                    let first_of_value = per_value[..length_minus_one]
                        .iter()
                        .all(|earlier| earlier.code_bits == 0);
                    total += if first_of_value { 24 } else { 16 };
                    total += symbol.code_bits as u32 * symbol.occurrences;
                } else {
                    total += INLINE_RUN_BITS * symbol.occurrences;
                }
            }
        }
        total
    }
}
