//! Nybble splitting, the XOR pre-filter, and the run tokenizer.
//!
//! The compressor walks the input as a stream of 4-bit nybbles, high half
//! first, and groups consecutive equal nybbles into runs of at most eight.
//! In XOR mode each input byte is first replaced by itself XORed with the
//! byte four positions earlier — one tile row back — which turns vertically
//! repetitive art into long runs of zero.

use crate::symbols::RUN_LENGTHS;
use oxitile_core::Result;

/// Distance of the XOR filter, in bytes: one row of a tile.
pub(crate) const XOR_STRIDE: usize = 4;

/// A single pass over the input, yielding `(value, length)` runs.
///
/// The scanner is consumed by [`RunScanner::for_each_run`]; the compressor
/// constructs a fresh one for each of its passes so the filter history and
/// the nybble flip-flop always start clean.
#[derive(Debug)]
pub(crate) struct RunScanner<'a> {
    input: &'a [u8],
    pos: usize,
    xor_mode: bool,
    /// Circular history of the last four pre-filter bytes.
    history: [u8; XOR_STRIDE],
    history_index: usize,
    current: u8,
    low_half: bool,
}

impl<'a> RunScanner<'a> {
    pub fn new(input: &'a [u8], xor_mode: bool) -> Self {
        Self {
            input,
            pos: 0,
            xor_mode,
            history: [0; XOR_STRIDE],
            history_index: 0,
            current: 0,
            low_half: false,
        }
    }

    /// Next input byte, passed through the XOR filter when enabled.
    ///
    /// The history always records the byte as read, not as filtered.
    fn next_byte(&mut self) -> Option<u8> {
        let raw = *self.input.get(self.pos)?;
        self.pos += 1;

        let previous = self.history[self.history_index];
        self.history[self.history_index] = raw;
        self.history_index = (self.history_index + 1) % XOR_STRIDE;

        Some(if self.xor_mode { raw ^ previous } else { raw })
    }

    fn next_nybble(&mut self) -> Option<u8> {
        if self.low_half {
            self.low_half = false;
            Some(self.current & 0xF)
        } else {
            self.current = self.next_byte()?;
            self.low_half = true;
            Some(self.current >> 4)
        }
    }

    /// Tokenize the whole input, handing each run to `emit`.
    ///
    /// A run ends when the next nybble differs or the length reaches eight;
    /// the final run is emitted when the input ends.
    pub fn for_each_run<F>(mut self, mut emit: F) -> Result<()>
    where
        F: FnMut(u8, u8) -> Result<()>,
    {
        let Some(first) = self.next_nybble() else {
            return Ok(());
        };

        let mut current = first;
        let mut run_length = 0u8;

        loop {
            run_length += 1;
            let previous = current;
            let next = self.next_nybble();

            if run_length == RUN_LENGTHS as u8 || next != Some(previous) {
                emit(previous, run_length)?;
                run_length = 0;
            }

            match next {
                Some(nybble) => current = nybble,
                None => return Ok(()),
            }
        }
    }
}
