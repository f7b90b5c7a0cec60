//! Optimal-mode code construction: length-limited Huffman via
//! package-merge.
//!
//! Seven rounds of packaging bound every code to eight bits. The number of
//! coded symbols is then brute-forced: coding more symbols can push common
//! runs onto longer codes, so every cut-off from "all qualifying runs" down
//! to "the two most common" is costed with the shared estimator and the
//! cheapest wins. Codes come out of a canonical walk over the resulting
//! lengths, with a one-shot length bump that steers the walk around the
//! reserved escape prefix.

use crate::symbols::{
    MAX_CODE_BITS, MIN_OCCURRENCES, RUN_LENGTHS, SymbolTable, TOTAL_SYMBOLS,
};
use std::ops::Range;

/// Rounds of packaging; lengths can reach `PACKAGE_ROUNDS + 1` bits.
const PACKAGE_ROUNDS: usize = MAX_CODE_BITS as usize - 1;

/// Assign length-limited canonical codes to the symbols in `table`.
pub(crate) fn assign_codes(table: &mut SymbolTable) {
    let mut merge = PackageMerge::new(table);

    // Brute-force the cheapest number of coded runs, rarest excluded first.
    let first_qualified = merge.first_qualified;
    let mut best_leaf_start = first_qualified;
    let mut best_total_bits = u32::MAX;

    for leaf_start in first_qualified..TOTAL_SYMBOLS - 1 {
        merge.assign_lengths(leaf_start, table);
        let total_bits = table.total_encoded_bits();
        if total_bits < best_total_bits {
            best_total_bits = total_bits;
            best_leaf_start = leaf_start;
        }
    }

    merge.assign_lengths(best_leaf_start, table);

    assign_canonical_codes(table);
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    /// Value-major symbol index of the run this leaf stands for.
    Leaf(u8),
    /// Arena indices of the two merged children.
    Package(u16, u16),
}

#[derive(Debug, Clone, Copy)]
struct Node {
    occurrences: u32,
    kind: NodeKind,
}

/// Index arena for the merge: leaves in `0..TOTAL_SYMBOLS`, packages
/// appended round by round. Each round consumes the leaf queue plus exactly
/// the previous round's package range, so a pair of ranges stands in for
/// the double buffer a pointerless implementation would otherwise need.
#[derive(Debug)]
struct PackageMerge {
    nodes: Vec<Node>,
    /// First leaf with enough occurrences to deserve a code.
    first_qualified: usize,
}

impl PackageMerge {
    fn new(table: &SymbolTable) -> Self {
        let mut nodes: Vec<Node> = (0..TOTAL_SYMBOLS)
            .map(|i| {
                let value = (i / RUN_LENGTHS) as u8;
                let length_minus_one = (i % RUN_LENGTHS) as u8;
                Node {
                    occurrences: table.get(value, length_minus_one).occurrences,
                    kind: NodeKind::Leaf(i as u8),
                }
            })
            .collect();
        nodes.sort_by_key(|node| node.occurrences);

        let first_qualified = nodes
            .iter()
            .position(|node| node.occurrences >= MIN_OCCURRENCES)
            .unwrap_or(TOTAL_SYMBOLS);

        Self {
            nodes,
            first_qualified,
        }
    }

    /// Run the merge with leaves `leaf_start..` and store the resulting
    /// code lengths into `table`.
    fn assign_lengths(&mut self, leaf_start: usize, table: &mut SymbolTable) {
        let roots = self.build_trees(leaf_start);

        table.reset_code_lengths();
        for root in roots {
            self.tally_leaf_depths(root, table);
        }

        // A leaf that the packaging never picked up still needs a code;
        // with very few qualifying runs the odd leaf out is discarded every
        // round and ends the walks at zero.
        for node in &self.nodes[leaf_start..TOTAL_SYMBOLS] {
            if let NodeKind::Leaf(symbol) = node.kind {
                let record = symbol_mut(table, symbol);
                if record.code_bits == 0 {
                    record.code_bits = 1;
                }
            }
        }
    }

    /// Seven package rounds; returns the arena range of the final round's
    /// packages.
    fn build_trees(&mut self, leaf_start: usize) -> Range<usize> {
        self.nodes.truncate(TOTAL_SYMBOLS);
        let mut previous_round = TOTAL_SYMBOLS..TOTAL_SYMBOLS;

        for _ in 0..PACKAGE_ROUNDS {
            let mut leaf_read = leaf_start;
            let mut package_read = previous_round.start;
            let package_end = previous_round.end;
            let round_start = self.nodes.len();

            loop {
                let right = self.pop_smallest(&mut leaf_read, &mut package_read, package_end);
                let left = self.pop_smallest(&mut leaf_read, &mut package_read, package_end);

                // An unpaired leftover is discarded with the round.
                let (Some(right), Some(left)) = (right, left) else {
                    break;
                };

                let occurrences =
                    self.nodes[left].occurrences + self.nodes[right].occurrences;
                self.nodes.push(Node {
                    occurrences,
                    kind: NodeKind::Package(left as u16, right as u16),
                });
            }

            previous_round = round_start..self.nodes.len();
        }

        previous_round
    }

    /// Pop the smaller of the two queue heads; ties prefer the leaf, which
    /// keeps code lengths short.
    fn pop_smallest(
        &self,
        leaf_read: &mut usize,
        package_read: &mut usize,
        package_end: usize,
    ) -> Option<usize> {
        let leaf_available = *leaf_read < TOTAL_SYMBOLS;
        let package_available = *package_read < package_end;

        if leaf_available
            && (!package_available
                || self.nodes[*leaf_read].occurrences <= self.nodes[*package_read].occurrences)
        {
            let index = *leaf_read;
            *leaf_read += 1;
            Some(index)
        } else if package_available {
            let index = *package_read;
            *package_read += 1;
            Some(index)
        } else {
            None
        }
    }

    /// Each appearance of a leaf under a final package costs it one bit.
    fn tally_leaf_depths(&self, index: usize, table: &mut SymbolTable) {
        match self.nodes[index].kind {
            NodeKind::Leaf(symbol) => symbol_mut(table, symbol).code_bits += 1,
            NodeKind::Package(left, right) => {
                self.tally_leaf_depths(left as usize, table);
                self.tally_leaf_depths(right as usize, table);
            }
        }
    }
}

fn symbol_mut(table: &mut SymbolTable, value_major: u8) -> &mut crate::symbols::RunSymbol {
    let value = value_major / RUN_LENGTHS as u8;
    let length_minus_one = value_major % RUN_LENGTHS as u8;
    table.get_mut(value, length_minus_one)
}

/// Turn the code lengths into canonical codes, dodging the reserved escape.
///
/// Symbols are walked in `(code_bits ascending, occurrences descending)`
/// order, so the length bump introduced by the escape avoidance lands on
/// the rarest runs. The avoidance fires at most once: from that symbol on,
/// every length is one bit wider, which keeps the canonical walk monotonic.
fn assign_canonical_codes(table: &mut SymbolTable) {
    let mut order = SymbolTable::flat_order();
    order.sort_by(|&a, &b| {
        let (sym_a, sym_b) = (table.flat(a), table.flat(b));
        sym_a
            .code_bits
            .cmp(&sym_b.code_bits)
            .then(sym_b.occurrences.cmp(&sym_a.occurrences))
    });

    // Wraps to zero on the first increment.
    let mut code: u32 = u32::MAX;
    let mut previous_length = 0u8;
    let mut bumped = false;

    for &index in &order {
        let stored_bits = table.flat(index).code_bits;
        if stored_bits == 0 {
            continue;
        }

        code = code.wrapping_add(1);
        let mut length = stored_bits + bumped as u8;

        if length != previous_length {
            code <<= length - previous_length;
            previous_length = length;
        }

        // The next set bit would make this code equal to, or a prefix of,
        // the escape pattern.
        let collides = if length >= 6 {
            code >> (length - 6) == 0x3E
        } else {
            code == (1 << length) - 1
        };
        if !bumped && collides {
            code <<= 1;
            length += 1;
            previous_length += 1;
            bumped = true;
        }

        let symbol = table.flat_mut(index);
        symbol.code_bits = length;
        symbol.code = code as u8;
    }
}
