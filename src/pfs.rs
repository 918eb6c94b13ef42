//! Parallel fault simulator (optional): evaluates up to 64 fault
//! scenarios per pass by bit-packing fault-effect vectors into a single
//! machine word, SIMD-by-bits within one thread (no thread pool).
//!
//! This is a cross-check of [`crate::faults::deductive`], not a
//! replacement for it: the deductive simulator remains the authoritative
//! per-line fault set (it computes results for every line, not just
//! primary outputs, and does not require re-simulating per fault chunk).

use crate::error::{FsimError, Result};
use crate::faults::{FaultId, Polarity};
use crate::netlist::{LineId, Netlist, Op};

const CHUNK_SIZE: usize = 64;

/// The set of faults (from the given list) detected at each primary
/// output, after simulating every fault in 64-wide packed passes.
#[derive(Debug, Clone, Default)]
pub struct FaultCoverage {
    /// Faults detected at each primary output, indexed the same way as
    /// [`Netlist::primary_outputs`].
    pub detected_per_output: Vec<Vec<FaultId>>,
    /// The union of `detected_per_output`: the overall fault coverage of
    /// the vector.
    pub detected: Vec<FaultId>,
}

/// Runs a parallel (bit-packed) fault simulation of `faults` against
/// `netlist` under the given primary-input vector, which must already be
/// levelized (values are recomputed per pass and do not need to be
/// pre-simulated).
///
/// # Errors
///
/// Returns [`FsimError::MissingPiValue`] if `pi_values` does not cover
/// every primary input, or any error the underlying fault-free evaluation
/// would: an unlevelized netlist is an [`FsimError::Internal`].
pub fn simulate(netlist: &Netlist, pi_values: &[u8], faults: &[FaultId]) -> Result<FaultCoverage> {
    if !netlist.is_levelized() {
        return Err(FsimError::Internal(
            "parallel fault simulation requires levelize() first".to_string(),
        ));
    }
    if pi_values.len() != netlist.primary_inputs().len() {
        return Err(FsimError::MissingPiValue(
            netlist
                .primary_inputs()
                .get(pi_values.len())
                .copied()
                .unwrap_or(usize::MAX),
        ));
    }

    let n = netlist.len();
    let max_level = netlist.max_level().unwrap_or(0);
    let pi_order = netlist.primary_inputs().to_vec();

    // Fault-free pass: every bit of the packed word takes the same,
    // fault-free value (all-0 or all-1 word per line).
    let fault_free = evaluate_fault_free_words(netlist, &pi_order, pi_values, max_level, n);

    let mut detected_per_output: Vec<Vec<FaultId>> = vec![Vec::new(); netlist.primary_outputs().len()];

    for chunk in faults.chunks(CHUNK_SIZE) {
        let words = evaluate_chunk(netlist, &pi_order, pi_values, max_level, n, chunk);
        for (out_idx, &po) in netlist.primary_outputs().iter().enumerate() {
            let mismatches = words[po] ^ fault_free[po];
            for bit in 0..chunk.len() {
                if mismatches & (1u64 << bit) != 0 {
                    detected_per_output[out_idx].push(chunk[bit]);
                }
            }
        }
    }

    let mut detected: Vec<FaultId> = detected_per_output.iter().flatten().copied().collect();
    detected.sort_by_key(|f| (f.line, f.polarity == Polarity::StuckAt1));
    detected.dedup_by_key(|f| (f.line, f.polarity));

    Ok(FaultCoverage {
        detected_per_output,
        detected,
    })
}

fn eval_word(op: Op, fanin_words: &[u64]) -> u64 {
    match op {
        Op::Ipt => unreachable!("IPT value is supplied externally"),
        Op::Brch => fanin_words[0],
        Op::Not => !fanin_words[0],
        Op::And => fanin_words.iter().fold(u64::MAX, |acc, &w| acc & w),
        Op::Nand => !fanin_words.iter().fold(u64::MAX, |acc, &w| acc & w),
        Op::Or => fanin_words.iter().fold(0, |acc, &w| acc | w),
        Op::Nor => !fanin_words.iter().fold(0, |acc, &w| acc | w),
        Op::Xor => fanin_words.iter().fold(0, |acc, &w| acc ^ w),
    }
}

fn pi_word(pi_order: &[LineId], pi_values: &[u8], id: LineId) -> u64 {
    let pos = pi_order.iter().position(|&p| p == id).expect("checked by caller");
    if pi_values[pos] == 1 {
        u64::MAX
    } else {
        0
    }
}

fn evaluate_fault_free_words(
    netlist: &Netlist,
    pi_order: &[LineId],
    pi_values: &[u8],
    max_level: usize,
    n: usize,
) -> Vec<u64> {
    let mut words = vec![0u64; n];
    for level in 0..=max_level {
        for id in (0..n).filter(|&id| netlist.level(id) == Some(level)) {
            let op = netlist.line(id).op();
            words[id] = if op == Op::Ipt {
                pi_word(pi_order, pi_values, id)
            } else {
                let fanin_words: Vec<u64> =
                    netlist.line(id).fanin().iter().map(|&p| words[p]).collect();
                eval_word(op, &fanin_words)
            };
        }
    }
    words
}

/// Evaluates one 64-wide chunk of faults: bit `b` of a line's word holds
/// the value that line would take if `chunk[b]` were injected alone. A
/// stuck-at-0/1 line simply has its bit forced to 0/1 at (and downstream
/// of) the faulty line, by overriding its word before evaluating gates
/// that read it.
fn evaluate_chunk(
    netlist: &Netlist,
    pi_order: &[LineId],
    pi_values: &[u8],
    max_level: usize,
    n: usize,
    chunk: &[FaultId],
) -> Vec<u64> {
    let mut stuck_mask = vec![0u64; n]; // bits of faults active on this line
    let mut stuck_value = vec![0u64; n]; // the forced value for those bits
    for (bit, fault) in chunk.iter().enumerate() {
        stuck_mask[fault.line] |= 1 << bit;
        if fault.polarity == Polarity::StuckAt1 {
            stuck_value[fault.line] |= 1 << bit;
        }
    }

    let mut words = vec![0u64; n];
    for level in 0..=max_level {
        for id in (0..n).filter(|&id| netlist.level(id) == Some(level)) {
            let op = netlist.line(id).op();
            let natural = if op == Op::Ipt {
                pi_word(pi_order, pi_values, id)
            } else {
                let fanin_words: Vec<u64> =
                    netlist.line(id).fanin().iter().map(|&p| words[p]).collect();
                eval_word(op, &fanin_words)
            };
            let mask = stuck_mask[id];
            words[id] = (natural & !mask) | (stuck_value[id] & mask);
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faults::deductive::deductive_fault_simulation;
    use crate::faults::enumerate::complete_list;
    use crate::levelize::levelize;
    use crate::netlist::{Kind, LineRecord};
    use crate::simulate::simulate as simulate_fault_free;

    fn rec(label: i64, kind: Kind, op: Op, fanin: &[i64]) -> LineRecord {
        LineRecord {
            label,
            kind,
            op,
            fanin_labels: fanin.to_vec(),
        }
    }

    #[test]
    fn pfs_agrees_with_deductive_simulator_at_primary_outputs() {
        let records = vec![
            rec(1, Kind::PrimaryInput, Op::Ipt, &[]),
            rec(2, Kind::PrimaryInput, Op::Ipt, &[]),
            rec(3, Kind::Branch, Op::Brch, &[1]),
            rec(4, Kind::PrimaryOutput, Op::And, &[3, 2]),
            rec(5, Kind::PrimaryOutput, Op::Or, &[3, 2]),
        ];
        let mut net = Netlist::build(&records).unwrap();
        levelize(&mut net).unwrap();

        for pi in [[0u8, 0u8], [0, 1], [1, 0], [1, 1]] {
            simulate_fault_free(&mut net, &pi).unwrap();
            let deductive = deductive_fault_simulation(&net).unwrap();
            let faults = complete_list(&net);
            let coverage = simulate(&net, &pi, &faults).unwrap();

            for (out_idx, &po) in net.primary_outputs().iter().enumerate() {
                let mut expected: Vec<FaultId> = deductive[po].iter().collect();
                expected.sort_by_key(|f| (f.line, f.polarity == Polarity::StuckAt1));
                let mut got = coverage.detected_per_output[out_idx].clone();
                got.sort_by_key(|f| (f.line, f.polarity == Polarity::StuckAt1));
                assert_eq!(got, expected, "mismatch at PO {} for pi {:?}", po, pi);
            }
        }
    }
}
