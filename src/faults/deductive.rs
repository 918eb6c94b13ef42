//! Deductive fault simulator: per-line fault-set propagation using
//! gate-specific union/intersection/difference formulas driven by
//! controlling-value semantics.

use crate::error::{FsimError, Result};
use crate::netlist::{LineId, Netlist, Op};

use super::{FaultId, FaultSet, Polarity};

/// Computes `faults(x)` for every line, under the current fault-free
/// simulation result. Requires [`crate::levelize::levelize`] and
/// [`crate::simulate::simulate`] (or [`crate::simulate::simulate_with`])
/// to have already run.
///
/// # Errors
///
/// Returns [`FsimError::UnsupportedOp`] if a line uses XOR with more than
/// two fanins (the symmetric-difference extension only generalizes
/// cleanly to the two-input case; wider XORs are rejected rather than
/// silently mis-propagated). Returns [`FsimError::Internal`] if levels or
/// values are missing, which indicates the required prior steps did not
/// run.
pub fn deductive_fault_simulation(netlist: &Netlist) -> Result<Vec<FaultSet>> {
    let n = netlist.len();
    let mut faults: Vec<Option<FaultSet>> = vec![None; n];

    let max_level = netlist.max_level().ok_or_else(|| {
        FsimError::Internal("deductive fault simulation requires levelize() first".to_string())
    })?;

    for level in 0..=max_level {
        let ids: Vec<LineId> = (0..n).filter(|&id| netlist.level(id) == Some(level)).collect();
        for id in ids {
            let line = netlist.line(id);
            let op = line.op();
            let value = netlist.value(id).ok_or_else(|| {
                FsimError::Internal(format!(
                    "line {} has no fault-free value; simulate() must run before deductive_fault_simulation()",
                    id
                ))
            })?;

            let mut set = match op {
                Op::Ipt => FaultSet::empty(n),
                Op::Brch | Op::Not => faults[line.fanin()[0]]
                    .clone()
                    .ok_or_else(|| missing_fanin_faults(id, line.fanin()[0]))?,
                Op::And | Op::Nand | Op::Or | Op::Nor => {
                    propagate_controlled(netlist, &faults, id, op, n)?
                }
                Op::Xor => propagate_xor(netlist, &faults, id)?,
            };

            // Finalization: the local fault is always detectable at its
            // own line, regardless of what propagation computed.
            set.insert(FaultId::new(id, Polarity::opposite_of(value)));
            faults[id] = Some(set);
        }
    }

    Ok(faults.into_iter().map(|f| f.unwrap()).collect())
}

fn missing_fanin_faults(id: LineId, fanin: LineId) -> FsimError {
    FsimError::Internal(format!(
        "line {} evaluated before its fanin {} in level order",
        id, fanin
    ))
}

/// Rule A / Rule B, shared by AND, NAND, OR, NOR: only the controlling
/// value differs.
fn propagate_controlled(
    netlist: &Netlist,
    faults: &[Option<FaultSet>],
    id: LineId,
    op: Op,
    n: usize,
) -> Result<FaultSet> {
    let c = op
        .controlling_value()
        .expect("AND/NAND/OR/NOR always have a controlling value");
    let fanin = netlist.line(id).fanin();

    let mut controlling = Vec::new();
    let mut non_controlling = Vec::new();
    for &y in fanin {
        let value = netlist
            .value(y)
            .ok_or_else(|| missing_fanin_faults(id, y))?;
        let set = faults[y].as_ref().ok_or_else(|| missing_fanin_faults(id, y))?;
        if value == c {
            controlling.push(set);
        } else {
            non_controlling.push(set);
        }
    }

    if controlling.is_empty() {
        // Rule A: faults(x) = union over all fanins (== union over NC,
        // since C is empty).
        Ok(FaultSet::union_all(n, non_controlling.into_iter()))
    } else {
        // Rule B: faults(x) = (intersection over C) \ (union over NC).
        let mut result = controlling[0].clone();
        for set in &controlling[1..] {
            result.intersect_with(set);
        }
        let nc_union = FaultSet::union_all(n, non_controlling.into_iter());
        result.difference_with(&nc_union);
        Ok(result)
    }
}

/// Conservative two-input XOR substitute: `faults(x) = (L(a) ∪ L(b)) \
/// (L(a) ∩ L(b))`, i.e. the symmetric difference of the two fanins' fault
/// sets. XOR has no controlling value, so Rule A/B do not apply directly.
fn propagate_xor(
    netlist: &Netlist,
    faults: &[Option<FaultSet>],
    id: LineId,
) -> Result<FaultSet> {
    let fanin = netlist.line(id).fanin();
    if fanin.len() != 2 {
        return Err(FsimError::UnsupportedOp(id));
    }
    let a = faults[fanin[0]].as_ref().ok_or_else(|| missing_fanin_faults(id, fanin[0]))?;
    let b = faults[fanin[1]].as_ref().ok_or_else(|| missing_fanin_faults(id, fanin[1]))?;

    let mut union = a.clone();
    union.union_with(b);
    let mut inter = a.clone();
    inter.intersect_with(b);
    union.difference_with(&inter);
    Ok(union)
}
