//! Fault-free simulator: given primary-input values, computes the logic
//! value of every line in non-decreasing level order.

use crate::error::{FsimError, Result};
use crate::netlist::{LineId, Netlist, Op};

fn eval(op: Op, fanin_values: &[u8]) -> u8 {
    match op {
        Op::Ipt => unreachable!("IPT value is supplied externally"),
        Op::Brch | Op::Not => {
            let v = fanin_values[0];
            if op == Op::Not {
                1 - v
            } else {
                v
            }
        }
        Op::And => u8::from(fanin_values.iter().all(|&v| v == 1)),
        Op::Nand => u8::from(!fanin_values.iter().all(|&v| v == 1)),
        Op::Or => u8::from(fanin_values.iter().any(|&v| v == 1)),
        Op::Nor => u8::from(!fanin_values.iter().any(|&v| v == 1)),
        Op::Xor => fanin_values.iter().fold(0u8, |acc, &v| acc ^ v),
    }
}

/// Runs the fault-free simulation, assigning `value(x)` for every line
/// consistent with each operator's Boolean function table. `pi_value`
/// supplies the externally-driven value of a primary input line.
///
/// # Errors
///
/// Returns [`FsimError::Internal`] if levels are missing (the shell layer
/// is responsible for surfacing this as [`FsimError::ExecutionOutOfSequence`]
/// instead, since only it knows the command sequence that got here), or
/// [`FsimError::MissingPiValue`] if `pi_value` is undefined on some primary
/// input.
pub fn simulate_with(
    netlist: &mut Netlist,
    pi_value: impl Fn(LineId) -> Option<u8>,
) -> Result<()> {
    simulate_inner(netlist, pi_value, None)
}

/// Re-runs the fault-free simulation with a single stuck-at fault injected:
/// `clamped_line`'s value is forced to `stuck_value` instead of being
/// computed from its operator, and propagation proceeds from there exactly
/// as [`simulate_with`] would otherwise.
///
/// This is the operational definition of fault detection: comparing this
/// result against the fault-free result at a line is what "detected at
/// that line" means. It is not on the deductive simulator's hot path, but
/// exists to cross-check [`crate::faults::deductive::deductive_fault_simulation`]
/// and [`crate::pfs`] against ground truth in tests.
pub fn simulate_with_fault_injected(
    netlist: &mut Netlist,
    pi_value: impl Fn(LineId) -> Option<u8>,
    clamped_line: LineId,
    stuck_value: u8,
) -> Result<()> {
    simulate_inner(netlist, pi_value, Some((clamped_line, stuck_value)))
}

fn simulate_inner(
    netlist: &mut Netlist,
    pi_value: impl Fn(LineId) -> Option<u8>,
    injected: Option<(LineId, u8)>,
) -> Result<()> {
    if !netlist.is_levelized() {
        return Err(FsimError::Internal(
            "fault-free simulation requires levelize() to have run first".to_string(),
        ));
    }

    let max_level = netlist.max_level().unwrap_or(0);
    for level in 0..=max_level {
        let ids: Vec<LineId> = (0..netlist.len())
            .filter(|&id| netlist.level(id) == Some(level))
            .collect();
        for id in ids {
            if let Some((clamped_line, stuck_value)) = injected {
                if id == clamped_line {
                    netlist.set_value(id, stuck_value);
                    continue;
                }
            }
            let op = netlist.line(id).op();
            let value = if op == Op::Ipt {
                pi_value(id).ok_or(FsimError::MissingPiValue(id))?
            } else {
                let fanin = netlist.line(id).fanin().to_vec();
                let fanin_values: Vec<u8> = fanin
                    .iter()
                    .map(|&p| {
                        netlist.value(p).ok_or_else(|| {
                            FsimError::Internal(format!(
                                "fanin {} of line {} has no value at evaluation time",
                                p, id
                            ))
                        })
                    })
                    .collect::<Result<_>>()?;
                eval(op, &fanin_values)
            };
            netlist.set_value(id, value);
        }
    }
    Ok(())
}

/// Convenience wrapper over [`simulate_with`] that supplies primary-input
/// values positionally, in [`Netlist::primary_inputs`] declaration order.
pub fn simulate(netlist: &mut Netlist, pi_values: &[u8]) -> Result<()> {
    if pi_values.len() != netlist.primary_inputs().len() {
        return Err(FsimError::MissingPiValue(
            netlist
                .primary_inputs()
                .get(pi_values.len())
                .copied()
                .unwrap_or(usize::MAX),
        ));
    }
    let pi_order = netlist.primary_inputs().to_vec();
    simulate_with(netlist, |id| {
        pi_order
            .iter()
            .position(|&p| p == id)
            .map(|pos| pi_values[pos])
    })
}
