//! Fault-list enumerator: the complete and collapsed single stuck-at
//! lists.

use crate::netlist::{Kind, Netlist};

use super::{FaultId, Polarity};

/// The complete single stuck-at fault list: both polarities on every line,
/// `2N` faults.
pub fn complete_list(netlist: &Netlist) -> Vec<FaultId> {
    let mut faults = Vec::with_capacity(2 * netlist.len());
    for line in netlist.lines() {
        faults.push(FaultId::new(line.id(), Polarity::StuckAt0));
        faults.push(FaultId::new(line.id(), Polarity::StuckAt1));
    }
    faults
}

/// A trait seam for fault-list collapsing policies, so a stronger
/// gate-equivalence collapser could be plugged in later without changing
/// call sites. Only the checkpoint policy (primary inputs and fanout
/// branches) is implemented here; stronger gate-level equivalence collapsing
/// is left as a documented extension point.
pub trait FaultCollapser {
    fn collapse(&self, netlist: &Netlist) -> Vec<FaultId>;
}

/// Retains SA0 and SA1 on every checkpoint line: primary inputs and
/// fanout branches. By the checkpoint theorem, every single stuck-at fault
/// on any line is functionally equivalent to some fault on a checkpoint
/// line, so this set is sufficient to represent all equivalence classes
/// without requiring gate-boundary equivalence analysis.
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckpointCollapser;

impl FaultCollapser for CheckpointCollapser {
    fn collapse(&self, netlist: &Netlist) -> Vec<FaultId> {
        let mut faults = Vec::new();
        for line in netlist.lines() {
            if matches!(line.kind(), Kind::PrimaryInput | Kind::Branch) {
                faults.push(FaultId::new(line.id(), Polarity::StuckAt0));
                faults.push(FaultId::new(line.id(), Polarity::StuckAt1));
            }
        }
        faults
    }
}

/// Convenience wrapper over [`CheckpointCollapser`], the default collapsed
/// list policy.
pub fn collapsed_list(netlist: &Netlist) -> Vec<FaultId> {
    CheckpointCollapser.collapse(netlist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{LineRecord, Op};

    fn rec(label: i64, kind: Kind, op: Op, fanin: &[i64]) -> LineRecord {
        LineRecord {
            label,
            kind,
            op,
            fanin_labels: fanin.to_vec(),
        }
    }

    #[test]
    fn complete_list_has_two_faults_per_line() {
        let records = vec![
            rec(1, Kind::PrimaryInput, Op::Ipt, &[]),
            rec(2, Kind::PrimaryOutput, Op::Not, &[1]),
        ];
        let net = Netlist::build(&records).unwrap();
        assert_eq!(complete_list(&net).len(), 2 * net.len());
    }

    #[test]
    fn collapsed_list_keeps_only_checkpoints() {
        let records = vec![
            rec(1, Kind::PrimaryInput, Op::Ipt, &[]),
            rec(2, Kind::Branch, Op::Brch, &[1]),
            rec(3, Kind::PrimaryOutput, Op::Not, &[2]),
            rec(4, Kind::PrimaryOutput, Op::Not, &[2]),
        ];
        let net = Netlist::build(&records).unwrap();
        let collapsed = collapsed_list(&net);
        // PI (line 0) and branch (line 1) are checkpoints; the two NOT
        // outputs (lines 2, 3) are not.
        assert_eq!(collapsed.len(), 4);
        assert!(collapsed.iter().all(|f| f.line == 0 || f.line == 1));
    }
}
