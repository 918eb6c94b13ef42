//! Optional fault-equivalence collapsing: the richer variant of fault-list
//! collapsing that spec.md notes but does not specify in depth, beyond
//! fixing its interface.

use crate::faults::enumerate::{CheckpointCollapser, FaultCollapser};
use crate::faults::FaultId;
use crate::netlist::Netlist;

/// Groups the fault universe into equivalence classes, each class a set of
/// faults that are indistinguishable at every primary output for every
/// input vector. Only the checkpoint policy backs this: each class holds
/// exactly one checkpoint fault, since gate-boundary equivalence grouping
/// (folding non-checkpoint faults into their checkpoint's class) is
/// documented as optional future work, not a contract this crate fulfills.
pub fn equivalence_classes(netlist: &Netlist) -> Vec<Vec<FaultId>> {
    CheckpointCollapser
        .collapse(netlist)
        .into_iter()
        .map(|fault| vec![fault])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{Kind, LineRecord, Op};

    fn rec(label: i64, kind: Kind, op: Op, fanin: &[i64]) -> LineRecord {
        LineRecord {
            label,
            kind,
            op,
            fanin_labels: fanin.to_vec(),
        }
    }

    #[test]
    fn each_class_holds_one_checkpoint_fault() {
        let records = vec![
            rec(1, Kind::PrimaryInput, Op::Ipt, &[]),
            rec(2, Kind::Branch, Op::Brch, &[1]),
            rec(3, Kind::PrimaryOutput, Op::Not, &[2]),
            rec(4, Kind::PrimaryOutput, Op::Not, &[2]),
        ];
        let net = Netlist::build(&records).unwrap();
        let classes = equivalence_classes(&net);
        assert_eq!(classes.len(), 4);
        assert!(classes.iter().all(|class| class.len() == 1));
        assert!(classes
            .iter()
            .all(|class| class[0].line == 0 || class[0].line == 1));
    }
}
