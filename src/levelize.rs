//! Levelizer: assigns each line a non-negative integer level consistent
//! with topological order, by longest path from any primary input.

use crate::error::{FsimError, Result};
use crate::netlist::{Kind, Netlist};

/// Levelizes `netlist` in place: marks all primary inputs at level 0, then
/// repeatedly scans unleveled lines, leveling one once every fanin is
/// leveled, until a fixed point is reached. Returns the maximum level
/// (`Lmax`).
///
/// # Errors
///
/// Returns [`FsimError::MalformedNetlist`] if a sweep makes no progress
/// while unleveled lines remain, which can only happen if the fanin
/// relation contains a cycle that slipped past [`Netlist::build`] (an
/// internal-invariant situation, surfaced here defensively).
pub fn levelize(netlist: &mut Netlist) -> Result<usize> {
    netlist.reset_scratch();

    let n = netlist.len();
    let mut remaining = n;
    let pi_ids: Vec<_> = netlist
        .lines()
        .iter()
        .filter(|l| l.kind() == Kind::PrimaryInput)
        .map(|l| l.id())
        .collect();
    for id in pi_ids {
        netlist.set_level(id, 0);
        remaining -= 1;
    }

    let mut max_level = 0;
    while remaining > 0 {
        let mut progressed = false;
        for id in 0..n {
            if netlist.level(id).is_some() {
                continue;
            }
            let fanin = netlist.line(id).fanin().to_vec();
            if fanin.iter().all(|&p| netlist.level(p).is_some()) {
                let level = 1 + fanin.iter().map(|&p| netlist.level(p).unwrap()).max().unwrap_or(0);
                netlist.set_level(id, level);
                max_level = max_level.max(level);
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            return Err(FsimError::MalformedNetlist(
                "levelization stalled with unleveled lines remaining (cycle in fanin relation)"
                    .to_string(),
            ));
        }
    }

    netlist.set_max_level(max_level);
    Ok(max_level)
}
