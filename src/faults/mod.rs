//! Fault identifiers, fault sets, the fault-list enumerator, and the
//! deductive fault simulator.

pub mod deductive;
pub mod enumerate;

use std::fmt;

use fixedbitset::FixedBitSet;

use crate::netlist::LineId;

/// The polarity of a single stuck-at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    StuckAt0,
    StuckAt1,
}

impl Polarity {
    /// The polarity that is the complement of the given logic value, i.e.
    /// the locally-detectable fault at a line currently holding that value.
    pub fn opposite_of(value: u8) -> Self {
        if value == 0 {
            Self::StuckAt1
        } else {
            Self::StuckAt0
        }
    }

    fn bit(self) -> usize {
        match self {
            Self::StuckAt0 => 0,
            Self::StuckAt1 => 1,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StuckAt0 => write!(f, "SA0"),
            Self::StuckAt1 => write!(f, "SA1"),
        }
    }
}

/// A single stuck-at fault, identified by the line it is injected on and
/// its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaultId {
    pub line: LineId,
    pub polarity: Polarity,
}

impl FaultId {
    pub fn new(line: LineId, polarity: Polarity) -> Self {
        Self { line, polarity }
    }

    fn bit_index(self) -> usize {
        self.line * 2 + self.polarity.bit()
    }

    fn from_bit_index(bit: usize) -> Self {
        let line = bit / 2;
        let polarity = if bit % 2 == 0 {
            Polarity::StuckAt0
        } else {
            Polarity::StuckAt1
        };
        Self { line, polarity }
    }
}

impl fmt::Display for FaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.line, self.polarity)
    }
}

/// A finite set of [`FaultId`]s, backed by a bitset of width `2N` (one bit
/// per `(line_id, polarity)` pair) rather than the source's ad-hoc
/// 4-valued array: union, intersection and difference map directly onto
/// `FixedBitSet`'s bitwise operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultSet {
    bits: FixedBitSet,
}

impl FaultSet {
    /// An empty set over a universe of `line_count` lines (`2 *
    /// line_count` possible faults).
    pub fn empty(line_count: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(2 * line_count),
        }
    }

    pub fn insert(&mut self, fault: FaultId) {
        self.bits.insert(fault.bit_index());
    }

    pub fn contains(&self, fault: FaultId) -> bool {
        self.bits.contains(fault.bit_index())
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = FaultId> + '_ {
        self.bits.ones().map(FaultId::from_bit_index)
    }

    /// `self |= other`.
    pub fn union_with(&mut self, other: &Self) {
        self.bits.union_with(&other.bits);
    }

    /// `self &= other`.
    pub fn intersect_with(&mut self, other: &Self) {
        self.bits.intersect_with(&other.bits);
    }

    /// `self -= other` (set difference).
    pub fn difference_with(&mut self, other: &Self) {
        self.bits.difference_with(&other.bits);
    }

    /// The union of a collection of fault sets, each over the same
    /// universe size.
    pub fn union_all<'a>(line_count: usize, sets: impl Iterator<Item = &'a Self>) -> Self {
        let mut out = Self::empty(line_count);
        for set in sets {
            out.union_with(set);
        }
        out
    }
}

impl FromIterator<FaultId> for FaultSet {
    fn from_iter<I: IntoIterator<Item = FaultId>>(iter: I) -> Self {
        let faults: Vec<FaultId> = iter.into_iter().collect();
        let line_count = faults.iter().map(|f| f.line + 1).max().unwrap_or(0);
        let mut set = Self::empty(line_count);
        for fault in faults {
            set.insert(fault);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_intersection_difference_agree_with_naive_sets() {
        use std::collections::HashSet;

        let a_faults = [FaultId::new(0, Polarity::StuckAt0), FaultId::new(1, Polarity::StuckAt1)];
        let b_faults = [FaultId::new(1, Polarity::StuckAt1), FaultId::new(2, Polarity::StuckAt0)];

        let mut a = FaultSet::empty(3);
        for f in a_faults {
            a.insert(f);
        }
        let mut b = FaultSet::empty(3);
        for f in b_faults {
            b.insert(f);
        }

        let a_set: HashSet<_> = a_faults.into_iter().collect();
        let b_set: HashSet<_> = b_faults.into_iter().collect();

        let mut union = a.clone();
        union.union_with(&b);
        let expected_union: HashSet<_> = a_set.union(&b_set).copied().collect();
        assert_eq!(
            union.iter().collect::<HashSet<_>>(),
            expected_union
        );

        let mut inter = a.clone();
        inter.intersect_with(&b);
        let expected_inter: HashSet<_> = a_set.intersection(&b_set).copied().collect();
        assert_eq!(inter.iter().collect::<HashSet<_>>(), expected_inter);

        let mut diff = a.clone();
        diff.difference_with(&b);
        let expected_diff: HashSet<_> = a_set.difference(&b_set).copied().collect();
        assert_eq!(diff.iter().collect::<HashSet<_>>(), expected_diff);
    }
}
