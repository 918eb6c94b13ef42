//! The netlist data model: a directed acyclic graph of typed gates with
//! explicit fanin/fanout cross-links and per-line simulation scratch.

pub mod parse;

use std::collections::HashMap;
use std::fmt;

use crate::error::{FsimError, Result};

/// Dense index of a [`Line`] within a [`Netlist`]. Assigned at load time,
/// in `[0, N)`.
pub type LineId = usize;

/// The four structural roles a line can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A primary input: no fanin, value supplied externally.
    PrimaryInput,
    /// A fanout stem branch: exactly one fanin, identity function.
    Branch,
    /// A primary output: no fanout.
    PrimaryOutput,
    /// An internal gate: one of the Boolean functions in [`Op`].
    Gate,
}

/// The Boolean operator of a line, from the closed set fixed by the file
/// format. `Xor` is reserved for the fault-free simulator; the deductive
/// fault simulator handles it via the symmetric-difference extension
/// described for that module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Source of a primary input; takes its value from the caller.
    Ipt,
    /// Identity function of a fanout branch.
    Brch,
    Xor,
    Or,
    Nor,
    Not,
    Nand,
    And,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ipt => "IPT",
            Self::Brch => "BRCH",
            Self::Xor => "XOR",
            Self::Or => "OR",
            Self::Nor => "NOR",
            Self::Not => "NOT",
            Self::Nand => "NAND",
            Self::And => "AND",
        };
        write!(f, "{}", s)
    }
}

impl Op {
    /// The controlling value of this operator's function, if it has one.
    /// `0` for AND/NAND, `1` for OR/NOR; `None` for all other operators,
    /// including XOR (which has no controlling value).
    pub fn controlling_value(self) -> Option<u8> {
        match self {
            Self::And | Self::Nand => Some(0),
            Self::Or | Self::Nor => Some(1),
            _ => None,
        }
    }

    /// Whether this operator inverts the function of its non-inverted
    /// counterpart (NAND/NOR/NOT all invert; AND/OR/BRCH do not).
    pub fn inverts(self) -> bool {
        matches!(self, Self::Nand | Self::Nor | Self::Not)
    }
}

/// A single record as produced by a netlist loader, keyed by the file's
/// own (possibly sparse) labels rather than the dense ids [`Netlist::build`]
/// assigns.
#[derive(Debug, Clone)]
pub struct LineRecord {
    pub label: i64,
    pub kind: Kind,
    pub op: Op,
    pub fanin_labels: Vec<i64>,
}

/// One signal-bearing wire. Structural fields (`kind`, `op`, `fanin`,
/// `fanout`) are fixed at construction time; simulation scratch (`level`,
/// `value`, fault sets) lives in parallel arrays on [`Netlist`], each owned
/// by exactly one pipeline stage.
#[derive(Debug, Clone)]
pub struct Line {
    id: LineId,
    label: i64,
    kind: Kind,
    op: Op,
    fanin: Vec<LineId>,
    fanout: Vec<LineId>,
}

impl Line {
    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn label(&self) -> i64 {
        self.label
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn fanin(&self) -> &[LineId] {
        &self.fanin
    }

    pub fn fanout(&self) -> &[LineId] {
        &self.fanout
    }
}

/// The netlist: an owned array of [`Line`]s plus the scratch arrays filled
/// in by levelization and simulation. Read-only once built, except for the
/// scratch arrays.
#[derive(Debug, Clone)]
pub struct Netlist {
    lines: Vec<Line>,
    primary_inputs: Vec<LineId>,
    primary_outputs: Vec<LineId>,
    levels: Vec<Option<usize>>,
    values: Vec<Option<u8>>,
    max_level: Option<usize>,
}

impl Netlist {
    /// Constructs the DAG from a list of `(label, kind, op, fanin_labels)`
    /// records. Assigns dense ids in the order labels are first seen,
    /// resolves `fanin_labels` to line ids, and derives `fanout` by
    /// inversion.
    ///
    /// # Errors
    ///
    /// Returns [`FsimError::MalformedNetlist`] if a label is duplicated, a
    /// fanin label is unresolved, fanin arity is inconsistent with `kind`
    /// or `op`, or the fanin relation contains a cycle.
    pub fn build(records: &[LineRecord]) -> Result<Self> {
        let mut id_of_label: HashMap<i64, LineId> = HashMap::with_capacity(records.len());
        for (id, record) in records.iter().enumerate() {
            if id_of_label.insert(record.label, id).is_some() {
                return Err(FsimError::MalformedNetlist(format!(
                    "duplicate line label {}",
                    record.label
                )));
            }
        }

        let mut lines = Vec::with_capacity(records.len());
        for (id, record) in records.iter().enumerate() {
            Self::check_arity(record)?;
            let mut fanin = Vec::with_capacity(record.fanin_labels.len());
            for label in &record.fanin_labels {
                let fanin_id = *id_of_label.get(label).ok_or_else(|| {
                    FsimError::MalformedNetlist(format!(
                        "line {} references unknown fanin label {}",
                        record.label, label
                    ))
                })?;
                fanin.push(fanin_id);
            }
            lines.push(Line {
                id,
                label: record.label,
                kind: record.kind,
                op: record.op,
                fanin,
                fanout: Vec::new(),
            });
        }

        let n = lines.len();
        let mut fanout: Vec<Vec<LineId>> = vec![Vec::new(); n];
        for line in &lines {
            for &pred in &line.fanin {
                fanout[pred].push(line.id);
            }
        }
        for (id, outs) in fanout.into_iter().enumerate() {
            lines[id].fanout = outs;
        }

        Self::check_acyclic(&lines)?;

        let primary_inputs: Vec<LineId> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == Kind::PrimaryInput)
            .map(|(id, _)| id)
            .collect();
        let primary_outputs: Vec<LineId> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == Kind::PrimaryOutput)
            .map(|(id, _)| id)
            .collect();

        Ok(Self {
            levels: vec![None; n],
            values: vec![None; n],
            lines,
            primary_inputs,
            primary_outputs,
            max_level: None,
        })
    }

    fn check_arity(record: &LineRecord) -> Result<()> {
        let fanin_count = record.fanin_labels.len();
        let ok = match record.kind {
            Kind::PrimaryInput => record.op == Op::Ipt && fanin_count == 0,
            Kind::Branch => record.op == Op::Brch && fanin_count == 1,
            Kind::Gate | Kind::PrimaryOutput => match record.op {
                Op::Not => fanin_count == 1,
                Op::And | Op::Or | Op::Nand | Op::Nor | Op::Xor => fanin_count >= 1,
                Op::Ipt | Op::Brch => false,
            },
        };
        if ok {
            Ok(())
        } else {
            Err(FsimError::MalformedNetlist(format!(
                "line {} has kind {:?}/op {} inconsistent with {} fanin(s)",
                record.label, record.kind, record.op, fanin_count
            )))
        }
    }

    fn check_acyclic(lines: &[Line]) -> Result<()> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }
        let mut marks = vec![Mark::Unvisited; lines.len()];
        // Explicit stack to avoid recursion depth issues on large netlists.
        for start in 0..lines.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            let mut stack = vec![(start, 0usize)];
            marks[start] = Mark::InProgress;
            while let Some(&mut (node, ref mut next)) = stack.last_mut() {
                if *next < lines[node].fanin.len() {
                    let pred = lines[node].fanin[*next];
                    *next += 1;
                    match marks[pred] {
                        Mark::Unvisited => {
                            marks[pred] = Mark::InProgress;
                            stack.push((pred, 0));
                        }
                        Mark::InProgress => {
                            return Err(FsimError::MalformedNetlist(
                                "cycle detected in fanin relation".to_string(),
                            ));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    /// Clears `level`, `value`, and the caller-held fault sets between runs.
    pub fn reset_scratch(&mut self) {
        for level in &mut self.levels {
            *level = None;
        }
        for value in &mut self.values {
            *value = None;
        }
        self.max_level = None;
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id]
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Primary input line ids, in file-declaration order.
    pub fn primary_inputs(&self) -> &[LineId] {
        &self.primary_inputs
    }

    /// Primary output line ids, in file-declaration order.
    pub fn primary_outputs(&self) -> &[LineId] {
        &self.primary_outputs
    }

    pub fn level(&self, id: LineId) -> Option<usize> {
        self.levels[id]
    }

    pub(crate) fn set_level(&mut self, id: LineId, level: usize) {
        self.levels[id] = Some(level);
    }

    pub fn max_level(&self) -> Option<usize> {
        self.max_level
    }

    pub(crate) fn set_max_level(&mut self, level: usize) {
        self.max_level = Some(level);
    }

    pub fn is_levelized(&self) -> bool {
        self.levels.iter().all(Option::is_some)
    }

    pub fn value(&self, id: LineId) -> Option<u8> {
        self.values[id]
    }

    pub(crate) fn set_value(&mut self, id: LineId, value: u8) {
        self.values[id] = Some(value);
    }

    /// Pretty-prints the circuit, one line per gate: id, label, kind, op,
    /// and fanin ids, matching the shell's `PC` command.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&format!(
                "{:>4}  label={:<8} kind={:<14?} op={:<4} fanin={:?}\n",
                line.id, line.label, line.kind, line.op, line.fanin
            ));
        }
        out
    }
}
