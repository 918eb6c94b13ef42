//! Error taxonomy for the fault simulator core and shell.

use thiserror::Error;

/// The line-id type used throughout the crate; see [`crate::netlist::LineId`].
pub type LineId = usize;

/// All error kinds the core and shell can report.
///
/// Every variant corresponds to one of the error kinds named in the
/// simulator's propagation policy: input/configuration errors are reported
/// and leave state untouched, `Internal` is the only variant ever treated
/// as fatal.
#[derive(Debug, Error)]
pub enum FsimError {
    /// The netlist file was absent, unreadable, or malformed.
    #[error("input error at line {line_no} ({path}): {message} (read: {raw:?})")]
    Input {
        path: String,
        line_no: usize,
        raw: String,
        message: String,
    },

    /// An unresolved label, an arity mismatch, or a fanin/fanout cycle.
    #[error("malformed netlist: {0}")]
    MalformedNetlist(String),

    /// A command ran before its prerequisite.
    #[error("command {command:?} requires {prerequisite} to have run first")]
    ExecutionOutOfSequence {
        command: String,
        prerequisite: &'static str,
    },

    /// The deductive fault simulator encountered an operator it cannot
    /// propagate through (XOR without the symmetric-difference extension).
    #[error("unsupported operator for deductive fault propagation on line {0}")]
    UnsupportedOp(LineId),

    /// A primary input was left unset before fault-free simulation.
    #[error("missing value for primary input line {0}")]
    MissingPiValue(LineId),

    /// An invariant documented in the netlist data model was violated at
    /// runtime. Always a bug; never expected to be triggered by valid input.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FsimError>;
