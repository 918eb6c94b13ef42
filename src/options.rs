//! Command-line options for the fault simulator shell.

use std::fmt;

use clap::{Parser, ValueEnum};

/// The trace level to use for instantiating the logging framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceLevel {
    /// Turn logging off.
    Off,
    /// Only print errors.
    Error,
    /// Print errors and warnings.
    Warn,
    /// Print errors, warnings and useful information.
    Info,
    /// Print errors, warnings, useful and debug information.
    Debug,
    /// Print all information, including very verbose output.
    Trace,
}

impl Default for TraceLevel {
    fn default() -> Self {
        Self::Error
    }
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        write!(f, "{}", s)
    }
}

impl From<TraceLevel> for log::LevelFilter {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Off => Self::Off,
            TraceLevel::Error => Self::Error,
            TraceLevel::Warn => Self::Warn,
            TraceLevel::Info => Self::Info,
            TraceLevel::Debug => Self::Debug,
            TraceLevel::Trace => Self::Trace,
        }
    }
}

/// Command-line options of the `fsim` shell.
///
/// This struct only covers startup options; the bulk of the interaction
/// happens through the interactive command surface once the shell is
/// running.
#[derive(Debug, Clone, Default, Parser)]
#[command(version, about = "Gate-level stuck-at fault simulator")]
pub struct CliOptions {
    /// Netlist file to load before entering the interactive shell,
    /// equivalent to issuing `READ <file>` as the first command.
    #[arg(short = 'r', long = "read")]
    pub input_file: Option<String>,

    /// Read shell commands from the given file instead of standard input,
    /// one command per line, and exit once the file is exhausted.
    #[arg(short = 's', long = "script")]
    pub script_file: Option<String>,

    /// The trace level to use for instantiating the logging framework.
    #[arg(short = 't', long = "trace", default_value = "error")]
    pub trace_level: TraceLevel,
}
