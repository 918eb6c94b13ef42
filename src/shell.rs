//! The interactive command shell: a thin driver over the simulation core
//! that owns a single [`Context`] value rather than scattering mutable
//! state across process-wide globals.

use std::io::{self, BufRead, Write};
use std::process::Command;

use log::{debug, info};

use crate::error::{FsimError, Result};
use crate::faults::deductive::deductive_fault_simulation;
use crate::faults::enumerate::{collapsed_list, complete_list};
use crate::faults::FaultSet;
use crate::levelize::levelize;
use crate::netlist::parse::read_self_format;
use crate::netlist::Netlist;
use crate::simulate::simulate;

/// The shell's owned state: at most one loaded netlist, plus which
/// prerequisite pipeline stages have run for it. Replaces the source's
/// process-wide globals (`Node`, `Pinput`, `Poutput`, `Gstate`) with a
/// single value threaded through command dispatch.
#[derive(Default)]
pub struct Context {
    netlist: Option<Netlist>,
    levelized: bool,
    last_faults: Option<Vec<FaultSet>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn netlist(&self) -> Option<&Netlist> {
        self.netlist.as_ref()
    }

    fn require_netlist(&self, command: &str) -> Result<&Netlist> {
        self.netlist.as_ref().ok_or_else(|| FsimError::ExecutionOutOfSequence {
            command: command.to_string(),
            prerequisite: "READ",
        })
    }

    fn require_levelized(&self, command: &str) -> Result<&Netlist> {
        let netlist = self.require_netlist(command)?;
        if self.levelized {
            Ok(netlist)
        } else {
            Err(FsimError::ExecutionOutOfSequence {
                command: command.to_string(),
                prerequisite: "LEV",
            })
        }
    }
}

/// The outcome of dispatching one command: whether the shell should keep
/// running.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Parses and executes a single command line against `ctx`. Unrecognized
/// tokens are forwarded to the host shell, via `Command::new(program).args(rest)`
/// rather than a shell string, so interactive input cannot smuggle in shell
/// metacharacters.
///
/// Per the error propagation policy, input/configuration errors are
/// reported on `out` and leave `ctx` unchanged; they do not abort the loop.
pub fn dispatch(ctx: &mut Context, line: &str, mut out: impl Write) -> Result<Outcome> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((command, args)) = tokens.split_first() else {
        return Ok(Outcome::Continue);
    };

    match command.to_ascii_uppercase().as_str() {
        "READ" => {
            let path = args.first().ok_or_else(|| FsimError::Input {
                path: String::new(),
                line_no: 0,
                raw: line.to_string(),
                message: "READ requires a file path argument".to_string(),
            })?;
            let records = read_self_format(path)?;
            let netlist = Netlist::build(&records)?;
            info!("loaded {} lines from {}", netlist.len(), path);
            ctx.netlist = Some(netlist);
            ctx.levelized = false;
            ctx.last_faults = None;
        }
        "PC" => {
            let netlist = ctx.require_netlist("PC")?;
            write!(out, "{}", netlist.describe()).ok();
        }
        "LEV" => {
            let netlist = ctx.netlist.as_mut().ok_or_else(|| FsimError::ExecutionOutOfSequence {
                command: "LEV".to_string(),
                prerequisite: "READ",
            })?;
            let lmax = levelize(netlist)?;
            ctx.levelized = true;
            debug!("levelized, Lmax = {}", lmax);
            writeln!(out, "#levels = {}", lmax).ok();
        }
        "GFL" => {
            let netlist = ctx.require_netlist("GFL")?;
            let complete = complete_list(netlist);
            let collapsed = collapsed_list(netlist);
            writeln!(
                out,
                "complete fault list: {} faults, collapsed: {} faults",
                complete.len(),
                collapsed.len()
            )
            .ok();
        }
        "FFS" => {
            let netlist = ctx.require_levelized("FFS")?;
            let pi_values: std::result::Result<Vec<u8>, _> = args.iter().map(|s| s.parse::<u8>()).collect();
            let pi_values = pi_values.map_err(|_| FsimError::Input {
                path: String::new(),
                line_no: 0,
                raw: line.to_string(),
                message: "FFS expects 0/1 primary input values".to_string(),
            })?;
            let mut netlist = netlist.clone();
            simulate(&mut netlist, &pi_values)?;
            for &po in netlist.primary_outputs() {
                writeln!(out, "PO {} = {}", po, netlist.value(po).unwrap()).ok();
            }
            ctx.netlist = Some(netlist);
        }
        "DFS" => {
            let netlist = ctx.require_levelized("DFS")?;
            if (0..netlist.len()).any(|id| netlist.value(id).is_none()) {
                return Err(FsimError::ExecutionOutOfSequence {
                    command: "DFS".to_string(),
                    prerequisite: "FFS",
                });
            }
            let faults = deductive_fault_simulation(netlist)?;
            for &po in netlist.primary_outputs() {
                writeln!(
                    out,
                    "PO {}: {} fault(s) detected",
                    po,
                    faults[po].len()
                )
                .ok();
            }
            ctx.last_faults = Some(faults);
        }
        "PFS" => {
            let netlist = ctx.require_levelized("PFS")?;
            let pi_values: std::result::Result<Vec<u8>, _> = args.iter().map(|s| s.parse::<u8>()).collect();
            let pi_values = pi_values.map_err(|_| FsimError::Input {
                path: String::new(),
                line_no: 0,
                raw: line.to_string(),
                message: "PFS expects 0/1 primary input values".to_string(),
            })?;
            let faults = complete_list(netlist);
            let coverage = crate::pfs::simulate(netlist, &pi_values, &faults)?;
            writeln!(out, "{} fault(s) covered", coverage.detected.len()).ok();
        }
        "HELP" => {
            writeln!(out, "{}", HELP_TEXT).ok();
        }
        "QUIT" => return Ok(Outcome::Quit),
        _ => {
            forward_to_host_shell(command, args, &mut out);
        }
    }
    Ok(Outcome::Continue)
}

const HELP_TEXT: &str = "\
READ <file>  - read a netlist in self format
PC           - print the circuit
LEV          - levelize the circuit
GFL          - generate the complete and collapsed fault lists
FFS <pis...> - fault-free simulation for the given primary input vector
DFS          - deductive fault simulation, using the last FFS result
PFS <pis...> - parallel (bit-packed) fault simulation
HELP         - print this help information
QUIT         - exit the shell";

fn forward_to_host_shell(command: &str, args: &[&str], out: &mut impl Write) {
    match Command::new(command).args(args).status() {
        Ok(status) => {
            if !status.success() {
                writeln!(out, "{}: exited with {}", command, status).ok();
            }
        }
        Err(e) => {
            writeln!(out, "{}: command not found ({})", command, e).ok();
        }
    }
}

/// Runs the shell to completion, reading one command per line from
/// `input` and writing responses to `out`. Returns the process exit code:
/// `0` on normal termination via `QUIT`, and also `0` when input is simply
/// exhausted (end of a script).
pub fn run(ctx: &mut Context, mut input: impl BufRead, mut out: impl Write) -> i32 {
    let mut line = String::new();
    loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => return 0,
            Ok(_) => {}
            Err(e) => {
                writeln!(out, "Error: {}", e).ok();
                return 1;
            }
        }
        match dispatch(ctx, &line, &mut out) {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Quit) => return 0,
            Err(e) => {
                writeln!(out, "Error: {}", e).ok();
            }
        }
    }
}

/// Convenience entry point used by `main`: reads commands from standard
/// input and writes responses to standard output.
pub fn run_interactive(ctx: &mut Context) -> i32 {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(ctx, stdin.lock(), stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_netlist(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("toy.self");
        std::fs::write(
            &path,
            "1 1 0 1 0\n1 2 0 1 0\n3 3 6 0 2 1 2\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn commands_before_read_are_out_of_sequence() {
        let mut ctx = Context::new();
        let mut out = Vec::new();
        let err = dispatch(&mut ctx, "PC", &mut out).unwrap_err();
        assert!(matches!(err, FsimError::ExecutionOutOfSequence { .. }));
    }

    #[test]
    fn read_then_lev_then_ffs_then_dfs_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_netlist(&dir);
        let mut ctx = Context::new();
        let mut out = Vec::new();

        dispatch(&mut ctx, &format!("READ {}", path.display()), &mut out).unwrap();
        dispatch(&mut ctx, "LEV", &mut out).unwrap();
        dispatch(&mut ctx, "FFS 1 0", &mut out).unwrap();
        dispatch(&mut ctx, "DFS", &mut out).unwrap();
        assert!(ctx.last_faults.is_some());
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut ctx = Context::new();
        let input = Cursor::new(b"QUIT\nPC\n".to_vec());
        let mut out = Vec::new();
        let code = run(&mut ctx, input, &mut out);
        assert_eq!(code, 0);
    }

    #[test]
    fn unrecognized_command_is_forwarded_without_aborting() {
        let mut ctx = Context::new();
        let mut out = Vec::new();
        // `true` exists on any POSIX host and always exits 0; this merely
        // exercises that forwarding doesn't error out the dispatch loop.
        let outcome = dispatch(&mut ctx, "true", &mut out).unwrap();
        assert_eq!(outcome, Outcome::Continue);
    }
}
