//! `fsim` binary crate: the interactive stuck-at fault simulation shell.

use std::io::{self, Write};

use clap::Parser;
use fs_err as fs;

use fsim::options::{CliOptions, TraceLevel};
use fsim::shell::{self, Context};

fn main() {
    let code = fsim_main();
    std::process::exit(code);
}

/// Initialize the logging framework with the given trace level.
///
/// # Errors
///
/// Returns an error if the logging framework has already been initialized.
fn initialize_logging(level: TraceLevel) -> io::Result<()> {
    env_logger::builder()
        .filter(None, level.into())
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}

/// Parses options, optionally performs the implicit initial `READ`, then
/// runs the shell either interactively or against a script file. Returns
/// the process exit code per the command surface's exit-code contract:
/// `0` on normal termination, non-zero on an unrecoverable load error.
fn fsim_main() -> i32 {
    let options = CliOptions::parse();
    if initialize_logging(options.trace_level).is_err() {
        let _ = writeln!(io::stderr(), "Error: logging already initialized");
    }

    let mut ctx = Context::new();

    if let Some(path) = &options.input_file {
        let command = format!("READ {}", path);
        let mut out = io::stdout();
        if let Err(e) = shell::dispatch(&mut ctx, &command, &mut out) {
            let _ = writeln!(io::stderr(), "Error: {}", e);
            return 1;
        }
    }

    match &options.script_file {
        Some(script_path) => match fs::File::open(script_path) {
            Ok(file) => shell::run(&mut ctx, io::BufReader::new(file), io::stdout()),
            Err(e) => {
                let _ = writeln!(io::stderr(), "Error: could not open script {}: {}", script_path, e);
                1
            }
        },
        None => shell::run_interactive(&mut ctx),
    }
}
