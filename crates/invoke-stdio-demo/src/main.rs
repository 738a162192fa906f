//! Demo binary for the `invoke-stdio` adapter.
//!
//! Run as `invoke-demo NAME QUERY METHOD HEADERS` with the request body on
//! standard input; exactly one JSON object is written to standard output.

mod handlers;

use std::io::{self, Write};
use std::process::ExitCode;

use invoke_stdio::{Config, telemetry};

fn main() -> ExitCode {
    let mut stderr = io::stderr().lock();
    let config = Config::from_env().unwrap_or_else(|error| {
        writeln!(stderr, "{error}; using default logging").ok();
        Config::default()
    });
    if let Err(error) = telemetry::initialise(&config) {
        writeln!(stderr, "{error}").ok();
    }

    let registry = match handlers::registry() {
        Ok(registry) => registry,
        Err(error) => {
            writeln!(stderr, "{error}").ok();
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    match invoke_stdio::run(&registry, std::env::args_os(), &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            writeln!(stderr, "{error}").ok();
            ExitCode::FAILURE
        }
    }
}
