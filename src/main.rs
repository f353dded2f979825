/*
 * main.rs
 *
 * Parse args, build config, call the supervisor, turn the result into an
 * exit code. Boring on purpose. The interesting stuff is in supervisor.rs.
 *
 * Everything that can be wrong with the flags is found before anything
 * is spawned.
 */

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use timelimitx::args::Args;
use timelimitx::error::{TimeoutError, exit_codes};
use timelimitx::supervisor::{RunConfig, run_command};
use timelimitx::{logging, version_banner};

fn main() -> ExitCode {
    ExitCode::from(run_main())
}

fn run_main() -> u8 {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            let _ = e.print();
            return 0;
        }
        Err(e) => {
            let _ = e.print();
            return exit_codes::INTERNAL_ERROR;
        }
    };

    if args.version {
        println!("{}", version_banner());
        return 0;
    }

    if let Err(e) = logging::init(&args.log_level) {
        eprintln!("timelimitx: {e}");
        return e.exit_code();
    }

    let config = match RunConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("timelimitx: {e}");
            if matches!(e, TimeoutError::MissingArgument(_)) {
                eprintln!("{}", Args::usage());
            }
            return e.exit_code();
        }
    };

    let Some(command) = args.command_line() else {
        eprintln!("timelimitx: command to execute is required");
        eprintln!("{}", Args::usage());
        return exit_codes::INTERNAL_ERROR;
    };

    match run_command(&command, &config) {
        Ok(result) => result.exit_code(),
        Err(e @ (TimeoutError::Wait(_) | TimeoutError::Internal(_))) => {
            eprintln!("timelimitx: {e}");
            e.exit_code()
        }
        Err(e) => {
            eprintln!("timelimitx: error starting command: {e}");
            e.exit_code()
        }
    }
}
