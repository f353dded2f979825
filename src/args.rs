/*
 * args.rs
 *
 * Clap derive macros handle parsing. Life's too short to do this by hand.
 *
 * The front-end only produces strings. Turning them into a Duration and a
 * Signal happens in RunConfig::from_args so the errors come out of one place.
 *
 * trailing_var_arg grabs everything after the first positional so
 * `timelimitx -t 5s grep -r foo .` doesn't try to parse grep's flags.
 * The first word itself may not start with '-', so a mistyped flag is an
 * error instead of a command. Use `--` to run something like `-x`.
 * --version is our own flag, not clap's, because it has to win over the
 * missing --time check and print the banner we want.
 */

use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "timelimitx",
    disable_version_flag = true,
    about = "Run a shell command with a time limit",
    long_about = "Run COMMAND through /bin/sh in its own process group, and kill the whole\n\
                  group if it is still running after DURATION.\n\n\
                  DURATION is an integer followed by a unit:\n\
                  's' for seconds, 'm' for minutes, 'h' for hours, 'd' for days.\n\n\
                  Examples:\n\
                    timelimitx -t 30s make test\n\
                    timelimitx -t 2m -s SIGINT -- ./server --port 8080\n\
                    timelimitx -t 1h 'tar czf backup.tgz data/ && upload backup.tgz'\n\n\
                  On timeout, SIGNAL is sent to the process group, then after the grace\n\
                  period SIGKILL is sent to the same group unconditionally.",
    after_help = "Exit status:\n\
                  124 if COMMAND times out\n\
                  125 if timelimitx itself fails (bad flags, spawn failure)\n\
                  126 if the shell is found but cannot be invoked\n\
                  127 if the shell cannot be found\n\
                  the exit status of COMMAND otherwise (128+N if killed by signal N)"
)]
pub struct Args {
    /// Time limit, e.g. 30s, 5m, 2h, 1d.
    #[arg(short = 't', long = "time", value_name = "DURATION")]
    pub time: Option<String>,

    /// Signal to send to the process group on timeout.
    ///
    /// One of SIGTERM, SIGINT, SIGKILL (case-insensitive).
    #[arg(
        short = 's',
        long = "signal",
        default_value = "SIGTERM",
        value_name = "SIGNAL"
    )]
    pub signal: String,

    /// Grace period between SIGNAL and the final SIGKILL.
    #[arg(
        short = 'g',
        long = "grace",
        default_value = "1s",
        value_name = "DURATION"
    )]
    pub grace: String,

    /// Announce the timeout signal and successful completion on stderr.
    #[arg(long = "verbose")]
    pub verbose: bool,

    /// Filter for internal diagnostics on stderr (e.g. debug, timelimitx=trace).
    #[arg(long = "log-level", default_value = "warn", value_name = "LEVEL")]
    pub log_level: String,

    /// Print the version of the tool and exit.
    #[arg(long = "version")]
    pub version: bool,

    /// Command to run. Joined with single spaces and handed to the shell.
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    pub command: Vec<String>,
}

impl Args {
    /// The shell command line, or None if no command was given.
    #[must_use]
    pub fn command_line(&self) -> Option<String> {
        if self.command.is_empty() {
            None
        } else {
            Some(self.command.join(" "))
        }
    }

    /* one-line usage for error paths */
    #[must_use]
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }
}
