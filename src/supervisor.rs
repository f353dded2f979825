/*
 * supervisor.rs
 *
 * Spawn the shell, race the deadline against the child, escalate if the
 * deadline wins. All the tricky bits live here.
 *
 * The race: a waiter thread owns the child and blocks in waitpid, then
 * sends the status down a channel. We block in recv_timeout on that
 * channel. Whichever comes first - a message or the deadline - decides the
 * outcome, exactly once. No polling. A message already sitting in the
 * channel beats a zero deadline.
 *
 * Escalation: requested signal to -pgid, sleep the grace period, SIGKILL
 * to -pgid. Always all three steps, in that order, even if the requested
 * signal was already SIGKILL or the group is long gone. Delivery results
 * are logged and otherwise ignored - ESRCH just means the job is done.
 *
 * If the deadline wins, the waiter thread is abandoned. It reaps the child
 * whenever the kernel gets around to it and its send goes nowhere.
 */

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::args::Args;
use crate::duration::parse_duration;
use crate::error::{Result, TimeoutError, exit_codes};
use crate::process::{RawExitStatus, SpawnError, reset_sigchld, signal_group, spawn_shell};
use crate::signal::{Signal, parse_signal, signal_number};

/// Shell used to interpret the command.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Time between the requested signal and the unconditional SIGKILL.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(1);

/* runtime config, built once from CLI args and never mutated */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub timeout: Duration, /* how long before we escalate */
    pub signal: Signal,    /* what to send first (default: SIGTERM) */
    pub grace: Duration,   /* wait between signal and SIGKILL */
    pub verbose: bool,     /* announce escalation and clean exits */
    pub shell: PathBuf,    /* interpreter for the command string */
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            signal: Signal::SIGTERM,
            grace: DEFAULT_GRACE,
            verbose: false,
            shell: PathBuf::from(DEFAULT_SHELL),
        }
    }
}

impl RunConfig {
    #[must_use]
    pub fn new(timeout: Duration, signal: Signal) -> Self {
        Self {
            timeout,
            signal,
            ..Self::default()
        }
    }

    /* build config from CLI args. fails if time/signal/grace is bogus. */
    pub fn from_args(args: &Args) -> Result<Self> {
        let time = args
            .time
            .as_deref()
            .ok_or(TimeoutError::MissingArgument("--time flag is required"))?;
        let timeout = parse_duration(time)?;
        let signal = parse_signal(&args.signal)?;
        let grace = parse_duration(&args.grace)?;

        Ok(Self {
            timeout,
            signal,
            grace,
            verbose: args.verbose,
            shell: PathBuf::from(DEFAULT_SHELL),
        })
    }
}

/* how the run ended */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    /// Child exited before the deadline.
    Completed { status: RawExitStatus },
    /// Deadline fired first; the group got `signal`, then SIGKILL.
    TimedOut {
        signal: Signal,
        /* child had already reported exit by the end of the grace period */
        exited_during_grace: bool,
    },
}

impl RunResult {
    /// Exit code for the tool: mirror the child on natural completion, 124 on timeout.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Completed { status } => status_to_exit_code(status),
            Self::TimedOut { .. } => exit_codes::TIMEOUT,
        }
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/* exit status to 8-bit code, POSIX style: 128 + signum for signal deaths */
#[allow(clippy::cast_sign_loss)]
fn status_to_exit_code(status: &RawExitStatus) -> u8 {
    if let Some(sig) = status.signal() {
        return ((128i32 + sig) & 0xFF) as u8;
    }

    (status.code().unwrap_or(1) & 0xFF) as u8
}

/// POSIX exit code a shell would report for a process killed by `signal`.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn signal_exit_code(signal: Signal) -> u8 {
    ((128i32 + signal_number(signal)) & 0xFF) as u8
}

/// Spawn `command` under the shell and enforce the time limit.
///
/// Errors: shell not found, permission denied, spawn failed, wait failed.
/// Signal delivery failures during escalation are never errors.
pub fn run_command(command: &str, config: &RunConfig) -> Result<RunResult> {
    /* an inherited SIG_IGN would make the kernel reap the child behind our back */
    reset_sigchld();

    let mut child = spawn_shell(&config.shell, command).map_err(|e| match e {
        SpawnError::NotFound(s) => TimeoutError::CommandNotFound(s),
        SpawnError::PermissionDenied(s) => TimeoutError::PermissionDenied(s),
        SpawnError::Spawn(errno) | SpawnError::Wait(errno) => TimeoutError::Spawn(errno),
        SpawnError::InvalidArg => TimeoutError::InvalidCommand,
    })?;

    /* child leads its own group, so pid == pgid */
    let pgid = child.id();
    debug!(pgid, shell = %config.shell.display(), command, "spawned");

    let (tx, rx) = mpsc::channel();
    let waiter = thread::Builder::new()
        .name("timelimitx-wait".into())
        .spawn(move || {
            /* receiver may be gone if the deadline won; nothing to do then */
            let _ = tx.send(child.wait());
        });

    if let Err(e) = waiter {
        /* don't leave an unsupervised group behind */
        let _ = signal_group(pgid, Signal::SIGKILL);
        return Err(TimeoutError::Internal(format!("failed to start wait thread: {e}")));
    }

    match rx.recv_timeout(config.timeout) {
        Ok(Ok(status)) => {
            debug!(pgid, %status, "child exited before deadline");
            report_completion(&status, config);
            Ok(RunResult::Completed { status })
        }
        Ok(Err(e)) => match e {
            SpawnError::Wait(errno) => Err(TimeoutError::Wait(errno)),
            other => Err(TimeoutError::Internal(other.to_string())),
        },
        Err(RecvTimeoutError::Timeout) => {
            debug!(pgid, timeout = ?config.timeout, "deadline reached");
            Ok(escalate(pgid, config, &rx))
        }
        Err(RecvTimeoutError::Disconnected) => Err(TimeoutError::Internal(
            "wait thread exited without a status".to_string(),
        )),
    }
}

/*
 * requested signal, grace sleep, SIGKILL. strictly in that order.
 * the late completion check happens before SIGKILL so that our own kill
 * doesn't count as the child exiting on its own.
 */
fn escalate(
    pgid: libc::pid_t,
    config: &RunConfig,
    rx: &Receiver<core::result::Result<RawExitStatus, SpawnError>>,
) -> RunResult {
    if config.verbose {
        eprintln!(
            "timelimitx: time limit exceeded, sending {} to the process group",
            config.signal
        );
    }

    let delivery = signal_group(pgid, config.signal);
    trace!(pgid, signal = %config.signal, ?delivery, "escalation signal");

    thread::sleep(config.grace);

    let exited_during_grace = rx.try_recv().is_ok();

    let delivery = signal_group(pgid, Signal::SIGKILL);
    trace!(pgid, ?delivery, exited_during_grace, "force kill");

    RunResult::TimedOut {
        signal: config.signal,
        exited_during_grace,
    }
}

/* failure always gets a line, success only in verbose mode */
fn report_completion(status: &RawExitStatus, config: &RunConfig) {
    if !status.success() {
        eprintln!("timelimitx: command finished with error: {status}");
    } else if config.verbose {
        eprintln!("timelimitx: command finished successfully");
    }
}
