/*
 * lib.rs
 *
 * Exists mostly for testing. Integration tests need our types, doc tests
 * need a lib. You could use this as a library but honestly just shell out.
 */

//! # timelimitx
//!
//! Run a shell command with a wall-clock limit. On timeout the whole
//! process group gets the requested signal, then SIGKILL after a grace period.
//!
//! ## Quick Start
//!
//! ```rust
//! use timelimitx::{parse_duration, parse_signal, signal::Signal};
//! use std::time::Duration;
//!
//! let dur = parse_duration("30s").unwrap();
//! assert_eq!(dur, Duration::from_secs(30));
//!
//! let sig = parse_signal("sigterm").unwrap();
//! assert_eq!(sig, Signal::SIGTERM);
//! ```

pub mod args;
pub mod duration;
pub mod error;
pub mod logging;
pub mod process;
pub mod signal;
pub mod supervisor;

pub use args::Args;
pub use duration::parse_duration;
pub use error::{Result, TimeoutError, exit_codes};
pub use process::{Delivery, RawExitStatus, signal_group};
pub use signal::{Signal, parse_signal, signal_name, signal_number};
pub use supervisor::{DEFAULT_GRACE, RunConfig, RunResult, run_command};

/// The line printed by `--version`.
#[must_use]
pub fn version_banner() -> String {
    format!("Current timelimitx version v{}", env!("CARGO_PKG_VERSION"))
}
