/*
 * signal.rs
 *
 * Accept "SIGTERM", "SIGINT", "SIGKILL" in any case. Nothing else: no
 * numbers, no bare "TERM". The set is closed on purpose so a typo can't
 * turn into some other signal being sent to a whole process group.
 *
 * Local Signal enum with libc constants - no nix dependency.
 */

use crate::error::{Result, TimeoutError};

/* the escalation signals. Copy/PartialEq for easy comparison. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Signal {
    SIGINT = libc::SIGINT,
    SIGKILL = libc::SIGKILL,
    SIGTERM = libc::SIGTERM,
}

impl Signal {
    /* convert from raw signal number */
    pub fn try_from_raw(num: i32) -> Option<Self> {
        match num {
            libc::SIGINT => Some(Self::SIGINT),
            libc::SIGKILL => Some(Self::SIGKILL),
            libc::SIGTERM => Some(Self::SIGTERM),
            _ => None,
        }
    }

    /* get raw signal number */
    #[inline]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }
}

impl core::fmt::Display for Signal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(signal_name(*self))
    }
}

impl core::str::FromStr for Signal {
    type Err = TimeoutError;

    fn from_str(s: &str) -> Result<Self> {
        parse_signal(s)
    }
}

/// Resolve a symbolic signal name, case-insensitive.
///
/// # Examples
///
/// ```
/// use timelimitx::signal::{parse_signal, Signal};
///
/// assert_eq!(parse_signal("SIGTERM").unwrap(), Signal::SIGTERM);
/// assert_eq!(parse_signal("sigint").unwrap(), Signal::SIGINT);
/// assert_eq!(parse_signal("SigKill").unwrap(), Signal::SIGKILL);
/// assert!(parse_signal("SIGHUP").is_err());
/// assert!(parse_signal("15").is_err());
/// ```
pub fn parse_signal(input: &str) -> Result<Signal> {
    /* TERM first, it's the default and 99% of usage */
    if input.eq_ignore_ascii_case("SIGTERM") {
        Ok(Signal::SIGTERM)
    } else if input.eq_ignore_ascii_case("SIGKILL") {
        Ok(Signal::SIGKILL)
    } else if input.eq_ignore_ascii_case("SIGINT") {
        Ok(Signal::SIGINT)
    } else {
        Err(TimeoutError::UnsupportedSignal(input.to_string()))
    }
}

/* raw number, for 128 + signum exit codes */
#[must_use]
#[inline]
pub const fn signal_number(signal: Signal) -> i32 {
    signal.as_raw()
}

/* human-readable name for verbose output */
#[must_use]
pub const fn signal_name(signal: Signal) -> &'static str {
    match signal {
        Signal::SIGINT => "SIGINT",
        Signal::SIGKILL => "SIGKILL",
        Signal::SIGTERM => "SIGTERM",
    }
}

/* name for any raw signal number, used when describing how a child died */
#[must_use]
pub fn raw_signal_name(num: i32) -> Option<&'static str> {
    match num {
        libc::SIGHUP => Some("SIGHUP"),
        libc::SIGQUIT => Some("SIGQUIT"),
        libc::SIGABRT => Some("SIGABRT"),
        libc::SIGSEGV => Some("SIGSEGV"),
        libc::SIGPIPE => Some("SIGPIPE"),
        libc::SIGALRM => Some("SIGALRM"),
        libc::SIGUSR1 => Some("SIGUSR1"),
        libc::SIGUSR2 => Some("SIGUSR2"),
        _ => Signal::try_from_raw(num).map(signal_name),
    }
}
