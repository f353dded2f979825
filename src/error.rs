/*
 * error.rs
 *
 * Exit codes follow GNU coreutils timeout. Scripts depend on these.
 * 124 = timed out, 125 = our fault, 126 = shell not executable,
 * 127 = shell not found.
 *
 * Parse errors surface before anything is spawned, so there is never
 * partial state to clean up when one of these comes back.
 */

use thiserror::Error;

/// exit codes per GNU coreutils convention. don't change these.
pub mod exit_codes {
    /// Command ran too long (timed out)
    pub const TIMEOUT: u8 = 124;
    /// timelimitx itself failed (bad flags, spawn failure, internal error)
    pub const INTERNAL_ERROR: u8 = 125;
    /// Shell found but couldn't be executed (permissions)
    pub const CANNOT_INVOKE: u8 = 126;
    /// Shell not found
    pub const NOT_FOUND: u8 = 127;
}

/* everything that can go wrong */
#[derive(Debug, Error)]
pub enum TimeoutError {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    #[error("unsupported signal: {0}")]
    UnsupportedSignal(String),
    #[error("{0}")]
    MissingArgument(&'static str),
    #[error("shell not found: {0}")]
    CommandNotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("command contains a NUL byte")]
    InvalidCommand,
    #[error("failed to spawn process: errno {0}")]
    Spawn(i32),
    #[error("failed to wait for process: errno {0}")]
    Wait(i32),
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl TimeoutError {
    /* map errors to exit codes. 126 vs 127 matters to scripts. */
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::CommandNotFound(_) => exit_codes::NOT_FOUND,
            Self::PermissionDenied(_) => exit_codes::CANNOT_INVOKE,
            Self::InvalidDuration(_)
            | Self::UnsupportedSignal(_)
            | Self::MissingArgument(_)
            | Self::InvalidCommand
            | Self::Spawn(_)
            | Self::Wait(_)
            | Self::InvalidLogLevel(_)
            | Self::Internal(_) => exit_codes::INTERNAL_ERROR,
        }
    }

    /// True for errors raised by the duration parser or signal resolver,
    /// i.e. before any process exists.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::InvalidDuration(_) | Self::UnsupportedSignal(_))
    }
}

pub type Result<T> = core::result::Result<T, TimeoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_signal_names_input() {
        let err = TimeoutError::UnsupportedSignal("SIGHUP".to_string());
        assert_eq!(err.to_string(), "unsupported signal: SIGHUP");
    }

    #[test]
    fn test_spawn_exit_codes() {
        assert_eq!(
            TimeoutError::CommandNotFound("/bin/sh".into()).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            TimeoutError::PermissionDenied("/bin/sh".into()).exit_code(),
            exit_codes::CANNOT_INVOKE
        );
        assert_eq!(TimeoutError::Spawn(12).exit_code(), exit_codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_parse_errors_are_internal() {
        let dur = TimeoutError::InvalidDuration("invalid time format".into());
        let sig = TimeoutError::UnsupportedSignal("SIGFOO".into());
        assert!(dur.is_parse_error());
        assert!(sig.is_parse_error());
        assert_eq!(dur.exit_code(), exit_codes::INTERNAL_ERROR);
        assert_eq!(sig.exit_code(), exit_codes::INTERNAL_ERROR);
        assert!(!TimeoutError::Spawn(1).is_parse_error());
    }
}
