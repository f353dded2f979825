/*
 * logging.rs
 *
 * tracing subscriber for internal diagnostics. Writes to stderr, never
 * stdout - stdout belongs to the child. Default filter is "warn", and the
 * supervisor only emits debug/trace, so a normal run prints nothing.
 *
 * The user-facing --verbose lines are not log records. They go straight
 * to stderr from the supervisor.
 */

use std::io;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TimeoutError};

/// Install the global subscriber with `level` as an EnvFilter directive.
pub fn init(level: &str) -> Result<()> {
    let filter = mk_filter(level)?;
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TimeoutError::Internal(format!("logger init: {e}")))
}

fn mk_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).map_err(|_| TimeoutError::InvalidLogLevel(level.to_string()))
}
