/*
 * duration.rs
 *
 * Parse "30s", "5m", "2h", "1d". Integer amount, one unit character, no
 * default unit. Units are case sensitive and the token is not trimmed.
 *
 * A leading '+' is fine. A leading '-' parses as a number but is rejected:
 * std Duration can't go negative and a timer in the past is not a timeout.
 * Zero is allowed and means the deadline fires immediately.
 */

use std::time::Duration;

use crate::error::{Result, TimeoutError};

/* seconds per unit */
const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;
const SECS_PER_DAY: u64 = 86_400;

/// Parse "30s", "2m", "1h", "1d" into a whole number of seconds.
///
/// # Examples
///
/// ```
/// use timelimitx::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
/// assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
/// assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
/// assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86400));
/// assert!(parse_duration("30").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration> {
    if input.len() < 2 {
        return Err(TimeoutError::InvalidDuration(
            "invalid time format".to_string(),
        ));
    }

    let (amount_str, unit) = split_amount_and_unit(input);

    let amount: i64 = amount_str.parse().map_err(|_| {
        TimeoutError::InvalidDuration(format!("invalid number in time limit '{input}'"))
    })?;

    let scale = unit_scale(unit).ok_or_else(|| {
        TimeoutError::InvalidDuration(format!(
            "invalid time unit '{unit}', must be s, m, h, or d"
        ))
    })?;

    let amount = u64::try_from(amount).map_err(|_| {
        TimeoutError::InvalidDuration("negative values not allowed".to_string())
    })?;

    let secs = amount
        .checked_mul(scale)
        .ok_or_else(|| TimeoutError::InvalidDuration("value too large".to_string()))?;

    Ok(Duration::from_secs(secs))
}

/* last char is the unit, everything before it is the amount */
fn split_amount_and_unit(input: &str) -> (&str, char) {
    match input.char_indices().next_back() {
        Some((idx, unit)) => (&input[..idx], unit),
        None => (input, '\0'),
    }
}

/* seconds per unit, None for anything outside s/m/h/d */
const fn unit_scale(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(SECS_PER_MINUTE),
        'h' => Some(SECS_PER_HOUR),
        'd' => Some(SECS_PER_DAY),
        _ => None,
    }
}
