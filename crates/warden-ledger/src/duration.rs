//! Moderator-facing duration strings.
//!
//! Input grammar: one or more `<digits><unit>` terms with nothing in
//! between, units `s`, `m`, `h`, `d` in either case. `"1d12h30m"`,
//! `"90s"`, `"2H"` are all fine. Anything else is rejected whole.
//!
//! Output is the compact form `"1d 12h 30m"`. Seconds are only shown for
//! durations under a day, where they still matter.

use std::time::Duration;

use crate::LedgerError;

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Parses a duration such as `"1d12h30m"`.
///
/// # Errors
/// [`LedgerError::InvalidDurationFormat`] when the string is empty, has a
/// unit with no number before it, has an unknown unit, ends in a number
/// with no unit, overflows, or adds up to zero.
pub fn parse_duration(input: &str) -> Result<Duration, LedgerError> {
    let invalid = || LedgerError::InvalidDurationFormat(input.to_string());

    let mut total_ms: u64 = 0;
    let mut number: Option<u64> = None;

    for c in input.chars() {
        if let Some(digit) = c.to_digit(10) {
            let value = number
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|n| n.checked_add(u64::from(digit)))
                .ok_or_else(invalid)?;
            number = Some(value);
            continue;
        }

        let value = number.take().ok_or_else(invalid)?;
        let unit_ms = match c.to_ascii_lowercase() {
            's' => SECOND_MS,
            'm' => MINUTE_MS,
            'h' => HOUR_MS,
            'd' => DAY_MS,
            _ => return Err(invalid()),
        };
        total_ms = value
            .checked_mul(unit_ms)
            .and_then(|term| total_ms.checked_add(term))
            .ok_or_else(invalid)?;
    }

    if number.is_some() || total_ms == 0 {
        return Err(invalid());
    }
    Ok(Duration::from_millis(total_ms))
}

/// Formats a span in milliseconds as `"1d 2h 30m"`.
///
/// Zero, negative, and sub-second spans all read `"0s"`.
pub fn format_millis(ms: i64) -> String {
    if ms <= 0 {
        return "0s".to_string();
    }

    let total_secs = ms as u64 / SECOND_MS;
    let days = total_secs / 86_400;
    let hours = (total_secs / 3_600) % 24;
    let minutes = (total_secs / 60) % 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 && days == 0 {
        parts.push(format!("{seconds}s"));
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// [`format_millis`] for a [`Duration`].
pub fn format_duration(duration: Duration) -> String {
    format_millis(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
}
