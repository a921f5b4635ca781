//! Date cadence calculator.
//!
//! Pure calendar arithmetic for the three recurrence units. All stepping is
//! done on the local calendar of the date's own timezone, so a daily task
//! keeps its wall-clock time across DST transitions and a monthly task keeps
//! its day-of-month (clamped when the target month is shorter).

use chrono::{DateTime, Days, Duration, LocalResult, Months, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The recurrence unit of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence type: {0}")]
pub struct ParseCadenceError(String);

impl FromStr for Cadence {
    type Err = ParseCadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Cadence::Daily),
            "weekly" => Ok(Cadence::Weekly),
            "monthly" => Ok(Cadence::Monthly),
            _ => Err(ParseCadenceError(s.to_string())),
        }
    }
}

/// Parses a stored/user recurrence type where `none` means "not recurring".
pub fn parse_recurring_type(s: &str) -> Result<Option<Cadence>, ParseCadenceError> {
    match s.trim().to_lowercase().as_str() {
        "none" | "" => Ok(None),
        other => other.parse().map(Some).map_err(|_| ParseCadenceError(s.to_string())),
    }
}

/// Computes the next due date after `date` for `cadence`.
///
/// - `Daily`: one calendar day later, same wall-clock time.
/// - `Weekly`: seven calendar days later.
/// - `Monthly`: the month is incremented and the day clamped to the last day
///   of the resulting month (Jan 31 -> Feb 28/29).
///
/// The clamp is applied per step. Callers that chain steps must feed back the
/// previous output, so a series starting on the 31st drifts to the 29th (or
/// 28th) and stays there.
///
/// Returns `None` only when the result is outside chrono's representable range.
pub fn advance<Z: TimeZone>(date: &DateTime<Z>, cadence: Cadence) -> Option<DateTime<Z>> {
    let local = date.naive_local();
    let next = match cadence {
        Cadence::Daily => local.checked_add_days(Days::new(1))?,
        Cadence::Weekly => local.checked_add_days(Days::new(7))?,
        Cadence::Monthly => local.checked_add_months(Months::new(1))?,
    };
    resolve_local(&date.timezone(), next)
}

/// Advances a UTC instant on the calendar of `tz`.
pub fn advance_utc(instant: DateTime<Utc>, cadence: Cadence, tz: Tz) -> Option<DateTime<Utc>> {
    advance(&instant.with_timezone(&tz), cadence).map(|next| next.with_timezone(&Utc))
}

/// The first `count` due dates of a chain starting at `start` (inclusive).
pub fn chain(start: DateTime<Utc>, cadence: Cadence, count: usize, tz: Tz) -> Option<Vec<DateTime<Utc>>> {
    let mut dates = Vec::with_capacity(count);
    let mut current = start;
    for i in 0..count {
        if i > 0 {
            current = advance_utc(current, cadence, tz)?;
        }
        dates.push(current);
    }
    Some(dates)
}

/// Maps a local wall-clock time back onto the timeline.
///
/// Times skipped by a spring-forward transition move one hour later;
/// ambiguous fall-back times take the earlier instant.
fn resolve_local<Z: TimeZone>(tz: &Z, naive: NaiveDateTime) -> Option<DateTime<Z>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        }
    }
}
