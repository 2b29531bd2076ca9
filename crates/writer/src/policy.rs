//! Rollover policies
//!
//! A policy runs a two-phase protocol. When a file is opened,
//! [`Policy::can_continue_file`] decides from file metadata whether an
//! existing file may be appended to, and [`Policy::init`] captures the
//! baseline for the second phase (bytes already written, or the next
//! rollover boundary). Per record, [`Policy::can_accept`] decides whether
//! the active file still has room; a `false` obligates the writer to roll
//! over before writing that record.
//!
//! The current wall-clock time is passed in by the caller instead of being
//! read here, which keeps every decision reproducible.
//!
//! Writers hold a list of policies and combine them with a logical AND via
//! [`can_continue_all`] and [`can_accept_all`].

use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Weekday,
};

use scribe_config::PolicyConfig;

use crate::error::{Error, Result};

/// Rule deciding file continuation and remaining capacity
#[derive(Debug, Clone)]
pub enum Policy {
    /// Always continue, always accept
    Endless,

    /// Force a new file on every process start
    Startup,

    /// Reject once a byte limit is reached
    Size {
        /// Maximum file size in bytes
        limit: u64,
        /// Bytes charged against the active file so far
        used: u64,
    },

    /// Reject once a day boundary is crossed
    Daily {
        /// Time of day the boundary falls on
        time: NaiveTime,
        /// Cached boundary after the active file was opened
        next_rollover: Option<DateTime<Local>>,
    },

    /// Reject once a week boundary is crossed
    Weekly {
        /// Day of week the boundary falls on
        day: Weekday,
        /// Time of day the boundary falls on
        time: NaiveTime,
        /// Cached boundary after the active file was opened
        next_rollover: Option<DateTime<Local>>,
    },

    /// Reject once a month boundary (the 1st) is crossed
    Monthly {
        /// Time of day the boundary falls on
        time: NaiveTime,
        /// Cached boundary after the active file was opened
        next_rollover: Option<DateTime<Local>>,
    },
}

impl Policy {
    /// Policy that never triggers a rollover
    pub fn endless() -> Self {
        Self::Endless
    }

    /// Policy that starts a new file on every process start
    pub fn startup() -> Self {
        Self::Startup
    }

    /// Policy that rolls over once `limit` bytes are written
    pub fn size(limit: u64) -> Self {
        Self::Size { limit, used: 0 }
    }

    /// Policy that rolls over every day at `time`
    pub fn daily(time: NaiveTime) -> Self {
        Self::Daily {
            time,
            next_rollover: None,
        }
    }

    /// Policy that rolls over every week on `day` at `time`
    pub fn weekly(day: Weekday, time: NaiveTime) -> Self {
        Self::Weekly {
            day,
            time,
            next_rollover: None,
        }
    }

    /// Policy that rolls over on the 1st of every month at `time`
    pub fn monthly(time: NaiveTime) -> Self {
        Self::Monthly {
            time,
            next_rollover: None,
        }
    }

    /// Build a policy from its configuration
    pub fn from_config(config: &PolicyConfig) -> Result<Self> {
        match config {
            PolicyConfig::Endless => Ok(Self::endless()),
            PolicyConfig::Startup => Ok(Self::startup()),
            PolicyConfig::Size { limit } => {
                if *limit == 0 {
                    Err(Error::InvalidPolicy("size limit must not be zero".into()))
                } else {
                    Ok(Self::size(*limit))
                }
            }
            PolicyConfig::Daily { time } => Ok(Self::daily(parse_time(time.as_deref())?)),
            PolicyConfig::Weekly { day, time } => Ok(Self::weekly(
                parse_day(day.as_deref())?,
                parse_time(time.as_deref())?,
            )),
            PolicyConfig::Monthly { time } => Ok(Self::monthly(parse_time(time.as_deref())?)),
        }
    }

    /// Decide from file metadata whether an existing file may be appended to
    ///
    /// Pure with respect to policy state; a missing or unreadable file is
    /// never continued.
    pub fn can_continue_file(&self, path: &Path, now: DateTime<Local>) -> bool {
        match self {
            Self::Endless => true,
            Self::Startup => false,
            Self::Size { limit, .. } => fs::metadata(path)
                .map(|meta| meta.len() < *limit)
                .unwrap_or(false),
            Self::Daily { time, .. } => modified_at_or_after(path, daily_boundaries(now, *time).0),
            Self::Weekly { day, time, .. } => {
                modified_at_or_after(path, weekly_boundaries(now, *day, *time).0)
            }
            Self::Monthly { time, .. } => {
                modified_at_or_after(path, monthly_boundaries(now, *time).0)
            }
        }
    }

    /// Capture the baseline for per-record decisions against a freshly
    /// opened (or continued) file
    pub fn init(&mut self, path: &Path, now: DateTime<Local>) {
        match self {
            Self::Endless | Self::Startup => {}
            Self::Size { used, .. } => {
                *used = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
            }
            Self::Daily {
                time,
                next_rollover,
            } => *next_rollover = Some(daily_boundaries(now, *time).1),
            Self::Weekly {
                day,
                time,
                next_rollover,
            } => *next_rollover = Some(weekly_boundaries(now, *day, *time).1),
            Self::Monthly {
                time,
                next_rollover,
            } => *next_rollover = Some(monthly_boundaries(now, *time).1),
        }
    }

    /// Decide whether a record of `bytes` encoded bytes still fits
    ///
    /// The size policy charges the record before comparing, so the check is
    /// prospective: the record that would cross the limit is rejected.
    pub fn can_accept(&mut self, bytes: u64, now: DateTime<Local>) -> bool {
        match self {
            Self::Endless | Self::Startup => true,
            Self::Size { limit, used } => {
                *used += bytes;
                *used <= *limit
            }
            Self::Daily { next_rollover, .. }
            | Self::Weekly { next_rollover, .. }
            | Self::Monthly { next_rollover, .. } => match next_rollover {
                Some(boundary) => now < *boundary,
                None => true,
            },
        }
    }
}

/// AND of [`Policy::can_continue_file`] across all policies
pub fn can_continue_all(policies: &[Policy], path: &Path, now: DateTime<Local>) -> bool {
    let mut result = true;
    for policy in policies {
        result &= policy.can_continue_file(path, now);
    }
    result
}

/// [`Policy::init`] for all policies
pub fn init_all(policies: &mut [Policy], path: &Path, now: DateTime<Local>) {
    for policy in policies {
        policy.init(path, now);
    }
}

/// AND of [`Policy::can_accept`] across all policies
///
/// Every policy is consulted even after one rejects, so counters stay
/// consistent across the whole list.
pub fn can_accept_all(policies: &mut [Policy], bytes: u64, now: DateTime<Local>) -> bool {
    let mut result = true;
    for policy in policies {
        result &= policy.can_accept(bytes, now);
    }
    result
}

fn modified_at_or_after(path: &Path, boundary: DateTime<Local>) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    DateTime::<Local>::from(modified) >= boundary
}

/// Latest boundary at or before `now` and earliest boundary after `now` for
/// a daily rollover at `time`
fn daily_boundaries(now: DateTime<Local>, time: NaiveTime) -> (DateTime<Local>, DateTime<Local>) {
    let today = now.date_naive();
    let candidate = resolve_local(today.and_time(time));
    if candidate <= now {
        (
            candidate,
            resolve_local((today + Duration::days(1)).and_time(time)),
        )
    } else {
        (
            resolve_local((today - Duration::days(1)).and_time(time)),
            candidate,
        )
    }
}

fn weekly_boundaries(
    now: DateTime<Local>,
    day: Weekday,
    time: NaiveTime,
) -> (DateTime<Local>, DateTime<Local>) {
    let today = now.date_naive();
    let days_back =
        (today.weekday().num_days_from_monday() + 7 - day.num_days_from_monday()) % 7;
    let anchor = today - Duration::days(i64::from(days_back));
    let candidate = resolve_local(anchor.and_time(time));
    if candidate <= now {
        (
            candidate,
            resolve_local((anchor + Duration::days(7)).and_time(time)),
        )
    } else {
        (
            resolve_local((anchor - Duration::days(7)).and_time(time)),
            candidate,
        )
    }
}

fn monthly_boundaries(now: DateTime<Local>, time: NaiveTime) -> (DateTime<Local>, DateTime<Local>) {
    let first = first_of_month(now.date_naive());
    let candidate = resolve_local(first.and_time(time));
    if candidate <= now {
        (candidate, resolve_local(next_month(first).and_time(time)))
    } else {
        (
            resolve_local(previous_month(first).and_time(time)),
            candidate,
        )
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first)
}

fn previous_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 1 {
        (first.year() - 1, 12)
    } else {
        (first.year(), first.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first)
}

/// Interpret a naive local date-time, scrolling forward out of DST gaps
fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    let mut naive = naive;
    loop {
        match Local.from_local_datetime(&naive) {
            LocalResult::Single(datetime) => return datetime,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => naive = naive + Duration::minutes(30),
        }
    }
}

fn parse_time(value: Option<&str>) -> Result<NaiveTime> {
    match value {
        None => Ok(NaiveTime::MIN),
        Some(text) => NaiveTime::parse_from_str(text, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
            .map_err(|_| Error::InvalidPolicy(format!("'{text}' is not a valid rollover time"))),
    }
}

fn parse_day(value: Option<&str>) -> Result<Weekday> {
    match value {
        None => Ok(Weekday::Mon),
        Some(text) => Weekday::from_str(text)
            .map_err(|_| Error::InvalidPolicy(format!("unknown weekday '{text}'"))),
    }
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;
