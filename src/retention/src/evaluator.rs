//! Per-file retention decisions.
//!
//! Each candidate is judged on its own: stat it, pull the date out of its
//! base name, compare the age against the rule. Nothing here touches the
//! filesystem beyond the stat.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::trace;

use crate::policy::RetentionClock;

// ASCII digits only; `\d` would also accept other Unicode numerals.
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("date pattern is valid"));

/// Why a candidate was left alone without an age comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The path could not be stat'ed (vanished, permission denied, ...).
    Unreadable,
    /// The path is a directory.
    Directory,
    /// The base name carries no usable `YYYY-MM-DD` token.
    NoDate,
}

/// Outcome of evaluating one candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Skip(SkipReason),
    Retain { date: NaiveDate, age_days: i64 },
    Expire { date: NaiveDate, age_days: i64 },
}

/// Extract the date stamp from a file's base name.
///
/// Only the first date-shaped substring is considered; if it is not a real
/// calendar date the name is inconclusive and `None` is returned, even when
/// a later substring would parse.
pub fn extract_date(file_name: &str) -> Option<NaiveDate> {
    let token = DATE_PATTERN.find(file_name)?;
    NaiveDate::parse_from_str(token.as_str(), "%Y-%m-%d").ok()
}

/// Decide what to do with `path` under a rule keeping `keep_days` days.
pub fn evaluate(path: &Path, clock: &RetentionClock, keep_days: i64) -> Disposition {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {
            trace!(path = %path.display(), "Skipping directory");
            return Disposition::Skip(SkipReason::Directory);
        }
        Ok(_) => {}
        Err(e) => {
            trace!(path = %path.display(), error = %e, "Skipping unreadable path");
            return Disposition::Skip(SkipReason::Unreadable);
        }
    }

    let Some(date) = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(extract_date)
    else {
        trace!(path = %path.display(), "Skipping file without date stamp");
        return Disposition::Skip(SkipReason::NoDate);
    };

    let age_days = clock.age_in_days(date);
    if clock.is_expired(date, keep_days) {
        Disposition::Expire { date, age_days }
    } else {
        Disposition::Retain { date, age_days }
    }
}
