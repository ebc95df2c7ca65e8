//! The run clock and the age comparison every retention decision uses.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// The single reference date of a retention run.
///
/// Computed once when the run starts and reused for every file, so the
/// cutoff stays the same even if the pass crosses midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionClock {
    today: NaiveDate,
}

impl RetentionClock {
    /// Capture the current calendar day in `timezone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone string is not a known IANA name.
    pub fn now_in(timezone: &str) -> Result<Self, PolicyError> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|e| PolicyError::InvalidTimezone {
                timezone: timezone.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self::at(Utc::now().with_timezone(&tz).date_naive()))
    }

    /// A clock pinned to a fixed date.
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Today at midnight UTC, the instant all ages are measured from.
    pub fn reference_instant(&self) -> DateTime<Utc> {
        self.today.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Whole days elapsed between `date` and today. Future dates are negative.
    pub fn age_in_days(&self, date: NaiveDate) -> i64 {
        self.today.signed_duration_since(date).num_days()
    }

    /// A file is expired only when it is strictly older than `keep_days`.
    pub fn is_expired(&self, date: NaiveDate, keep_days: i64) -> bool {
        self.age_in_days(date) > keep_days
    }

    /// Newest date that is still kept for `keep_days`; anything dated
    /// before it is expired. `None` when the window reaches past the
    /// earliest representable date.
    pub fn oldest_kept(&self, keep_days: i64) -> Option<NaiveDate> {
        let days = u64::try_from(keep_days).ok()?;
        self.today.checked_sub_days(Days::new(days))
    }
}

/// Errors raised while setting up the run clock.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Invalid timezone '{timezone}': {message}")]
    InvalidTimezone { timezone: String, message: String },
}
