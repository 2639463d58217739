//! Timeline bounds and slider-to-date mapping.
//!
//! # Responsibility
//! - Derive `[earliest, latest]` from the loaded schedule entries.
//! - Map a 0..=100 slider position onto a concrete point in that range.
//!
//! # Invariants
//! - `latest` is the maximum end date plus one day, so position 100 lands
//!   strictly after every recorded end date.
//! - `latest > earliest` for every constructed `TimelineBounds`.
//! - `date_at` is pure: identical `(bounds, percent)` yields identical output,
//!   and the output always lies within `[earliest, latest]`.

use crate::model::schedule::ScheduleEntry;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowest slider position.
pub const PERCENT_MIN: f64 = 0.0;
/// Highest slider position.
pub const PERCENT_MAX: f64 = 100.0;

/// Errors from timeline construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// No usable timeline can be built from the current entries.
    InvalidRange { reason: &'static str },
}

impl Display for TimelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange { reason } => write!(f, "invalid timeline range: {reason}"),
        }
    }
}

impl Error for TimelineError {}

/// Usable date interval spanned by the complete schedule entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineBounds {
    earliest: NaiveDate,
    latest: NaiveDate,
}

impl TimelineBounds {
    /// Folds over entries, tracking the minimum start and maximum end.
    ///
    /// Only entries with both dates contribute; an entry that can never be
    /// shown must not stretch the slider range.
    ///
    /// # Errors
    /// - `InvalidRange` when no entry has both dates.
    /// - `InvalidRange` when the padded end does not lie after the earliest start.
    pub fn from_entries(entries: &[ScheduleEntry]) -> Result<Self, TimelineError> {
        let mut earliest: Option<NaiveDate> = None;
        let mut max_end: Option<NaiveDate> = None;
        for (start, end) in entries.iter().filter_map(ScheduleEntry::span) {
            earliest = Some(earliest.map_or(start, |current| current.min(start)));
            max_end = Some(max_end.map_or(end, |current| current.max(end)));
        }

        let (Some(earliest), Some(max_end)) = (earliest, max_end) else {
            return Err(TimelineError::InvalidRange {
                reason: "no schedule entry has both a start and an end date",
            });
        };
        // Why: the last scheduled day must be reachable before 100%, where
        // every element reads as finished.
        let latest = max_end.succ_opt().ok_or(TimelineError::InvalidRange {
            reason: "latest end date has no following day",
        })?;
        if latest <= earliest {
            return Err(TimelineError::InvalidRange {
                reason: "every end date precedes the earliest start date",
            });
        }

        Ok(Self { earliest, latest })
    }

    pub fn earliest(&self) -> NaiveDate {
        self.earliest
    }

    /// Padded upper bound (maximum end date + 1 day).
    pub fn latest(&self) -> NaiveDate {
        self.latest
    }

    pub fn span_days(&self) -> i64 {
        (self.latest - self.earliest).num_days()
    }

    /// Maps a slider position onto the timeline.
    ///
    /// `percent` is clamped to `[0, 100]`; `NaN` maps to 0.
    pub fn date_at(&self, percent: f64) -> NaiveDateTime {
        let percent = clamp_percent(percent);
        let span_ms = (self.latest - self.earliest).num_milliseconds();
        let offset_ms = ((span_ms as f64) * percent / PERCENT_MAX).round() as i64;
        self.earliest.and_time(NaiveTime::MIN) + Duration::milliseconds(offset_ms.clamp(0, span_ms))
    }

    /// Whether `at` lies inside `[earliest, latest]`.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.earliest.and_time(NaiveTime::MIN) && at <= self.latest.and_time(NaiveTime::MIN)
    }
}

/// Clamps a raw slider value into `[0, 100]`.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return PERCENT_MIN;
    }
    percent.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// Process-scoped timeline position owned by the engine.
///
/// `last_applied` is observability only; every apply is a full recompute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineState {
    pub current: Option<NaiveDateTime>,
    pub last_applied: Option<NaiveDateTime>,
}
