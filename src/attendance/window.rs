//! Recurring weekly check-in window.
//!
//! A window is a day of the week plus a start and end time-of-day, with no
//! calendar date attached. All instants are evaluated in UTC; the host's local
//! timezone is never consulted.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("day_of_week must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidDayOfWeek(i32),

    #[error("start time {start} must be before end time {end}")]
    EmptyWindow { start: NaiveTime, end: NaiveTime },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    day: Weekday,
    start: NaiveTime,
    end: NaiveTime,
}

/// Concrete start/end instants of a window on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveWindow {
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(day_of_week: i32, start: NaiveTime, end: NaiveTime) -> Result<Self, WindowError> {
        let day = weekday_from_index(day_of_week)?;
        // sub-second precision is not part of a session's schedule
        let start = truncate_to_seconds(start);
        let end = truncate_to_seconds(end);
        if start >= end {
            return Err(WindowError::EmptyWindow { start, end });
        }
        Ok(Self { day, start, end })
    }

    /// Builds a window from placeholder-date timestamps, keeping only their
    /// UTC hour/minute/second.
    pub fn from_placeholder(
        day_of_week: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, WindowError> {
        Self::new(day_of_week, start.time(), end.time())
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Returns today's concrete window when `now` falls on the window's day
    /// and within `[start, end]`, both ends inclusive.
    pub fn active_window_for(&self, now: DateTime<Utc>) -> Option<ActiveWindow> {
        if now.weekday() != self.day {
            return None;
        }
        let today = now.date_naive();
        let window = ActiveWindow {
            session_start: self.start_instant_for(today),
            session_end: self.end_instant_for(today),
        };
        (window.session_start <= now && now <= window.session_end).then_some(window)
    }

    pub fn start_instant_for(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(self.start).and_utc()
    }

    /// End-of-window instant on `date`. Check-ins at or before it are on time.
    pub fn end_instant_for(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(self.end).and_utc()
    }
}

pub fn weekday_from_index(day_of_week: i32) -> Result<Weekday, WindowError> {
    match day_of_week {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(WindowError::InvalidDayOfWeek(other)),
    }
}

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(day: Weekday) -> i32 {
    day.num_days_from_sunday() as i32
}

fn truncate_to_seconds(t: NaiveTime) -> NaiveTime {
    t.with_nanosecond(0).unwrap_or(t)
}
