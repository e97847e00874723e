use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::attendance::window::{TimeWindow, WindowError};
use crate::error::AppError;

/// Date every session time-of-day is anchored to in storage. Only the UTC
/// hour/minute/second of `start_time`/`end_time` carry meaning.
pub fn placeholder_date() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Session {
    pub id: String,
    pub class_id: String,
    pub name: String,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn window(&self) -> Result<TimeWindow, WindowError> {
        TimeWindow::from_placeholder(self.day_of_week, self.start_time, self.end_time)
    }
}

/// Anchors a time-of-day to the placeholder date in UTC.
pub fn placeholder_instant(time: NaiveTime) -> DateTime<Utc> {
    placeholder_date().and_time(time).and_utc()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionRequest {
    pub class_id: String,
    pub name: String,
    pub day_of_week: i32,
    /// "HH:MM", UTC.
    pub start_time: String,
    /// "HH:MM", UTC.
    pub end_time: String,
    #[serde(default = "default_recurring")]
    pub is_recurring: bool,
}

fn default_recurring() -> bool {
    true
}

impl NewSessionRequest {
    /// Validates the request and builds its window.
    pub fn window(&self) -> Result<TimeWindow, AppError> {
        if self.class_id.trim().is_empty() {
            return Err(AppError::BadRequest("class_id is required".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Session name is required.".to_string()));
        }
        let start = parse_time_of_day(&self.start_time)?;
        let end = parse_time_of_day(&self.end_time)?;
        TimeWindow::new(self.day_of_week, start, end).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// Parses `H:MM` / `HH:MM` (00:00 to 23:59).
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, AppError> {
    let invalid = || AppError::BadRequest(format!("Invalid time format (HH:MM): {}", raw));

    let (hour, minute) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !(digits(hour) && hour.len() <= 2 && digits(minute) && minute.len() == 2) {
        return Err(invalid());
    }

    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSortField {
    DayOfWeek,
    Name,
    StartTime,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSort {
    pub field: SessionSortField,
    pub ascending: bool,
}

impl Default for SessionSort {
    fn default() -> Self {
        Self {
            field: SessionSortField::DayOfWeek,
            ascending: true,
        }
    }
}

impl SessionSort {
    /// Parses `<field>-<asc|desc>`, e.g. `day_of_week-asc`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, order) = raw.rsplit_once('-')?;
        let field = match field {
            "day_of_week" => SessionSortField::DayOfWeek,
            "name" => SessionSortField::Name,
            "start_time" => SessionSortField::StartTime,
            "created_at" => SessionSortField::CreatedAt,
            _ => return None,
        };
        let ascending = match order {
            "asc" => true,
            "desc" => false,
            _ => return None,
        };
        Some(Self { field, ascending })
    }

    pub fn order_by(self) -> String {
        let column = match self.field {
            SessionSortField::DayOfWeek => "day_of_week",
            SessionSortField::Name => "name",
            SessionSortField::StartTime => "start_time",
            SessionSortField::CreatedAt => "created_at",
        };
        let direction = if self.ascending { "ASC" } else { "DESC" };
        // secondary keys keep the listing stable
        format!("{} {}, start_time ASC, id ASC", column, direction)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionQuery {
    pub class: Option<String>,
    pub sort: Option<String>,
}
