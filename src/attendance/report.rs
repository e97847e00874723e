use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::attendance::store::AttendanceStore;
use crate::attendance::summary::AttendanceSummary;
use crate::error::AppError;
use crate::models::AttendanceEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    OnTime,
    Late,
    Absent,
}

/// Derived per-student status for one session-day. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub student_id: String,
    pub student_name: String,
    pub student_image_url: Option<String>,
    pub status: ReportStatus,
    pub checkin_time: Option<DateTime<Utc>>,
    pub verified_by_face: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceReport {
    pub session_id: String,
    pub date: NaiveDate,
    pub rows: Vec<ReportRow>,
    pub summary: AttendanceSummary,
}

impl AttendanceReport {
    pub fn new(session_id: impl Into<String>, date: NaiveDate, rows: Vec<ReportRow>) -> Self {
        let summary = AttendanceSummary::from_rows(&rows);
        Self {
            session_id: session_id.into(),
            date,
            rows,
            summary,
        }
    }
}

/// UTC `[start, end)` bounds of a calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Classifies every student enrolled in the session's class for `date`.
///
/// Rows follow roster order. A student with several check-ins that day is
/// judged on the earliest one.
///
/// `date` is not required to fall on the session's weekday. On any other day
/// the kiosk cannot have recorded a check-in for the session, so the report
/// lists every enrolled student as absent; callers should pick dates on
/// `session.day_of_week`.
pub async fn build_report(
    store: &dyn AttendanceStore,
    session_id: &str,
    date: NaiveDate,
) -> Result<Vec<ReportRow>, AppError> {
    let session = store
        .find_session(session_id)
        .await
        .map_err(|e| unavailable("session lookup", e))?
        .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))?;

    let window = session.window().map_err(|e| {
        error!("Session {} has an invalid window: {}", session.id, e);
        AppError::DataUnavailable(format!("session {} has an invalid window: {}", session.id, e))
    })?;
    if date.weekday() != window.day() {
        warn!(
            "Report for session {} requested on {} ({}), but the session runs on {}",
            session.id,
            date,
            date.weekday(),
            window.day()
        );
    }

    let roster = store
        .enrolled_students(&session.class_id)
        .await
        .map_err(|e| unavailable("roster", e))?;

    let (day_start, day_end) = day_bounds(date);
    let events = store
        .attendance_events(&session.id, day_start, day_end)
        .await
        .map_err(|e| unavailable("attendance", e))?;

    let first_checkins = earliest_by_student(events);
    let session_end = window.end_instant_for(date);
    debug!(
        "Building report for session {} on {}: {} enrolled, {} checked in, window ends {}",
        session.id,
        date,
        roster.len(),
        first_checkins.len(),
        session_end
    );

    let rows = roster
        .into_iter()
        .map(|student| match first_checkins.get(&student.id) {
            Some(event) => ReportRow {
                status: if event.checkin_time <= session_end {
                    ReportStatus::OnTime
                } else {
                    ReportStatus::Late
                },
                checkin_time: Some(event.checkin_time),
                verified_by_face: event.verified_by_face,
                student_id: student.id,
                student_name: student.name,
                student_image_url: student.image_url,
            },
            None => ReportRow {
                status: ReportStatus::Absent,
                checkin_time: None,
                verified_by_face: false,
                student_id: student.id,
                student_name: student.name,
                student_image_url: student.image_url,
            },
        })
        .collect();

    Ok(rows)
}

fn earliest_by_student(events: Vec<AttendanceEvent>) -> HashMap<String, AttendanceEvent> {
    let mut by_student: HashMap<String, AttendanceEvent> = HashMap::new();
    for event in events {
        match by_student.entry(event.student_id.clone()) {
            Entry::Occupied(mut current) => {
                let existing = current.get();
                let earlier = (event.checkin_time, &event.id) < (existing.checkin_time, &existing.id);
                if earlier {
                    current.insert(event);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
        }
    }
    by_student
}

fn unavailable(what: &str, e: sqlx::Error) -> AppError {
    error!("Failed to load {} for attendance report: {}", what, e);
    AppError::DataUnavailable(format!("failed to load {}: {}", what, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::memory::MemoryStore;
    use chrono::TimeZone;

    const SESSION: &str = "session-mon";

    // 2024-01-08 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 8, h, m, s).unwrap()
    }

    fn store_with_roster() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_session(SESSION, "class-1", 1, (9, 0), (9, 15));
        store.enroll("a", "Alice", "class-1");
        store.enroll("b", "Bob", "class-1");
        store.enroll("c", "Carol", "class-1");
        store
    }

    fn row_for<'a>(rows: &'a [ReportRow], id: &str) -> &'a ReportRow {
        rows.iter().find(|r| r.student_id == id).expect("row present")
    }

    #[tokio::test]
    async fn test_on_time_late_and_absent() {
        let store = store_with_roster();
        store.push_event("a", SESSION, at(9, 5, 0), true);
        store.push_event("b", SESSION, at(9, 20, 0), false);

        let rows = build_report(&store, SESSION, monday()).await.unwrap();
        assert_eq!(rows.len(), 3);

        let a = row_for(&rows, "a");
        assert_eq!(a.status, ReportStatus::OnTime);
        assert_eq!(a.checkin_time, Some(at(9, 5, 0)));
        assert!(a.verified_by_face);

        let b = row_for(&rows, "b");
        assert_eq!(b.status, ReportStatus::Late);
        assert_eq!(b.checkin_time, Some(at(9, 20, 0)));
        assert!(!b.verified_by_face);

        let c = row_for(&rows, "c");
        assert_eq!(c.status, ReportStatus::Absent);
        assert_eq!(c.checkin_time, None);
        assert!(!c.verified_by_face);
    }

    #[tokio::test]
    async fn test_end_of_window_is_on_time_and_one_second_later_is_late() {
        let store = store_with_roster();
        store.push_event("a", SESSION, at(9, 15, 0), false);
        store.push_event("b", SESSION, at(9, 15, 1), false);

        let rows = build_report(&store, SESSION, monday()).await.unwrap();
        assert_eq!(row_for(&rows, "a").status, ReportStatus::OnTime);
        assert_eq!(row_for(&rows, "b").status, ReportStatus::Late);
    }

    #[tokio::test]
    async fn test_double_tap_uses_earliest_checkin() {
        let store = store_with_roster();
        store.push_event("a", SESSION, at(9, 30, 0), false);
        store.push_event("a", SESSION, at(9, 2, 0), true);

        let rows = build_report(&store, SESSION, monday()).await.unwrap();
        let a = row_for(&rows, "a");
        assert_eq!(a.status, ReportStatus::OnTime);
        assert_eq!(a.checkin_time, Some(at(9, 2, 0)));
        assert!(a.verified_by_face);
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_other_days_are_ignored() {
        let store = store_with_roster();
        // previous Monday and 00:00 of the next day fall outside the range
        store.push_event("a", SESSION, Utc.with_ymd_and_hms(2024, 1, 1, 9, 5, 0).unwrap(), true);
        store.push_event("b", SESSION, Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap(), true);

        let rows = build_report(&store, SESSION, monday()).await.unwrap();
        assert!(rows.iter().all(|r| r.status == ReportStatus::Absent));
    }

    #[tokio::test]
    async fn test_date_off_session_weekday_lists_everyone_absent() {
        let store = store_with_roster();
        store.push_event("a", SESSION, at(9, 5, 0), true);

        // Tuesday after the Monday session
        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let rows = build_report(&store, SESSION, tuesday).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.status == ReportStatus::Absent));
        assert!(rows.iter().all(|r| r.checkin_time.is_none()));
    }

    #[tokio::test]
    async fn test_report_is_idempotent() {
        let store = store_with_roster();
        store.push_event("a", SESSION, at(9, 5, 0), true);
        store.push_event("b", SESSION, at(9, 20, 0), false);

        let first = build_report(&store, SESSION, monday()).await.unwrap();
        let second = build_report(&store, SESSION, monday()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = store_with_roster();
        let err = build_report(&store, "missing", monday()).await.unwrap_err();
        assert!(matches!(err, AppError::SessionNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_store_failure_is_data_unavailable() {
        let store = store_with_roster();
        store.fail_reads(true);
        let err = build_report(&store, SESSION, monday()).await.unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(_)));
    }

    #[test]
    fn test_day_bounds() {
        let (start, end) = day_bounds(monday());
        assert_eq!(start, at(0, 0, 0));
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap());
    }
}
