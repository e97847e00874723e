use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{AttendanceEvent, RosterEntry, Session, Student};

/// A check-in waiting to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceEvent {
    pub student_id: String,
    pub session_id: String,
    pub checkin_time: DateTime<Utc>,
    pub verified_by_face: bool,
}

/// Everything the attendance core reads from or writes to durable storage.
///
/// Handed to the core explicitly; nothing in `attendance` reaches for a
/// global connection.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_student_by_rfid(&self, rfid_uid: &str) -> Result<Option<Student>, sqlx::Error>;

    async fn enrolled_class_ids(&self, student_id: &str) -> Result<BTreeSet<String>, sqlx::Error>;

    async fn sessions_for_classes(
        &self,
        class_ids: &BTreeSet<String>,
    ) -> Result<Vec<Session>, sqlx::Error>;

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, sqlx::Error>;

    async fn insert_attendance_event(
        &self,
        event: NewAttendanceEvent,
    ) -> Result<AttendanceEvent, sqlx::Error>;

    /// Events of one session with `from <= checkin_time < to`.
    async fn attendance_events(
        &self,
        session_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceEvent>, sqlx::Error>;

    async fn enrolled_students(&self, class_id: &str) -> Result<Vec<RosterEntry>, sqlx::Error>;
}
