use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::attendance::{AttendanceStore, NewAttendanceEvent};
use crate::db::repository;
use crate::models::{AttendanceEvent, RosterEntry, Session, Student};

/// `AttendanceStore` over the SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AttendanceStore for SqliteStore {
    async fn find_student_by_rfid(&self, rfid_uid: &str) -> Result<Option<Student>, sqlx::Error> {
        repository::find_student_by_rfid(&self.db, rfid_uid).await
    }

    async fn enrolled_class_ids(&self, student_id: &str) -> Result<BTreeSet<String>, sqlx::Error> {
        repository::fetch_enrolled_class_ids(&self.db, student_id).await
    }

    async fn sessions_for_classes(
        &self,
        class_ids: &BTreeSet<String>,
    ) -> Result<Vec<Session>, sqlx::Error> {
        repository::fetch_sessions_for_classes(&self.db, class_ids).await
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, sqlx::Error> {
        repository::find_session_by_id(&self.db, session_id).await
    }

    async fn insert_attendance_event(
        &self,
        event: NewAttendanceEvent,
    ) -> Result<AttendanceEvent, sqlx::Error> {
        repository::insert_attendance(&self.db, &event).await
    }

    async fn attendance_events(
        &self,
        session_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceEvent>, sqlx::Error> {
        repository::fetch_attendance_between(&self.db, session_id, from, to).await
    }

    async fn enrolled_students(&self, class_id: &str) -> Result<Vec<RosterEntry>, sqlx::Error> {
        repository::fetch_enrolled_students(&self.db, class_id).await
    }
}
