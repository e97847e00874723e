//! In-memory `AttendanceStore` for exercising the core without SQLite.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use crate::attendance::store::{AttendanceStore, NewAttendanceEvent};
use crate::models::session::placeholder_instant;
use crate::models::{AttendanceEvent, PRESENT_STATUS, RosterEntry, Session, Student};

#[derive(Default)]
pub struct MemoryStore {
    students: Mutex<Vec<Student>>,
    enrollments: Mutex<Vec<(String, String)>>,
    sessions: Mutex<Vec<Session>>,
    events: Mutex<Vec<AttendanceEvent>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn add_session(&self, id: &str, class_id: &str, day: i32, start: (u32, u32), end: (u32, u32)) {
        let time = |(h, m): (u32, u32)| NaiveTime::from_hms_opt(h, m, 0).expect("valid time");
        self.sessions.lock().unwrap().push(Session {
            id: id.to_string(),
            class_id: class_id.to_string(),
            name: format!("Session {}", id),
            day_of_week: day,
            start_time: placeholder_instant(time(start)),
            end_time: placeholder_instant(time(end)),
            is_recurring: true,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        });
    }

    pub fn add_student(&self, id: &str, name: &str, rfid_uid: Option<&str>, embedding: Option<Vec<f32>>) {
        self.students.lock().unwrap().push(Student {
            id: id.to_string(),
            name: name.to_string(),
            rfid_uid: rfid_uid.map(str::to_string),
            face_embedding: embedding.map(sqlx::types::Json),
            image_url: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        });
    }

    /// Adds the student if unknown, then enrolls them in `class_id`.
    pub fn enroll(&self, student_id: &str, name: &str, class_id: &str) {
        let known = self.students.lock().unwrap().iter().any(|s| s.id == student_id);
        if !known {
            self.add_student(student_id, name, None, None);
        }
        self.enrollments
            .lock()
            .unwrap()
            .push((student_id.to_string(), class_id.to_string()));
    }

    pub fn push_event(&self, student_id: &str, session_id: &str, at: DateTime<Utc>, verified: bool) {
        let mut events = self.events.lock().unwrap();
        let id = format!("event-{}", events.len());
        events.push(AttendanceEvent {
            id,
            student_id: student_id.to_string(),
            session_id: session_id.to_string(),
            checkin_time: at,
            status: PRESENT_STATUS.to_string(),
            verified_by_face: verified,
        });
    }

    pub fn events(&self) -> Vec<AttendanceEvent> {
        self.events.lock().unwrap().clone()
    }

    fn check_read(&self) -> Result<(), sqlx::Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_student_by_rfid(&self, rfid_uid: &str) -> Result<Option<Student>, sqlx::Error> {
        self.check_read()?;
        Ok(self
            .students
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.rfid_uid.as_deref() == Some(rfid_uid))
            .cloned())
    }

    async fn enrolled_class_ids(&self, student_id: &str) -> Result<BTreeSet<String>, sqlx::Error> {
        self.check_read()?;
        Ok(self
            .enrollments
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == student_id)
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn sessions_for_classes(
        &self,
        class_ids: &BTreeSet<String>,
    ) -> Result<Vec<Session>, sqlx::Error> {
        self.check_read()?;
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| class_ids.contains(&s.class_id))
            .cloned()
            .collect())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, sqlx::Error> {
        self.check_read()?;
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == session_id)
            .cloned())
    }

    async fn insert_attendance_event(
        &self,
        event: NewAttendanceEvent,
    ) -> Result<AttendanceEvent, sqlx::Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("attendance table is read-only".to_string()));
        }
        self.push_event(
            &event.student_id,
            &event.session_id,
            event.checkin_time,
            event.verified_by_face,
        );
        let events = self.events.lock().unwrap();
        Ok(events.last().cloned().expect("event just pushed"))
    }

    async fn attendance_events(
        &self,
        session_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceEvent>, sqlx::Error> {
        self.check_read()?;
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.session_id == session_id && from <= e.checkin_time && e.checkin_time < to)
            .cloned()
            .collect())
    }

    async fn enrolled_students(&self, class_id: &str) -> Result<Vec<RosterEntry>, sqlx::Error> {
        self.check_read()?;
        let enrolled: Vec<String> = self
            .enrollments
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, c)| c == class_id)
            .map(|(s, _)| s.clone())
            .collect();
        let mut roster: Vec<RosterEntry> = self
            .students
            .lock()
            .unwrap()
            .iter()
            .filter(|s| enrolled.contains(&s.id))
            .map(|s| RosterEntry {
                id: s.id.clone(),
                name: s.name.clone(),
                image_url: s.image_url.clone(),
            })
            .collect();
        roster.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(roster)
    }
}
