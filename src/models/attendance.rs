use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Persisted status: "attendance occurred". On-time/late/absent is derived at report time.
pub const PRESENT_STATUS: &str = "present";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AttendanceEvent {
    pub id: String,
    pub student_id: String,
    pub session_id: String,
    pub checkin_time: DateTime<Utc>,
    pub status: String,
    pub verified_by_face: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceLogEntry {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub student_image_url: Option<String>,
    pub session_id: String,
    pub session_name: String,
    pub checkin_time: DateTime<Utc>,
    pub status: String,
    pub verified_by_face: bool,
}
