use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::attendance::store::{AttendanceStore, NewAttendanceEvent};
use crate::error::AppError;
use crate::models::AttendanceEvent;

/// Persists one check-in for a session already resolved as active at `now`.
///
/// The window is not re-validated and repeated check-ins are not rejected;
/// reports keep the earliest event of the day.
pub async fn record_attendance(
    store: &dyn AttendanceStore,
    student_id: &str,
    session_id: &str,
    verified_by_face: bool,
    now: DateTime<Utc>,
) -> Result<AttendanceEvent, AppError> {
    let event = NewAttendanceEvent {
        student_id: student_id.to_string(),
        session_id: session_id.to_string(),
        checkin_time: now,
        verified_by_face,
    };

    match store.insert_attendance_event(event).await {
        Ok(recorded) => {
            info!(
                "Recorded attendance {} for student {} in session {} (face verified: {})",
                recorded.id, student_id, session_id, verified_by_face
            );
            Ok(recorded)
        }
        Err(e) => {
            error!(
                "Failed to record attendance for student {} in session {}: {}",
                student_id, session_id, e
            );
            Err(AppError::RecordingFailed(e.to_string()))
        }
    }
}
