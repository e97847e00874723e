use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::attendance::{AttendanceStore, find_active_session, record_attendance};
use crate::error::AppError;
use crate::face::{FaceMatch, FaceMatcher};
use crate::models::{AttendanceEvent, Student};

#[derive(Debug, Clone, Deserialize)]
pub struct CheckInRequest {
    pub rfid_uid: String,
    /// Live descriptor from the kiosk camera, sent once the face scan ran.
    #[serde(default)]
    pub face_descriptor: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInStudent {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInSession {
    pub id: String,
    pub name: String,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckInOutcome {
    CheckedIn {
        student: CheckInStudent,
        session: CheckInSession,
        event: AttendanceEvent,
        face: Option<FaceMatch>,
    },
    /// The student has a stored embedding; resubmit with a live descriptor.
    FaceScanRequired {
        student: CheckInStudent,
        session: CheckInSession,
    },
}

/// Kiosk check-in: RFID lookup, active session, optional face decision, record.
pub struct CheckInService {
    store: Arc<dyn AttendanceStore>,
    face: Arc<dyn FaceMatcher>,
}

impl CheckInService {
    pub fn new(store: Arc<dyn AttendanceStore>, face: Arc<dyn FaceMatcher>) -> Self {
        Self { store, face }
    }

    pub async fn check_in(
        &self,
        req: CheckInRequest,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome, AppError> {
        let rfid_uid = req.rfid_uid.trim();
        if rfid_uid.is_empty() {
            return Err(AppError::BadRequest("rfid_uid is required".to_string()));
        }

        let student = match self.store.find_student_by_rfid(rfid_uid).await? {
            Some(s) => s,
            None => {
                info!("RFID {} not found", rfid_uid);
                return Err(AppError::RfidNotFound);
            }
        };

        let class_ids = self.store.enrolled_class_ids(&student.id).await?;
        let active = match find_active_session(self.store.as_ref(), &class_ids, now).await? {
            Some(a) => a,
            None => {
                info!("No active session for student {} at {}", student.name, now);
                return Err(AppError::NoActiveSession);
            }
        };

        let session = CheckInSession {
            id: active.session.id.clone(),
            name: active.session.name.clone(),
            session_start: active.window.session_start,
            session_end: active.window.session_end,
        };

        let face = match (student.embedding(), req.face_descriptor.as_deref()) {
            (None, _) => {
                info!(
                    "Student {} has no face embedding, checking in with RFID only",
                    student.name
                );
                None
            }
            (Some(_), None) => {
                return Ok(CheckInOutcome::FaceScanRequired {
                    student: summary_of(&student),
                    session,
                });
            }
            (Some(stored), Some(live)) => {
                let decision = self.face.match_face(live, stored);
                if !decision.is_match {
                    warn!(
                        "Face mismatch for student {} (distance {:.3})",
                        student.name, decision.distance
                    );
                    return Err(AppError::FaceMismatch);
                }
                Some(decision)
            }
        };

        let verified_by_face = face.is_some_and(|f| f.is_match);
        let event = record_attendance(
            self.store.as_ref(),
            &student.id,
            &session.id,
            verified_by_face,
            now,
        )
        .await?;

        Ok(CheckInOutcome::CheckedIn {
            student: summary_of(&student),
            session,
            event,
            face,
        })
    }
}

fn summary_of(student: &Student) -> CheckInStudent {
    CheckInStudent {
        id: student.id.clone(),
        name: student.name.clone(),
        image_url: student.image_url.clone(),
    }
}
