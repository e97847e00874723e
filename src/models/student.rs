use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub rfid_uid: Option<String>,
    #[serde(skip_serializing)]
    pub face_embedding: Option<Json<Vec<f32>>>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn embedding(&self) -> Option<&[f32]> {
        self.face_embedding
            .as_ref()
            .map(|e| e.0.as_slice())
            .filter(|e| !e.is_empty())
    }
}

/// Roster view of a student, as used by attendance reports.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudentRequest {
    pub name: String,
    pub rfid_uid: String,
    #[serde(default)]
    pub face_embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewStudentRequest {
    /// Checks required fields; a face embedding, when present, must have
    /// exactly `embedding_dim` finite values.
    pub fn validate(&self, embedding_dim: usize) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Student name is required.".to_string()));
        }
        if self.rfid_uid.trim().is_empty() {
            return Err(AppError::BadRequest("RFID UID is required.".to_string()));
        }
        if let Some(embedding) = self.face_embedding.as_deref().filter(|e| !e.is_empty()) {
            if embedding.len() != embedding_dim {
                return Err(AppError::BadRequest(format!(
                    "Face embedding must have {} values, got {}.",
                    embedding_dim,
                    embedding.len()
                )));
            }
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(AppError::BadRequest(
                    "Face embedding must contain only finite numbers.".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub rfid_uid: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum StudentSort {
    #[default]
    #[serde(rename = "created_at-desc")]
    CreatedAtDesc,
    #[serde(rename = "created_at-asc")]
    CreatedAtAsc,
    #[serde(rename = "name-asc")]
    NameAsc,
    #[serde(rename = "name-desc")]
    NameDesc,
}

impl StudentSort {
    pub fn order_by(self) -> &'static str {
        match self {
            StudentSort::CreatedAtDesc => "s.created_at DESC",
            StudentSort::CreatedAtAsc => "s.created_at ASC",
            StudentSort::NameAsc => "s.name ASC",
            StudentSort::NameDesc => "s.name DESC",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentQuery {
    pub q: Option<String>,
    pub class: Option<String>,
    #[serde(default)]
    pub sort: StudentSort,
}
