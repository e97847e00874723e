use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use tracing::info;

use super::students::conflict_on_duplicate;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{ClassGroup, NewClassRequest, UpdateEnrollmentsRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(super) struct EnrollmentsResponse {
    class_id: String,
    student_ids: Vec<String>,
}

pub(super) async fn list_classes(State(state): State<AppState>) -> Result<Json<Vec<ClassGroup>>, AppError> {
    let classes = repository::fetch_classes(&state.db).await?;
    Ok(Json(classes))
}

pub(super) async fn create_class(
    State(state): State<AppState>,
    Json(req): Json<NewClassRequest>,
) -> Result<(StatusCode, Json<ClassGroup>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Class name is required.".to_string()));
    }
    let class = repository::insert_class(&state.db, &req.name)
        .await
        .map_err(|e| conflict_on_duplicate(e, "A class with this name already exists."))?;
    Ok((StatusCode::CREATED, Json(class)))
}

pub(super) async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_class(&state.db, &id).await?;
    if ok {
        info!("Deleted class {} with its sessions and enrollments", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub(super) async fn list_enrollments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EnrollmentsResponse>, AppError> {
    repository::find_class_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let student_ids = repository::fetch_enrolled_student_ids(&state.db, &id).await?;
    Ok(Json(EnrollmentsResponse {
        class_id: id,
        student_ids,
    }))
}

pub(super) async fn replace_enrollments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEnrollmentsRequest>,
) -> Result<Json<EnrollmentsResponse>, AppError> {
    repository::find_class_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    for student_id in &req.student_ids {
        if repository::find_student_by_id(&state.db, student_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("Unknown student id: {}", student_id)));
        }
    }

    let count = repository::replace_enrollments(&state.db, &id, &req.student_ids).await?;
    info!("Class {} now has {} enrolled students", id, count);

    let student_ids = repository::fetch_enrolled_student_ids(&state.db, &id).await?;
    Ok(Json(EnrollmentsResponse {
        class_id: id,
        student_ids,
    }))
}
