use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewStudentRequest, Student, StudentQuery, UpdateStudentRequest};
use crate::state::AppState;

const DUPLICATE_RFID: &str = "This RFID UID is already registered to another student.";

pub(super) async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<StudentQuery>,
) -> Result<Json<Vec<Student>>, AppError> {
    let students = repository::fetch_students(&state.db, &params).await?;
    Ok(Json(students))
}

pub(super) async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let student = repository::find_student_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(student))
}

pub(super) async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<NewStudentRequest>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    req.validate(state.config.face_embedding_dim)?;
    let student = repository::insert_student(&state.db, req)
        .await
        .map_err(|e| conflict_on_duplicate(e, DUPLICATE_RFID))?;
    info!("Enrolled student {} ({})", student.name, student.id);
    Ok((StatusCode::CREATED, Json(student)))
}

pub(super) async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<Json<Student>, AppError> {
    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Student name is required.".to_string()));
    }
    let student = repository::update_student(&state.db, &id, req)
        .await
        .map_err(|e| conflict_on_duplicate(e, DUPLICATE_RFID))?
        .ok_or(AppError::NotFound)?;
    Ok(Json(student))
}

pub(super) async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_student(&state.db, &id).await?;
    if ok {
        info!("Deleted student {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub(super) fn conflict_on_duplicate(err: sqlx::Error, message: &str) -> AppError {
    if repository::is_unique_violation(&err) {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Database(err)
    }
}
