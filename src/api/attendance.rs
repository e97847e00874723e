use axum::Json;
use axum::extract::{Query, State};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::attendance::{AttendanceReport, build_report};
use crate::db::repository;
use crate::error::AppError;
use crate::models::AttendanceLogEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct ReportParams {
    session_id: String,
    /// YYYY-MM-DD
    date: String,
}

pub(super) async fn list_recent_attendance(
    State(state): State<AppState>,
) -> Result<Json<Vec<AttendanceLogEntry>>, AppError> {
    let entries = repository::fetch_recent_attendance(&state.db, state.config.recent_attendance_limit).await?;
    Ok(Json(entries))
}

pub(super) async fn attendance_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<AttendanceReport>, AppError> {
    let date = NaiveDate::parse_from_str(params.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date (YYYY-MM-DD): {}", params.date)))?;

    let rows = build_report(state.store.as_ref(), &params.session_id, date).await?;
    Ok(Json(AttendanceReport::new(params.session_id, date, rows)))
}
