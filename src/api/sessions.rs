use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewSessionRequest, Session, SessionQuery, SessionSort};
use crate::state::AppState;

pub(super) async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<SessionQuery>,
) -> Result<Json<Vec<Session>>, AppError> {
    let sort = match params.sort.as_deref() {
        Some(raw) => SessionSort::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unsupported sort: {}", raw)))?,
        None => SessionSort::default(),
    };
    let class_id = params.class.as_deref().filter(|c| !c.is_empty() && *c != "all");
    let sessions = repository::fetch_sessions(&state.db, class_id, sort).await?;
    Ok(Json(sessions))
}

pub(super) async fn list_class_sessions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Session>>, AppError> {
    repository::find_class_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let sessions = repository::fetch_sessions(&state.db, Some(&id), SessionSort::default()).await?;
    Ok(Json(sessions))
}

pub(super) async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<NewSessionRequest>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let window = req.window()?;
    repository::find_class_by_id(&state.db, &req.class_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Unknown class id: {}", req.class_id)))?;

    let session = repository::insert_session(
        &state.db,
        &req.class_id,
        &req.name,
        window,
        req.is_recurring,
    )
    .await?;
    info!(
        "Created session {} for class {} (day {}, {} - {} UTC)",
        session.id,
        session.class_id,
        session.day_of_week,
        window.start(),
        window.end()
    );
    Ok((StatusCode::CREATED, Json(session)))
}

pub(super) async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_session(&state.db, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
