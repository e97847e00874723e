use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::error::AppError;
use crate::services::{CheckInOutcome, CheckInRequest};
use crate::state::KioskState;

pub(super) async fn check_in(
    State(state): State<KioskState>,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<CheckInOutcome>, AppError> {
    let outcome = state.check_in.check_in(req, Utc::now()).await?;
    Ok(Json(outcome))
}
