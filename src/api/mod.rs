mod attendance;
mod classes;
mod kiosk;
mod sessions;
mod students;

use axum::routing::{delete, get, post};
use axum::{Router, extract::State, http::StatusCode};

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let kiosk = Router::new()
        .route("/check-in", post(kiosk::check_in))
        .with_state(state.kiosk());

    let admin = Router::new()
        .route("/health", get(health))
        .route("/students", get(students::list_students).post(students::create_student))
        .route(
            "/students/{id}",
            get(students::get_student)
                .patch(students::update_student)
                .delete(students::delete_student),
        )
        .route("/classes", get(classes::list_classes).post(classes::create_class))
        .route("/classes/{id}", delete(classes::delete_class))
        .route(
            "/classes/{id}/enrollments",
            get(classes::list_enrollments).put(classes::replace_enrollments),
        )
        .route("/classes/{id}/sessions", get(sessions::list_class_sessions))
        .route("/sessions", get(sessions::list_sessions).post(sessions::create_session))
        .route("/sessions/{id}", delete(sessions::delete_session))
        .route("/attendance", get(attendance::list_recent_attendance))
        .route("/attendance/report", get(attendance::attendance_report))
        .with_state(state);

    kiosk.merge(admin)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
