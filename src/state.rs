use std::sync::Arc;

use sqlx::SqlitePool;

use crate::attendance::AttendanceStore;
use crate::config::AppConfig;
use crate::db::SqliteStore;
use crate::face::{EuclideanFaceMatcher, FaceMatcher};
use crate::services::CheckInService;

/// Admin-facing state: full database access.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub store: Arc<dyn AttendanceStore>,
    pub face: Arc<dyn FaceMatcher>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        Self {
            store: Arc::new(SqliteStore::new(db.clone())),
            face: Arc::new(EuclideanFaceMatcher::new(config.face_match_threshold)),
            config: Arc::new(config),
            db,
        }
    }

    /// State for the public kiosk routes. It carries only the attendance
    /// store contract, never the raw pool.
    pub fn kiosk(&self) -> KioskState {
        KioskState {
            check_in: Arc::new(CheckInService::new(self.store.clone(), self.face.clone())),
        }
    }
}

#[derive(Clone)]
pub struct KioskState {
    pub check_in: Arc<CheckInService>,
}
