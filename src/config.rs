use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::AppError;
use crate::face::{DEFAULT_EMBEDDING_DIM, DEFAULT_MATCH_THRESHOLD};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub max_connections: u32,
    /// Euclidean distance strictly below which a face counts as a match.
    pub face_match_threshold: f32,
    /// Length every stored face embedding must have.
    pub face_embedding_dim: usize,
    pub recent_attendance_limit: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://rollcall.db?mode=rwc".to_string(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_connections: 5,
            face_match_threshold: DEFAULT_MATCH_THRESHOLD,
            face_embedding_dim: DEFAULT_EMBEDDING_DIM,
            recent_attendance_limit: 100,
        }
    }
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let listen_addr = parse_var("LISTEN_ADDR")?.unwrap_or(defaults.listen_addr);
        let max_connections = parse_var("DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections);
        let face_match_threshold =
            parse_var("FACE_MATCH_THRESHOLD")?.unwrap_or(defaults.face_match_threshold);
        let face_embedding_dim =
            parse_var("FACE_EMBEDDING_DIM")?.unwrap_or(defaults.face_embedding_dim);
        let recent_attendance_limit =
            parse_var("RECENT_ATTENDANCE_LIMIT")?.unwrap_or(defaults.recent_attendance_limit);

        if max_connections == 0 {
            return Err(AppError::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
        }
        if !(face_match_threshold.is_finite() && face_match_threshold > 0.0) {
            return Err(AppError::Config(format!(
                "FACE_MATCH_THRESHOLD must be a positive number, got {}",
                face_match_threshold
            )));
        }
        if face_embedding_dim == 0 {
            return Err(AppError::Config("FACE_EMBEDDING_DIM must be at least 1".to_string()));
        }
        if recent_attendance_limit <= 0 {
            return Err(AppError::Config(
                "RECENT_ATTENDANCE_LIMIT must be positive".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            listen_addr,
            max_connections,
            face_match_threshold,
            face_embedding_dim,
            recent_attendance_limit,
        })
    }
}

fn parse_var<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{} is invalid ({}): {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}
