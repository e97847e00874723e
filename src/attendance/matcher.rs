use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, warn};

use crate::attendance::store::AttendanceStore;
use crate::attendance::window::{ActiveWindow, weekday_index};
use crate::models::Session;

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub session: Session,
    pub window: ActiveWindow,
}

/// Picks the session whose window contains `now`.
///
/// When several windows overlap, the one starting earliest in the day wins,
/// then the lowest session id. Sessions with a malformed window are skipped.
pub fn resolve_active_session(sessions: &[Session], now: DateTime<Utc>) -> Option<ActiveSession> {
    let today = weekday_index(now.weekday());

    sessions
        .iter()
        .filter(|s| s.day_of_week == today)
        .filter_map(|s| match s.window() {
            Ok(window) => window.active_window_for(now).map(|active| (s, window, active)),
            Err(e) => {
                warn!("Skipping session {} with invalid window: {}", s.id, e);
                None
            }
        })
        .min_by(|(a, wa, _), (b, wb, _)| wa.start().cmp(&wb.start()).then_with(|| a.id.cmp(&b.id)))
        .map(|(session, _, window)| ActiveSession {
            session: session.clone(),
            window,
        })
}

/// Looks up the sessions of the given classes and resolves the active one.
pub async fn find_active_session(
    store: &dyn AttendanceStore,
    enrolled_class_ids: &BTreeSet<String>,
    now: DateTime<Utc>,
) -> Result<Option<ActiveSession>, sqlx::Error> {
    if enrolled_class_ids.is_empty() {
        return Ok(None);
    }

    let sessions = store.sessions_for_classes(enrolled_class_ids).await?;
    debug!(
        "Resolving active session among {} candidate sessions at {}",
        sessions.len(),
        now
    );
    Ok(resolve_active_session(&sessions, now))
}
