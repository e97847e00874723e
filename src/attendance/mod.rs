//! Session-window attendance resolution and status classification.

pub mod matcher;
pub mod recorder;
pub mod report;
pub mod store;
pub mod summary;
pub mod window;

#[cfg(test)]
pub(crate) mod memory;

pub use matcher::{ActiveSession, find_active_session, resolve_active_session};
pub use recorder::record_attendance;
pub use report::{AttendanceReport, ReportRow, ReportStatus, build_report};
pub use store::{AttendanceStore, NewAttendanceEvent};
pub use summary::AttendanceSummary;
pub use window::{ActiveWindow, TimeWindow, WindowError};
