pub mod attendance;
pub mod class_group;
pub mod session;
pub mod student;

pub use attendance::{AttendanceEvent, AttendanceLogEntry, PRESENT_STATUS};
pub use class_group::{ClassGroup, NewClassRequest, UpdateEnrollmentsRequest};
pub use session::{NewSessionRequest, Session, SessionQuery, SessionSort};
pub use student::{NewStudentRequest, RosterEntry, Student, StudentQuery, StudentSort, UpdateStudentRequest};
