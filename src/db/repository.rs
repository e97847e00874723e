use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::attendance::window::weekday_index;
use crate::attendance::{NewAttendanceEvent, TimeWindow};
use crate::models::session::placeholder_instant;
use crate::models::{
    AttendanceEvent, AttendanceLogEntry, ClassGroup, NewStudentRequest, PRESENT_STATUS,
    RosterEntry, Session, SessionSort, Student, StudentQuery, UpdateStudentRequest,
};

const STUDENT_COLUMNS: &str = "s.id AS id, s.name AS name, s.rfid_uid AS rfid_uid, \
     s.face_embedding AS face_embedding, s.image_url AS image_url, s.created_at AS created_at";

const SESSION_COLUMNS: &str =
    "id, class_id, name, day_of_week, start_time, end_time, is_recurring, created_at";

const ATTENDANCE_COLUMNS: &str = "id, student_id, session_id, checkin_time, status, verified_by_face";

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// students
// ---------------------------------------------------------------------------

pub async fn fetch_students(db: &SqlitePool, query: &StudentQuery) -> Result<Vec<Student>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    qb.push(STUDENT_COLUMNS).push(" FROM students s");

    if let Some(class_id) = query.class.as_deref().filter(|c| !c.is_empty() && *c != "all") {
        qb.push(" JOIN enrollments e ON e.student_id = s.id AND e.class_id = ")
            .push_bind(class_id.to_string());
    }
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        qb.push(" WHERE s.name LIKE ")
            .push_bind(format!("%{}%", escape_like(q)))
            .push(" ESCAPE '\\'");
    }
    qb.push(" ORDER BY ").push(query.sort.order_by()).push(", s.id ASC");

    qb.build_query_as::<Student>().fetch_all(db).await
}

pub async fn find_student_by_id(db: &SqlitePool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {} FROM students s WHERE s.id = ?", STUDENT_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_student_by_rfid(db: &SqlitePool, rfid_uid: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {} FROM students s WHERE s.rfid_uid = ?",
        STUDENT_COLUMNS
    ))
    .bind(rfid_uid.trim())
    .fetch_optional(db)
    .await
}

pub async fn insert_student(db: &SqlitePool, req: NewStudentRequest) -> Result<Student, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let rfid_uid = req.rfid_uid.trim().to_string();
    let face_embedding = req.face_embedding.filter(|e| !e.is_empty()).map(Json);

    sqlx::query(
        r#"
        INSERT INTO students (id, name, rfid_uid, face_embedding, image_url, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(&rfid_uid)
    .bind(&face_embedding)
    .bind(&req.image_url)
    .bind(now)
    .execute(db)
    .await?;

    Ok(Student {
        id,
        name: req.name.trim().to_string(),
        rfid_uid: Some(rfid_uid),
        face_embedding,
        image_url: req.image_url,
        created_at: now,
    })
}

/// Applies a partial edit. The read and the write share one transaction, so
/// concurrent edits of the same student do not drop each other's fields.
pub async fn update_student(
    db: &SqlitePool,
    id: &str,
    req: UpdateStudentRequest,
) -> Result<Option<Student>, sqlx::Error> {
    let mut tx = db.begin().await?;

    let current = sqlx::query_as::<_, Student>(&format!(
        "SELECT {} FROM students s WHERE s.id = ?",
        STUDENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    let mut current = match current {
        Some(s) => s,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name.trim().to_string();
    }
    if let Some(rfid_uid) = req.rfid_uid {
        current.rfid_uid = non_empty(rfid_uid);
    }
    if let Some(image_url) = req.image_url {
        current.image_url = non_empty(image_url);
    }

    sqlx::query(
        r#"
        UPDATE students
        SET name = ?1,
            rfid_uid = ?2,
            image_url = ?3
        WHERE id = ?4
        "#,
    )
    .bind(&current.name)
    .bind(&current.rfid_uid)
    .bind(&current.image_url)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(current))
}

pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

// ---------------------------------------------------------------------------
// classes and enrollments
// ---------------------------------------------------------------------------

pub async fn fetch_classes(db: &SqlitePool) -> Result<Vec<ClassGroup>, sqlx::Error> {
    sqlx::query_as::<_, ClassGroup>("SELECT id, name, created_at FROM classes ORDER BY name ASC")
        .fetch_all(db)
        .await
}

pub async fn find_class_by_id(db: &SqlitePool, id: &str) -> Result<Option<ClassGroup>, sqlx::Error> {
    sqlx::query_as::<_, ClassGroup>("SELECT id, name, created_at FROM classes WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_class(db: &SqlitePool, name: &str) -> Result<ClassGroup, sqlx::Error> {
    let class = ClassGroup {
        id: Uuid::new_v4().to_string(),
        name: name.trim().to_string(),
        created_at: Utc::now(),
    };

    sqlx::query("INSERT INTO classes (id, name, created_at) VALUES (?1, ?2, ?3)")
        .bind(&class.id)
        .bind(&class.name)
        .bind(class.created_at)
        .execute(db)
        .await?;

    Ok(class)
}

/// Sessions, enrollments and their attendance go with the class.
pub async fn delete_class(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM classes WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

pub async fn fetch_enrolled_student_ids(db: &SqlitePool, class_id: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT student_id FROM enrollments WHERE class_id = ? ORDER BY student_id",
    )
    .bind(class_id)
    .fetch_all(db)
    .await
}

pub async fn fetch_enrolled_class_ids(
    db: &SqlitePool,
    student_id: &str,
) -> Result<BTreeSet<String>, sqlx::Error> {
    let ids = sqlx::query_scalar::<_, String>("SELECT class_id FROM enrollments WHERE student_id = ?")
        .bind(student_id)
        .fetch_all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

pub async fn fetch_enrolled_students(db: &SqlitePool, class_id: &str) -> Result<Vec<RosterEntry>, sqlx::Error> {
    sqlx::query_as::<_, RosterEntry>(
        r#"
        SELECT s.id AS id, s.name AS name, s.image_url AS image_url
        FROM enrollments e
        JOIN students s ON s.id = e.student_id
        WHERE e.class_id = ?
        ORDER BY s.name ASC, s.id ASC
        "#,
    )
    .bind(class_id)
    .fetch_all(db)
    .await
}

/// Replaces the enrollment set of a class in one transaction, so a failure
/// leaves the previous set intact.
pub async fn replace_enrollments(
    db: &SqlitePool,
    class_id: &str,
    student_ids: &[String],
) -> Result<usize, sqlx::Error> {
    let unique: BTreeSet<&str> = student_ids.iter().map(String::as_str).collect();

    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM enrollments WHERE class_id = ?")
        .bind(class_id)
        .execute(&mut *tx)
        .await?;

    for student_id in &unique {
        sqlx::query("INSERT INTO enrollments (student_id, class_id) VALUES (?1, ?2)")
            .bind(student_id)
            .bind(class_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(unique.len())
}

// ---------------------------------------------------------------------------
// sessions
// ---------------------------------------------------------------------------

pub async fn fetch_sessions(
    db: &SqlitePool,
    class_id: Option<&str>,
    sort: SessionSort,
) -> Result<Vec<Session>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    qb.push(SESSION_COLUMNS).push(" FROM sessions");
    if let Some(class_id) = class_id {
        qb.push(" WHERE class_id = ").push_bind(class_id.to_string());
    }
    qb.push(" ORDER BY ").push(sort.order_by());

    qb.build_query_as::<Session>().fetch_all(db).await
}

pub async fn fetch_sessions_for_classes(
    db: &SqlitePool,
    class_ids: &BTreeSet<String>,
) -> Result<Vec<Session>, sqlx::Error> {
    if class_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    qb.push(SESSION_COLUMNS).push(" FROM sessions WHERE class_id IN (");
    let mut separated = qb.separated(", ");
    for id in class_ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(") ORDER BY id ASC");

    qb.build_query_as::<Session>().fetch_all(db).await
}

pub async fn find_session_by_id(db: &SqlitePool, id: &str) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(&format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Stores a session; its day of week is taken from `window`.
pub async fn insert_session(
    db: &SqlitePool,
    class_id: &str,
    name: &str,
    window: TimeWindow,
    is_recurring: bool,
) -> Result<Session, sqlx::Error> {
    let session = Session {
        id: Uuid::new_v4().to_string(),
        class_id: class_id.to_string(),
        name: name.trim().to_string(),
        day_of_week: weekday_index(window.day()),
        start_time: placeholder_instant(window.start()),
        end_time: placeholder_instant(window.end()),
        is_recurring,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO sessions
            (id, class_id, name, day_of_week, start_time, end_time, is_recurring, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&session.id)
    .bind(&session.class_id)
    .bind(&session.name)
    .bind(session.day_of_week)
    .bind(session.start_time)
    .bind(session.end_time)
    .bind(session.is_recurring)
    .bind(session.created_at)
    .execute(db)
    .await?;

    Ok(session)
}

pub async fn delete_session(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(result > 0)
}

// ---------------------------------------------------------------------------
// attendance
// ---------------------------------------------------------------------------

pub async fn insert_attendance(
    db: &SqlitePool,
    event: &NewAttendanceEvent,
) -> Result<AttendanceEvent, sqlx::Error> {
    let recorded = AttendanceEvent {
        id: Uuid::new_v4().to_string(),
        student_id: event.student_id.clone(),
        session_id: event.session_id.clone(),
        checkin_time: event.checkin_time,
        status: PRESENT_STATUS.to_string(),
        verified_by_face: event.verified_by_face,
    };

    sqlx::query(
        r#"
        INSERT INTO attendance
            (id, student_id, session_id, checkin_time, status, verified_by_face)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&recorded.id)
    .bind(&recorded.student_id)
    .bind(&recorded.session_id)
    .bind(recorded.checkin_time)
    .bind(&recorded.status)
    .bind(recorded.verified_by_face)
    .execute(db)
    .await?;

    Ok(recorded)
}

/// Check-ins of one session with `from <= checkin_time < to`, oldest first.
pub async fn fetch_attendance_between(
    db: &SqlitePool,
    session_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<AttendanceEvent>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceEvent>(&format!(
        "SELECT {} FROM attendance \
         WHERE session_id = ?1 AND checkin_time >= ?2 AND checkin_time < ?3 \
         ORDER BY checkin_time ASC, id ASC",
        ATTENDANCE_COLUMNS
    ))
    .bind(session_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await
}

pub async fn fetch_recent_attendance(db: &SqlitePool, limit: i64) -> Result<Vec<AttendanceLogEntry>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceLogEntry>(
        r#"
        SELECT
            a.id AS id,
            a.student_id AS student_id,
            s.name AS student_name,
            s.image_url AS student_image_url,
            a.session_id AS session_id,
            se.name AS session_name,
            a.checkin_time AS checkin_time,
            a.status AS status,
            a.verified_by_face AS verified_by_face
        FROM attendance a
        JOIN students s ON s.id = a.student_id
        JOIN sessions se ON se.id = a.session_id
        ORDER BY a.checkin_time DESC, a.id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
