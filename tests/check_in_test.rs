use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use rollcall::attendance::{ReportStatus, TimeWindow, build_report};
use rollcall::db::{self, SqliteStore, repository};
use rollcall::error::AppError;
use rollcall::face::EuclideanFaceMatcher;
use rollcall::models::NewStudentRequest;
use rollcall::services::{CheckInOutcome, CheckInRequest, CheckInService};

fn window(day: i32, start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    TimeWindow::new(
        day,
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
    .unwrap()
}

fn card(rfid: &str, descriptor: Option<Vec<f32>>) -> CheckInRequest {
    CheckInRequest {
        rfid_uid: rfid.to_string(),
        face_descriptor: descriptor,
    }
}

#[tokio::test]
async fn test_kiosk_check_ins_feed_the_report() {
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to create test db");

    let class = repository::insert_class(&pool, "Science").await.unwrap();
    let session = repository::insert_session(&pool, &class.id, "Lab", window(3, (14, 0), (14, 30)), true)
        .await
        .unwrap();

    let plain = repository::insert_student(
        &pool,
        NewStudentRequest {
            name: "Pat".to_string(),
            rfid_uid: "CARD-P".to_string(),
            face_embedding: None,
            image_url: None,
        },
    )
    .await
    .unwrap();
    let face = repository::insert_student(
        &pool,
        NewStudentRequest {
            name: "Fay".to_string(),
            rfid_uid: "CARD-F".to_string(),
            face_embedding: Some(vec![0.2; 8]),
            image_url: None,
        },
    )
    .await
    .unwrap();
    repository::replace_enrollments(&pool, &class.id, &[plain.id.clone(), face.id.clone()])
        .await
        .unwrap();

    let service = CheckInService::new(
        Arc::new(SqliteStore::new(pool.clone())),
        Arc::new(EuclideanFaceMatcher::default()),
    );

    // 2024-01-10 is a Wednesday
    let on_time = Utc.with_ymd_and_hms(2024, 1, 10, 14, 30, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2024, 1, 10, 14, 30, 1).unwrap();

    // the window end itself is still inside the session
    let outcome = service.check_in(card("CARD-P", None), on_time).await.unwrap();
    assert!(matches!(outcome, CheckInOutcome::CheckedIn { .. }));

    let err = service.check_in(card("CARD-F", None), late).await.unwrap_err();
    assert!(matches!(err, AppError::NoActiveSession));

    let early = Utc.with_ymd_and_hms(2024, 1, 10, 14, 10, 0).unwrap();
    let outcome = service.check_in(card("CARD-F", None), early).await.unwrap();
    assert!(matches!(outcome, CheckInOutcome::FaceScanRequired { .. }));

    let err = service
        .check_in(card("CARD-F", Some(vec![0.9; 8])), early)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::FaceMismatch));

    let outcome = service
        .check_in(card("CARD-F", Some(vec![0.21; 8])), early)
        .await
        .unwrap();
    match outcome {
        CheckInOutcome::CheckedIn { session: s, event, .. } => {
            assert_eq!(s.id, session.id);
            assert_eq!(s.session_start, Utc.with_ymd_and_hms(2024, 1, 10, 14, 0, 0).unwrap());
            assert!(event.verified_by_face);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let store = SqliteStore::new(pool.clone());
    let rows = build_report(&store, &session.id, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].student_name, "Fay");
    assert_eq!(rows[0].status, ReportStatus::OnTime);
    assert!(rows[0].verified_by_face);
    assert_eq!(rows[1].student_name, "Pat");
    assert_eq!(rows[1].status, ReportStatus::OnTime);
    assert_eq!(rows[1].checkin_time, Some(on_time));
}
