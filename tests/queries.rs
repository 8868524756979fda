mod common;

use class_enrollment_seaorm::{CatalogError, EventStore, NewClass, ReportFilter};
use common::*;

#[tokio::test]
async fn has_joined_reflects_bookings() {
    let db = setup_db().await;
    let store = EventStore::new(db.clone());
    let admin = register_admin(&db).await;
    let class = create_class(&store, &admin, "Astronomy").await;
    let session = create_session(&store, &admin, class.id, 1, 0, 5).await;
    let booked = register_student(&db, 1).await;
    let idle = register_student(&db, 2).await;

    store.enroll(&booked, session.id).await.unwrap();

    assert!(store.has_joined(session.id, booked.user_id()).await.unwrap());
    assert!(!store.has_joined(session.id, idle.user_id()).await.unwrap());
    assert!(!store.has_joined(session.id + 1, booked.user_id()).await.unwrap());
}

#[tokio::test]
async fn lists_bookings_latest_first() {
    let db = setup_db().await;
    let store = EventStore::new(db.clone());
    let admin = register_admin(&db).await;
    let robotics = create_class(&store, &admin, "Robotics").await;
    let poetry = create_class(&store, &admin, "Poetry").await;

    let early = create_session(&store, &admin, robotics.id, 1, 0, 5).await;
    let late = create_session(&store, &admin, poetry.id, 2, 3, 5).await;
    let middle = create_session(&store, &admin, poetry.id, 1, 5, 5).await;
    let untouched = create_session(&store, &admin, robotics.id, 2, 0, 5).await;

    let student = register_student(&db, 1).await;
    let other = register_student(&db, 2).await;
    store.enroll(&student, early.id).await.unwrap();
    store.enroll(&student, late.id).await.unwrap();
    store.enroll(&student, middle.id).await.unwrap();
    store.enroll(&other, untouched.id).await.unwrap();

    let listed = store.list_for_user(student.user_id()).await.unwrap();
    let ids: Vec<i32> = listed.iter().map(|s| s.session_id).collect();
    assert_eq!(ids, vec![late.id, middle.id, early.id]);

    assert_eq!(listed[0].class_name, "Poetry");
    assert_eq!(listed[0].day_sequence, 2);
    assert_eq!(listed[2].class_name, "Robotics");
    assert_eq!(listed[2].start_at, early.start_at);
    assert_eq!(listed[2].end_at, early.end_at);

    // Re-queried on every call.
    store.enroll(&other, early.id).await.unwrap();
    assert_eq!(store.list_for_user(other.user_id()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn user_without_bookings_lists_nothing() {
    let db = setup_db().await;
    let store = EventStore::new(db.clone());
    let student = register_student(&db, 1).await;

    assert!(store.list_for_user(student.user_id()).await.unwrap().is_empty());
    assert!(store.list_for_user(12_345).await.unwrap().is_empty());
}

#[tokio::test]
async fn availability_tracks_remaining_seats() {
    let db = setup_db().await;
    let store = EventStore::new(db.clone());
    let admin = register_admin(&db).await;
    let class = create_class(&store, &admin, "Ceramics").await;
    let session = create_session(&store, &admin, class.id, 1, 0, 2).await;

    let before = store.session_availability(session.id).await.unwrap().unwrap();
    assert_eq!(before.remaining_seats, 2);
    assert!(!before.is_full);

    store.enroll(&register_student(&db, 1).await, session.id).await.unwrap();
    store.enroll(&register_student(&db, 2).await, session.id).await.unwrap();

    let after = store.session_availability(session.id).await.unwrap().unwrap();
    assert_eq!(after.current_enrolled_count, 2);
    assert_eq!(after.remaining_seats, 0);
    assert!(after.is_full);

    assert!(store.session_availability(session.id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn lists_classes_newest_first_and_finds_one_by_id() {
    let db = setup_db().await;
    let store = EventStore::new(db.clone());
    let admin = register_admin(&db).await;
    let robotics = create_class(&store, &admin, "Robotics").await;
    let poetry = create_class(&store, &admin, "Poetry").await;

    let names: Vec<String> = store
        .classes()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Poetry", "Robotics"]);

    assert_eq!(store.class_by_id(robotics.id).await.unwrap(), Some(robotics));
    assert!(store.class_by_id(poetry.id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn session_detail_includes_room_and_instructors() {
    let db = setup_db().await;
    let store = EventStore::new(db.clone());
    let admin = register_admin(&db).await;
    let class = store
        .create_class(
            &admin,
            NewClass {
                name: "Astronomy".to_string(),
                room_number: "204".to_string(),
                room_name: "Planetarium".to_string(),
                syllabus_pdf_url: Some("astronomy.pdf".to_string()),
                instructors: vec!["Mr. Sato".to_string(), "Dr. Ito".to_string()],
            },
        )
        .await
        .unwrap();
    let session = create_session(&store, &admin, class.id, 2, 1, 3).await;
    store.enroll(&register_student(&db, 1).await, session.id).await.unwrap();

    let detail = store.session_detail(session.id).await.unwrap().unwrap();
    assert_eq!(detail.class_name, "Astronomy");
    assert_eq!(detail.room_number, "204");
    assert_eq!(detail.room_name, "Planetarium");
    assert_eq!(detail.syllabus_pdf_url.as_deref(), Some("astronomy.pdf"));
    assert_eq!(detail.day_sequence, 2);
    assert_eq!(detail.start_at, session.start_at);
    assert_eq!(detail.instructors, vec!["Dr. Ito", "Mr. Sato"]);
    assert_eq!(detail.availability.remaining_seats, 2);

    assert!(store.session_detail(session.id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn class_without_instructors_has_an_empty_list() {
    let db = setup_db().await;
    let store = EventStore::new(db.clone());
    let admin = register_admin(&db).await;
    let class = store
        .create_class(
            &admin,
            NewClass {
                name: "Study Hall".to_string(),
                ..NewClass::default()
            },
        )
        .await
        .unwrap();
    let session = create_session(&store, &admin, class.id, 1, 0, 10).await;

    let detail = store.session_detail(session.id).await.unwrap().unwrap();
    assert!(detail.instructors.is_empty());
}

#[tokio::test]
async fn status_report_covers_every_session_and_filters() {
    let db = setup_db().await;
    let store = EventStore::new(db.clone());
    let admin = register_admin(&db).await;
    let robotics = create_class(&store, &admin, "Robotics").await;
    let poetry = store
        .create_class(
            &admin,
            NewClass {
                name: "Poetry".to_string(),
                room_number: "3".to_string(),
                room_name: "Library".to_string(),
                syllabus_pdf_url: None,
                instructors: vec!["Ms. Tanaka".to_string(), "Mr. Abe".to_string()],
            },
        )
        .await
        .unwrap();

    let late = create_session(&store, &admin, robotics.id, 2, 0, 4).await;
    let early = create_session(&store, &admin, robotics.id, 1, 0, 4).await;
    let verse = create_session(&store, &admin, poetry.id, 1, 2, 2).await;
    store.enroll(&register_student(&db, 1).await, early.id).await.unwrap();
    store.enroll(&register_student(&db, 2).await, verse.id).await.unwrap();
    store.enroll(&register_student(&db, 3).await, verse.id).await.unwrap();

    let all = store
        .class_status_report(&admin, ReportFilter::default())
        .await
        .unwrap();
    let ids: Vec<i32> = all.iter().map(|s| s.session_id).collect();
    assert_eq!(ids, vec![early.id, late.id, verse.id]);
    assert_eq!(all[0].current_enrolled_count, 1);
    assert_eq!(all[0].instructors, vec!["Ms. Tanaka"]);
    assert_eq!(all[2].class_name, "Poetry");
    assert_eq!(all[2].room_name, "Library");
    assert_eq!((all[2].capacity, all[2].current_enrolled_count), (2, 2));
    assert_eq!(all[2].instructors, vec!["Mr. Abe", "Ms. Tanaka"]);

    let robotics_only = store
        .class_status_report(&admin, ReportFilter::class(robotics.id))
        .await
        .unwrap();
    assert_eq!(robotics_only.len(), 2);

    let one = store
        .class_status_report(&admin, ReportFilter::session(late.id))
        .await
        .unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].current_enrolled_count, 0);

    let student = register_student(&db, 4).await;
    let err = store
        .class_status_report(&student, ReportFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotAdministrator), "got {err:?}");
}

#[tokio::test]
async fn applicants_report_lists_enrolled_students() {
    let db = setup_db().await;
    let store = EventStore::new(db.clone());
    let admin = register_admin(&db).await;
    let robotics = create_class(&store, &admin, "Robotics").await;
    let poetry = create_class(&store, &admin, "Poetry").await;
    let morning = create_session(&store, &admin, robotics.id, 1, 0, 5).await;
    let evening = create_session(&store, &admin, poetry.id, 1, 6, 5).await;

    let first = register_student(&db, 1).await;
    let second = register_student(&db, 2).await;
    store.enroll(&second, morning.id).await.unwrap();
    store.enroll(&first, morning.id).await.unwrap();
    store.enroll(&first, evening.id).await.unwrap();

    let roster = store
        .applicants_report(&admin, ReportFilter::default())
        .await
        .unwrap();
    let rows: Vec<(i32, i32)> = roster.iter().map(|a| (a.session_id, a.user_id)).collect();
    assert_eq!(
        rows,
        vec![
            (morning.id, first.user_id()),
            (morning.id, second.user_id()),
            (evening.id, first.user_id()),
        ]
    );
    assert_eq!(roster[0].email, "student1@example.com");
    assert_eq!(roster[0].student_name.as_deref(), Some("Student 1"));
    assert_eq!(roster[0].guardian_name, None);
    assert_eq!(roster[0].class_name, "Robotics");
    assert_eq!(roster[2].class_name, "Poetry");
    assert_eq!(roster[2].start_at, evening.start_at);

    let poetry_only = store
        .applicants_report(&admin, ReportFilter::class(poetry.id))
        .await
        .unwrap();
    assert_eq!(poetry_only.len(), 1);
    assert_eq!(poetry_only[0].user_id, first.user_id());

    let morning_only = store
        .applicants_report(&admin, ReportFilter::session(morning.id))
        .await
        .unwrap();
    assert_eq!(morning_only.len(), 2);

    let err = store
        .applicants_report(&first, ReportFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotAdministrator), "got {err:?}");
}
