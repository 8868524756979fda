#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use class_enrollment_seaorm::entity::{
    class, class_instructor, enrollment, instructor, session, setting, user, user_profile,
};
use class_enrollment_seaorm::migration::{Migrator, MigratorTrait};
use class_enrollment_seaorm::{
    EventStore, NewClass, NewSession, Notifier, NotifyError, Principal,
};
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, Set, TransactionTrait,
};
use tempfile::TempDir;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use tokio::task::JoinHandle;

pub const EVENT_DAY_1: OffsetDateTime = datetime!(2025-08-01 09:00 UTC);
pub const EVENT_DAY_2: OffsetDateTime = datetime!(2025-08-02 09:00 UTC);

/// Fresh, migrated in-memory SQLite database.
///
/// A single pooled connection keeps every caller on the same in-memory
/// database and makes the pool the writer queue.
pub async fn setup_db() -> DatabaseConnection {
    init_tracing();

    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Fresh, migrated SQLite database in a temporary file behind a pool of
/// `max_connections`, so transactions really run side by side.
///
/// Keep the returned directory alive for as long as the connection is used.
pub async fn setup_file_db(max_connections: u32) -> (TempDir, DatabaseConnection) {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("event.db").display());
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(max_connections).sqlx_logging(false);

    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    (dir, db)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Opens a transaction that holds the database write lock until it is
/// released by [`release_after`].
pub async fn hold_write_lock(db: &DatabaseConnection) -> DatabaseTransaction {
    let writer = db.begin().await.unwrap();
    writer
        .execute_unprepared("UPDATE sessions SET capacity = capacity")
        .await
        .unwrap();
    writer
}

/// Rolls `writer` back after `delay` on a separate task.
pub fn release_after(writer: DatabaseTransaction, delay: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        writer.rollback().await.unwrap();
    })
}

pub async fn insert_user(db: &DatabaseConnection, email: &str, is_admin: bool) -> user::Model {
    user::ActiveModel {
        email: Set(email.to_string()),
        is_admin: Set(is_admin),
        created_at: Set(OffsetDateTime::now_utc().into_db()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Creates a non-admin user with a profile and returns its principal.
pub async fn register_student(db: &DatabaseConnection, n: usize) -> Principal {
    let email = format!("student{n}@example.com");
    let user = insert_user(db, &email, false).await;
    user_profile::ActiveModel {
        user_id: Set(user.id),
        student_name: Set(Some(format!("Student {n}"))),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    Principal::student(user.id, email)
}

pub async fn register_admin(db: &DatabaseConnection) -> Principal {
    let user = insert_user(db, "admin@example.com", true).await;
    user_profile::ActiveModel {
        user_id: Set(user.id),
        student_name: Set(Some("Administrator".to_string())),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    Principal::administrator(user.id, "admin@example.com")
}

pub async fn create_class(store: &EventStore, admin: &Principal, name: &str) -> class::Model {
    store
        .create_class(
            admin,
            NewClass {
                name: name.to_string(),
                room_number: "101".to_string(),
                room_name: "Science Lab".to_string(),
                syllabus_pdf_url: None,
                instructors: vec!["Ms. Tanaka".to_string()],
            },
        )
        .await
        .unwrap()
}

/// Adds a one-hour session `offset_hours` after the start of the given day.
pub async fn create_session(
    store: &EventStore,
    admin: &Principal,
    class_id: i32,
    day_sequence: i32,
    offset_hours: i64,
    capacity: i32,
) -> session::Model {
    let day_start = if day_sequence == 1 {
        EVENT_DAY_1
    } else {
        EVENT_DAY_2
    };
    let start_at = day_start + Duration::hours(offset_hours);
    store
        .create_session(
            admin,
            NewSession {
                class_id,
                day_sequence,
                start_at,
                end_at: start_at + Duration::hours(1),
                capacity,
            },
        )
        .await
        .unwrap()
}

pub async fn enrolled_count(db: &DatabaseConnection, session_id: i32) -> i32 {
    session::Entity::find_by_id(session_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .current_enrolled_count
}

/// Row counts of the eight tables a reset touches, parents last.
pub async fn table_counts(db: &DatabaseConnection) -> [u64; 8] {
    [
        enrollment::Entity::find().count(db).await.unwrap(),
        session::Entity::find().count(db).await.unwrap(),
        class_instructor::Entity::find().count(db).await.unwrap(),
        class::Entity::find().count(db).await.unwrap(),
        instructor::Entity::find().count(db).await.unwrap(),
        user_profile::Entity::find().count(db).await.unwrap(),
        user::Entity::find().count(db).await.unwrap(),
        setting::Entity::find().count(db).await.unwrap(),
    ]
}

trait IntoDb {
    fn into_db(self) -> sea_orm::prelude::DateTimeWithTimeZone;
}

impl IntoDb for OffsetDateTime {
    fn into_db(self) -> sea_orm::prelude::DateTimeWithTimeZone {
        chrono::DateTime::from_timestamp(self.unix_timestamp(), self.nanosecond())
            .unwrap()
            .into()
    }
}

/// Notifier that remembers every notice it was asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(i32, i32, String)>>,
    pub notify: tokio::sync::Notify,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, user_id: i32, session_id: i32, email: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((user_id, session_id, email.to_string()));
        self.notify.notify_one();
        Ok(())
    }
}

/// Notifier whose delivery always fails.
#[derive(Debug, Default)]
pub struct FailingNotifier {
    pub attempts: tokio::sync::Notify,
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _: i32, _: i32, _: &str) -> Result<(), NotifyError> {
        self.attempts.notify_one();
        Err(NotifyError("smtp relay unreachable".to_string()))
    }
}

pub fn store_with_recorder(db: DatabaseConnection) -> (EventStore, Arc<RecordingNotifier>) {
    let recorder = Arc::new(RecordingNotifier::default());
    let store = EventStore::new(db).with_notifier(recorder.clone());
    (store, recorder)
}
