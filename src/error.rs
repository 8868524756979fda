//! Error types returned by the engine.
//!
//! Every domain outcome other than success is a variant here; nothing is
//! swallowed or retried inside the crate. Storage failures carry the
//! underlying [`DbErr`] so callers can choose their own retry policy.

use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

/// Failure of the relational store or of the operation deadline.
///
/// Whenever this is returned the surrounding transaction has been rolled back.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("operation exceeded its {0:?} deadline and was rolled back")]
    TimedOut(Duration),
}

/// A referenced row does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("session {0} does not exist")]
    Session(i32),
    #[error("user {0} has no profile")]
    Profile(i32),
    #[error("class {0} does not exist")]
    Class(i32),
}

/// Outcome of a rejected [`enroll`](crate::EventStore::enroll) or
/// [`evaluate_quota`](crate::EventStore::evaluate_quota) call.
#[derive(Debug, Error)]
pub enum EnrollError {
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error("user is already enrolled in this session")]
    AlreadyEnrolled,
    #[error("session is full")]
    SessionFull,
    #[error("cannot enroll in more than 2 sessions on the same day")]
    DayLimitExceeded,
    #[error("cannot enroll in more than 3 sessions in total")]
    TotalLimitExceeded,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DbErr> for EnrollError {
    fn from(err: DbErr) -> Self {
        Self::Storage(StorageError::Db(err))
    }
}

/// The step of a bulk reset that failed.
///
/// Deletion stages are listed in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStage {
    Begin,
    Enrollments,
    Sessions,
    ClassInstructors,
    Classes,
    Instructors,
    UserProfiles,
    Users,
    Settings,
    SeedSettings,
    Commit,
}

impl std::fmt::Display for ResetStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Begin => "begin transaction",
            Self::Enrollments => "delete enrollments",
            Self::Sessions => "delete sessions",
            Self::ClassInstructors => "delete class instructors",
            Self::Classes => "delete classes",
            Self::Instructors => "delete instructors",
            Self::UserProfiles => "delete student profiles",
            Self::Users => "delete student users",
            Self::Settings => "delete settings",
            Self::SeedSettings => "seed default settings",
            Self::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Outcome of a rejected [`reset_all`](crate::EventStore::reset_all) call.
///
/// None of these leave partial effects in the database.
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("confirmation phrase does not match")]
    InvalidConfirmation,
    #[error("only administrators may reset event data")]
    NotAdministrator,
    #[error("reset failed at stage '{stage}': {source}")]
    Failed {
        stage: ResetStage,
        #[source]
        source: StorageError,
    },
}

/// Errors from the administrative catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("only administrators may manage the catalog")]
    NotAdministrator,
    #[error("invalid session: {0}")]
    InvalidSession(&'static str),
    #[error("class name must not be empty")]
    EmptyClassName,
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        Self::Storage(StorageError::Db(err))
    }
}

/// Errors from reading or writing the event date settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("only administrators may change settings")]
    NotAdministrator,
    #[error("setting '{0}' is missing")]
    Missing(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DbErr> for SettingsError {
    fn from(err: DbErr) -> Self {
        Self::Storage(StorageError::Db(err))
    }
}

/// Malformed engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },
}
