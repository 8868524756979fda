//! Bulk reset of all event data.
//!
//! Two steps with separate failure handling: a single serializable
//! transaction that wipes and reseeds the tables, then an advisory sweep of
//! the uploads directory that only runs once the transaction has committed.

use std::future::Future;
use std::io;
use std::path::Path;
use std::time::Duration;

use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, IsolationLevel, QueryFilter, Set,
    TransactionTrait,
};
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::auth::Principal;
use crate::entity::{
    class, class_instructor, enrollment, instructor, session, setting, user, user_profile,
};
use crate::error::{ResetError, ResetStage, StorageError};
use crate::settings::{EVENT_DATE_1, EVENT_DATE_2};
use crate::EventStore;

/// The exact phrase an operator must type to authorize a reset.
pub const RESET_CONFIRMATION_PHRASE: &str = "削除を実行する";

/// What the post-commit upload sweep managed to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Files removed from the uploads directory.
    pub removed_files: usize,
    /// Files that could not be removed; they are left in place.
    pub failed_files: usize,
}

impl EventStore {
    /// Deletes every class, session, enrollment, instructor and student
    /// account, then restores the default event dates.
    ///
    /// The database work is all-or-nothing: deletions run children first
    /// (enrollments, sessions, class–instructor links, classes, instructors,
    /// student profiles, student users, settings) followed by reseeding
    /// `event_date_1` / `event_date_2`, inside one transaction opened at
    /// `SERIALIZABLE` isolation so rows written concurrently cannot survive
    /// the wipe. Any failure rolls everything back and is reported with the
    /// stage that failed.
    ///
    /// Once committed, the files directly inside the configured uploads
    /// directory are deleted. Failures there are logged and counted in the
    /// returned [`ResetReport`] but never turn the reset into an error.
    ///
    /// # Errors
    ///
    /// * [`ResetError::NotAdministrator`] if `principal` is not an admin.
    /// * [`ResetError::InvalidConfirmation`] if `confirmation` differs from
    ///   [`RESET_CONFIRMATION_PHRASE`] in any way.
    /// * [`ResetError::Failed`] if the transaction could not be completed.
    ///
    /// The two gate checks happen before anything is touched.
    pub async fn reset_all(
        &self,
        principal: &Principal,
        confirmation: &str,
    ) -> Result<ResetReport, ResetError> {
        if !principal.is_admin() {
            return Err(ResetError::NotAdministrator);
        }
        if confirmation != RESET_CONFIRMATION_PHRASE {
            return Err(ResetError::InvalidConfirmation);
        }

        self.wipe_and_reseed().await.inspect_err(|err| {
            warn!(user_id = principal.user_id(), error = %err, "event data reset rolled back");
        })?;
        info!(user_id = principal.user_id(), "event data reset committed");

        let report = clear_upload_dir(&self.config.upload_dir).await;
        info!(
            removed = report.removed_files,
            failed = report.failed_files,
            "upload directory cleared"
        );
        Ok(report)
    }

    async fn wipe_and_reseed(&self) -> Result<(), ResetError> {
        let deadline = Instant::now() + self.config.operation_timeout;
        let limit = self.config.operation_timeout;

        let txn = stage(ResetStage::Begin, deadline, limit, async {
            self.conn
                .begin_with_config(Some(IsolationLevel::Serializable), None)
                .await
        })
        .await?;

        if let Err(err) = self.clear_tables(&txn, deadline, limit).await {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback after failed reset also failed");
            }
            return Err(err);
        }

        stage(ResetStage::Commit, deadline, limit, txn.commit()).await
    }

    async fn clear_tables(
        &self,
        txn: &DatabaseTransaction,
        deadline: Instant,
        limit: Duration,
    ) -> Result<(), ResetError> {
        stage(ResetStage::Enrollments, deadline, limit, async {
            enrollment::Entity::delete_many().exec(txn).await
        })
        .await?;
        stage(ResetStage::Sessions, deadline, limit, async {
            session::Entity::delete_many().exec(txn).await
        })
        .await?;
        stage(ResetStage::ClassInstructors, deadline, limit, async {
            class_instructor::Entity::delete_many().exec(txn).await
        })
        .await?;
        stage(ResetStage::Classes, deadline, limit, async {
            class::Entity::delete_many().exec(txn).await
        })
        .await?;
        stage(ResetStage::Instructors, deadline, limit, async {
            instructor::Entity::delete_many().exec(txn).await
        })
        .await?;
        stage(ResetStage::UserProfiles, deadline, limit, async {
            user_profile::Entity::delete_many()
                .filter(
                    user_profile::Column::UserId.in_subquery(
                        Query::select()
                            .column(user::Column::Id)
                            .from(user::Entity)
                            .and_where(user::Column::IsAdmin.eq(false))
                            .to_owned(),
                    ),
                )
                .exec(txn)
                .await
        })
        .await?;
        stage(ResetStage::Users, deadline, limit, async {
            user::Entity::delete_many()
                .filter(user::Column::IsAdmin.eq(false))
                .exec(txn)
                .await
        })
        .await?;
        stage(ResetStage::Settings, deadline, limit, async {
            setting::Entity::delete_many().exec(txn).await
        })
        .await?;
        stage(ResetStage::SeedSettings, deadline, limit, async {
            seed_settings(txn, &self.config.default_event_dates).await
        })
        .await
    }
}

// Runs one reset step against the shared deadline, tagging failures with the step.
async fn stage<T, F>(
    stage: ResetStage,
    deadline: Instant,
    limit: Duration,
    step: F,
) -> Result<T, ResetError>
where
    F: Future<Output = Result<T, DbErr>>,
{
    match timeout_at(deadline, step).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ResetError::Failed {
            stage,
            source: StorageError::Db(err),
        }),
        Err(_) => Err(ResetError::Failed {
            stage,
            source: StorageError::TimedOut(limit),
        }),
    }
}

async fn seed_settings(txn: &DatabaseTransaction, dates: &(String, String)) -> Result<(), DbErr> {
    setting::Entity::insert_many([
        setting::ActiveModel {
            key: Set(EVENT_DATE_1.to_string()),
            value: Set(dates.0.clone()),
        },
        setting::ActiveModel {
            key: Set(EVENT_DATE_2.to_string()),
            value: Set(dates.1.clone()),
        },
    ])
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

/// Deletes the regular files directly inside `dir`.
///
/// A missing directory counts as already clean. Subdirectories are skipped.
/// Every failure is logged and counted, never retried.
pub(crate) async fn clear_upload_dir(dir: &Path) -> ResetReport {
    let mut report = ResetReport::default();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return report,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "cannot read upload directory");
            return report;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "stopped listing upload directory");
                break;
            }
        };

        let path = entry.path();
        match entry.file_type().await {
            Ok(kind) if kind.is_dir() => continue,
            Ok(_) => {}
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot inspect uploaded file");
                report.failed_files += 1;
                continue;
            }
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => report.removed_files += 1,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to delete uploaded file");
                report.failed_files += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let report = clear_upload_dir(&dir.path().join("absent")).await;
        assert_eq!(report, ResetReport::default());
    }

    #[tokio::test]
    async fn removes_files_and_keeps_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("syllabus-1.pdf"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("syllabus-2.pdf"), b"%PDF").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("keep.pdf"), b"%PDF").unwrap();

        let report = clear_upload_dir(dir.path()).await;

        assert_eq!(report.removed_files, 2);
        assert_eq!(report.failed_files, 0);
        assert!(!dir.path().join("syllabus-1.pdf").exists());
        assert!(dir.path().join("nested").join("keep.pdf").exists());
    }
}
