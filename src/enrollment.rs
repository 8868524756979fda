//! Capacity-gated booking.

use std::sync::Arc;

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, warn};

use crate::auth::Principal;
use crate::clock::to_db_timestamp;
use crate::entity::{enrollment, session, user_profile};
use crate::error::{EnrollError, NotFound};
use crate::quota::{evaluate_for_profile, QuotaVerdict};
use crate::EventStore;

/// A committed booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentReceipt {
    pub enrollment_id: i32,
    pub session_id: i32,
    pub user_profile_id: i32,
    pub registered_at: DateTimeWithTimeZone,
}

impl EventStore {
    /// Books a seat in `session_id` for the calling student.
    ///
    /// Runs as one transaction:
    ///
    /// 1. lock the caller's profile row and evaluate the quota,
    /// 2. insert the enrollment, relying on the `(session, profile)` unique
    ///    index to reject duplicates,
    /// 3. increment the seat counter with a single
    ///    `UPDATE … WHERE current_enrolled_count < capacity`; zero affected
    ///    rows means the session is full and the insert is rolled back,
    /// 4. commit.
    ///
    /// There is no state in which an enrollment exists without its counter
    /// increment or the reverse. After the commit a confirmation is handed to
    /// the notifier on a detached task; its outcome is only logged.
    ///
    /// No retries happen here. Callers decide what to do with
    /// [`EnrollError::Storage`].
    ///
    /// # Errors
    ///
    /// * [`EnrollError::NotFound`] if the session or the caller's profile is missing.
    /// * [`EnrollError::TotalLimitExceeded`] / [`EnrollError::DayLimitExceeded`].
    /// * [`EnrollError::AlreadyEnrolled`] if the caller already holds this seat.
    /// * [`EnrollError::SessionFull`] if no seat is left.
    /// * [`EnrollError::Storage`] on database failure or deadline expiry.
    pub async fn enroll(
        &self,
        principal: &Principal,
        session_id: i32,
    ) -> Result<EnrollmentReceipt, EnrollError> {
        let user_id = principal.user_id();
        let outcome = self
            .with_deadline(self.enroll_in_transaction(user_id, session_id))
            .await;

        match &outcome {
            Ok(receipt) => {
                debug!(user_id, session_id, enrollment_id = receipt.enrollment_id, "enrolled");
                self.dispatch_confirmation(principal, session_id);
            }
            Err(err) => debug!(user_id, session_id, error = %err, "enrollment rejected"),
        }
        outcome
    }

    async fn enroll_in_transaction(
        &self,
        user_id: i32,
        session_id: i32,
    ) -> Result<EnrollmentReceipt, EnrollError> {
        let txn = self.conn.begin().await?;

        if txn.get_database_backend() == DatabaseBackend::Sqlite {
            claim_sqlite_write_lock(&txn, user_id).await?;
        }

        // Serializes concurrent bookings by the same user on the quota check.
        let profile = user_profile::Entity::find()
            .filter(user_profile::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(NotFound::Profile(user_id))?;

        match evaluate_for_profile(&txn, profile.id, session_id).await? {
            QuotaVerdict::Allowed => {}
            QuotaVerdict::DayLimitExceeded => {
                txn.rollback().await?;
                return Err(EnrollError::DayLimitExceeded);
            }
            QuotaVerdict::TotalLimitExceeded => {
                txn.rollback().await?;
                return Err(EnrollError::TotalLimitExceeded);
            }
        }

        let registered_at = to_db_timestamp(self.clock.now())?;
        let inserted = enrollment::Entity::insert(enrollment::ActiveModel {
            session_id: Set(session_id),
            user_profile_id: Set(profile.id),
            registered_at: Set(registered_at),
            ..Default::default()
        })
        .exec(&txn)
        .await;

        let enrollment_id = match inserted {
            Ok(res) => res.last_insert_id,
            Err(err) if is_unique_violation(&err) => {
                txn.rollback().await?;
                return Err(EnrollError::AlreadyEnrolled);
            }
            Err(err) => return Err(err.into()),
        };

        let bumped = session::Entity::update_many()
            .col_expr(
                session::Column::CurrentEnrolledCount,
                Expr::col(session::Column::CurrentEnrolledCount).add(1),
            )
            .filter(session::Column::Id.eq(session_id))
            .filter(
                Expr::col(session::Column::CurrentEnrolledCount)
                    .lt(Expr::col(session::Column::Capacity)),
            )
            .exec(&txn)
            .await?;

        if bumped.rows_affected == 0 {
            txn.rollback().await?;
            return Err(EnrollError::SessionFull);
        }

        txn.commit().await?;

        Ok(EnrollmentReceipt {
            enrollment_id,
            session_id,
            user_profile_id: profile.id,
            registered_at,
        })
    }

    fn dispatch_confirmation(&self, principal: &Principal, session_id: i32) {
        let notifier = Arc::clone(&self.notifier);
        let user_id = principal.user_id();
        let email = principal.email().to_owned();

        tokio::spawn(async move {
            if let Err(err) = notifier.send(user_id, session_id, &email).await {
                warn!(user_id, session_id, error = %err, "failed to send enrollment confirmation");
            }
        });
    }
}

// SQLite has no row locks and a deferred transaction that read first cannot
// upgrade to a writer while another one holds the lock. Writing before any
// read makes competing bookings wait on the busy timeout instead.
async fn claim_sqlite_write_lock(txn: &DatabaseTransaction, user_id: i32) -> Result<(), DbErr> {
    user_profile::Entity::update_many()
        .col_expr(
            user_profile::Column::UserId,
            SimpleExpr::from(Expr::col(user_profile::Column::UserId)),
        )
        .filter(user_profile::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    Ok(())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
