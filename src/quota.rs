//! Per-user booking quota.
//!
//! A student may hold at most [`MAX_PER_DAY`] enrollments on the same event
//! day and at most [`MAX_TOTAL`] enrollments overall. The rule is evaluated on
//! demand from the current enrollment rows; nothing is persisted.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QuerySelect, RelationTrait,
};

use crate::entity::{enrollment, session, user_profile};
use crate::error::{EnrollError, NotFound};
use crate::EventStore;

/// Enrollments allowed on a single day sequence.
pub const MAX_PER_DAY: i64 = 2;

/// Enrollments allowed in total.
pub const MAX_TOTAL: i64 = 3;

/// Result of checking the quota for one prospective booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaVerdict {
    Allowed,
    DayLimitExceeded,
    TotalLimitExceeded,
}

impl QuotaVerdict {
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }
}

/// Number of enrollments a user holds on one day sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromQueryResult)]
pub struct DayTally {
    pub day_sequence: i32,
    pub enrolled: i64,
}

/// Applies the quota rule to a user's existing tallies.
///
/// The total limit is checked first. The day limit looks at the day of the
/// session being booked, not at the days already booked.
pub fn evaluate(target_day: i32, tallies: &[DayTally]) -> QuotaVerdict {
    let total: i64 = tallies.iter().map(|t| t.enrolled).sum();
    if total >= MAX_TOTAL {
        return QuotaVerdict::TotalLimitExceeded;
    }

    let same_day: i64 = tallies
        .iter()
        .filter(|t| t.day_sequence == target_day)
        .map(|t| t.enrolled)
        .sum();
    if same_day >= MAX_PER_DAY {
        return QuotaVerdict::DayLimitExceeded;
    }

    QuotaVerdict::Allowed
}

impl EventStore {
    /// Checks whether `user_id` may book `session_id` right now.
    ///
    /// This is an advisory read for display purposes; [`enroll`](Self::enroll)
    /// repeats the check inside its own transaction.
    ///
    /// # Errors
    ///
    /// * [`NotFound::Session`] / [`NotFound::Profile`] for unknown ids.
    /// * [`EnrollError::Storage`] on database failure or deadline expiry.
    pub async fn evaluate_quota(
        &self,
        user_id: i32,
        session_id: i32,
    ) -> Result<QuotaVerdict, EnrollError> {
        self.with_deadline(async {
            let profile = user_profile::Entity::find()
                .filter(user_profile::Column::UserId.eq(user_id))
                .one(&self.conn)
                .await?
                .ok_or(NotFound::Profile(user_id))?;
            evaluate_for_profile(&self.conn, profile.id, session_id).await
        })
        .await
    }
}

/// Reads the target session's day and the profile's tallies through `db`
/// (normally an open transaction) and applies [`evaluate`].
pub(crate) async fn evaluate_for_profile<C>(
    db: &C,
    profile_id: i32,
    session_id: i32,
) -> Result<QuotaVerdict, EnrollError>
where
    C: ConnectionTrait,
{
    let target = session::Entity::find_by_id(session_id)
        .one(db)
        .await?
        .ok_or(NotFound::Session(session_id))?;

    let tallies = enrollment::Entity::find()
        .select_only()
        .column(session::Column::DaySequence)
        .column_as(Expr::col((enrollment::Entity, enrollment::Column::Id)).count(), "enrolled")
        .join(JoinType::InnerJoin, enrollment::Relation::Session.def())
        .filter(enrollment::Column::UserProfileId.eq(profile_id))
        .group_by(session::Column::DaySequence)
        .into_model::<DayTally>()
        .all(db)
        .await?;

    Ok(evaluate(target.day_sequence, &tallies))
}
