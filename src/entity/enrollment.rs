//! Enrollment entity model.
//!
//! One row binds one student profile to one session. Rows are never updated;
//! they are only inserted by a booking and removed by a bulk reset.

use sea_orm::entity::prelude::*;

/// An accepted booking.
///
/// `(session_id, user_profile_id)` is covered by the unique index
/// `idx-enrollments-session-profile`; a second insert for the same pair fails
/// with a unique-constraint violation, which the engine reports as
/// [`EnrollError::AlreadyEnrolled`](crate::EnrollError::AlreadyEnrolled).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub session_id: i32,
    pub user_profile_id: i32,
    pub registered_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::session::Entity",
        from = "Column::SessionId",
        to = "super::session::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::UserProfileId",
        to = "super::user_profile::Column::Id"
    )]
    UserProfile,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::user_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
