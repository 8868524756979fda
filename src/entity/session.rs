//! Bookable, capacity-bounded time slots of a class.
//!
//! `current_enrolled_count` is only ever changed by
//! [`EventStore::enroll`](crate::EventStore::enroll) and only ever cleared by
//! [`EventStore::reset_all`](crate::EventStore::reset_all).

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing one bookable session of a class.
///
/// # Database Schema
///
/// | Column                 | Type               | Description                                 |
/// |------------------------|--------------------|---------------------------------------------|
/// | id                     | INTEGER (PK)       | Session ID                                  |
/// | class_id               | INTEGER (FK)       | Parent class                                |
/// | day_sequence           | INTEGER            | Event day, `1` or `2`                       |
/// | start_at               | TIMESTAMPTZ        | Start of the slot                           |
/// | end_at                 | TIMESTAMPTZ        | End of the slot                             |
/// | capacity               | INTEGER            | Seat limit, always `> 0`                    |
/// | current_enrolled_count | INTEGER            | Seats taken, `0 ..= capacity`               |
///
/// The bounds on `day_sequence`, `capacity` and `current_enrolled_count` are
/// enforced with `CHECK` constraints as well as by the engine.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub class_id: i32,
    pub day_sequence: i32,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: DateTimeWithTimeZone,
    pub capacity: i32,
    pub current_enrolled_count: i32,
}

impl Model {
    /// Seats still open. Never negative, even if the stored counter is off.
    pub fn remaining_seats(&self) -> i32 {
        (self.capacity - self.current_enrolled_count).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.current_enrolled_count >= self.capacity
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id"
    )]
    Class,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
