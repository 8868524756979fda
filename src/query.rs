//! Read-only enrollment queries.
//!
//! None of these open a transaction; they run at the store's default read
//! consistency and are re-queried on every call.

use std::collections::HashMap;

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

use crate::entity::{class, class_instructor, enrollment, instructor, session, user_profile};
use crate::EventStore;

/// A session the user holds a seat in, with its class name.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct EnrolledSession {
    pub session_id: i32,
    pub class_name: String,
    pub day_sequence: i32,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: DateTimeWithTimeZone,
    pub registered_at: DateTimeWithTimeZone,
}

/// Seat counts for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionAvailability {
    pub session_id: i32,
    pub capacity: i32,
    pub current_enrolled_count: i32,
    /// `capacity - current_enrolled_count`, never below zero.
    pub remaining_seats: i32,
    pub is_full: bool,
}

impl From<session::Model> for SessionAvailability {
    fn from(model: session::Model) -> Self {
        Self {
            session_id: model.id,
            capacity: model.capacity,
            current_enrolled_count: model.current_enrolled_count,
            remaining_seats: model.remaining_seats(),
            is_full: model.is_full(),
        }
    }
}

/// Everything a student sees before booking a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetail {
    pub class_id: i32,
    pub class_name: String,
    pub room_number: String,
    pub room_name: String,
    pub syllabus_pdf_url: Option<String>,
    pub day_sequence: i32,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: DateTimeWithTimeZone,
    /// Instructor names, alphabetical.
    pub instructors: Vec<String>,
    pub availability: SessionAvailability,
}

impl EventStore {
    /// Whether `user_id` holds a seat in `session_id`.
    pub async fn has_joined(&self, session_id: i32, user_id: i32) -> Result<bool, DbErr> {
        let matches = enrollment::Entity::find()
            .join(JoinType::InnerJoin, enrollment::Relation::UserProfile.def())
            .filter(enrollment::Column::SessionId.eq(session_id))
            .filter(user_profile::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await?;
        Ok(matches > 0)
    }

    /// All sessions `user_id` is enrolled in, latest start first.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<EnrolledSession>, DbErr> {
        session::Entity::find()
            .select_only()
            .column_as(session::Column::Id, "session_id")
            .column_as(class::Column::Name, "class_name")
            .column(session::Column::DaySequence)
            .column(session::Column::StartAt)
            .column(session::Column::EndAt)
            .column(enrollment::Column::RegisteredAt)
            .join(JoinType::InnerJoin, session::Relation::Class.def())
            .join(JoinType::InnerJoin, session::Relation::Enrollment.def())
            .join(JoinType::InnerJoin, enrollment::Relation::UserProfile.def())
            .filter(user_profile::Column::UserId.eq(user_id))
            .order_by_desc(session::Column::StartAt)
            .order_by_asc(session::Column::Id)
            .into_model::<EnrolledSession>()
            .all(&self.conn)
            .await
    }

    /// Current seat counts, or `None` if the session does not exist.
    pub async fn session_availability(
        &self,
        session_id: i32,
    ) -> Result<Option<SessionAvailability>, DbErr> {
        Ok(session::Entity::find_by_id(session_id)
            .one(&self.conn)
            .await?
            .map(SessionAvailability::from))
    }

    /// The session with its class, room and instructors, or `None` if the
    /// session does not exist.
    pub async fn session_detail(&self, session_id: i32) -> Result<Option<SessionDetail>, DbErr> {
        let Some((session, Some(class))) = session::Entity::find_by_id(session_id)
            .find_also_related(class::Entity)
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let instructors = instructor_names(&self.conn, &[class.id])
            .await?
            .remove(&class.id)
            .unwrap_or_default();

        Ok(Some(SessionDetail {
            class_id: class.id,
            class_name: class.name,
            room_number: class.room_number,
            room_name: class.room_name,
            syllabus_pdf_url: class.syllabus_pdf_url,
            day_sequence: session.day_sequence,
            start_at: session.start_at,
            end_at: session.end_at,
            instructors,
            availability: SessionAvailability::from(session),
        }))
    }
}

#[derive(Debug, FromQueryResult)]
struct InstructorLink {
    class_id: i32,
    name: String,
}

/// Instructor names per class id, each list alphabetical. Classes without
/// instructors have no entry.
pub(crate) async fn instructor_names<C>(
    db: &C,
    class_ids: &[i32],
) -> Result<HashMap<i32, Vec<String>>, DbErr>
where
    C: ConnectionTrait,
{
    let mut names: HashMap<i32, Vec<String>> = HashMap::new();
    if class_ids.is_empty() {
        return Ok(names);
    }

    let links = class_instructor::Entity::find()
        .select_only()
        .column(class_instructor::Column::ClassId)
        .column(instructor::Column::Name)
        .join(JoinType::InnerJoin, class_instructor::Relation::Instructor.def())
        .filter(class_instructor::Column::ClassId.is_in(class_ids.iter().copied()))
        .order_by_asc(instructor::Column::Name)
        .into_model::<InstructorLink>()
        .all(db)
        .await?;

    for link in links {
        names.entry(link.class_id).or_default().push(link.name);
    }
    Ok(names)
}
