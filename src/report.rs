//! Administrative reports over the enrollment tables: live seat status per
//! session and the roster of enrolled students.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};

use crate::auth::Principal;
use crate::entity::{class, enrollment, session, user, user_profile};
use crate::error::CatalogError;
use crate::query::instructor_names;
use crate::EventStore;

/// Narrows a report to one class, one session, or both. The default covers
/// everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub class_id: Option<i32>,
    pub session_id: Option<i32>,
}

impl ReportFilter {
    pub fn class(class_id: i32) -> Self {
        Self {
            class_id: Some(class_id),
            session_id: None,
        }
    }

    pub fn session(session_id: i32) -> Self {
        Self {
            class_id: None,
            session_id: Some(session_id),
        }
    }

    // Both reports join `sessions`, so the filter is expressed on it.
    fn condition(self) -> Condition {
        Condition::all()
            .add_option(self.class_id.map(|id| session::Column::ClassId.eq(id)))
            .add_option(self.session_id.map(|id| session::Column::Id.eq(id)))
    }
}

/// Seat status of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub session_id: i32,
    pub class_id: i32,
    pub class_name: String,
    pub room_name: String,
    pub day_sequence: i32,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: DateTimeWithTimeZone,
    pub capacity: i32,
    pub current_enrolled_count: i32,
    /// Instructor names, alphabetical.
    pub instructors: Vec<String>,
}

#[derive(Debug, FromQueryResult)]
struct StatusRow {
    session_id: i32,
    class_id: i32,
    class_name: String,
    room_name: String,
    day_sequence: i32,
    start_at: DateTimeWithTimeZone,
    end_at: DateTimeWithTimeZone,
    capacity: i32,
    current_enrolled_count: i32,
}

/// One enrolled student in one session.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct Applicant {
    pub user_id: i32,
    pub email: String,
    pub registered_at: DateTimeWithTimeZone,
    pub student_name: Option<String>,
    pub guardian_name: Option<String>,
    pub school_name: Option<String>,
    pub grade: Option<String>,
    pub session_id: i32,
    pub class_name: String,
    pub day_sequence: i32,
    pub start_at: DateTimeWithTimeZone,
    pub end_at: DateTimeWithTimeZone,
}

impl EventStore {
    /// Capacity, seats taken and instructors for every session matching
    /// `filter`, ordered by class then start time.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::NotAdministrator`] if `principal` is not an admin.
    /// * [`CatalogError::Storage`] on database failure.
    pub async fn class_status_report(
        &self,
        principal: &Principal,
        filter: ReportFilter,
    ) -> Result<Vec<SessionStatus>, CatalogError> {
        if !principal.is_admin() {
            return Err(CatalogError::NotAdministrator);
        }

        let rows = session::Entity::find()
            .select_only()
            .column_as(session::Column::Id, "session_id")
            .column(session::Column::ClassId)
            .column_as(class::Column::Name, "class_name")
            .column(class::Column::RoomName)
            .column(session::Column::DaySequence)
            .column(session::Column::StartAt)
            .column(session::Column::EndAt)
            .column(session::Column::Capacity)
            .column(session::Column::CurrentEnrolledCount)
            .join(JoinType::InnerJoin, session::Relation::Class.def())
            .filter(filter.condition())
            .order_by_asc(session::Column::ClassId)
            .order_by_asc(session::Column::StartAt)
            .order_by_asc(session::Column::Id)
            .into_model::<StatusRow>()
            .all(&self.conn)
            .await?;

        let mut class_ids: Vec<i32> = rows.iter().map(|row| row.class_id).collect();
        class_ids.dedup();
        let names = instructor_names(&self.conn, &class_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| SessionStatus {
                instructors: names.get(&row.class_id).cloned().unwrap_or_default(),
                session_id: row.session_id,
                class_id: row.class_id,
                class_name: row.class_name,
                room_name: row.room_name,
                day_sequence: row.day_sequence,
                start_at: row.start_at,
                end_at: row.end_at,
                capacity: row.capacity,
                current_enrolled_count: row.current_enrolled_count,
            })
            .collect())
    }

    /// Enrolled students with their profile, email and registration time,
    /// ordered by session start then user id.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::NotAdministrator`] if `principal` is not an admin.
    /// * [`CatalogError::Storage`] on database failure.
    pub async fn applicants_report(
        &self,
        principal: &Principal,
        filter: ReportFilter,
    ) -> Result<Vec<Applicant>, CatalogError> {
        if !principal.is_admin() {
            return Err(CatalogError::NotAdministrator);
        }

        let applicants = enrollment::Entity::find()
            .select_only()
            .column_as(user::Column::Id, "user_id")
            .column(user::Column::Email)
            .column(enrollment::Column::RegisteredAt)
            .column(user_profile::Column::StudentName)
            .column(user_profile::Column::GuardianName)
            .column(user_profile::Column::SchoolName)
            .column(user_profile::Column::Grade)
            .column(enrollment::Column::SessionId)
            .column_as(class::Column::Name, "class_name")
            .column(session::Column::DaySequence)
            .column(session::Column::StartAt)
            .column(session::Column::EndAt)
            .join(JoinType::InnerJoin, enrollment::Relation::UserProfile.def())
            .join(JoinType::InnerJoin, user_profile::Relation::User.def())
            .join(JoinType::InnerJoin, enrollment::Relation::Session.def())
            .join(JoinType::InnerJoin, session::Relation::Class.def())
            .filter(filter.condition())
            .order_by_asc(session::Column::StartAt)
            .order_by_asc(enrollment::Column::SessionId)
            .order_by_asc(user::Column::Id)
            .into_model::<Applicant>()
            .all(&self.conn)
            .await?;

        Ok(applicants)
    }
}
