//! Administrative catalog operations: classes, their instructors, and the
//! sessions students book.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use time::OffsetDateTime;
use tracing::info;

use crate::auth::Principal;
use crate::clock::to_db_timestamp;
use crate::entity::{class, class_instructor, instructor, session};
use crate::error::{CatalogError, NotFound};
use crate::EventStore;

/// Input for [`EventStore::create_class`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewClass {
    pub name: String,
    pub room_number: String,
    pub room_name: String,
    pub syllabus_pdf_url: Option<String>,
    /// Instructor names; blank entries are ignored.
    pub instructors: Vec<String>,
}

/// Input for [`EventStore::create_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub class_id: i32,
    pub day_sequence: i32,
    pub start_at: OffsetDateTime,
    pub end_at: OffsetDateTime,
    pub capacity: i32,
}

impl NewSession {
    fn validate(&self) -> Result<(), CatalogError> {
        if !matches!(self.day_sequence, 1 | 2) {
            return Err(CatalogError::InvalidSession("day sequence must be 1 or 2"));
        }
        if self.capacity <= 0 {
            return Err(CatalogError::InvalidSession("capacity must be positive"));
        }
        if self.start_at >= self.end_at {
            return Err(CatalogError::InvalidSession("session must end after it starts"));
        }
        Ok(())
    }
}

impl EventStore {
    /// Creates a class and links its instructors in one transaction.
    ///
    /// Instructors are matched by exact name and created when unknown.
    pub async fn create_class(
        &self,
        principal: &Principal,
        new: NewClass,
    ) -> Result<class::Model, CatalogError> {
        if !principal.is_admin() {
            return Err(CatalogError::NotAdministrator);
        }
        if new.name.trim().is_empty() {
            return Err(CatalogError::EmptyClassName);
        }

        let created = self
            .with_deadline(async {
                let txn = self.conn.begin().await?;

                let class = class::ActiveModel {
                    name: Set(new.name),
                    room_number: Set(new.room_number),
                    room_name: Set(new.room_name),
                    syllabus_pdf_url: Set(new.syllabus_pdf_url),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                for name in new.instructors.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
                    let instructor_id = find_or_create_instructor(&txn, name).await?;
                    class_instructor::Entity::insert(class_instructor::ActiveModel {
                        class_id: Set(class.id),
                        instructor_id: Set(instructor_id),
                    })
                    .on_conflict(
                        OnConflict::columns([
                            class_instructor::Column::ClassId,
                            class_instructor::Column::InstructorId,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await?;
                }

                txn.commit().await?;
                Ok::<_, CatalogError>(class)
            })
            .await?;

        info!(class_id = created.id, name = %created.name, "class created");
        Ok(created)
    }

    /// Adds a bookable session to an existing class with no seats taken.
    pub async fn create_session(
        &self,
        principal: &Principal,
        new: NewSession,
    ) -> Result<session::Model, CatalogError> {
        if !principal.is_admin() {
            return Err(CatalogError::NotAdministrator);
        }
        new.validate()?;

        let created = self
            .with_deadline(async {
                let txn = self.conn.begin().await?;

                if class::Entity::find_by_id(new.class_id).one(&txn).await?.is_none() {
                    return Err(CatalogError::NotFound(NotFound::Class(new.class_id)));
                }

                let session = session::ActiveModel {
                    class_id: Set(new.class_id),
                    day_sequence: Set(new.day_sequence),
                    start_at: Set(to_db_timestamp(new.start_at)?),
                    end_at: Set(to_db_timestamp(new.end_at)?),
                    capacity: Set(new.capacity),
                    current_enrolled_count: Set(0),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                txn.commit().await?;
                Ok::<_, CatalogError>(session)
            })
            .await?;

        info!(
            session_id = created.id,
            class_id = created.class_id,
            capacity = created.capacity,
            "session created"
        );
        Ok(created)
    }

    /// Every class, most recently created first.
    pub async fn classes(&self) -> Result<Vec<class::Model>, DbErr> {
        class::Entity::find()
            .order_by_desc(class::Column::Id)
            .all(&self.conn)
            .await
    }

    pub async fn class_by_id(&self, class_id: i32) -> Result<Option<class::Model>, DbErr> {
        class::Entity::find_by_id(class_id).one(&self.conn).await
    }

    /// Sessions of `class_id`, earliest first.
    pub async fn sessions_for_class(&self, class_id: i32) -> Result<Vec<session::Model>, DbErr> {
        session::Entity::find()
            .filter(session::Column::ClassId.eq(class_id))
            .order_by_asc(session::Column::StartAt)
            .all(&self.conn)
            .await
    }
}

async fn find_or_create_instructor(txn: &DatabaseTransaction, name: &str) -> Result<i32, DbErr> {
    if let Some(existing) = instructor::Entity::find()
        .filter(instructor::Column::Name.eq(name))
        .one(txn)
        .await?
    {
        return Ok(existing.id);
    }

    let created = instructor::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    Ok(created.id)
}
