//! Class entity: the catalog entry that owns one or more sessions.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub room_number: String,
    pub room_name: String,
    /// Path of the uploaded syllabus, relative to the uploads directory.
    pub syllabus_pdf_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
    #[sea_orm(has_many = "super::class_instructor::Entity")]
    ClassInstructor,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::class_instructor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassInstructor.def()
    }
}

impl Related<super::instructor::Entity> for Entity {
    fn to() -> RelationDef {
        super::class_instructor::Relation::Instructor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::class_instructor::Relation::Class.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
