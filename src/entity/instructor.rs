//! Instructor entity. Names are unique so class creation can find-or-create.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "instructors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::class_instructor::Entity")]
    ClassInstructor,
}

impl Related<super::class_instructor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassInstructor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
