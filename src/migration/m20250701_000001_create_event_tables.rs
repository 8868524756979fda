use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250701_000001_create_event_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Users::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserProfiles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::UserId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserProfiles::StudentName).string())
                    .col(ColumnDef::new(UserProfiles::SchoolName).string())
                    .col(ColumnDef::new(UserProfiles::Grade).string())
                    .col(ColumnDef::new(UserProfiles::GuardianName).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_profiles-user_id")
                            .from(UserProfiles::Table, UserProfiles::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Classes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Classes::Name).string().not_null())
                    .col(ColumnDef::new(Classes::RoomNumber).string().not_null())
                    .col(ColumnDef::new(Classes::RoomName).string().not_null())
                    .col(ColumnDef::new(Classes::SyllabusPdfUrl).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Instructors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Instructors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Instructors::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClassInstructors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ClassInstructors::ClassId).integer().not_null())
                    .col(
                        ColumnDef::new(ClassInstructors::InstructorId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ClassInstructors::ClassId)
                            .col(ClassInstructors::InstructorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-class_instructors-class_id")
                            .from(ClassInstructors::Table, ClassInstructors::ClassId)
                            .to(Classes::Table, Classes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-class_instructors-instructor_id")
                            .from(ClassInstructors::Table, ClassInstructors::InstructorId)
                            .to(Instructors::Table, Instructors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::ClassId).integer().not_null())
                    .col(
                        ColumnDef::new(Sessions::DaySequence)
                            .integer()
                            .not_null()
                            .check(Expr::col(Sessions::DaySequence).is_in([1, 2])),
                    )
                    .col(
                        ColumnDef::new(Sessions::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::EndAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::Capacity)
                            .integer()
                            .not_null()
                            .check(Expr::col(Sessions::Capacity).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Sessions::CurrentEnrolledCount)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Sessions::CurrentEnrolledCount).gte(0)),
                    )
                    .check(
                        Expr::col(Sessions::CurrentEnrolledCount)
                            .lte(Expr::col(Sessions::Capacity)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sessions-class_id")
                            .from(Sessions::Table, Sessions::ClassId)
                            .to(Classes::Table, Classes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::SessionId).integer().not_null())
                    .col(
                        ColumnDef::new(Enrollments::UserProfileId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-session_id")
                            .from(Enrollments::Table, Enrollments::SessionId)
                            .to(Sessions::Table, Sessions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-user_profile_id")
                            .from(Enrollments::Table, Enrollments::UserProfileId)
                            .to(UserProfiles::Table, UserProfiles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-enrollments-session-profile")
                    .table(Enrollments::Table)
                    .col(Enrollments::SessionId)
                    .col(Enrollments::UserProfileId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::Value).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassInstructors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Instructors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    IsAdmin,
    CreatedAt,
}

#[derive(Iden)]
enum UserProfiles {
    Table,
    Id,
    UserId,
    StudentName,
    SchoolName,
    Grade,
    GuardianName,
}

#[derive(Iden)]
enum Classes {
    Table,
    Id,
    Name,
    RoomNumber,
    RoomName,
    SyllabusPdfUrl,
}

#[derive(Iden)]
enum Instructors {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum ClassInstructors {
    Table,
    ClassId,
    InstructorId,
}

#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    ClassId,
    DaySequence,
    StartAt,
    EndAt,
    Capacity,
    CurrentEnrolledCount,
}

#[derive(Iden)]
enum Enrollments {
    Table,
    Id,
    SessionId,
    UserProfileId,
    RegisteredAt,
}

#[derive(Iden)]
enum Settings {
    Table,
    Key,
    Value,
}
