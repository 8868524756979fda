//! Database entity models for class-enrollment-seaorm.
//!
//! This module contains the Sea-ORM entity definitions for every table the
//! enrollment engine reads or clears. The schema itself is created by the
//! [`Migrator`](crate::migration::Migrator) when the `migration` feature is on.
//!
//! Tables, parents first:
//!
//! | Entity               | Table               |
//! |----------------------|---------------------|
//! | [`user`]             | `users`             |
//! | [`user_profile`]     | `user_profiles`     |
//! | [`class`]            | `classes`           |
//! | [`instructor`]       | `instructors`       |
//! | [`class_instructor`] | `class_instructors` |
//! | [`session`]          | `sessions`          |
//! | [`enrollment`]       | `enrollments`       |
//! | [`setting`]          | `settings`          |

pub mod class;
pub mod class_instructor;
pub mod enrollment;
pub mod instructor;
pub mod session;
pub mod setting;
pub mod user;
pub mod user_profile;
