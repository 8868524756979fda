//! Time source for `registered_at` stamps.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::DbErr;
use time::OffsetDateTime;

/// Supplies the current instant to the engine.
///
/// Swapped out in tests to pin `registered_at` values.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

// Converts time::OffsetDateTime into sea_orm's chrono-based DateTimeWithTimeZone
pub(crate) fn to_db_timestamp(at: OffsetDateTime) -> Result<DateTimeWithTimeZone, DbErr> {
    chrono::DateTime::from_timestamp(at.unix_timestamp(), at.nanosecond())
        .map(Into::into)
        .ok_or_else(|| DbErr::Custom(format!("timestamp out of range: {at}")))
}
