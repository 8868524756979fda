//! Event date settings.
//!
//! Two rows in `settings` map day sequence 1 and 2 to calendar dates. They
//! are plain strings (`YYYY-MM-DD`); formatting and parsing belong to the
//! presentation layer.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::auth::Principal;
use crate::entity::setting;
use crate::error::SettingsError;
use crate::EventStore;

pub const EVENT_DATE_1: &str = "event_date_1";
pub const EVENT_DATE_2: &str = "event_date_2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDates {
    pub day1: String,
    pub day2: String,
}

impl EventStore {
    /// Reads both event dates.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Missing`] if either row is absent.
    pub async fn event_dates(&self) -> Result<EventDates, SettingsError> {
        let rows = setting::Entity::find()
            .filter(setting::Column::Key.is_in([EVENT_DATE_1, EVENT_DATE_2]))
            .all(&self.conn)
            .await?;

        let lookup = |key: &'static str| {
            rows.iter()
                .find(|row| row.key == key)
                .map(|row| row.value.clone())
                .ok_or(SettingsError::Missing(key))
        };

        Ok(EventDates {
            day1: lookup(EVENT_DATE_1)?,
            day2: lookup(EVENT_DATE_2)?,
        })
    }

    /// Upserts both event dates. Administrators only.
    pub async fn update_event_dates(
        &self,
        principal: &Principal,
        dates: EventDates,
    ) -> Result<(), SettingsError> {
        if !principal.is_admin() {
            return Err(SettingsError::NotAdministrator);
        }

        self.with_deadline(async {
            setting::Entity::insert_many([
                setting::ActiveModel {
                    key: Set(EVENT_DATE_1.to_string()),
                    value: Set(dates.day1),
                },
                setting::ActiveModel {
                    key: Set(EVENT_DATE_2.to_string()),
                    value: Set(dates.day2),
                },
            ])
            .on_conflict(
                OnConflict::column(setting::Column::Key)
                    .update_column(setting::Column::Value)
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;
            Ok::<_, SettingsError>(())
        })
        .await
    }
}
