mod inmemory;
mod postgres;

use crate::repos::shared::repo::DeleteResult;
use chrono::{DateTime, Utc};
pub use inmemory::InMemoryReminderRepo;
use laterdate_domain::{ContactMethod, Reminder, ID};
pub use postgres::PostgresReminderRepo;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Reminder store query failed: {0:#}")]
    Query(anyhow::Error),
    #[error("Reminder store is missing column `{column}`. Apply the bundled migrations (RUN_MIGRATIONS=true) or add the column to user_reminders.")]
    SchemaMismatch { column: String },
}

/// Gateway to the reminder collection that is shared with the dashboard
#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    /// Every incomplete `Reminder` due at or before `now`, regardless of
    /// deletion or sent flags
    async fn find_due_candidates(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError>;
    /// Sets the sent flag of `channel` and nothing else
    async fn mark_channel_sent(&self, reminder_id: &ID, channel: ContactMethod)
        -> anyhow::Result<()>;
    /// The incomplete, not deleted `Reminder` for `phone` with the latest due
    /// date. Ties go to the greatest id.
    async fn find_latest_incomplete_by_phone(&self, phone: &str)
        -> anyhow::Result<Option<Reminder>>;
    async fn mark_completed(&self, reminder_id: &ID) -> anyhow::Result<()>;
    /// Hard deletes reminders that were soft deleted before `cutoff`
    async fn delete_trashed_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<DeleteResult>;
}
