use super::{IReminderRepo, StoreError};
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use chrono::{DateTime, Utc};
use laterdate_domain::{ContactMethod, Reminder, ID};

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(vec![]),
        }
    }
}

impl Default for InMemoryReminderRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_due_candidates(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
        Ok(find_by(&self.reminders, |r| !r.completed && r.due_at <= now))
    }

    async fn mark_channel_sent(
        &self,
        reminder_id: &ID,
        channel: ContactMethod,
    ) -> anyhow::Result<()> {
        if update(reminder_id, &self.reminders, |r| r.mark_sent(channel)) {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Reminder {} was not found", reminder_id))
        }
    }

    async fn find_latest_incomplete_by_phone(
        &self,
        phone: &str,
    ) -> anyhow::Result<Option<Reminder>> {
        let reminders = find_by(&self.reminders, |r| {
            !r.completed && r.deleted_at.is_none() && r.contact_phone.as_deref() == Some(phone)
        });
        Ok(reminders
            .into_iter()
            .max_by_key(|r| (r.due_at, r.id.inner())))
    }

    async fn mark_completed(&self, reminder_id: &ID) -> anyhow::Result<()> {
        if update(reminder_id, &self.reminders, |r| r.completed = true) {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Reminder {} was not found", reminder_id))
        }
    }

    async fn delete_trashed_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.reminders, |r| r.is_trashed_before(cutoff)))
    }
}
