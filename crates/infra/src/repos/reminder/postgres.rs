use super::{IReminderRepo, StoreError};
use crate::repos::shared::repo::DeleteResult;
use chrono::{DateTime, Utc};
use laterdate_domain::{ContactMethod, Reminder, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::warn;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Postgres error code for references to a column that does not exist
const UNDEFINED_COLUMN: &str = "42703";

const REMINDER_COLUMNS: &str = "id, user_id, title, message, category, reminder_date, \
    contact_methods, contact_email, contact_phone, completed, deleted_at, \
    sms_sent, email_sent, call_sent";

#[derive(Debug, FromRow)]
struct ReminderRaw {
    id: Uuid,
    user_id: String,
    title: Option<String>,
    message: Option<String>,
    category: Option<String>,
    reminder_date: DateTime<Utc>,
    contact_methods: Option<Vec<String>>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    completed: Option<bool>,
    deleted_at: Option<DateTime<Utc>>,
    sms_sent: Option<bool>,
    email_sent: Option<bool>,
    call_sent: Option<bool>,
}

impl From<ReminderRaw> for Reminder {
    fn from(raw: ReminderRaw) -> Self {
        let id: ID = raw.id.into();
        let contact_methods = raw.contact_methods.map(|methods| {
            methods
                .iter()
                .filter_map(|method| match method.parse::<ContactMethod>() {
                    Ok(method) => Some(method),
                    Err(e) => {
                        warn!("Ignoring contact method of reminder {}: {}", id, e);
                        None
                    }
                })
                .collect()
        });

        Reminder {
            id,
            owner: raw.user_id,
            title: raw.title.unwrap_or_default(),
            message: raw.message.unwrap_or_default(),
            category: raw.category.unwrap_or_default(),
            due_at: raw.reminder_date,
            contact_methods,
            contact_email: raw.contact_email,
            contact_phone: raw.contact_phone,
            completed: raw.completed.unwrap_or(false),
            deleted_at: raw.deleted_at,
            sms_sent: raw.sms_sent.unwrap_or(false),
            email_sent: raw.email_sent.unwrap_or(false),
            call_sent: raw.call_sent.unwrap_or(false),
        }
    }
}

fn sent_flag_column(channel: ContactMethod) -> &'static str {
    match channel {
        ContactMethod::Email => "email_sent",
        ContactMethod::Sms => "sms_sent",
        ContactMethod::Voice => "call_sent",
    }
}

fn missing_column(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::ColumnNotFound(column) => Some(column.clone()),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNDEFINED_COLUMN) => {
            // Message looks like: column "sms_sent" does not exist
            let message = db_err.message();
            let column = message
                .split('"')
                .nth(1)
                .map(|c| c.to_string())
                .unwrap_or_else(|| message.to_string());
            Some(column)
        }
        _ => None,
    }
}

fn to_store_error(e: sqlx::Error) -> StoreError {
    match missing_column(&e) {
        Some(column) => StoreError::SchemaMismatch { column },
        None => StoreError::Query(anyhow::Error::new(e)),
    }
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        let contact_methods = reminder.contact_methods.as_ref().map(|methods| {
            methods
                .iter()
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        });
        sqlx::query(
            r#"
            INSERT INTO user_reminders
            (id, user_id, title, message, category, reminder_date, contact_methods,
             contact_email, contact_phone, completed, deleted_at, sms_sent, email_sent, call_sent)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(reminder.id.inner())
        .bind(&reminder.owner)
        .bind(&reminder.title)
        .bind(&reminder.message)
        .bind(&reminder.category)
        .bind(reminder.due_at)
        .bind(contact_methods)
        .bind(&reminder.contact_email)
        .bind(&reminder.contact_phone)
        .bind(reminder.completed)
        .bind(reminder.deleted_at)
        .bind(reminder.sms_sent)
        .bind(reminder.email_sent)
        .bind(reminder.call_sent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        let query = format!("SELECT {} FROM user_reminders WHERE id = $1", REMINDER_COLUMNS);
        match sqlx::query_as::<_, ReminderRaw>(&query)
            .bind(reminder_id.inner())
            .fetch_optional(&self.pool)
            .await
        {
            Ok(reminder) => reminder.map(|r| r.into()),
            Err(e) => {
                warn!("Unable to find reminder {}. Err: {:?}", reminder_id, e);
                None
            }
        }
    }

    async fn find_due_candidates(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
        // The sent flags are selected explicitly so that an unmigrated table
        // fails even when no rows match
        let query = format!(
            r#"
            SELECT {} FROM user_reminders
            WHERE completed = false AND reminder_date <= $1
            ORDER BY reminder_date ASC, id ASC
            "#,
            REMINDER_COLUMNS
        );
        let reminders = sqlx::query_as::<_, ReminderRaw>(&query)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(to_store_error)?;

        Ok(reminders.into_iter().map(|r| r.into()).collect())
    }

    async fn mark_channel_sent(
        &self,
        reminder_id: &ID,
        channel: ContactMethod,
    ) -> anyhow::Result<()> {
        let query = format!(
            "UPDATE user_reminders SET {} = true WHERE id = $1",
            sent_flag_column(channel)
        );
        let res = sqlx::query(&query)
            .bind(reminder_id.inner())
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            anyhow::bail!("Reminder {} was not found", reminder_id);
        }
        Ok(())
    }

    async fn find_latest_incomplete_by_phone(
        &self,
        phone: &str,
    ) -> anyhow::Result<Option<Reminder>> {
        let query = format!(
            r#"
            SELECT {} FROM user_reminders
            WHERE contact_phone = $1 AND completed = false AND deleted_at IS NULL
            ORDER BY reminder_date DESC, id DESC
            LIMIT 1
            "#,
            REMINDER_COLUMNS
        );
        let reminder = sqlx::query_as::<_, ReminderRaw>(&query)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reminder.map(|r| r.into()))
    }

    async fn mark_completed(&self, reminder_id: &ID) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE user_reminders
            SET completed = true
            WHERE id = $1
            "#,
        )
        .bind(reminder_id.inner())
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            anyhow::bail!("Reminder {} was not found", reminder_id);
        }
        Ok(())
    }

    async fn delete_trashed_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM user_reminders
            WHERE deleted_at IS NOT NULL AND deleted_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sqlx::{postgres::PgPoolOptions, Executor};

    const MIGRATION: &str = include_str!("../../../migrations/20240101000000_user_reminders.sql");

    /// Gateway over a migrated `user_reminders` table in a fresh schema.
    /// Returns None when DATABASE_URL is not set.
    async fn setup_store() -> Option<(PostgresReminderRepo, PgPool, String)> {
        let connection_string = match std::env::var("DATABASE_URL") {
            Ok(conn) => conn,
            Err(_) => {
                eprintln!("DATABASE_URL is not set, skipping postgres reminder store test");
                return None;
            }
        };
        // A single connection keeps the search_path for every query
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&connection_string)
            .await
            .expect("To connect to postgres");
        let schema = format!("reminders_test_{}", ID::new().inner().simple());
        pool.execute(format!("CREATE SCHEMA {0}; SET search_path TO {0}", schema).as_str())
            .await
            .expect("To create test schema");
        pool.execute(MIGRATION).await.expect("To apply migration");

        Some((PostgresReminderRepo::new(pool.clone()), pool, schema))
    }

    async fn teardown(pool: &PgPool, schema: &str) {
        pool.execute(format!("DROP SCHEMA {} CASCADE", schema).as_str())
            .await
            .expect("To drop test schema");
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
    }

    fn reminder(due_at: DateTime<Utc>) -> Reminder {
        let mut reminder = Reminder::new("user_1", "Dentist", due_at);
        reminder.contact_methods = Some(vec![ContactMethod::Sms, ContactMethod::Email]);
        reminder.contact_phone = Some("+15550001111".into());
        reminder.contact_email = Some("a@b.com".into());
        reminder
    }

    #[tokio::test]
    async fn marking_channels_sent_updates_only_that_flag() {
        let Some((repo, pool, schema)) = setup_store().await else {
            return;
        };
        let reminder = reminder(now());
        repo.insert(&reminder).await.expect("To insert reminder");

        let (sms, email) = tokio::join!(
            repo.mark_channel_sent(&reminder.id, ContactMethod::Sms),
            repo.mark_channel_sent(&reminder.id, ContactMethod::Email),
        );
        sms.expect("To mark sms sent");
        email.expect("To mark email sent");
        repo.mark_channel_sent(&reminder.id, ContactMethod::Sms)
            .await
            .expect("To mark sms sent again");

        let stored = repo.find(&reminder.id).await.expect("To find reminder");
        assert!(stored.sms_sent);
        assert!(stored.email_sent);
        assert!(!stored.call_sent);
        assert_eq!(stored.title, reminder.title);
        assert_eq!(stored.contact_methods, reminder.contact_methods);

        assert!(repo
            .mark_channel_sent(&ID::new(), ContactMethod::Voice)
            .await
            .is_err());

        teardown(&pool, &schema).await;
    }

    #[tokio::test]
    async fn due_candidates_are_incomplete_and_due() {
        let Some((repo, pool, schema)) = setup_store().await else {
            return;
        };
        let due = reminder(now() - Duration::days(2));
        let mut deleted = reminder(now() - Duration::days(1));
        deleted.deleted_at = Some(now());
        let future = reminder(now() + Duration::minutes(1));
        let mut completed = reminder(now() - Duration::days(3));
        completed.completed = true;
        for reminder in [&due, &deleted, &future, &completed] {
            repo.insert(reminder).await.expect("To insert reminder");
        }

        let candidates = repo
            .find_due_candidates(now())
            .await
            .expect("To fetch candidates");
        let ids: Vec<_> = candidates.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![due.id, deleted.id]);

        teardown(&pool, &schema).await;
    }

    #[tokio::test]
    async fn missing_sent_flag_column_is_a_schema_mismatch() {
        let Some((repo, pool, schema)) = setup_store().await else {
            return;
        };
        pool.execute("ALTER TABLE user_reminders DROP COLUMN call_sent")
            .await
            .expect("To drop column");

        match repo.find_due_candidates(now()).await {
            Err(StoreError::SchemaMismatch { column }) => assert_eq!(column, "call_sent"),
            other => panic!("Expected schema mismatch, got {:?}", other),
        }

        teardown(&pool, &schema).await;
    }

    #[tokio::test]
    async fn reply_lookup_breaks_due_date_ties_by_id() {
        let Some((repo, pool, schema)) = setup_store().await else {
            return;
        };
        let first = reminder(now());
        let second = reminder(now());
        repo.insert(&first).await.expect("To insert reminder");
        repo.insert(&second).await.expect("To insert reminder");

        let expected = std::cmp::max(first.id.inner(), second.id.inner());
        for _ in 0..3 {
            let found = repo
                .find_latest_incomplete_by_phone("+15550001111")
                .await
                .expect("To query by phone")
                .expect("To find a reminder");
            assert_eq!(found.id.inner(), expected);
        }

        teardown(&pool, &schema).await;
    }

    #[test]
    fn maps_missing_columns_to_schema_mismatch() {
        let err = to_store_error(sqlx::Error::ColumnNotFound("call_sent".into()));
        match err {
            StoreError::SchemaMismatch { column } => assert_eq!(column, "call_sent"),
            other => panic!("Expected schema mismatch, got {:?}", other),
        }

        let err = to_store_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[test]
    fn raw_rows_default_absent_values() {
        let raw = ReminderRaw {
            id: Uuid::new_v4(),
            user_id: "user_1".into(),
            title: None,
            message: Some("Bring passport".into()),
            category: None,
            reminder_date: Utc::now(),
            contact_methods: Some(vec!["sms".into(), "carrier-pigeon".into()]),
            contact_email: None,
            contact_phone: Some("+15550001111".into()),
            completed: None,
            deleted_at: None,
            sms_sent: None,
            email_sent: Some(true),
            call_sent: None,
        };

        let reminder: Reminder = raw.into();
        assert_eq!(reminder.title, "");
        assert_eq!(reminder.contact_methods, Some(vec![ContactMethod::Sms]));
        assert!(!reminder.completed);
        assert!(!reminder.sms_sent);
        assert!(reminder.email_sent);
    }
}
