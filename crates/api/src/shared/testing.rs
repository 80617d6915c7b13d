use chrono::{DateTime, Utc};
use laterdate_domain::{ContactMethod, Reminder, ID};
use laterdate_infra::{
    Config, DeleteResult, IChannelSender, IReminderRepo, ISys, LaterDateContext, ProviderError,
    SendError, SendReceipt, Senders, StoreError,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

pub struct StaticTimeSys(pub DateTime<Utc>);

impl ISys for StaticTimeSys {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FakeOutcome {
    Succeed,
    Fail,
    /// Never completes within the send timeout
    Hang,
}

pub struct FakeSender {
    channel: ContactMethod,
    outcome: Mutex<FakeOutcome>,
    sent: Mutex<Vec<ID>>,
}

impl FakeSender {
    pub fn new(channel: ContactMethod) -> Self {
        Self {
            channel,
            outcome: Mutex::new(FakeOutcome::Succeed),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn set_outcome(&self, outcome: FakeOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    /// Reminders that were successfully sent, in order
    pub fn sent_to(&self) -> Vec<ID> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IChannelSender for FakeSender {
    fn channel(&self) -> ContactMethod {
        self.channel
    }

    async fn send(&self, reminder: &Reminder) -> Result<SendReceipt, SendError> {
        let outcome = *self.outcome.lock().unwrap();
        match outcome {
            FakeOutcome::Succeed => {
                self.sent.lock().unwrap().push(reminder.id);
                Ok(SendReceipt {
                    provider_id: format!("{}-{}", self.channel, reminder.id),
                })
            }
            FakeOutcome::Fail => Err(SendError::Provider(ProviderError::Rejected {
                status: 503,
                message: "Provider unavailable".into(),
            })),
            FakeOutcome::Hang => {
                actix_web::rt::time::sleep(Duration::from_secs(60 * 60)).await;
                Err(SendError::Timeout(Duration::from_secs(60 * 60)))
            }
        }
    }
}

pub struct TestContext {
    pub ctx: LaterDateContext,
    pub email: Arc<FakeSender>,
    pub sms: Arc<FakeSender>,
    pub voice: Arc<FakeSender>,
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        poll_interval: Duration::from_millis(50),
        send_timeout: Duration::from_millis(200),
        dispatch_concurrency: 4,
        trash_sweep_interval: Duration::from_millis(50),
        run_migrations: false,
        resend: None,
        twilio: None,
    }
}

/// Inmemory context with fake senders and time frozen at `now`
pub fn setup_context(now: DateTime<Utc>) -> TestContext {
    let email = Arc::new(FakeSender::new(ContactMethod::Email));
    let sms = Arc::new(FakeSender::new(ContactMethod::Sms));
    let voice = Arc::new(FakeSender::new(ContactMethod::Voice));
    let senders = Senders {
        email: email.clone(),
        sms: sms.clone(),
        voice: voice.clone(),
    };
    let mut ctx = LaterDateContext::create_inmemory(test_config(), senders);
    ctx.sys = Arc::new(StaticTimeSys(now));

    TestContext {
        ctx,
        email,
        sms,
        voice,
    }
}

/// Store that fails every call
pub struct FailingReminderRepo {
    missing_column: Option<String>,
}

impl FailingReminderRepo {
    pub fn schema_mismatch(column: &str) -> Self {
        Self {
            missing_column: Some(column.to_string()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            missing_column: None,
        }
    }

    fn error(&self) -> StoreError {
        match &self.missing_column {
            Some(column) => StoreError::SchemaMismatch {
                column: column.clone(),
            },
            None => StoreError::Query(anyhow::anyhow!("connection refused")),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for FailingReminderRepo {
    async fn insert(&self, _reminder: &Reminder) -> anyhow::Result<()> {
        Err(self.error().into())
    }

    async fn find(&self, _reminder_id: &ID) -> Option<Reminder> {
        None
    }

    async fn find_due_candidates(&self, _now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
        Err(self.error())
    }

    async fn mark_channel_sent(&self, _id: &ID, _channel: ContactMethod) -> anyhow::Result<()> {
        Err(self.error().into())
    }

    async fn find_latest_incomplete_by_phone(&self, _phone: &str) -> anyhow::Result<Option<Reminder>> {
        Err(self.error().into())
    }

    async fn mark_completed(&self, _reminder_id: &ID) -> anyhow::Result<()> {
        Err(self.error().into())
    }

    async fn delete_trashed_before(&self, _cutoff: DateTime<Utc>) -> anyhow::Result<DeleteResult> {
        Err(self.error().into())
    }
}
