use laterdate_api::Application;
use laterdate_domain::{ContactMethod, Reminder, ID};
use laterdate_infra::{
    Config, IChannelSender, LaterDateContext, SendError, SendReceipt, Senders,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// Sender that records every reminder it is asked to deliver
pub struct RecordingSender {
    channel: ContactMethod,
    sent: Mutex<Vec<ID>>,
}

impl RecordingSender {
    fn new(channel: ContactMethod) -> Arc<Self> {
        Arc::new(Self {
            channel,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent_to(&self) -> Vec<ID> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IChannelSender for RecordingSender {
    fn channel(&self) -> ContactMethod {
        self.channel
    }

    async fn send(&self, reminder: &Reminder) -> Result<SendReceipt, SendError> {
        self.sent.lock().unwrap().push(reminder.id);
        Ok(SendReceipt {
            provider_id: format!("{}-{}", self.channel, reminder.id),
        })
    }
}

pub struct TestApp {
    pub ctx: LaterDateContext,
    pub address: String,
    pub email: Arc<RecordingSender>,
    pub sms: Arc<RecordingSender>,
    pub voice: Arc<RecordingSender>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    /// Waits long enough for the dispatch job to have polled a few times
    pub async fn wait_for_polls(&self) {
        actix_web::rt::time::sleep(self.ctx.config.poll_interval * 6).await;
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    let config = Config {
        port: 0, // Random port
        poll_interval: Duration::from_millis(50),
        send_timeout: Duration::from_secs(1),
        dispatch_concurrency: 4,
        trash_sweep_interval: Duration::from_secs(60 * 60),
        run_migrations: false,
        resend: None,
        twilio: None,
    };
    let email = RecordingSender::new(ContactMethod::Email);
    let sms = RecordingSender::new(ContactMethod::Sms);
    let voice = RecordingSender::new(ContactMethod::Voice);
    let senders = Senders {
        email: email.clone(),
        sms: sms.clone(),
        voice: voice.clone(),
    };
    let ctx = LaterDateContext::create_inmemory(config, senders);

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        ctx,
        address,
        email,
        sms,
        voice,
    }
}
