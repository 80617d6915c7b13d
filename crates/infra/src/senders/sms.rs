use super::{IChannelSender, SendError, SendReceipt};
use crate::services::ITelephonyProvider;
use laterdate_domain::{sms_body, ContactMethod, Reminder};
use std::sync::Arc;

pub struct SmsSender {
    provider: Arc<dyn ITelephonyProvider>,
    from: String,
}

impl SmsSender {
    pub fn new(provider: Arc<dyn ITelephonyProvider>, from: String) -> Self {
        Self { provider, from }
    }
}

#[async_trait::async_trait]
impl IChannelSender for SmsSender {
    fn channel(&self) -> ContactMethod {
        ContactMethod::Sms
    }

    async fn send(&self, reminder: &Reminder) -> Result<SendReceipt, SendError> {
        let to = reminder
            .destination(ContactMethod::Sms)
            .ok_or(SendError::MissingDestination(ContactMethod::Sms))?;

        let provider_id = self
            .provider
            .send_sms(&self.from, to, &sms_body(reminder))
            .await?;
        Ok(SendReceipt { provider_id })
    }
}
