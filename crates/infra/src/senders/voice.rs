use super::{IChannelSender, SendError, SendReceipt};
use crate::services::ITelephonyProvider;
use laterdate_domain::{voice_twiml, ContactMethod, Reminder};
use std::sync::Arc;

pub struct VoiceSender {
    provider: Arc<dyn ITelephonyProvider>,
    from: String,
}

impl VoiceSender {
    pub fn new(provider: Arc<dyn ITelephonyProvider>, from: String) -> Self {
        Self { provider, from }
    }
}

#[async_trait::async_trait]
impl IChannelSender for VoiceSender {
    fn channel(&self) -> ContactMethod {
        ContactMethod::Voice
    }

    async fn send(&self, reminder: &Reminder) -> Result<SendReceipt, SendError> {
        let to = reminder
            .destination(ContactMethod::Voice)
            .ok_or(SendError::MissingDestination(ContactMethod::Voice))?;

        let provider_id = self
            .provider
            .send_call(&self.from, to, &voice_twiml(reminder))
            .await?;
        Ok(SendReceipt { provider_id })
    }
}
