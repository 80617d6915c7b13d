mod email;
mod sms;
mod unconfigured;
mod voice;

pub use email::EmailSender;
pub use sms::SmsSender;
pub use unconfigured::UnconfiguredSender;
pub use voice::VoiceSender;

use crate::{
    config::Config,
    services::{ProviderError, ResendEmailApi, TwilioApi},
};
use laterdate_domain::{ContactMethod, Reminder};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

/// Proof of a successful send
#[derive(Debug, Clone, PartialEq)]
pub struct SendReceipt {
    /// Message id, message sid or call sid assigned by the provider
    pub provider_id: String,
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("No provider is configured for {0}")]
    NotConfigured(ContactMethod),
    #[error("Reminder has no destination for {0}")]
    MissingDestination(ContactMethod),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Send did not complete within {0:?}")]
    Timeout(Duration),
}

/// Delivers a `Reminder` through one `ContactMethod`.
///
/// Senders never retry. Failures are returned so that the caller can go on
/// with other work and retry on the next poll.
#[async_trait::async_trait]
pub trait IChannelSender: Send + Sync {
    fn channel(&self) -> ContactMethod;
    async fn send(&self, reminder: &Reminder) -> Result<SendReceipt, SendError>;
}

#[derive(Clone)]
pub struct Senders {
    pub email: Arc<dyn IChannelSender>,
    pub sms: Arc<dyn IChannelSender>,
    pub voice: Arc<dyn IChannelSender>,
}

impl Senders {
    pub fn from_config(config: &Config) -> Self {
        let email: Arc<dyn IChannelSender> = match &config.resend {
            Some(resend) => Arc::new(EmailSender::new(
                Arc::new(ResendEmailApi::new(resend.api_key.clone())),
                resend.from.clone(),
            )),
            None => Arc::new(UnconfiguredSender::new(ContactMethod::Email)),
        };

        let (sms, voice): (Arc<dyn IChannelSender>, Arc<dyn IChannelSender>) = match &config.twilio
        {
            Some(twilio) => {
                let api = Arc::new(TwilioApi::new(
                    twilio.account_sid.clone(),
                    twilio.auth_token.clone(),
                ));
                (
                    Arc::new(SmsSender::new(api.clone(), twilio.phone_number.clone())),
                    Arc::new(VoiceSender::new(api, twilio.phone_number.clone())),
                )
            }
            None => (
                Arc::new(UnconfiguredSender::new(ContactMethod::Sms)),
                Arc::new(UnconfiguredSender::new(ContactMethod::Voice)),
            ),
        };

        Self { email, sms, voice }
    }

    pub fn get(&self, channel: ContactMethod) -> &Arc<dyn IChannelSender> {
        match channel {
            ContactMethod::Email => &self.email,
            ContactMethod::Sms => &self.sms,
            ContactMethod::Voice => &self.voice,
        }
    }
}
