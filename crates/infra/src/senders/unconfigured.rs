use super::{IChannelSender, SendError, SendReceipt};
use laterdate_domain::{ContactMethod, Reminder};

/// Stands in for a channel whose provider credentials are missing
pub struct UnconfiguredSender {
    channel: ContactMethod,
}

impl UnconfiguredSender {
    pub fn new(channel: ContactMethod) -> Self {
        Self { channel }
    }
}

#[async_trait::async_trait]
impl IChannelSender for UnconfiguredSender {
    fn channel(&self) -> ContactMethod {
        self.channel
    }

    async fn send(&self, _reminder: &Reminder) -> Result<SendReceipt, SendError> {
        Err(SendError::NotConfigured(self.channel))
    }
}
