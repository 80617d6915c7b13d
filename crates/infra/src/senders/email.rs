use super::{IChannelSender, SendError, SendReceipt};
use crate::services::{IEmailProvider, OutgoingEmail};
use laterdate_domain::{email_content, ContactMethod, Reminder};
use std::sync::Arc;

pub struct EmailSender {
    provider: Arc<dyn IEmailProvider>,
    from: String,
}

impl EmailSender {
    pub fn new(provider: Arc<dyn IEmailProvider>, from: String) -> Self {
        Self { provider, from }
    }
}

#[async_trait::async_trait]
impl IChannelSender for EmailSender {
    fn channel(&self) -> ContactMethod {
        ContactMethod::Email
    }

    async fn send(&self, reminder: &Reminder) -> Result<SendReceipt, SendError> {
        let to = reminder
            .destination(ContactMethod::Email)
            .ok_or(SendError::MissingDestination(ContactMethod::Email))?;
        let content = email_content(reminder);
        let email = OutgoingEmail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: content.subject,
            html: content.html,
        };

        let provider_id = self.provider.send_email(&email).await?;
        Ok(SendReceipt { provider_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::senders::tests::{reminder, FakeProvider};

    #[tokio::test]
    async fn sends_formatted_email_to_contact_email() {
        let provider = Arc::new(FakeProvider::new(false));
        let sender = EmailSender::new(provider.clone(), "LaterDate <hi@laterdate.app>".into());

        let receipt = sender.send(&reminder()).await.expect("To send email");
        assert_eq!(receipt.provider_id, "email_1");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (from, to, content) = &requests[0];
        assert_eq!(from, "LaterDate <hi@laterdate.app>");
        assert_eq!(to, "a@b.com");
        assert!(content.starts_with("Reminder: Take medicine\n"));
    }

    #[tokio::test]
    async fn reports_provider_failures() {
        let sender = EmailSender::new(Arc::new(FakeProvider::new(true)), "a@laterdate.app".into());
        assert!(matches!(
            sender.send(&reminder()).await,
            Err(SendError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn refuses_reminders_without_email() {
        let provider = Arc::new(FakeProvider::new(false));
        let sender = EmailSender::new(provider.clone(), "a@laterdate.app".into());
        let mut reminder = reminder();
        reminder.contact_email = None;

        assert!(matches!(
            sender.send(&reminder).await,
            Err(SendError::MissingDestination(ContactMethod::Email))
        ));
        assert!(provider.requests.lock().unwrap().is_empty());
    }
}
