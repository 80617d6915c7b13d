mod resend;
mod twilio;

pub use resend::ResendEmailApi;
pub use twilio::TwilioApi;

use reqwest::Response;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("[Network Error] {0}")]
    Network(#[from] reqwest::Error),
    #[error("[Unexpected Response] Provider responded with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Transactional email provider
#[async_trait::async_trait]
pub trait IEmailProvider: Send + Sync {
    /// Returns the provider message id
    async fn send_email(&self, email: &OutgoingEmail) -> Result<String, ProviderError>;
}

/// SMS and voice call provider
#[async_trait::async_trait]
pub trait ITelephonyProvider: Send + Sync {
    /// Returns the provider message sid
    async fn send_sms(&self, from: &str, to: &str, body: &str) -> Result<String, ProviderError>;
    /// Places a call that plays `twiml` and returns the provider call sid
    async fn send_call(&self, from: &str, to: &str, twiml: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Deserializes a successful response or turns the provider error body
/// into a `ProviderError`
async fn read_response<T: for<'de> Deserialize<'de>>(res: Response) -> Result<T, ProviderError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }

    let body = res.text().await?;
    let message = match serde_json::from_str::<ProviderErrorBody>(&body) {
        Ok(error_body) => error_body.message,
        Err(_) => body,
    };
    Err(ProviderError::Rejected {
        status: status.as_u16(),
        message,
    })
}
