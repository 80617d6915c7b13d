use super::{read_response, IEmailProvider, OutgoingEmail, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const RESEND_API_BASE_URL: &str = "https://api.resend.com";

pub struct ResendEmailApi {
    client: Client,
    api_key: String,
}

impl ResendEmailApi {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[async_trait::async_trait]
impl IEmailProvider for ResendEmailApi {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<String, ProviderError> {
        let body = SendEmailRequest {
            from: &email.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };
        let res = self
            .client
            .post(format!("{}/emails", RESEND_API_BASE_URL))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        read_response::<SendEmailResponse>(res).await.map(|r| r.id)
    }
}
