use super::{read_response, ITelephonyProvider, ProviderError};
use reqwest::Client;
use serde::Deserialize;

const TWILIO_API_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

pub struct TwilioApi {
    client: Client,
    account_sid: String,
    auth_token: String,
}

impl TwilioApi {
    pub fn new(account_sid: String, auth_token: String) -> Self {
        Self {
            client: Client::new(),
            account_sid,
            auth_token,
        }
    }

    async fn create(&self, resource: &str, form: &[(&str, &str)]) -> Result<String, ProviderError> {
        let res = self
            .client
            .post(format!(
                "{}/Accounts/{}/{}.json",
                TWILIO_API_BASE_URL, self.account_sid, resource
            ))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(form)
            .send()
            .await?;

        read_response::<TwilioResource>(res).await.map(|r| r.sid)
    }
}

#[derive(Debug, Deserialize)]
struct TwilioResource {
    sid: String,
}

#[async_trait::async_trait]
impl ITelephonyProvider for TwilioApi {
    async fn send_sms(&self, from: &str, to: &str, body: &str) -> Result<String, ProviderError> {
        self.create("Messages", &[("From", from), ("To", to), ("Body", body)])
            .await
    }

    async fn send_call(&self, from: &str, to: &str, twiml: &str) -> Result<String, ProviderError> {
        self.create("Calls", &[("From", from), ("To", to), ("Twiml", twiml)])
            .await
    }
}
