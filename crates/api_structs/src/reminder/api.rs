use serde::{Deserialize, Serialize};

pub mod receive_sms_reply {
    use super::*;

    /// Form fields posted by Twilio for an inbound SMS. Every other field
    /// of the webhook is ignored.
    #[derive(Debug, Deserialize, Serialize)]
    pub struct RequestBody {
        #[serde(rename = "From", default)]
        pub from: String,
        #[serde(rename = "Body", default)]
        pub body: String,
    }
}
