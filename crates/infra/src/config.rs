use std::{str::FromStr, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Caller id used for both SMS and voice calls
    pub phone_number: String,
}

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// How often the dispatch loop polls the store for due reminders
    pub poll_interval: Duration,
    /// Upper bound for a single provider call. A send exceeding it counts
    /// as failed and is retried on the next poll.
    pub send_timeout: Duration,
    /// Maximum number of work items in flight during one poll
    pub dispatch_concurrency: usize,
    /// How often reminders that expired in the trash are removed
    pub trash_sweep_interval: Duration,
    /// Apply the bundled migrations before starting
    pub run_migrations: bool,
    pub resend: Option<ResendConfig>,
    pub twilio: Option<TwilioConfig>,
}

const DEFAULT_PORT: usize = 5000;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 20;
const DEFAULT_DISPATCH_CONCURRENCY: usize = 8;
const DEFAULT_TRASH_SWEEP_INTERVAL_SECS: u64 = 60 * 60;
const DEFAULT_EMAIL_FROM: &str = "LaterDate <onboarding@resend.dev>";

fn env_or_default<T: FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => parse_or_default(key, &value, default),
        Err(_) => default,
    }
}

fn parse_or_default<T: FromStr + std::fmt::Display + Copy>(key: &str, value: &str, default: T) -> T {
    match value.trim().parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(
                "The given {}: {} is not valid, falling back to the default: {}.",
                key, value, default
            );
            default
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn new() -> Self {
        let port = env_or_default("PORT", DEFAULT_PORT);
        let poll_interval_secs = env_or_default("REMINDER_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS);
        let send_timeout_secs = env_or_default("REMINDER_SEND_TIMEOUT_SECS", DEFAULT_SEND_TIMEOUT_SECS);
        let dispatch_concurrency =
            env_or_default("REMINDER_DISPATCH_CONCURRENCY", DEFAULT_DISPATCH_CONCURRENCY);
        let trash_sweep_interval_secs =
            env_or_default("TRASH_SWEEP_INTERVAL_SECS", DEFAULT_TRASH_SWEEP_INTERVAL_SECS);
        let run_migrations = env_or_default("RUN_MIGRATIONS", false);

        let resend = non_empty_env("RESEND_API_KEY").map(|api_key| ResendConfig {
            api_key,
            from: non_empty_env("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.into()),
        });
        if resend.is_none() {
            warn!("Did not find RESEND_API_KEY environment variable. Email reminders will not be sent.");
        }

        let twilio = match (
            non_empty_env("TWILIO_ACCOUNT_SID"),
            non_empty_env("TWILIO_AUTH_TOKEN"),
            non_empty_env("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(phone_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                phone_number,
            }),
            _ => {
                warn!("TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_PHONE_NUMBER must all be set. SMS and voice reminders will not be sent.");
                None
            }
        };

        let config = Self {
            port,
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
            send_timeout: Duration::from_secs(send_timeout_secs.max(1)),
            dispatch_concurrency: dispatch_concurrency.max(1),
            trash_sweep_interval: Duration::from_secs(trash_sweep_interval_secs.max(1)),
            run_migrations,
            resend,
            twilio,
        };
        info!(
            "Polling for due reminders every {:?} with a send timeout of {:?}",
            config.poll_interval, config.send_timeout
        );
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
