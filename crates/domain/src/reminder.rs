use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Duration, Utc};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Reminders in the trash older than this are removed for good
pub const TRASH_RETENTION_DAYS: i64 = 30;

/// A channel through which a `Reminder` can reach its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactMethod {
    Email,
    Sms,
    Voice,
}

impl ContactMethod {
    pub const ALL: [ContactMethod; 3] = [Self::Email, Self::Sms, Self::Voice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Voice => "voice",
        }
    }
}

impl Display for ContactMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown contact method: `{0}`")]
pub struct UnknownContactMethod(pub String);

impl FromStr for ContactMethod {
    type Err = UnknownContactMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "voice" => Ok(Self::Voice),
            other => Err(UnknownContactMethod(other.to_string())),
        }
    }
}

/// A `Reminder` is created by its owner on the dashboard and should reach
/// the owner through every selected `ContactMethod` once `due_at` has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    /// The user that created this `Reminder`
    pub owner: String,
    pub title: String,
    pub message: String,
    pub category: String,
    /// Point in time at which the `Reminder` should fire
    pub due_at: DateTime<Utc>,
    /// `None` when the stored record has no contact methods at all
    pub contact_methods: Option<Vec<ContactMethod>>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// Set by the owner (or by an inbound "done" reply), a completed
    /// `Reminder` is never dispatched
    pub completed: bool,
    /// Soft delete marker
    pub deleted_at: Option<DateTime<Utc>>,
    pub sms_sent: bool,
    pub email_sent: bool,
    pub call_sent: bool,
}

impl Reminder {
    pub fn new(owner: impl Into<String>, title: impl Into<String>, due_at: DateTime<Utc>) -> Self {
        Self {
            id: Default::default(),
            owner: owner.into(),
            title: title.into(),
            message: String::new(),
            category: String::new(),
            due_at,
            contact_methods: Some(Vec::new()),
            contact_email: None,
            contact_phone: None,
            completed: false,
            deleted_at: None,
            sms_sent: false,
            email_sent: false,
            call_sent: false,
        }
    }

    /// Whether the dispatch loop should look at this `Reminder` at `now`
    pub fn is_dispatch_candidate(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deleted_at.is_none() && self.due_at <= now
    }

    pub fn is_sent(&self, channel: ContactMethod) -> bool {
        match channel {
            ContactMethod::Email => self.email_sent,
            ContactMethod::Sms => self.sms_sent,
            ContactMethod::Voice => self.call_sent,
        }
    }

    pub fn mark_sent(&mut self, channel: ContactMethod) {
        match channel {
            ContactMethod::Email => self.email_sent = true,
            ContactMethod::Sms => self.sms_sent = true,
            ContactMethod::Voice => self.call_sent = true,
        }
    }

    /// The non empty destination address used by `channel`
    pub fn destination(&self, channel: ContactMethod) -> Option<&str> {
        let destination = match channel {
            ContactMethod::Email => self.contact_email.as_deref(),
            ContactMethod::Sms | ContactMethod::Voice => self.contact_phone.as_deref(),
        };
        destination.map(str::trim).filter(|d| !d.is_empty())
    }

    /// Whether the `Reminder` was soft deleted before `cutoff`
    pub fn is_trashed_before(&self, cutoff: DateTime<Utc>) -> bool {
        match self.deleted_at {
            Some(deleted_at) => deleted_at < cutoff,
            None => false,
        }
    }
}

impl Entity<ID> for Reminder {
    fn id(&self) -> ID {
        self.id
    }
}

/// Reminders deleted before the returned instant are expired
pub fn trash_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(TRASH_RETENTION_DAYS)
}
