/// Outcome of an inbound SMS reply sent by the owner of a `Reminder`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Completed,
    NoIncompleteReminder,
    NotUnderstood,
}

impl ReplyOutcome {
    /// Text sent back to the owner
    pub fn message(&self) -> &'static str {
        match self {
            Self::Completed => "Reminder marked as complete",
            Self::NoIncompleteReminder => "No incomplete reminders found for your number.",
            Self::NotUnderstood => "Sorry, I did not understand your message.",
        }
    }
}

/// Whether the reply body asks to complete the latest reminder
pub fn is_completion_reply(body: &str) -> bool {
    body.trim().to_lowercase() == "done"
}
