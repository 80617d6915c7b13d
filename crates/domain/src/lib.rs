mod dispatch;
mod notification;
mod reminder;
mod reply;
mod shared;

pub use dispatch::{resolve_due_work, DueSet, MalformedReminder, WorkItem};
pub use notification::{email_content, escape_markup, sms_body, voice_twiml, EmailContent};
pub use reminder::{
    trash_cutoff, ContactMethod, Reminder, UnknownContactMethod, TRASH_RETENTION_DAYS,
};
pub use reply::{is_completion_reply, ReplyOutcome};
pub use shared::entity::{Entity, InvalidIDError, ID};
