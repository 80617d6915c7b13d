use crate::{
    reminder::{ContactMethod, Reminder},
    shared::entity::ID,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// A single notification that still has to go out: `reminder` through `channel`
#[derive(Debug, Clone, Copy)]
pub struct WorkItem<'a> {
    pub reminder: &'a Reminder,
    pub channel: ContactMethod,
}

impl<'a> WorkItem<'a> {
    pub fn key(&self) -> (ID, ContactMethod) {
        (self.reminder.id, self.channel)
    }
}

/// A due `Reminder` that cannot be dispatched on some channel because the
/// stored record is incomplete. It stays a candidate until fixed externally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedReminder {
    #[error("Reminder {0} has no contact methods")]
    MissingContactMethods(ID),
    #[error("Reminder {id} selects {channel} but has no destination for it")]
    MissingDestination { id: ID, channel: ContactMethod },
}

#[derive(Debug, Default)]
pub struct DueSet<'a> {
    pub items: Vec<WorkItem<'a>>,
    pub malformed: Vec<MalformedReminder>,
}

/// Computes which (reminder, channel) pairs still need a send at `now`.
///
/// Candidates that are completed, deleted or not yet due are skipped. Channels
/// whose sent flag is set are never returned again. The output keeps the order
/// of `candidates` and, within a reminder, the order of its contact methods.
pub fn resolve_due_work(candidates: &[Reminder], now: DateTime<Utc>) -> DueSet<'_> {
    let mut due_set = DueSet::default();

    for reminder in candidates {
        if !reminder.is_dispatch_candidate(now) {
            continue;
        }

        let methods = match &reminder.contact_methods {
            Some(methods) if !methods.is_empty() => methods,
            _ => {
                due_set
                    .malformed
                    .push(MalformedReminder::MissingContactMethods(reminder.id));
                continue;
            }
        };

        let mut seen: Vec<ContactMethod> = Vec::with_capacity(methods.len());
        for channel in methods.iter().copied() {
            if seen.contains(&channel) {
                continue;
            }
            seen.push(channel);

            if reminder.is_sent(channel) {
                continue;
            }
            if reminder.destination(channel).is_none() {
                due_set.malformed.push(MalformedReminder::MissingDestination {
                    id: reminder.id,
                    channel,
                });
                continue;
            }
            due_set.items.push(WorkItem { reminder, channel });
        }
    }

    due_set
}
