use crate::shared::usecase::UseCase;
use actix_web::rt::time::timeout;
use futures::{stream, StreamExt};
use laterdate_domain::{resolve_due_work, MalformedReminder, WorkItem};
use laterdate_infra::{LaterDateContext, SendError, SendReceipt, StoreError};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Sends every due (reminder, channel) pair that has not been sent yet and
/// records the per channel sent flag after each successful send.
#[derive(Debug)]
pub struct DispatchDueRemindersUseCase;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Reminders returned by the store for this poll
    pub candidates: usize,
    pub sent: usize,
    pub failed: usize,
    /// Sends that succeeded but whose sent flag could not be stored.
    /// These will be sent again on the next poll.
    pub unrecorded: usize,
    pub malformed: usize,
}

#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error("Unable to fetch due reminders, will retry on the next poll. {0}")]
    StoreQuery(StoreError),
    #[error("Unable to fetch due reminders, will retry on the next poll. {0}")]
    SchemaMismatch(StoreError),
}

impl From<StoreError> for UseCaseError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SchemaMismatch { .. } => Self::SchemaMismatch(e),
            StoreError::Query(_) => Self::StoreQuery(e),
        }
    }
}

enum WorkItemOutcome {
    Sent,
    Failed,
    Unrecorded,
}

fn log_malformed(malformed: &MalformedReminder) {
    match malformed {
        MalformedReminder::MissingContactMethods(id) => {
            warn!(reminder_id = %id, "Skipping malformed reminder: {}", malformed)
        }
        MalformedReminder::MissingDestination { id, channel } => {
            warn!(reminder_id = %id, channel = %channel, "Skipping malformed reminder: {}", malformed)
        }
    }
}

/// Sends one work item and stores its sent flag. A crash between the two
/// steps means the item is sent again on the next poll.
async fn dispatch_work_item(item: WorkItem<'_>, ctx: &LaterDateContext) -> WorkItemOutcome {
    let reminder_id = item.reminder.id;
    let channel = item.channel;
    let sender = ctx.senders.get(channel);
    debug_assert_eq!(sender.channel(), channel);

    let send_timeout = ctx.config.send_timeout;
    let res: Result<SendReceipt, SendError> = match timeout(send_timeout, sender.send(item.reminder)).await {
        Ok(res) => res,
        Err(_) => Err(SendError::Timeout(send_timeout)),
    };

    let receipt = match res {
        Ok(receipt) => receipt,
        Err(e) => {
            error!(
                reminder_id = %reminder_id,
                channel = %channel,
                "Failed to send reminder, will retry on the next poll: {}",
                e
            );
            return WorkItemOutcome::Failed;
        }
    };
    info!(
        reminder_id = %reminder_id,
        channel = %channel,
        provider_id = %receipt.provider_id,
        "Sent reminder"
    );

    match ctx
        .repos
        .reminders
        .mark_channel_sent(&reminder_id, channel)
        .await
    {
        Ok(()) => WorkItemOutcome::Sent,
        Err(e) => {
            error!(
                reminder_id = %reminder_id,
                channel = %channel,
                "Reminder was sent but the sent flag could not be stored, it may be sent again. Err: {:?}",
                e
            );
            WorkItemOutcome::Unrecorded
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DispatchDueRemindersUseCase {
    type Response = DispatchReport;

    type Error = UseCaseError;

    const NAME: &'static str = "DispatchDueReminders";

    async fn execute(&mut self, ctx: &LaterDateContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();

        let candidates = ctx.repos.reminders.find_due_candidates(now).await?;

        let due_set = resolve_due_work(&candidates, now);
        due_set.malformed.iter().for_each(log_malformed);

        let mut report = DispatchReport {
            candidates: candidates.len(),
            malformed: due_set.malformed.len(),
            ..Default::default()
        };

        let outcomes = stream::iter(due_set.items)
            .map(|item| dispatch_work_item(item, ctx))
            .buffer_unordered(ctx.config.dispatch_concurrency)
            .collect::<Vec<_>>()
            .await;

        for outcome in outcomes {
            match outcome {
                WorkItemOutcome::Sent => report.sent += 1,
                WorkItemOutcome::Failed => report.failed += 1,
                WorkItemOutcome::Unrecorded => report.unrecorded += 1,
            }
        }

        if report.sent + report.failed + report.unrecorded > 0 {
            info!("Dispatched due reminders: {:?}", report);
        } else {
            debug!("No reminders to dispatch: {:?}", report);
        }

        Ok(report)
    }
}
