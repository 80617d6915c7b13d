use crate::{
    reminder::{
        dispatch_due_reminders::DispatchDueRemindersUseCase,
        purge_trashed_reminders::PurgeTrashedRemindersUseCase,
    },
    shared::usecase::execute,
};
use actix_web::rt::time::interval;
use laterdate_infra::LaterDateContext;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Polls the store for due reminders. The first poll runs immediately and a
/// poll never starts before the previous one has finished.
pub fn start_dispatch_job(ctx: LaterDateContext) {
    actix_web::rt::spawn(async move {
        info!("Dispatching due reminders every {:?}", ctx.config.poll_interval);
        let mut interval = interval(ctx.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            // Errors are logged by the usecase and the next tick retries
            let _ = execute(DispatchDueRemindersUseCase, &ctx).await;
        }
    });
}

pub fn start_trash_sweep_job(ctx: LaterDateContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(ctx.config.trash_sweep_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let _ = execute(PurgeTrashedRemindersUseCase, &ctx).await;
        }
    });
}
