mod complete_reminder_by_reply;
pub mod dispatch_due_reminders;
pub mod purge_trashed_reminders;

use actix_web::web;
use complete_reminder_by_reply::complete_reminder_by_reply_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/twilio-webhook",
        web::post().to(complete_reminder_by_reply_controller),
    );
}
