use crate::error::ApiError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{http::header, web, HttpResponse};
use laterdate_api_structs::receive_sms_reply::RequestBody;
use laterdate_domain::{escape_markup, is_completion_reply, ReplyOutcome};
use laterdate_infra::LaterDateContext;
use thiserror::Error;
use tracing::info;

fn messaging_response(outcome: ReplyOutcome) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>{}</Message></Response>"#,
        escape_markup(outcome.message())
    )
}

pub async fn complete_reminder_by_reply_controller(
    ctx: web::Data<LaterDateContext>,
    body: web::Form<RequestBody>,
) -> Result<HttpResponse, ApiError> {
    let body = body.0;
    let usecase = CompleteReminderByReplyUseCase {
        from: body.from,
        body: body.body,
    };

    execute(usecase, &ctx)
        .await
        .map(|outcome| {
            HttpResponse::Ok()
                .insert_header((header::CONTENT_TYPE, "text/xml"))
                .body(messaging_response(outcome))
        })
        .map_err(ApiError::from)
}

/// Completes the latest incomplete reminder of the phone number that
/// replied DONE to an SMS reminder
#[derive(Debug)]
pub struct CompleteReminderByReplyUseCase {
    pub from: String,
    pub body: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum UseCaseError {
    #[error("Unable to complete reminder by reply: {0}")]
    StorageError(String),
}

impl From<UseCaseError> for ApiError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CompleteReminderByReplyUseCase {
    type Response = ReplyOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "CompleteReminderByReply";

    async fn execute(&mut self, ctx: &LaterDateContext) -> Result<Self::Response, Self::Error> {
        if !is_completion_reply(&self.body) {
            return Ok(ReplyOutcome::NotUnderstood);
        }
        // No reminder can match a missing sender number
        let phone = self.from.trim();
        if phone.is_empty() {
            return Ok(ReplyOutcome::NoIncompleteReminder);
        }

        let reminder = match ctx
            .repos
            .reminders
            .find_latest_incomplete_by_phone(phone)
            .await
            .map_err(|e| UseCaseError::StorageError(format!("{:#}", e)))?
        {
            Some(reminder) => reminder,
            None => return Ok(ReplyOutcome::NoIncompleteReminder),
        };

        ctx.repos
            .reminders
            .mark_completed(&reminder.id)
            .await
            .map_err(|e| {
                UseCaseError::StorageError(format!("reminder {}: {:#}", reminder.id, e))
            })?;
        info!(reminder_id = %reminder.id, "Reminder completed by SMS reply");

        Ok(ReplyOutcome::Completed)
    }
}
