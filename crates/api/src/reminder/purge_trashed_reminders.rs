use crate::shared::usecase::UseCase;
use laterdate_domain::trash_cutoff;
use laterdate_infra::LaterDateContext;
use thiserror::Error;
use tracing::info;

/// Hard deletes reminders that have been in the trash for longer than the
/// retention period
#[derive(Debug)]
pub struct PurgeTrashedRemindersUseCase;

#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error("Unable to delete trashed reminders: {0}")]
    StorageError(String),
}

#[async_trait::async_trait(?Send)]
impl UseCase for PurgeTrashedRemindersUseCase {
    /// Number of deleted reminders
    type Response = i64;

    type Error = UseCaseError;

    const NAME: &'static str = "PurgeTrashedReminders";

    async fn execute(&mut self, ctx: &LaterDateContext) -> Result<Self::Response, Self::Error> {
        let cutoff = trash_cutoff(ctx.sys.now());
        let res = ctx
            .repos
            .reminders
            .delete_trashed_before(cutoff)
            .await
            .map_err(|e| UseCaseError::StorageError(format!("{:#}", e)))?;

        if res.deleted_count > 0 {
            info!(
                "Deleted {} reminders that were trashed before {}",
                res.deleted_count, cutoff
            );
        }
        Ok(res.deleted_count)
    }
}
