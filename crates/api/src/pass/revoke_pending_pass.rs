use crate::shared::usecase::UseCase;
use passgate_domain::{Pass, ID};
use passgate_infra::PassgateContext;
use tracing::{error, info};

/// Removes the member's pass for the event while it has not been sent yet
#[derive(Debug)]
pub struct RevokePendingPassUseCase {
    pub event_id: ID,
    pub user_id: i64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for RevokePendingPassUseCase {
    type Response = Option<Pass>;

    type Error = UseCaseError;

    const NAME: &'static str = "RevokePendingPass";

    async fn execute(&mut self, ctx: &PassgateContext) -> Result<Self::Response, Self::Error> {
        let revoked = ctx
            .repos
            .passes
            .delete_pending(&self.event_id, self.user_id)
            .await
            .map_err(|e| {
                error!("Unable to revoke pass: {:?}", e);
                UseCaseError::StorageError
            })?;
        if let Some(pass) = &revoked {
            info!("Revoked pending pass {}", pass.id);
        }
        Ok(revoked)
    }
}
