use crate::shared::usecase::UseCase;
use itertools::Itertools;
use passgate_infra::PassgateContext;
use tracing::{error, info, warn};

const OWNER_REMINDER_TEXT: &str = "Weekly reminder: please publish your club's events for the \
coming week and check the registrations of the current ones.";

/// Weekly message to every club owner that is not banned
#[derive(Debug)]
pub struct RemindClubOwnersUseCase;

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for RemindClubOwnersUseCase {
    /// Number of owners reached
    type Response = usize;

    type Error = UseCaseError;

    const NAME: &'static str = "RemindClubOwners";

    async fn execute(&mut self, ctx: &PassgateContext) -> Result<Self::Response, Self::Error> {
        let owner_ids = ctx
            .repos
            .club_owners
            .find_all()
            .await
            .map_err(|e| {
                error!("Unable to load club owners: {:?}", e);
                UseCaseError::StorageError
            })?
            .into_iter()
            .map(|o| o.user_id)
            .unique()
            .collect::<Vec<_>>();

        let banned = ctx
            .repos
            .members
            .find_many(&owner_ids)
            .await
            .map_err(|e| {
                error!("Unable to load club owner members: {:?}", e);
                UseCaseError::StorageError
            })?
            .into_iter()
            .filter(|m| m.is_banned)
            .map(|m| m.id)
            .collect::<Vec<_>>();

        let mut reached = 0;
        for owner_id in owner_ids.into_iter().filter(|id| !banned.contains(id)) {
            match ctx.chat.send_message(owner_id, OWNER_REMINDER_TEXT).await {
                Ok(_) => reached += 1,
                Err(e) => warn!("Unable to remind club owner {}: {:?}", owner_id, e),
            }
        }
        info!("Reminded {} club owners", reached);

        Ok(reached)
    }
}
