use crate::shared::usecase::UseCase;
use passgate_domain::{CapacityWarning, Event};
use passgate_infra::PassgateContext;
use tracing::{error, warn};

/// Tells the owners of the event's club who opted into warnings that a
/// capacity threshold was reached. Delivery is best effort.
#[derive(Debug)]
pub struct WarnClubOwnersUseCase {
    pub event: Event,
    pub warning: CapacityWarning,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

#[derive(Debug, PartialEq)]
pub struct WarningReport {
    pub delivered: usize,
    pub failed: usize,
}

fn warning_text(event: &Event, warning: &CapacityWarning) -> String {
    match warning {
        CapacityWarning::ExpectedParticipantsReached { count } => format!(
            "Event \"{}\" reached its expected number of participants ({}).",
            event.name, count
        ),
        CapacityWarning::MaxParticipantsReached { count } => format!(
            "Event \"{}\" is full: {} of {} places taken. New registrations are closed.",
            event.name, count, event.max_participants
        ),
    }
}

#[async_trait::async_trait]
impl UseCase for WarnClubOwnersUseCase {
    type Response = WarningReport;

    type Error = UseCaseError;

    const NAME: &'static str = "WarnClubOwners";

    async fn execute(&mut self, ctx: &PassgateContext) -> Result<Self::Response, Self::Error> {
        let owners = ctx
            .repos
            .club_owners
            .find_by_club(&self.event.club_id)
            .await
            .map_err(|e| {
                error!("Unable to load owners of club {}: {:?}", self.event.club_id, e);
                UseCaseError::StorageError
            })?;

        let text = warning_text(&self.event, &self.warning);
        let mut report = WarningReport {
            delivered: 0,
            failed: 0,
        };
        for owner in owners.iter().filter(|o| o.warnings) {
            match ctx.chat.send_message(owner.user_id, &text).await {
                Ok(_) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        "Unable to warn club owner {} about event {}: {:?}",
                        owner.user_id, self.event.id, e
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
