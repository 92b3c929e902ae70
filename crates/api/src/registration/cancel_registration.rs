use super::subscribers::RevokePassOnCancellation;
use crate::error::PassgateError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use passgate_api_structs::cancel_registration::*;
use passgate_domain::ID;
use passgate_infra::PassgateContext;
use tracing::{error, info};

pub async fn cancel_registration_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<PassgateContext>,
) -> Result<HttpResponse, PassgateError> {
    let usecase = CancelRegistrationUseCase {
        event_id: path_params.event_id,
        user_id: path_params.user_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                event_id: res.event_id,
                user_id: res.user_id,
                removed: res.removed,
            })
        })
        .map_err(PassgateError::from)
}

/// Removes a registration. Cancelling a registration that does not exist
/// succeeds, cancelling after the event is over does not.
#[derive(Debug)]
pub struct CancelRegistrationUseCase {
    pub event_id: ID,
    pub user_id: i64,
}

#[derive(Debug, PartialEq)]
pub struct CancelledRegistration {
    pub event_id: ID,
    pub user_id: i64,
    pub removed: bool,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EventNotFound(ID),
    EventOver(ID),
    StorageError,
}

impl From<UseCaseError> for PassgateError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EventNotFound(event_id) => Self::NotFound(format!(
                "The event with id: {}, was not found.",
                event_id
            )),
            UseCaseError::EventOver(event_id) => Self::Conflict(format!(
                "The event with id: {} is over, registrations can no longer be cancelled.",
                event_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for CancelRegistrationUseCase {
    type Response = CancelledRegistration;

    type Error = UseCaseError;

    const NAME: &'static str = "CancelRegistration";

    fn is_expected_error(e: &Self::Error) -> bool {
        matches!(e, UseCaseError::EventOver(_))
    }

    async fn execute(&mut self, ctx: &PassgateContext) -> Result<Self::Response, Self::Error> {
        let storage_error = |e: anyhow::Error| {
            error!("Registration storage failure: {:?}", e);
            UseCaseError::StorageError
        };

        let event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .map_err(storage_error)?
            .ok_or(UseCaseError::EventNotFound(self.event_id))?;
        if event.is_over(ctx.sys.now()) {
            return Err(UseCaseError::EventOver(event.id));
        }

        let removed = ctx
            .repos
            .registrations
            .delete(&event.id, self.user_id)
            .await
            .map_err(storage_error)?;
        if removed {
            info!(
                "Member {} cancelled the registration for event {}",
                self.user_id, event.id
            );
        }

        Ok(CancelledRegistration {
            event_id: event.id,
            user_id: self.user_id,
            removed,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(RevokePassOnCancellation)]
    }
}
