use super::create_pass::{self, CreatePassUseCase};
use crate::error::PassgateError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use passgate_api_structs::create_passes_bulk::*;
use passgate_api_structs::dtos::{PassDTO, PassErrorDTO};
use passgate_domain::{Pass, PassType, Requester, ID};
use passgate_infra::PassgateContext;
use tracing::{error, info};

pub async fn create_passes_bulk_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PassgateContext>,
) -> Result<HttpResponse, PassgateError> {
    let body = body.0;
    let usecase = CreatePassesBulkUseCase {
        event_id: path_params.event_id,
        club_id: body.club_id,
        user_ids: body.user_ids,
        reason: body.reason,
        scheduled_at: body.scheduled_at,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                passes: res.passes.into_iter().map(PassDTO::new).collect(),
                errors: res
                    .errors
                    .into_iter()
                    .map(|(user_id, e)| PassErrorDTO {
                        user_id,
                        message: e.to_string(),
                    })
                    .collect(),
            })
        })
        .map_err(PassgateError::from)
}

/// Club owner grant for a list of members. Every member is handled on its
/// own and failures are collected instead of aborting the batch.
#[derive(Debug)]
pub struct CreatePassesBulkUseCase {
    pub event_id: ID,
    pub club_id: ID,
    pub user_ids: Vec<i64>,
    pub reason: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct BulkPassResult {
    pub passes: Vec<Pass>,
    pub errors: Vec<(i64, create_pass::UseCaseError)>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EventNotFound(ID),
    NotClubEvent { event_id: ID, club_id: ID },
    StorageError,
}

impl From<UseCaseError> for PassgateError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EventNotFound(event_id) => Self::NotFound(format!(
                "The event with id: {}, was not found.",
                event_id
            )),
            UseCaseError::NotClubEvent { event_id, club_id } => Self::BadClientData(format!(
                "The event with id: {} does not belong to the club: {}",
                event_id, club_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for CreatePassesBulkUseCase {
    type Response = BulkPassResult;

    type Error = UseCaseError;

    const NAME: &'static str = "CreatePassesBulk";

    async fn execute(&mut self, ctx: &PassgateContext) -> Result<Self::Response, Self::Error> {
        let event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .map_err(|e| {
                error!("Unable to load event {}: {:?}", self.event_id, e);
                UseCaseError::StorageError
            })?
            .ok_or(UseCaseError::EventNotFound(self.event_id))?;
        if event.club_id != self.club_id {
            return Err(UseCaseError::NotClubEvent {
                event_id: event.id,
                club_id: self.club_id,
            });
        }

        let mut res = BulkPassResult {
            passes: Vec::with_capacity(self.user_ids.len()),
            errors: Vec::new(),
        };
        for user_id in &self.user_ids {
            let usecase = CreatePassUseCase {
                event_id: event.id,
                user_id: *user_id,
                pass_type: PassType::ManualByOwner,
                requester: Requester::club(&self.club_id),
                reason: self.reason.clone(),
                scheduled_at: self.scheduled_at,
            };
            match execute(usecase, ctx).await {
                Ok(pass) => res.passes.push(pass),
                Err(e) => res.errors.push((*user_id, e)),
            }
        }
        info!(
            "Bulk grant for event {} created {} passes with {} errors",
            event.id,
            res.passes.len(),
            res.errors.len()
        );

        Ok(res)
    }
}
