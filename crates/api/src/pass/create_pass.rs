use crate::error::PassgateError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use passgate_api_structs::create_pass::*;
use passgate_domain::{Pass, PassType, Requester, ID};
use passgate_infra::PassgateContext;
use tracing::error;

pub async fn create_pass_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PassgateContext>,
) -> Result<HttpResponse, PassgateError> {
    let body = body.0;
    let usecase = CreatePassUseCase {
        event_id: path_params.event_id,
        user_id: body.user_id,
        pass_type: body.pass_type.unwrap_or(PassType::ApiGranted),
        requester: body.requester,
        reason: body.reason,
        scheduled_at: body.scheduled_at,
    };

    execute(usecase, &ctx)
        .await
        .map(|pass| HttpResponse::Created().json(APIResponse::new(pass)))
        .map_err(PassgateError::from)
}

/// Creates a pending pass unless the member already has one for the event
#[derive(Debug)]
pub struct CreatePassUseCase {
    pub event_id: ID,
    pub user_id: i64,
    pub pass_type: PassType,
    pub requester: Requester,
    pub reason: String,
    /// Defaults to now
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EventNotFound(ID),
    DuplicatePass { event_id: ID, user_id: i64 },
    StorageError,
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotFound(event_id) => {
                write!(f, "The event with id: {}, was not found.", event_id)
            }
            Self::DuplicatePass { event_id, user_id } => write!(
                f,
                "The member: {} already has a pass for the event: {}.",
                user_id, event_id
            ),
            Self::StorageError => write!(f, "Internal server error"),
        }
    }
}

impl From<UseCaseError> for PassgateError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EventNotFound(_) => Self::NotFound(e.to_string()),
            UseCaseError::DuplicatePass { .. } => Self::Conflict(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for CreatePassUseCase {
    type Response = Pass;

    type Error = UseCaseError;

    const NAME: &'static str = "CreatePass";

    fn is_expected_error(e: &Self::Error) -> bool {
        matches!(e, UseCaseError::DuplicatePass { .. })
    }

    async fn execute(&mut self, ctx: &PassgateContext) -> Result<Self::Response, Self::Error> {
        let storage_error = |e: anyhow::Error| {
            error!("Pass storage failure: {:?}", e);
            UseCaseError::StorageError
        };

        let event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .map_err(storage_error)?
            .ok_or(UseCaseError::EventNotFound(self.event_id))?;

        let duplicate = UseCaseError::DuplicatePass {
            event_id: event.id,
            user_id: self.user_id,
        };
        if ctx
            .repos
            .passes
            .find_active(&event.id, self.user_id)
            .await
            .map_err(storage_error)?
            .is_some()
        {
            return Err(duplicate);
        }

        let pass = Pass::new(
            event.id,
            self.user_id,
            self.pass_type,
            self.requester.clone(),
            self.reason.clone(),
            self.scheduled_at.unwrap_or_else(|| ctx.sys.now()),
        );
        // A concurrent create for the same pair may have won since the check
        let inserted = ctx
            .repos
            .passes
            .insert_if_absent(&pass)
            .await
            .map_err(storage_error)?;
        if !inserted {
            return Err(duplicate);
        }

        Ok(pass)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::*;
    use passgate_domain::PassStatus;

    fn usecase(event_id: ID, user_id: i64) -> CreatePassUseCase {
        CreatePassUseCase {
            event_id,
            user_id,
            pass_type: PassType::ApiGranted,
            requester: Requester::admin(99),
            reason: "Speaker".into(),
            scheduled_at: None,
        }
    }

    #[actix_web::main]
    #[test]
    async fn creates_pending_pass_scheduled_now() {
        let TestContext { ctx, sys, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;

        let pass = usecase(event.id, 1).execute(&ctx).await.unwrap();

        assert_eq!(pass.status, PassStatus::Pending);
        assert_eq!(pass.scheduled_at, sys.now());
        assert_eq!(pass.requester, Requester::admin(99));
    }

    #[actix_web::main]
    #[test]
    async fn second_pass_for_same_member_is_duplicate() {
        let TestContext { ctx, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;

        assert!(usecase(event.id, 1).execute(&ctx).await.is_ok());
        let res = usecase(event.id, 1).execute(&ctx).await;
        assert_eq!(
            res.unwrap_err(),
            UseCaseError::DuplicatePass {
                event_id: event.id,
                user_id: 1
            }
        );
        let due = ctx
            .repos
            .passes
            .find_due_unsent(ctx.sys.now())
            .await
            .unwrap();
        assert_eq!(due.len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn sent_pass_still_blocks_a_new_one() {
        let TestContext { ctx, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        let pass = usecase(event.id, 1).execute(&ctx).await.unwrap();
        ctx.repos
            .passes
            .mark_sent(&[pass.id], ctx.sys.now(), true, true)
            .await
            .unwrap();

        assert!(matches!(
            usecase(event.id, 1).execute(&ctx).await,
            Err(UseCaseError::DuplicatePass { .. })
        ));
    }

    #[actix_web::main]
    #[test]
    async fn rejects_unknown_event() {
        let TestContext { ctx, .. } = setup();
        let event_id = ID::new();
        assert_eq!(
            usecase(event_id, 1).execute(&ctx).await.unwrap_err(),
            UseCaseError::EventNotFound(event_id)
        );
    }

    #[test]
    fn duplicates_are_an_expected_outcome() {
        assert!(CreatePassUseCase::is_expected_error(
            &UseCaseError::DuplicatePass {
                event_id: ID::new(),
                user_id: 1,
            }
        ));
        assert!(!CreatePassUseCase::is_expected_error(
            &UseCaseError::StorageError
        ));
        assert!(!CreatePassUseCase::is_expected_error(
            &UseCaseError::EventNotFound(ID::new())
        ));
    }
}
