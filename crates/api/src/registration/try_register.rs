use super::subscribers::{CreatePassOnAdmission, WarnClubOwnersOnAdmission};
use crate::error::PassgateError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use passgate_api_structs::try_register::*;
use passgate_domain::{
    check_subscription, ChannelMembership, DenialReason, Event, Member, Registration,
    RegistrationInsert, ID,
};
use passgate_infra::PassgateContext;
use tracing::{error, info};

pub async fn try_register_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PassgateContext>,
) -> Result<HttpResponse, PassgateError> {
    let usecase = TryRegisterUseCase {
        event_id: path_params.event_id,
        user_id: body.user_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|outcome| match outcome {
            AdmissionOutcome::Admitted(admission) => HttpResponse::Created().json(
                APIResponse::new(admission.registration, admission.registered_count),
            ),
            AdmissionOutcome::Denied(reason) => {
                HttpResponse::Conflict().json(DeniedResponse { reason })
            }
        })
        .map_err(PassgateError::from)
}

/// Decides whether a member may join an event and registers them if so
#[derive(Debug)]
pub struct TryRegisterUseCase {
    pub event_id: ID,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    pub event: Event,
    pub member: Member,
    pub registration: Registration,
    /// Registrations of the event including this one
    pub registered_count: u32,
}

/// Denials are an expected outcome, not an error
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionOutcome {
    Admitted(Admission),
    Denied(DenialReason),
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EventNotFound(ID),
    MemberNotFound(i64),
    AlreadyRegistered,
    StorageError,
    ChatUnavailable,
}

impl From<UseCaseError> for PassgateError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EventNotFound(event_id) => Self::NotFound(format!(
                "The event with id: {}, was not found.",
                event_id
            )),
            UseCaseError::MemberNotFound(user_id) => Self::NotFound(format!(
                "The member with id: {}, was not found.",
                user_id
            )),
            UseCaseError::AlreadyRegistered => {
                Self::Conflict("The member is already registered for the event".into())
            }
            UseCaseError::StorageError | UseCaseError::ChatUnavailable => Self::InternalError,
        }
    }
}

impl TryRegisterUseCase {
    async fn channel_memberships(
        &self,
        event: &Event,
        ctx: &PassgateContext,
    ) -> Result<Vec<ChannelMembership>, UseCaseError> {
        let mut memberships = Vec::with_capacity(event.gating_channels.len());
        for channel_id in &event.gating_channels {
            let status = ctx
                .chat
                .get_membership(*channel_id, self.user_id)
                .await
                .map_err(|e| {
                    error!(
                        "Unable to check membership of {} in channel {}: {:?}",
                        self.user_id, channel_id, e
                    );
                    UseCaseError::ChatUnavailable
                })?;
            memberships.push(ChannelMembership {
                channel_id: *channel_id,
                status,
            });
        }
        Ok(memberships)
    }

    fn deny(&self, reason: DenialReason) -> AdmissionOutcome {
        info!(
            "Registration of {} for event {} denied: {:?}",
            self.user_id, self.event_id, reason
        );
        AdmissionOutcome::Denied(reason)
    }
}

#[async_trait::async_trait]
impl UseCase for TryRegisterUseCase {
    type Response = AdmissionOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "TryRegister";

    fn is_expected_error(e: &Self::Error) -> bool {
        matches!(e, UseCaseError::AlreadyRegistered)
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
        let member = ctx
            .repos
            .members
            .find(self.user_id)
            .await
            .map_err(storage_error)?
            .ok_or(UseCaseError::MemberNotFound(self.user_id))?;

        if ctx
            .repos
            .registrations
            .find(&event.id, member.id)
            .await
            .map_err(storage_error)?
            .is_some()
        {
            return Err(UseCaseError::AlreadyRegistered);
        }

        let now = ctx.sys.now();
        let registered = ctx
            .repos
            .registrations
            .count(&event.id)
            .await
            .map_err(storage_error)?;
        let policy = ctx.config.admission_policy();
        if let Err(reason) = policy.precheck(&event, &member.role, registered, now) {
            return Ok(self.deny(reason));
        }

        if event.subscription_required {
            let memberships = self.channel_memberships(&event, ctx).await?;
            if let Err(reason) = check_subscription(&event, &memberships) {
                return Ok(self.deny(reason));
            }
        }

        // The count read above is only advisory, the insert is the capacity gate
        let registration = Registration::new(event.id, member.id, now);
        let registered_count = match ctx
            .repos
            .registrations
            .insert_if_capacity(&registration, event.max_participants)
            .await
            .map_err(storage_error)?
        {
            RegistrationInsert::Inserted { count } => count,
            RegistrationInsert::Full { .. } => {
                return Ok(self.deny(DenialReason::EventFull {
                    max_participants: event.max_participants,
                }))
            }
            RegistrationInsert::AlreadyRegistered => return Err(UseCaseError::AlreadyRegistered),
        };
        info!(
            "Member {} registered for event {} ({} registered)",
            member.id, event.id, registered_count
        );

        Ok(AdmissionOutcome::Admitted(Admission {
            event,
            member,
            registration,
            registered_count,
        }))
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![
            Box::new(WarnClubOwnersOnAdmission),
            Box::new(CreatePassOnAdmission),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::*;
    use chrono::Duration;
    use passgate_domain::{MembershipStatus, PassType, Role};
    use std::sync::Arc;

    fn usecase(event: &Event, user_id: i64) -> TryRegisterUseCase {
        TryRegisterUseCase {
            event_id: event.id,
            user_id,
        }
    }

    fn admitted(outcome: &AdmissionOutcome) -> bool {
        matches!(outcome, AdmissionOutcome::Admitted(_))
    }

    #[actix_web::main]
    #[test]
    async fn third_member_is_denied_when_two_places() {
        let TestContext { ctx, .. } = setup();
        let mut event = event_factory();
        event.max_participants = 2;
        insert_event(&ctx, &event).await;
        for id in 1..=3 {
            insert_member(&ctx, id, "student").await;
        }

        assert!(admitted(&usecase(&event, 1).execute(&ctx).await.unwrap()));
        assert!(admitted(&usecase(&event, 2).execute(&ctx).await.unwrap()));
        assert_eq!(
            usecase(&event, 3).execute(&ctx).await.unwrap(),
            AdmissionOutcome::Denied(DenialReason::EventFull {
                max_participants: 2
            })
        );
        assert_eq!(ctx.repos.registrations.count(&event.id).await.unwrap(), 2);
    }

    #[actix_web::main]
    #[test]
    async fn privileged_role_uses_earlier_cutoff() {
        let TestContext { ctx, sys, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "applicant").await;
        sys.set(event.start_time - Duration::hours(2));

        assert_eq!(
            usecase(&event, 1).execute(&ctx).await.unwrap(),
            AdmissionOutcome::Denied(DenialReason::RegistrationClosed {
                deadline: event.start_time - Duration::hours(3)
            })
        );
    }

    #[actix_web::main]
    #[test]
    async fn baseline_role_uses_registration_deadline() {
        let TestContext { ctx, sys, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "student").await;
        sys.set(event.start_time - Duration::hours(2));

        assert!(admitted(&usecase(&event, 1).execute(&ctx).await.unwrap()));
    }

    #[actix_web::main]
    #[test]
    async fn deadline_wins_over_every_other_reason() {
        let TestContext { ctx, sys, .. } = setup();
        let mut event = event_factory();
        event.max_participants = 1;
        event.allowed_roles = vec![Role::new("applicant")];
        event.subscription_required = true;
        event.gating_channels = vec![-100];
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "applicant").await;
        insert_member(&ctx, 2, "student").await;
        ctx.repos
            .registrations
            .insert_if_capacity(&Registration::new(event.id, 1, sys.now()), 1)
            .await
            .unwrap();
        sys.set(event.registration_deadline);

        assert!(matches!(
            usecase(&event, 2).execute(&ctx).await.unwrap(),
            AdmissionOutcome::Denied(DenialReason::RegistrationClosed { .. })
        ));
    }

    #[actix_web::main]
    #[test]
    async fn role_outside_allowlist_is_denied() {
        let TestContext { ctx, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "guest").await;

        assert_eq!(
            usecase(&event, 1).execute(&ctx).await.unwrap(),
            AdmissionOutcome::Denied(DenialReason::RoleNotAllowed {
                role: Role::new("guest")
            })
        );
    }

    #[actix_web::main]
    #[test]
    async fn missing_subscriptions_are_listed() {
        let TestContext { ctx, chat, .. } = setup();
        let mut event = event_factory();
        event.subscription_required = true;
        event.gating_channels = vec![-100, -200, -300];
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "student").await;
        chat.set_membership(-100, 1, MembershipStatus::Member);
        chat.set_membership(-200, 1, MembershipStatus::Kicked);

        assert_eq!(
            usecase(&event, 1).execute(&ctx).await.unwrap(),
            AdmissionOutcome::Denied(DenialReason::NotSubscribed {
                missing_channels: vec![-200, -300]
            })
        );

        chat.set_membership(-200, 1, MembershipStatus::Administrator);
        chat.set_membership(-300, 1, MembershipStatus::Creator);
        assert!(admitted(&usecase(&event, 1).execute(&ctx).await.unwrap()));
    }

    #[actix_web::main]
    #[test]
    async fn unreachable_chat_aborts_without_registering() {
        let TestContext { ctx, chat, .. } = setup();
        let mut event = event_factory();
        event.subscription_required = true;
        event.gating_channels = vec![-100];
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "student").await;
        chat.fail_for(-100);

        assert_eq!(
            usecase(&event, 1).execute(&ctx).await.unwrap_err(),
            UseCaseError::ChatUnavailable
        );
        assert_eq!(ctx.repos.registrations.count(&event.id).await.unwrap(), 0);
    }

    #[actix_web::main]
    #[test]
    async fn registering_twice_is_a_conflict() {
        let TestContext { ctx, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "student").await;

        assert!(admitted(&usecase(&event, 1).execute(&ctx).await.unwrap()));
        assert_eq!(
            usecase(&event, 1).execute(&ctx).await.unwrap_err(),
            UseCaseError::AlreadyRegistered
        );
    }

    #[actix_web::main]
    #[test]
    async fn admission_creates_pass_and_warns_owners() {
        let TestContext { ctx, chat, .. } = setup();
        let mut event = event_factory();
        event.pass_required = true;
        event.expected_participants = 1;
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "student").await;
        insert_owner(&ctx, event.club_id, 500, true).await;

        let outcome = execute(usecase(&event, 1), &ctx).await.unwrap();
        assert!(admitted(&outcome));

        let pass = ctx
            .repos
            .passes
            .find_active(&event.id, 1)
            .await
            .unwrap()
            .expect("pass to be created on admission");
        assert_eq!(pass.pass_type, PassType::AutoOnRegistration);
        assert_eq!(chat.deliveries_to(500).len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn excluded_roles_get_no_auto_pass() {
        let TestContext { mut ctx, .. } = setup();
        ctx.config.pass_excluded_roles = vec![Role::new("applicant")];
        let mut event = event_factory();
        event.pass_required = true;
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "applicant").await;

        assert!(admitted(&execute(usecase(&event, 1), &ctx).await.unwrap()));
        assert!(ctx
            .repos
            .passes
            .find_active(&event.id, 1)
            .await
            .unwrap()
            .is_none());
    }

    #[actix_web::main]
    #[test]
    async fn denial_has_no_side_effects() {
        let TestContext { ctx, chat, .. } = setup();
        let mut event = event_factory();
        event.pass_required = true;
        insert_event(&ctx, &event).await;
        insert_member(&ctx, 1, "guest").await;
        insert_owner(&ctx, event.club_id, 500, true).await;

        let outcome = execute(usecase(&event, 1), &ctx).await.unwrap();
        assert!(!admitted(&outcome));
        assert!(ctx
            .repos
            .passes
            .find_active(&event.id, 1)
            .await
            .unwrap()
            .is_none());
        assert!(chat.deliveries().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_admissions_never_exceed_capacity() {
        let TestContext { ctx, .. } = setup();
        let mut event = event_factory();
        event.max_participants = 10;
        insert_event(&ctx, &event).await;
        for id in 1..=100 {
            insert_member(&ctx, id, "student").await;
        }

        let ctx = Arc::new(ctx);
        let handles = (1..=100)
            .map(|user_id| {
                let ctx = ctx.clone();
                let event_id = event.id;
                tokio::spawn(async move {
                    execute(TryRegisterUseCase { event_id, user_id }, &ctx).await
                })
            })
            .collect::<Vec<_>>();

        let mut admitted_count = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                AdmissionOutcome::Admitted(_) => admitted_count += 1,
                AdmissionOutcome::Denied(reason) => assert_eq!(
                    reason,
                    DenialReason::EventFull {
                        max_participants: 10
                    }
                ),
            }
        }

        assert_eq!(admitted_count, 10);
        assert_eq!(ctx.repos.registrations.count(&event.id).await.unwrap(), 10);
    }

    #[test]
    fn registering_twice_is_an_expected_outcome() {
        assert!(TryRegisterUseCase::is_expected_error(
            &UseCaseError::AlreadyRegistered
        ));
        assert!(!TryRegisterUseCase::is_expected_error(
            &UseCaseError::ChatUnavailable
        ));
    }
}
