use super::cancel_registration::{CancelRegistrationUseCase, CancelledRegistration};
use super::try_register::{AdmissionOutcome, TryRegisterUseCase};
use crate::club::warn_club_owners::WarnClubOwnersUseCase;
use crate::pass::{create_pass::CreatePassUseCase, revoke_pending_pass::RevokePendingPassUseCase};
use crate::shared::usecase::{execute, Subscriber};
use passgate_domain::{capacity_warnings, PassType, Requester};
use passgate_infra::PassgateContext;
use tracing::debug;

pub struct WarnClubOwnersOnAdmission;

#[async_trait::async_trait]
impl Subscriber<TryRegisterUseCase> for WarnClubOwnersOnAdmission {
    async fn notify(&self, e: &AdmissionOutcome, ctx: &PassgateContext) {
        let admission = match e {
            AdmissionOutcome::Admitted(admission) => admission,
            AdmissionOutcome::Denied(_) => return,
        };
        for warning in capacity_warnings(&admission.event, admission.registered_count) {
            let usecase = WarnClubOwnersUseCase {
                event: admission.event.clone(),
                warning,
            };
            // Sideeffect, ignore result
            let _ = execute(usecase, ctx).await;
        }
    }
}

pub struct CreatePassOnAdmission;

#[async_trait::async_trait]
impl Subscriber<TryRegisterUseCase> for CreatePassOnAdmission {
    async fn notify(&self, e: &AdmissionOutcome, ctx: &PassgateContext) {
        let admission = match e {
            AdmissionOutcome::Admitted(admission) => admission,
            AdmissionOutcome::Denied(_) => return,
        };
        if !admission.event.pass_required {
            return;
        }
        if ctx.config.is_pass_excluded(&admission.member.role) {
            debug!(
                "No pass for member {} with excluded role {}",
                admission.member.id, admission.member.role
            );
            return;
        }

        let usecase = CreatePassUseCase {
            event_id: admission.event.id,
            user_id: admission.member.id,
            pass_type: PassType::AutoOnRegistration,
            requester: Requester::system("registration"),
            reason: "Registered for the event".into(),
            scheduled_at: Some(admission.registration.registered_at),
        };
        // Sideeffect, ignore result
        let _ = execute(usecase, ctx).await;
    }
}

pub struct RevokePassOnCancellation;

#[async_trait::async_trait]
impl Subscriber<CancelRegistrationUseCase> for RevokePassOnCancellation {
    async fn notify(&self, e: &CancelledRegistration, ctx: &PassgateContext) {
        let usecase = RevokePendingPassUseCase {
            event_id: e.event_id,
            user_id: e.user_id,
        };
        // Sideeffect, ignore result
        let _ = execute(usecase, ctx).await;
    }
}
