use crate::event::Event;
use crate::member::MembershipStatus;
use crate::shared::role::Role;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Why a registration attempt was turned down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DenialReason {
    #[serde(rename_all = "camelCase")]
    RegistrationClosed { deadline: DateTime<Utc> },
    #[serde(rename_all = "camelCase")]
    EventFull { max_participants: u32 },
    #[serde(rename_all = "camelCase")]
    RoleNotAllowed { role: Role },
    #[serde(rename_all = "camelCase")]
    NotSubscribed { missing_channels: Vec<i64> },
}

/// Membership status of the member in one gating channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMembership {
    pub channel_id: i64,
    pub status: MembershipStatus,
}

/// Deployment wide admission rules
#[derive(Debug, Clone, Default)]
pub struct AdmissionPolicy {
    /// Roles that only have to respect the event's own registration deadline
    pub baseline_roles: Vec<Role>,
    /// How long before `start_time` registration closes for non-baseline roles
    pub extended_cutoff: Option<Duration>,
}

impl AdmissionPolicy {
    pub fn is_baseline(&self, role: &Role) -> bool {
        self.baseline_roles.iter().any(|r| r == role)
    }

    pub fn effective_deadline(&self, event: &Event, role: &Role) -> DateTime<Utc> {
        event.effective_deadline(self.is_baseline(role), self.extended_cutoff)
    }

    /// Runs the deadline, capacity and role checks, in that order.
    ///
    /// `registered` is the number of registrations currently known for the event.
    pub fn precheck(
        &self,
        event: &Event,
        role: &Role,
        registered: u32,
        now: DateTime<Utc>,
    ) -> Result<(), DenialReason> {
        let deadline = self.effective_deadline(event, role);
        if now >= deadline {
            return Err(DenialReason::RegistrationClosed { deadline });
        }
        if event.is_full(registered) {
            return Err(DenialReason::EventFull {
                max_participants: event.max_participants,
            });
        }
        if !event.allows_role(role) {
            return Err(DenialReason::RoleNotAllowed { role: role.clone() });
        }
        Ok(())
    }

    /// Full predicate: `precheck` followed by `check_subscription`
    pub fn evaluate(
        &self,
        event: &Event,
        role: &Role,
        registered: u32,
        memberships: &[ChannelMembership],
        now: DateTime<Utc>,
    ) -> Result<(), DenialReason> {
        self.precheck(event, role, registered, now)?;
        check_subscription(event, memberships)
    }
}

/// Channels the member still has to join. A gating channel without a known
/// membership counts as missing.
pub fn missing_channels(event: &Event, memberships: &[ChannelMembership]) -> Vec<i64> {
    if !event.subscription_required {
        return Vec::new();
    }
    event
        .gating_channels
        .iter()
        .filter(|channel_id| {
            !memberships
                .iter()
                .any(|m| m.channel_id == **channel_id && m.status.is_current_member())
        })
        .copied()
        .collect()
}

pub fn check_subscription(
    event: &Event,
    memberships: &[ChannelMembership],
) -> Result<(), DenialReason> {
    let missing_channels = missing_channels(event, memberships);
    if missing_channels.is_empty() {
        Ok(())
    } else {
        Err(DenialReason::NotSubscribed { missing_channels })
    }
}

/// Club owner warnings triggered by a successful registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityWarning {
    ExpectedParticipantsReached { count: u32 },
    MaxParticipantsReached { count: u32 },
}

/// Warnings to emit after the registration count went up to `count`
pub fn capacity_warnings(event: &Event, count: u32) -> Vec<CapacityWarning> {
    let mut warnings = Vec::new();
    if event.expected_participants > 0 && count == event.expected_participants {
        warnings.push(CapacityWarning::ExpectedParticipantsReached { count });
    }
    if event.max_participants > 0 && count == event.max_participants {
        warnings.push(CapacityWarning::MaxParticipantsReached { count });
    }
    warnings
}
