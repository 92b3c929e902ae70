use crate::shared::entity::{Entity, ID};
use crate::shared::role::Role;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A club `Event` members can register for.
///
/// Events are owned by the event directory and are read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: ID,
    pub club_id: ID,
    pub name: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    /// `None` means the event has no announced end
    pub end_time: Option<DateTime<Utc>>,
    pub registration_deadline: DateTime<Utc>,
    /// 0 means unlimited
    pub max_participants: u32,
    /// Soft threshold club owners are warned about, 0 disables it
    pub expected_participants: u32,
    pub allowed_roles: Vec<Role>,
    pub subscription_required: bool,
    /// Chat channels a member has to be subscribed to when
    /// `subscription_required` is set
    pub gating_channels: Vec<i64>,
    pub pass_required: bool,
}

impl Entity for Event {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl Event {
    pub fn has_capacity_limit(&self) -> bool {
        self.max_participants > 0
    }

    pub fn is_full(&self, registered: u32) -> bool {
        self.has_capacity_limit() && registered >= self.max_participants
    }

    pub fn allows_role(&self, role: &Role) -> bool {
        self.allowed_roles.iter().any(|r| r == role)
    }

    /// The registration deadline that applies to a member.
    ///
    /// Baseline members only have to respect `registration_deadline`. Everyone
    /// else is additionally bound by `extended_cutoff` before `start_time`,
    /// whichever comes first.
    pub fn effective_deadline(
        &self,
        is_baseline: bool,
        extended_cutoff: Option<Duration>,
    ) -> DateTime<Utc> {
        match extended_cutoff {
            Some(cutoff) if !is_baseline => {
                std::cmp::min(self.registration_deadline, self.start_time - cutoff)
            }
            _ => self.registration_deadline,
        }
    }

    /// When the event should be considered finished
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }

    pub fn is_over(&self, now: DateTime<Utc>) -> bool {
        self.ends_at() < now
    }
}
