use crate::shared::entity::ID;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member's registration for an `Event`. At most one exists per (event, member).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub event_id: ID,
    pub user_id: i64,
    pub registered_at: DateTime<Utc>,
    /// Set later by the check-in flow
    pub visited_via_event_qr: bool,
    pub visited_via_user_qr: bool,
}

impl Registration {
    pub fn new(event_id: ID, user_id: i64, registered_at: DateTime<Utc>) -> Self {
        Self {
            event_id,
            user_id,
            registered_at,
            visited_via_event_qr: false,
            visited_via_user_qr: false,
        }
    }
}

/// Result of a capacity guarded registration insert
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationInsert {
    /// The row was written, `count` is the number of registrations after the insert
    Inserted { count: u32 },
    /// Capacity was reached before the insert could happen
    Full { count: u32 },
    AlreadyRegistered,
}
