use chrono::{DateTime, Utc};
use passgate_domain::{Registration, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDTO {
    pub event_id: ID,
    pub user_id: i64,
    pub registered_at: DateTime<Utc>,
}

impl RegistrationDTO {
    pub fn new(registration: Registration) -> Self {
        Self {
            event_id: registration.event_id,
            user_id: registration.user_id,
            registered_at: registration.registered_at,
        }
    }
}
