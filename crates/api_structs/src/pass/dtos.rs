use chrono::{DateTime, Utc};
use passgate_domain::{Pass, PassStatus, PassType, Requester, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PassDTO {
    pub id: ID,
    pub event_id: ID,
    pub user_id: i64,
    pub pass_type: PassType,
    pub status: PassStatus,
    pub requester: Requester,
    pub reason: String,
    pub scheduled_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub email_sent: bool,
    pub chat_sent: bool,
}

impl PassDTO {
    pub fn new(pass: Pass) -> Self {
        Self {
            id: pass.id,
            event_id: pass.event_id,
            user_id: pass.user_id,
            pass_type: pass.pass_type,
            status: pass.status,
            requester: pass.requester,
            reason: pass.reason,
            scheduled_at: pass.scheduled_at,
            sent_at: pass.sent_at,
            email_sent: pass.email_sent,
            chat_sent: pass.chat_sent,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PassErrorDTO {
    pub user_id: i64,
    pub message: String,
}
