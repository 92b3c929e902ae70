use crate::dtos::{PassDTO, PassErrorDTO};
use chrono::{DateTime, Utc};
use passgate_domain::{Pass, PassType, Requester, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassResponse {
    pub pass: PassDTO,
}

impl PassResponse {
    pub fn new(pass: Pass) -> Self {
        Self {
            pass: PassDTO::new(pass),
        }
    }
}

pub mod create_pass {
    use super::*;

    #[derive(Deserialize, Serialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub user_id: i64,
        pub requester: Requester,
        /// Defaults to `apiGranted`
        pub pass_type: Option<PassType>,
        #[serde(default)]
        pub reason: String,
        /// Defaults to now
        pub scheduled_at: Option<DateTime<Utc>>,
    }

    pub type APIResponse = PassResponse;
}

pub mod create_passes_bulk {
    use super::*;

    #[derive(Deserialize, Serialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub club_id: ID,
        pub user_ids: Vec<i64>,
        #[serde(default)]
        pub reason: String,
        pub scheduled_at: Option<DateTime<Utc>>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub passes: Vec<PassDTO>,
        pub errors: Vec<PassErrorDTO>,
    }
}
