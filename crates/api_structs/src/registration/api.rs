use crate::dtos::RegistrationDTO;
use passgate_domain::{DenialReason, Registration, ID};
use serde::{Deserialize, Serialize};

pub mod try_register {
    use super::*;

    #[derive(Deserialize, Serialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub user_id: i64,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub registration: RegistrationDTO,
        pub registered_count: u32,
    }

    impl APIResponse {
        pub fn new(registration: Registration, registered_count: u32) -> Self {
            Self {
                registration: RegistrationDTO::new(registration),
                registered_count,
            }
        }
    }

    /// Body of a `409` when the registration was denied
    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DeniedResponse {
        pub reason: DenialReason,
    }
}

pub mod cancel_registration {
    use super::*;

    #[derive(Deserialize, Serialize)]
    pub struct PathParams {
        pub event_id: ID,
        pub user_id: i64,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub event_id: ID,
        pub user_id: i64,
        /// False when there was no registration to remove
        pub removed: bool,
    }
}
