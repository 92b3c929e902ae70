use serde::{Deserialize, Serialize};

pub mod get_service_health {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub message: String,
        /// Names of the dispatch profiles that fire on a schedule
        pub active_dispatch_profiles: Vec<String>,
        pub timezone: String,
    }
}
