use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};

/// A member who owns a club
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubOwner {
    pub club_id: ID,
    pub user_id: i64,
    /// Whether this owner wants capacity warnings for the club's events
    pub warnings: bool,
}
