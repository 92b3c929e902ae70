use crate::shared::role::Role;
use serde::{Deserialize, Serialize};

/// A club platform member. `id` is the member's chat platform user id,
/// which is also the chat to deliver direct messages to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub role: Role,
    pub email: Option<String>,
    pub is_banned: bool,
}

impl Member {
    pub fn new(id: i64, full_name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            role,
            email: None,
            is_banned: false,
        }
    }
}

/// Membership status of a member in a chat channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MembershipStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MembershipStatus {
    /// Whether the member currently belongs to the channel
    pub fn is_current_member(&self) -> bool {
        matches!(self, Self::Creator | Self::Administrator | Self::Member)
    }
}

impl std::str::FromStr for MembershipStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creator" => Ok(Self::Creator),
            "administrator" => Ok(Self::Administrator),
            "member" => Ok(Self::Member),
            "restricted" => Ok(Self::Restricted),
            "left" => Ok(Self::Left),
            "kicked" => Ok(Self::Kicked),
            other => Err(anyhow::anyhow!("Unknown membership status: {}", other)),
        }
    }
}
