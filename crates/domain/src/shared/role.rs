use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A role tag carried by a member, e.g. "student" or "applicant".
///
/// Roles are plain tags; which of them count as the baseline tier is
/// decided by deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Role {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Parses a comma separated list of role tags, skipping empty entries
pub fn parse_role_list(raw: &str) -> Vec<Role> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(Role::new)
        .collect()
}
