use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// How a `Pass` came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassType {
    /// Created when a member registered for an event that requires passes
    AutoOnRegistration,
    /// Granted by a club owner
    ManualByOwner,
    /// Granted through the API
    ApiGranted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassStatus {
    Pending,
    Sent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequesterKind {
    Club,
    Admin,
    System,
}

/// Who asked for a `Pass`. The meaning of `id` depends on `kind`: a club id
/// for `Club`, a chat user id for `Admin` and a subsystem name for `System`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub kind: RequesterKind,
    pub id: String,
}

impl Requester {
    pub fn club(club_id: &ID) -> Self {
        Self {
            kind: RequesterKind::Club,
            id: club_id.as_string(),
        }
    }

    pub fn admin(user_id: i64) -> Self {
        Self {
            kind: RequesterKind::Admin,
            id: user_id.to_string(),
        }
    }

    pub fn system(name: impl Into<String>) -> Self {
        Self {
            kind: RequesterKind::System,
            id: name.into(),
        }
    }
}

/// An access grant for one member to one event, delivered in batches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pass {
    pub id: ID,
    pub event_id: ID,
    pub user_id: i64,
    pub pass_type: PassType,
    pub status: PassStatus,
    pub requester: Requester,
    pub reason: String,
    /// Earliest time the pass may be dispatched
    pub scheduled_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub email_sent: bool,
    pub chat_sent: bool,
}

impl Entity for Pass {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl Pass {
    pub fn new(
        event_id: ID,
        user_id: i64,
        pass_type: PassType,
        requester: Requester,
        reason: impl Into<String>,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Default::default(),
            event_id,
            user_id,
            pass_type,
            status: PassStatus::Pending,
            requester,
            reason: reason.into(),
            scheduled_at,
            sent_at: None,
            email_sent: false,
            chat_sent: false,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PassStatus::Pending && self.scheduled_at <= now
    }

    /// Records the outcome of a dispatch cycle
    pub fn mark_sent(&mut self, sent_at: DateTime<Utc>, email_sent: bool, chat_sent: bool) {
        self.status = PassStatus::Sent;
        self.sent_at = Some(sent_at);
        self.email_sent = email_sent;
        self.chat_sent = chat_sent;
    }
}

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let text = match self {
                    $(Self::$variant => $text,)+
                };
                write!(f, "{}", text)
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(anyhow::anyhow!(
                        "Unknown {} value: {}",
                        stringify!($name),
                        other
                    )),
                }
            }
        }
    };
}

// Storage representations
text_enum!(PassType {
    AutoOnRegistration => "auto",
    ManualByOwner => "manual",
    ApiGranted => "api",
});
text_enum!(PassStatus {
    Pending => "pending",
    Sent => "sent",
});
text_enum!(RequesterKind {
    Club => "club",
    Admin => "admin",
    System => "system",
});

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_pass_is_pending() {
        let now = Utc::now();
        let pass = Pass::new(
            ID::new(),
            1,
            PassType::ApiGranted,
            Requester::system("tests"),
            "",
            now,
        );
        assert_eq!(pass.status, PassStatus::Pending);
        assert!(pass.sent_at.is_none());
        assert!(pass.is_due(now));
        assert!(!pass.is_due(now - Duration::seconds(1)));
    }

    #[test]
    fn sent_pass_is_never_due() {
        let now = Utc::now();
        let mut pass = Pass::new(
            ID::new(),
            1,
            PassType::AutoOnRegistration,
            Requester::system("registration"),
            "",
            now,
        );
        pass.mark_sent(now, false, true);
        assert!(!pass.is_due(now + Duration::days(1)));
        assert!(pass.chat_sent);
        assert!(!pass.email_sent);
    }

    #[test]
    fn storage_tags_round_trip() {
        for kind in [RequesterKind::Club, RequesterKind::Admin, RequesterKind::System] {
            assert_eq!(kind.to_string().parse::<RequesterKind>().unwrap(), kind);
        }
        assert!("robot".parse::<RequesterKind>().is_err());
        assert_eq!("manual".parse::<PassType>().unwrap(), PassType::ManualByOwner);
    }

    #[test]
    fn requester_constructors() {
        let club_id = ID::new();
        assert_eq!(Requester::club(&club_id).id, club_id.as_string());
        assert_eq!(Requester::admin(42).kind, RequesterKind::Admin);
    }
}
