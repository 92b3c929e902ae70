use crate::shared::entity::ID;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderKind {
    DayBefore,
    HourBefore,
}

impl Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DayBefore => write!(f, "day"),
            Self::HourBefore => write!(f, "hour"),
        }
    }
}

impl FromStr for ReminderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::DayBefore),
            "hour" => Ok(Self::HourBefore),
            other => Err(anyhow::anyhow!("Unknown reminder kind: {}", other)),
        }
    }
}

/// A `NotificationRecord` states that the member was already reminded about
/// the event with the given kind. It is never updated or deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRecord {
    pub event_id: ID,
    pub user_id: i64,
    pub kind: ReminderKind,
    pub created_at: DateTime<Utc>,
}

/// Time window around `offset` before an event start during which a reminder
/// of `kind` may be sent.
///
/// The width is the retry budget of a reminder: a failed delivery is retried
/// on every poll that still falls inside the band. Narrowing it below a few
/// poll intervals will lose reminders.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderBand {
    pub kind: ReminderKind,
    pub offset: Duration,
    pub width: Duration,
}

impl ReminderBand {
    /// One hour wide, centered on 24 hours before start
    pub fn day_before() -> Self {
        Self {
            kind: ReminderKind::DayBefore,
            offset: Duration::hours(24),
            width: Duration::hours(1),
        }
    }

    /// Five minutes wide, centered on one hour before start
    pub fn hour_before() -> Self {
        Self {
            kind: ReminderKind::HourBefore,
            offset: Duration::hours(1),
            width: Duration::minutes(5),
        }
    }

    pub fn earliest(&self) -> Duration {
        self.offset - self.width / 2
    }

    pub fn latest(&self) -> Duration {
        self.offset + self.width / 2
    }

    /// Whether `time_until_start` lies inside the band, edges included
    pub fn contains(&self, time_until_start: Duration) -> bool {
        time_until_start >= self.earliest() && time_until_start <= self.latest()
    }
}

pub fn default_reminder_bands() -> Vec<ReminderBand> {
    vec![ReminderBand::day_before(), ReminderBand::hour_before()]
}

/// Reminder kinds that are due for an event starting at `start_time`
pub fn due_reminders(
    bands: &[ReminderBand],
    start_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<ReminderKind> {
    let time_until_start = start_time - now;
    bands
        .iter()
        .filter(|band| band.contains(time_until_start))
        .map(|band| band.kind)
        .collect()
}
