use crate::event::Event;
use crate::member::Member;
use crate::pass::Pass;
use crate::shared::entity::ID;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named pass delivery profile. Every active profile fires on its own
/// `schedule` and delivers the due passes to its recipients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchProfile {
    pub name: String,
    #[serde(default)]
    pub recipient_emails: Vec<String>,
    #[serde(default)]
    pub chat_channel_id: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Six field cron expression, seconds first
    pub schedule: String,
}

fn default_active() -> bool {
    true
}

/// Due passes of one event
#[derive(Debug, Clone, PartialEq)]
pub struct EventPasses {
    pub event: Event,
    pub passes: Vec<Pass>,
}

/// Groups passes by event. Passes whose event is not in `events` are left out
/// and their event ids returned as the second element.
pub fn group_by_event(
    passes: Vec<Pass>,
    events: &HashMap<ID, Event>,
) -> (Vec<EventPasses>, Vec<ID>) {
    let mut grouped = Vec::new();
    let mut unknown_events = Vec::new();

    for (event_id, passes) in passes.into_iter().into_group_map_by(|p| p.event_id) {
        match events.get(&event_id) {
            Some(event) => grouped.push(EventPasses {
                event: event.clone(),
                passes,
            }),
            None => unknown_events.push(event_id),
        }
    }
    grouped.sort_by(|a, b| {
        a.event
            .start_time
            .cmp(&b.event.start_time)
            .then_with(|| a.event.id.cmp(&b.event.id))
    });
    unknown_events.sort();

    (grouped, unknown_events)
}

/// One row of the pass export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassExportRow {
    pub event: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub member: String,
    pub role: String,
}

pub const PASS_EXPORT_COLUMNS: [&str; 6] = ["event", "date", "time", "location", "member", "role"];

/// Everything a dispatch cycle delivers
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDigest {
    pub subject: String,
    pub summary: String,
    pub rows: Vec<PassExportRow>,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

/// The consolidated batch of due passes for one dispatch cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PassDigest {
    pub events: Vec<EventPasses>,
    pub generated_at: DateTime<Utc>,
}

impl PassDigest {
    pub fn new(events: Vec<EventPasses>, generated_at: DateTime<Utc>) -> Self {
        Self {
            events,
            generated_at,
        }
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn total_passes(&self) -> usize {
        self.events.iter().map(|e| e.passes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_passes() == 0
    }

    pub fn pass_ids(&self) -> Vec<ID> {
        self.events
            .iter()
            .flat_map(|e| e.passes.iter().map(|p| p.id))
            .collect()
    }

    pub fn subject(&self) -> String {
        format!(
            "Pass summary - {} events ({} passes)",
            self.event_count(),
            self.total_passes()
        )
    }

    pub fn summary(&self, tz: &Tz) -> String {
        let mut message = String::from("Pass summary\n\n");
        if self.is_empty() {
            message.push_str("No passes to send\n");
            return message;
        }

        message.push_str(&format!("Events: {}\n", self.event_count()));
        message.push_str(&format!("Passes: {}\n\n", self.total_passes()));
        for (i, group) in self.events.iter().enumerate() {
            let start = group.event.start_time.with_timezone(tz);
            message.push_str(&format!("{}. {}\n", i + 1, group.event.name));
            message.push_str(&format!("{}\n", start.format("%d.%m.%Y %H:%M")));
            message.push_str(&format!("{}\n", group.event.location));
            message.push_str(&format!("Passes: {}\n\n", group.passes.len()));
        }
        message
    }

    /// One row per pass, grouped by event in digest order
    pub fn export_rows(&self, members: &HashMap<i64, Member>, tz: &Tz) -> Vec<PassExportRow> {
        let mut rows = Vec::with_capacity(self.total_passes());
        for group in &self.events {
            let start = group.event.start_time.with_timezone(tz);
            for pass in &group.passes {
                let (member, role) = match members.get(&pass.user_id) {
                    Some(m) => (m.full_name.clone(), m.role.to_string()),
                    None => (format!("Unknown member {}", pass.user_id), String::new()),
                };
                rows.push(PassExportRow {
                    event: group.event.name.clone(),
                    date: start.format("%d.%m.%Y").to_string(),
                    time: start.format("%H:%M").to_string(),
                    location: group.event.location.clone(),
                    member,
                    role,
                });
            }
        }
        rows
    }

    pub fn render(
        &self,
        members: &HashMap<i64, Member>,
        tz: &Tz,
    ) -> anyhow::Result<RenderedDigest> {
        let rows = self.export_rows(members, tz);
        let attachment = serde_json::to_vec_pretty(&serde_json::json!({
            "columns": PASS_EXPORT_COLUMNS,
            "rows": rows,
        }))?;
        Ok(RenderedDigest {
            subject: self.subject(),
            summary: self.summary(tz),
            attachment_name: format!(
                "passes_{}.json",
                self.generated_at.with_timezone(tz).format("%Y-%m-%d")
            ),
            attachment,
            rows,
        })
    }
}
