use super::INotificationRepo;
use crate::repos::shared::inmemory_repo::*;
use passgate_domain::{NotificationRecord, ReminderKind, ID};

pub struct InMemoryNotificationRepo {
    records: std::sync::Mutex<Vec<NotificationRecord>>,
}

impl InMemoryNotificationRepo {
    pub fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for InMemoryNotificationRepo {
    async fn exists(&self, event_id: &ID, user_id: i64, kind: ReminderKind) -> anyhow::Result<bool> {
        Ok(!find_by(&self.records, |r| {
            r.event_id == *event_id && r.user_id == user_id && r.kind == kind
        })
        .is_empty())
    }

    async fn insert(&self, record: &NotificationRecord) -> anyhow::Result<bool> {
        let mut records = lock(&self.records);
        if records.iter().any(|r| {
            r.event_id == record.event_id && r.user_id == record.user_id && r.kind == record.kind
        }) {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }

    async fn find_notified_members(
        &self,
        event_id: &ID,
        kind: ReminderKind,
    ) -> anyhow::Result<Vec<i64>> {
        Ok(find_by(&self.records, |r| r.event_id == *event_id && r.kind == kind)
            .into_iter()
            .map(|r| r.user_id)
            .collect())
    }
}
