mod inmemory;
mod postgres;

pub use inmemory::InMemoryNotificationRepo;
use passgate_domain::{NotificationRecord, ReminderKind, ID};
pub use postgres::PostgresNotificationRepo;

/// Append only ledger of reminders that were delivered
#[async_trait::async_trait]
pub trait INotificationRepo: Send + Sync {
    async fn exists(&self, event_id: &ID, user_id: i64, kind: ReminderKind) -> anyhow::Result<bool>;
    /// Returns false when a record for the tuple already existed
    async fn insert(&self, record: &NotificationRecord) -> anyhow::Result<bool>;
    /// Members already reminded about `event_id` with `kind`
    async fn find_notified_members(
        &self,
        event_id: &ID,
        kind: ReminderKind,
    ) -> anyhow::Result<Vec<i64>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn records_are_unique_per_tuple() {
        let repo = InMemoryNotificationRepo::new();
        let event_id = ID::new();
        let record = NotificationRecord {
            event_id,
            user_id: 1,
            kind: ReminderKind::DayBefore,
            created_at: Utc::now(),
        };

        assert!(repo.insert(&record).await.unwrap());
        assert!(!repo.insert(&record).await.unwrap());
        assert!(repo.exists(&event_id, 1, ReminderKind::DayBefore).await.unwrap());
        assert!(!repo.exists(&event_id, 1, ReminderKind::HourBefore).await.unwrap());
        assert_eq!(
            repo.find_notified_members(&event_id, ReminderKind::DayBefore)
                .await
                .unwrap(),
            vec![1]
        );
    }
}
