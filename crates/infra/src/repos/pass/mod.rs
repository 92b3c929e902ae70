mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemoryPassRepo;
use passgate_domain::{Pass, ID};
pub use postgres::PostgresPassRepo;

#[async_trait::async_trait]
pub trait IPassRepo: Send + Sync {
    /// Inserts `pass` unless a pending or sent pass already exists for its
    /// (event, member) pair. Returns whether the pass was inserted.
    async fn insert_if_absent(&self, pass: &Pass) -> anyhow::Result<bool>;
    async fn find(&self, pass_id: &ID) -> anyhow::Result<Option<Pass>>;
    async fn find_active(&self, event_id: &ID, user_id: i64) -> anyhow::Result<Option<Pass>>;
    /// Pending passes with `scheduled_at <= now`
    async fn find_due_unsent(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Pass>>;
    async fn mark_sent(
        &self,
        pass_ids: &[ID],
        sent_at: DateTime<Utc>,
        email_sent: bool,
        chat_sent: bool,
    ) -> anyhow::Result<()>;
    /// Removes the pass of the pair if it is still pending
    async fn delete_pending(&self, event_id: &ID, user_id: i64) -> anyhow::Result<Option<Pass>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use passgate_domain::{PassStatus, PassType, Requester};

    fn pass(event_id: ID, user_id: i64, scheduled_at: DateTime<Utc>) -> Pass {
        Pass::new(
            event_id,
            user_id,
            PassType::ManualByOwner,
            Requester::admin(1),
            "guest",
            scheduled_at,
        )
    }

    #[tokio::test]
    async fn only_one_pass_per_pair() {
        let repo = InMemoryPassRepo::new();
        let event_id = ID::new();
        let now = Utc::now();

        assert!(repo.insert_if_absent(&pass(event_id, 1, now)).await.unwrap());
        assert!(!repo.insert_if_absent(&pass(event_id, 1, now)).await.unwrap());
        assert!(repo.insert_if_absent(&pass(event_id, 2, now)).await.unwrap());
    }

    #[tokio::test]
    async fn due_passes_leave_after_mark_sent() {
        let repo = InMemoryPassRepo::new();
        let now = Utc::now();
        let due = pass(ID::new(), 1, now - Duration::minutes(1));
        let later = pass(ID::new(), 1, now + Duration::hours(1));
        repo.insert_if_absent(&due).await.unwrap();
        repo.insert_if_absent(&later).await.unwrap();

        let found = repo.find_due_unsent(now).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, due.id);

        repo.mark_sent(&[due.id], now, false, true).await.unwrap();
        assert!(repo.find_due_unsent(now).await.unwrap().is_empty());

        let sent = repo.find(&due.id).await.unwrap().unwrap();
        assert_eq!(sent.status, PassStatus::Sent);
        assert!(sent.chat_sent);
        assert!(!sent.email_sent);
        assert_eq!(sent.sent_at, Some(now));
    }

    #[tokio::test]
    async fn mark_sent_with_no_ids_is_a_noop() {
        let repo = InMemoryPassRepo::new();
        assert!(repo.mark_sent(&[], Utc::now(), true, true).await.is_ok());
    }

    #[tokio::test]
    async fn only_pending_passes_are_deleted() {
        let repo = InMemoryPassRepo::new();
        let now = Utc::now();
        let pending = pass(ID::new(), 1, now);
        let sent = pass(ID::new(), 1, now);
        repo.insert_if_absent(&pending).await.unwrap();
        repo.insert_if_absent(&sent).await.unwrap();
        repo.mark_sent(&[sent.id], now, true, true).await.unwrap();

        assert!(repo.delete_pending(&pending.event_id, 1).await.unwrap().is_some());
        assert!(repo.delete_pending(&sent.event_id, 1).await.unwrap().is_none());
        assert!(repo.find_active(&sent.event_id, 1).await.unwrap().is_some());
    }
}
