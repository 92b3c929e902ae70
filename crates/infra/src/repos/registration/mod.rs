mod inmemory;
mod postgres;

pub use inmemory::InMemoryRegistrationRepo;
use passgate_domain::{Registration, RegistrationInsert, ID};
pub use postgres::PostgresRegistrationRepo;

#[async_trait::async_trait]
pub trait IRegistrationRepo: Send + Sync {
    async fn count(&self, event_id: &ID) -> anyhow::Result<u32>;
    /// Inserts `registration` unless the member is already registered or the
    /// event already has `max_participants` registrations (0 means unlimited).
    /// The count and the insert are one atomic step per event.
    async fn insert_if_capacity(
        &self,
        registration: &Registration,
        max_participants: u32,
    ) -> anyhow::Result<RegistrationInsert>;
    async fn find(&self, event_id: &ID, user_id: i64) -> anyhow::Result<Option<Registration>>;
    /// Returns whether a row was removed
    async fn delete(&self, event_id: &ID, user_id: i64) -> anyhow::Result<bool>;
    async fn find_registered_members(&self, event_id: &ID) -> anyhow::Result<Vec<i64>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    #[tokio::test]
    async fn inserts_until_full() {
        let repo = InMemoryRegistrationRepo::new();
        let event_id = ID::new();

        for user_id in 1..=2 {
            let res = repo
                .insert_if_capacity(&Registration::new(event_id, user_id, Utc::now()), 2)
                .await
                .unwrap();
            assert_eq!(res, RegistrationInsert::Inserted { count: user_id as u32 });
        }
        let res = repo
            .insert_if_capacity(&Registration::new(event_id, 3, Utc::now()), 2)
            .await
            .unwrap();
        assert_eq!(res, RegistrationInsert::Full { count: 2 });
        assert_eq!(repo.count(&event_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn second_insert_for_same_member_is_rejected() {
        let repo = InMemoryRegistrationRepo::new();
        let registration = Registration::new(ID::new(), 7, Utc::now());

        repo.insert_if_capacity(&registration, 0).await.unwrap();
        let res = repo.insert_if_capacity(&registration, 0).await.unwrap();
        assert_eq!(res, RegistrationInsert::AlreadyRegistered);
        assert_eq!(repo.count(&registration.event_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = InMemoryRegistrationRepo::new();
        let registration = Registration::new(ID::new(), 7, Utc::now());
        repo.insert_if_capacity(&registration, 0).await.unwrap();

        assert!(repo.delete(&registration.event_id, 7).await.unwrap());
        assert!(!repo.delete(&registration.event_id, 7).await.unwrap());
        assert!(repo.find(&registration.event_id, 7).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_never_overshoot() {
        let repo = Arc::new(InMemoryRegistrationRepo::new());
        let event_id = ID::new();

        let handles = (0..50)
            .map(|user_id| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.insert_if_capacity(&Registration::new(event_id, user_id, Utc::now()), 5)
                        .await
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();
        let mut inserted = 0;
        for handle in handles {
            if let RegistrationInsert::Inserted { .. } = handle.await.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 5);
        assert_eq!(repo.count(&event_id).await.unwrap(), 5);
    }
}
