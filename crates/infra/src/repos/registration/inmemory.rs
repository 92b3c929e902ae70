use super::IRegistrationRepo;
use crate::repos::shared::inmemory_repo::*;
use passgate_domain::{Registration, RegistrationInsert, ID};

pub struct InMemoryRegistrationRepo {
    registrations: std::sync::Mutex<Vec<Registration>>,
}

impl InMemoryRegistrationRepo {
    pub fn new() -> Self {
        Self {
            registrations: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IRegistrationRepo for InMemoryRegistrationRepo {
    async fn count(&self, event_id: &ID) -> anyhow::Result<u32> {
        let registrations = lock(&self.registrations);
        Ok(registrations
            .iter()
            .filter(|r| r.event_id == *event_id)
            .count() as u32)
    }

    async fn insert_if_capacity(
        &self,
        registration: &Registration,
        max_participants: u32,
    ) -> anyhow::Result<RegistrationInsert> {
        // Held for the count and the push
        let mut registrations = lock(&self.registrations);
        let mut count = 0;
        for r in registrations.iter().filter(|r| r.event_id == registration.event_id) {
            if r.user_id == registration.user_id {
                return Ok(RegistrationInsert::AlreadyRegistered);
            }
            count += 1;
        }
        if max_participants > 0 && count >= max_participants {
            return Ok(RegistrationInsert::Full { count });
        }
        registrations.push(registration.clone());
        Ok(RegistrationInsert::Inserted { count: count + 1 })
    }

    async fn find(&self, event_id: &ID, user_id: i64) -> anyhow::Result<Option<Registration>> {
        Ok(find_by(&self.registrations, |r| {
            r.event_id == *event_id && r.user_id == user_id
        })
        .into_iter()
        .next())
    }

    async fn delete(&self, event_id: &ID, user_id: i64) -> anyhow::Result<bool> {
        let deleted = find_and_delete_by(&self.registrations, |r| {
            r.event_id == *event_id && r.user_id == user_id
        });
        Ok(!deleted.is_empty())
    }

    async fn find_registered_members(&self, event_id: &ID) -> anyhow::Result<Vec<i64>> {
        Ok(find_by(&self.registrations, |r| r.event_id == *event_id)
            .into_iter()
            .map(|r| r.user_id)
            .collect())
    }
}
