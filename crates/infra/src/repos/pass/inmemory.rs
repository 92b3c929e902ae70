use super::IPassRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use passgate_domain::{Pass, PassStatus, ID};

pub struct InMemoryPassRepo {
    passes: std::sync::Mutex<Vec<Pass>>,
}

impl InMemoryPassRepo {
    pub fn new() -> Self {
        Self {
            passes: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IPassRepo for InMemoryPassRepo {
    async fn insert_if_absent(&self, pass: &Pass) -> anyhow::Result<bool> {
        let mut passes = lock(&self.passes);
        if passes
            .iter()
            .any(|p| p.event_id == pass.event_id && p.user_id == pass.user_id)
        {
            return Ok(false);
        }
        passes.push(pass.clone());
        Ok(true)
    }

    async fn find(&self, pass_id: &ID) -> anyhow::Result<Option<Pass>> {
        Ok(find(pass_id, &self.passes))
    }

    async fn find_active(&self, event_id: &ID, user_id: i64) -> anyhow::Result<Option<Pass>> {
        Ok(
            find_by(&self.passes, |p| p.event_id == *event_id && p.user_id == user_id)
                .into_iter()
                .next(),
        )
    }

    async fn find_due_unsent(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Pass>> {
        let mut due = find_by(&self.passes, |p| p.is_due(now));
        due.sort_by_key(|p| p.scheduled_at);
        Ok(due)
    }

    async fn mark_sent(
        &self,
        pass_ids: &[ID],
        sent_at: DateTime<Utc>,
        email_sent: bool,
        chat_sent: bool,
    ) -> anyhow::Result<()> {
        update_many(
            &self.passes,
            |p| pass_ids.contains(&p.id),
            |p| p.mark_sent(sent_at, email_sent, chat_sent),
        );
        Ok(())
    }

    async fn delete_pending(&self, event_id: &ID, user_id: i64) -> anyhow::Result<Option<Pass>> {
        Ok(find_and_delete_by(&self.passes, |p| {
            p.event_id == *event_id && p.user_id == user_id && p.status == PassStatus::Pending
        })
        .into_iter()
        .next())
    }
}
