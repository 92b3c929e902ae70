use super::IMemberRepo;
use crate::repos::shared::inmemory_repo::*;
use passgate_domain::Member;

pub struct InMemoryMemberRepo {
    members: std::sync::Mutex<Vec<Member>>,
}

impl InMemoryMemberRepo {
    pub fn new() -> Self {
        Self {
            members: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IMemberRepo for InMemoryMemberRepo {
    async fn save(&self, member: &Member) -> anyhow::Result<()> {
        let mut members = lock(&self.members);
        members.retain(|m| m.id != member.id);
        members.push(member.clone());
        Ok(())
    }

    async fn find(&self, user_id: i64) -> anyhow::Result<Option<Member>> {
        Ok(find_by(&self.members, |m| m.id == user_id).into_iter().next())
    }

    async fn find_many(&self, user_ids: &[i64]) -> anyhow::Result<Vec<Member>> {
        Ok(find_by(&self.members, |m| user_ids.contains(&m.id)))
    }
}
