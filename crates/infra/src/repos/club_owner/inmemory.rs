use super::IClubOwnerRepo;
use crate::repos::shared::inmemory_repo::*;
use passgate_domain::{ClubOwner, ID};

pub struct InMemoryClubOwnerRepo {
    owners: std::sync::Mutex<Vec<ClubOwner>>,
}

impl InMemoryClubOwnerRepo {
    pub fn new() -> Self {
        Self {
            owners: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IClubOwnerRepo for InMemoryClubOwnerRepo {
    async fn insert(&self, owner: &ClubOwner) -> anyhow::Result<()> {
        insert(owner, &self.owners);
        Ok(())
    }

    async fn find_by_club(&self, club_id: &ID) -> anyhow::Result<Vec<ClubOwner>> {
        Ok(find_by(&self.owners, |o| o.club_id == *club_id))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<ClubOwner>> {
        Ok(find_by(&self.owners, |_| true))
    }
}
