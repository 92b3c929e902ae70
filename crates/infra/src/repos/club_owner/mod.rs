mod inmemory;
mod postgres;

pub use inmemory::InMemoryClubOwnerRepo;
use passgate_domain::{ClubOwner, ID};
pub use postgres::PostgresClubOwnerRepo;

#[async_trait::async_trait]
pub trait IClubOwnerRepo: Send + Sync {
    async fn insert(&self, owner: &ClubOwner) -> anyhow::Result<()>;
    async fn find_by_club(&self, club_id: &ID) -> anyhow::Result<Vec<ClubOwner>>;
    async fn find_all(&self) -> anyhow::Result<Vec<ClubOwner>>;
}
