mod inmemory;
mod postgres;

pub use inmemory::InMemoryMemberRepo;
use passgate_domain::Member;
pub use postgres::PostgresMemberRepo;

/// The member directory, owned by account management
#[async_trait::async_trait]
pub trait IMemberRepo: Send + Sync {
    /// Inserts or replaces the member with the same id
    async fn save(&self, member: &Member) -> anyhow::Result<()>;
    async fn find(&self, user_id: i64) -> anyhow::Result<Option<Member>>;
    async fn find_many(&self, user_ids: &[i64]) -> anyhow::Result<Vec<Member>>;
}
