mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemoryEventRepo;
use passgate_domain::{Event, ID};
pub use postgres::PostgresEventRepo;

/// The event directory. Events are managed elsewhere, this core only reads them.
#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, e: &Event) -> anyhow::Result<()>;
    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<Event>>;
    async fn find_many(&self, event_ids: &[ID]) -> anyhow::Result<Vec<Event>>;
    /// Events with `from < start_time <= to`
    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>>;
}
