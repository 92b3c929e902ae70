mod club_owner;
mod event;
mod member;
mod notification;
mod pass;
mod registration;
mod shared;

pub use club_owner::IClubOwnerRepo;
use club_owner::{InMemoryClubOwnerRepo, PostgresClubOwnerRepo};
pub use event::IEventRepo;
use event::{InMemoryEventRepo, PostgresEventRepo};
pub use member::IMemberRepo;
use member::{InMemoryMemberRepo, PostgresMemberRepo};
pub use notification::INotificationRepo;
use notification::{InMemoryNotificationRepo, PostgresNotificationRepo};
pub use pass::IPassRepo;
use pass::{InMemoryPassRepo, PostgresPassRepo};
pub use registration::IRegistrationRepo;
use registration::{InMemoryRegistrationRepo, PostgresRegistrationRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub registrations: Arc<dyn IRegistrationRepo>,
    pub passes: Arc<dyn IPassRepo>,
    pub notifications: Arc<dyn INotificationRepo>,
    pub members: Arc<dyn IMemberRepo>,
    pub club_owners: Arc<dyn IClubOwnerRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        info!("DB EXECUTING MIGRATION ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB EXECUTING MIGRATION ... [done]");

        Ok(Self {
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            registrations: Arc::new(PostgresRegistrationRepo::new(pool.clone())),
            passes: Arc::new(PostgresPassRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            members: Arc::new(PostgresMemberRepo::new(pool.clone())),
            club_owners: Arc::new(PostgresClubOwnerRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepo::new()),
            registrations: Arc::new(InMemoryRegistrationRepo::new()),
            passes: Arc::new(InMemoryPassRepo::new()),
            notifications: Arc::new(InMemoryNotificationRepo::new()),
            members: Arc::new(InMemoryMemberRepo::new()),
            club_owners: Arc::new(InMemoryClubOwnerRepo::new()),
        }
    }
}
