mod config;
mod repos;
mod services;
mod system;

pub use config::{ChatConfig, Config, SmtpConfig};
pub use repos::{
    IClubOwnerRepo, IEventRepo, IMemberRepo, INotificationRepo, IPassRepo, IRegistrationRepo,
    Repos,
};
pub use services::*;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;

#[derive(Clone)]
pub struct PassgateContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub chat: Arc<dyn IChatChannel>,
    pub mailer: Arc<dyn IMailer>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl PassgateContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(&params.postgres_connection_string).await?;
        let config = Config::new();
        let mailer = SmtpMailer::new(&config.smtp)?;
        Ok(Self {
            repos,
            chat: Arc::new(HttpChatChannel::new(&config.chat)),
            mailer: Arc::new(mailer),
            config,
            sys: Arc::new(RealSys {}),
        })
    }

    /// Context with in-memory repositories and channel adapters
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            chat: Arc::new(InMemoryChatChannel::new()),
            mailer: Arc::new(InMemoryMailer::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<PassgateContext> {
    PassgateContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string()?,
    })
    .await
}

fn get_psql_connection_string() -> anyhow::Result<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .map_err(|_| anyhow::anyhow!("{} env var to be present.", PSQL_CONNECTION_STRING))
}
