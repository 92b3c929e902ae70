mod telemetry;

use passgate_api::Application;
use passgate_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};

// The cron scheduler needs a multi threaded runtime
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();
    // A missing .env file is fine, the environment may be set by the runtime
    let _ = dotenvy::dotenv();

    let subscriber = get_subscriber("passgate".into(), "info".into());
    init_subscriber(subscriber)?;

    let context = setup_context().await?;

    let app = Application::new(context).await?;
    app.start().await
}
