mod club;
mod dispatch;
mod error;
mod job_schedulers;
mod pass;
mod registration;
mod reminder;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::Schedulers;
use passgate_infra::PassgateContext;
use std::net::TcpListener;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    registration::configure_routes(cfg);
    pass::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    schedulers: Schedulers,
}

impl Application {
    pub async fn new(context: PassgateContext) -> anyhow::Result<Self> {
        let (server, port) = Application::configure_server(context.clone())?;
        let schedulers = Schedulers::new(context);
        schedulers.start().await?;

        Ok(Self {
            server,
            port,
            schedulers,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn configure_server(context: PassgateContext) -> anyhow::Result<(Server, u16)> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Serves until the server shuts down, then lets the schedulers finish
    /// their in-flight work
    pub async fn start(self) -> anyhow::Result<()> {
        info!("Listening on port {}", self.port);
        let res = self.server.await;
        self.schedulers.stop().await;
        res?;
        Ok(())
    }
}
