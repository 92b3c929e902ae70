use chrono::{Duration, Utc};
use passgate_api::Application;
use passgate_domain::{Event, Member, Role, ID};
use passgate_infra::PassgateContext;

pub struct TestApp {
    pub address: String,
    pub ctx: PassgateContext,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub async fn insert_event(&self, max_participants: u32, pass_required: bool) -> Event {
        let start_time = Utc::now() + Duration::days(3);
        let event = Event {
            id: ID::new(),
            club_id: ID::new(),
            name: "Board games".into(),
            location: "Main hall".into(),
            start_time,
            end_time: Some(start_time + Duration::hours(2)),
            registration_deadline: start_time - Duration::days(1),
            max_participants,
            expected_participants: 0,
            allowed_roles: vec![Role::new("student")],
            subscription_required: false,
            gating_channels: Vec::new(),
            pass_required,
        };
        self.ctx
            .repos
            .events
            .insert(&event)
            .await
            .expect("To insert event");
        event
    }

    pub async fn insert_member(&self, id: i64, role: &str) -> Member {
        let member = Member::new(id, format!("Member {}", id), Role::new(role));
        self.ctx
            .repos
            .members
            .save(&member)
            .await
            .expect("To insert member");
        member
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    let mut ctx = PassgateContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.baseline_roles = vec![Role::new("student")];

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://127.0.0.1:{}", application.port());
    let _ = tokio::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        address,
        ctx,
        client: reqwest::Client::new(),
    }
}
