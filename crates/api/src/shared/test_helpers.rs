use chrono::{DateTime, Duration, TimeZone, Utc};
use passgate_domain::{ClubOwner, Event, Member, Role, ID};
use passgate_infra::{InMemoryChatChannel, InMemoryMailer, PassgateContext};
pub use passgate_infra::ISys;
use std::sync::{Arc, Mutex};

/// Clock that only moves when told to
pub struct StaticTimeSys {
    now: Mutex<DateTime<Utc>>,
}

impl StaticTimeSys {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl ISys for StaticTimeSys {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct TestContext {
    pub ctx: PassgateContext,
    pub sys: Arc<StaticTimeSys>,
    pub chat: Arc<InMemoryChatChannel>,
    pub mailer: Arc<InMemoryMailer>,
}

pub fn event_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 18, 0, 0).unwrap()
}

/// In-memory context with a fixed clock two days before `event_start`
pub fn setup() -> TestContext {
    let mut ctx = PassgateContext::create_inmemory();
    let sys = Arc::new(StaticTimeSys::new(event_start() - Duration::days(2)));
    let chat = Arc::new(InMemoryChatChannel::new());
    let mailer = Arc::new(InMemoryMailer::new());
    ctx.sys = sys.clone();
    ctx.chat = chat.clone();
    ctx.mailer = mailer.clone();
    ctx.config.baseline_roles = vec![Role::new("student")];
    ctx.config.privileged_registration_cutoff = Some(Duration::hours(3));
    ctx.config.pass_excluded_roles = Vec::new();

    TestContext {
        ctx,
        sys,
        chat,
        mailer,
    }
}

pub fn event_factory() -> Event {
    let start_time = event_start();
    Event {
        id: ID::new(),
        club_id: ID::new(),
        name: "Chess night".into(),
        location: "Room 101".into(),
        start_time,
        end_time: Some(start_time + Duration::hours(2)),
        registration_deadline: start_time - Duration::hours(1),
        max_participants: 0,
        expected_participants: 0,
        allowed_roles: vec![Role::new("student"), Role::new("applicant")],
        subscription_required: false,
        gating_channels: Vec::new(),
        pass_required: false,
    }
}

pub async fn insert_event(ctx: &PassgateContext, event: &Event) {
    ctx.repos.events.insert(event).await.unwrap();
}

pub async fn insert_member(ctx: &PassgateContext, id: i64, role: &str) -> Member {
    let member = Member::new(id, format!("Member {}", id), Role::new(role));
    ctx.repos.members.save(&member).await.unwrap();
    member
}

pub async fn insert_owner(ctx: &PassgateContext, club_id: ID, user_id: i64, warnings: bool) {
    ctx.repos
        .club_owners
        .insert(&ClubOwner {
            club_id,
            user_id,
            warnings,
        })
        .await
        .unwrap();
}
