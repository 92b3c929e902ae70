use super::IEventRepo;
use chrono::{DateTime, Utc};
use passgate_domain::{Event, Role, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    event_uid: Uuid,
    club_uid: Uuid,
    name: String,
    location: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    registration_deadline: DateTime<Utc>,
    max_participants: i32,
    expected_participants: i32,
    allowed_roles: Vec<String>,
    subscription_required: bool,
    gating_channels: Vec<i64>,
    pass_required: bool,
}

impl From<EventRaw> for Event {
    fn from(e: EventRaw) -> Self {
        Self {
            id: e.event_uid.into(),
            club_id: e.club_uid.into(),
            name: e.name,
            location: e.location,
            start_time: e.start_time,
            end_time: e.end_time,
            registration_deadline: e.registration_deadline,
            max_participants: e.max_participants.max(0) as u32,
            expected_participants: e.expected_participants.max(0) as u32,
            allowed_roles: e.allowed_roles.iter().map(|r| Role::new(r.as_str())).collect(),
            subscription_required: e.subscription_required,
            gating_channels: e.gating_channels,
            pass_required: e.pass_required,
        }
    }
}

const SELECT_EVENTS: &str = r#"
    SELECT event_uid, club_uid, name, location, start_time, end_time,
        registration_deadline, max_participants, expected_participants,
        allowed_roles, subscription_required, gating_channels, pass_required
    FROM events
"#;

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn insert(&self, e: &Event) -> anyhow::Result<()> {
        let allowed_roles = e
            .allowed_roles
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>();
        sqlx::query(
            r#"
            INSERT INTO events(
                event_uid,
                club_uid,
                name,
                location,
                start_time,
                end_time,
                registration_deadline,
                max_participants,
                expected_participants,
                allowed_roles,
                subscription_required,
                gating_channels,
                pass_required
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(e.id.inner_ref())
        .bind(e.club_id.inner_ref())
        .bind(&e.name)
        .bind(&e.location)
        .bind(e.start_time)
        .bind(e.end_time)
        .bind(e.registration_deadline)
        .bind(e.max_participants as i32)
        .bind(e.expected_participants as i32)
        .bind(&allowed_roles)
        .bind(e.subscription_required)
        .bind(&e.gating_channels)
        .bind(e.pass_required)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<Event>> {
        let event = sqlx::query_as::<_, EventRaw>(&format!("{} WHERE event_uid = $1", SELECT_EVENTS))
            .bind(event_id.inner_ref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(event.map(Event::from))
    }

    async fn find_many(&self, event_ids: &[ID]) -> anyhow::Result<Vec<Event>> {
        let ids = event_ids.iter().map(|id| *id.inner_ref()).collect::<Vec<_>>();
        let events = sqlx::query_as::<_, EventRaw>(&format!(
            "{} WHERE event_uid = ANY($1)",
            SELECT_EVENTS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(events.into_iter().map(Event::from).collect())
    }

    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>> {
        let events = sqlx::query_as::<_, EventRaw>(&format!(
            "{} WHERE start_time > $1 AND start_time <= $2 ORDER BY start_time",
            SELECT_EVENTS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(events.into_iter().map(Event::from).collect())
    }
}
