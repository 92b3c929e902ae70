use super::IRegistrationRepo;
use chrono::{DateTime, Utc};
use passgate_domain::{Registration, RegistrationInsert, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresRegistrationRepo {
    pool: PgPool,
}

impl PostgresRegistrationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RegistrationRaw {
    event_uid: Uuid,
    user_id: i64,
    registered_at: DateTime<Utc>,
    visited_via_event_qr: bool,
    visited_via_user_qr: bool,
}

impl From<RegistrationRaw> for Registration {
    fn from(r: RegistrationRaw) -> Self {
        Self {
            event_id: r.event_uid.into(),
            user_id: r.user_id,
            registered_at: r.registered_at,
            visited_via_event_qr: r.visited_via_event_qr,
            visited_via_user_qr: r.visited_via_user_qr,
        }
    }
}

#[async_trait::async_trait]
impl IRegistrationRepo for PostgresRegistrationRepo {
    async fn count(&self, event_id: &ID) -> anyhow::Result<u32> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_uid = $1")
                .bind(event_id.inner_ref())
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u32)
    }

    async fn insert_if_capacity(
        &self,
        registration: &Registration,
        max_participants: u32,
    ) -> anyhow::Result<RegistrationInsert> {
        let mut tx = self.pool.begin().await?;

        // Serializes every admission for this event until commit
        sqlx::query("SELECT event_uid FROM events WHERE event_uid = $1 FOR UPDATE")
            .bind(registration.event_id.inner_ref())
            .fetch_optional(&mut *tx)
            .await?;

        let already_registered: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM registrations WHERE event_uid = $1 AND user_id = $2)",
        )
        .bind(registration.event_id.inner_ref())
        .bind(registration.user_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_registered {
            tx.rollback().await?;
            return Ok(RegistrationInsert::AlreadyRegistered);
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_uid = $1")
                .bind(registration.event_id.inner_ref())
                .fetch_one(&mut *tx)
                .await?;
        let count = count as u32;
        if max_participants > 0 && count >= max_participants {
            tx.rollback().await?;
            return Ok(RegistrationInsert::Full { count });
        }

        sqlx::query(
            r#"
            INSERT INTO registrations(
                event_uid,
                user_id,
                registered_at,
                visited_via_event_qr,
                visited_via_user_qr
            )
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(registration.event_id.inner_ref())
        .bind(registration.user_id)
        .bind(registration.registered_at)
        .bind(registration.visited_via_event_qr)
        .bind(registration.visited_via_user_qr)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(RegistrationInsert::Inserted { count: count + 1 })
    }

    async fn find(&self, event_id: &ID, user_id: i64) -> anyhow::Result<Option<Registration>> {
        let registration = sqlx::query_as::<_, RegistrationRaw>(
            r#"
            SELECT * FROM registrations
            WHERE event_uid = $1 AND user_id = $2
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration.map(Registration::from))
    }

    async fn delete(&self, event_id: &ID, user_id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM registrations WHERE event_uid = $1 AND user_id = $2")
            .bind(event_id.inner_ref())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_registered_members(&self, event_id: &ID) -> anyhow::Result<Vec<i64>> {
        let members: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM registrations WHERE event_uid = $1 ORDER BY registered_at",
        )
        .bind(event_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}
