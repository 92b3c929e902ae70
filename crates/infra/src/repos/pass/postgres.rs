use super::IPassRepo;
use chrono::{DateTime, Utc};
use passgate_domain::{Pass, PassStatus, Requester, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;

pub struct PostgresPassRepo {
    pool: PgPool,
}

impl PostgresPassRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PassRaw {
    pass_uid: Uuid,
    event_uid: Uuid,
    user_id: i64,
    pass_type: String,
    status: String,
    requester_kind: String,
    requester_id: String,
    reason: String,
    scheduled_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
    email_sent: bool,
    chat_sent: bool,
}

impl TryFrom<PassRaw> for Pass {
    type Error = anyhow::Error;

    fn try_from(p: PassRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: p.pass_uid.into(),
            event_id: p.event_uid.into(),
            user_id: p.user_id,
            pass_type: p.pass_type.parse()?,
            status: p.status.parse()?,
            requester: Requester {
                kind: p.requester_kind.parse()?,
                id: p.requester_id,
            },
            reason: p.reason,
            scheduled_at: p.scheduled_at,
            sent_at: p.sent_at,
            email_sent: p.email_sent,
            chat_sent: p.chat_sent,
        })
    }
}

fn into_passes(raw: Vec<PassRaw>) -> anyhow::Result<Vec<Pass>> {
    raw.into_iter().map(Pass::try_from).collect()
}

#[async_trait::async_trait]
impl IPassRepo for PostgresPassRepo {
    async fn insert_if_absent(&self, pass: &Pass) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO passes(
                pass_uid,
                event_uid,
                user_id,
                pass_type,
                status,
                requester_kind,
                requester_id,
                reason,
                scheduled_at,
                sent_at,
                email_sent,
                chat_sent
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (event_uid, user_id) DO NOTHING
            "#,
        )
        .bind(pass.id.inner_ref())
        .bind(pass.event_id.inner_ref())
        .bind(pass.user_id)
        .bind(pass.pass_type.to_string())
        .bind(pass.status.to_string())
        .bind(pass.requester.kind.to_string())
        .bind(&pass.requester.id)
        .bind(&pass.reason)
        .bind(pass.scheduled_at)
        .bind(pass.sent_at)
        .bind(pass.email_sent)
        .bind(pass.chat_sent)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn find(&self, pass_id: &ID) -> anyhow::Result<Option<Pass>> {
        sqlx::query_as::<_, PassRaw>("SELECT * FROM passes WHERE pass_uid = $1")
            .bind(pass_id.inner_ref())
            .fetch_optional(&self.pool)
            .await?
            .map(Pass::try_from)
            .transpose()
    }

    async fn find_active(&self, event_id: &ID, user_id: i64) -> anyhow::Result<Option<Pass>> {
        sqlx::query_as::<_, PassRaw>(
            "SELECT * FROM passes WHERE event_uid = $1 AND user_id = $2",
        )
        .bind(event_id.inner_ref())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Pass::try_from)
        .transpose()
    }

    async fn find_due_unsent(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Pass>> {
        let raw = sqlx::query_as::<_, PassRaw>(
            r#"
            SELECT * FROM passes
            WHERE status = $1 AND scheduled_at <= $2
            ORDER BY scheduled_at
            "#,
        )
        .bind(PassStatus::Pending.to_string())
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        into_passes(raw)
    }

    async fn mark_sent(
        &self,
        pass_ids: &[ID],
        sent_at: DateTime<Utc>,
        email_sent: bool,
        chat_sent: bool,
    ) -> anyhow::Result<()> {
        if pass_ids.is_empty() {
            return Ok(());
        }
        let ids = pass_ids.iter().map(|id| *id.inner_ref()).collect::<Vec<_>>();
        sqlx::query(
            r#"
            UPDATE passes SET
                status = $2,
                sent_at = $3,
                email_sent = $4,
                chat_sent = $5
            WHERE pass_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .bind(PassStatus::Sent.to_string())
        .bind(sent_at)
        .bind(email_sent)
        .bind(chat_sent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_pending(&self, event_id: &ID, user_id: i64) -> anyhow::Result<Option<Pass>> {
        sqlx::query_as::<_, PassRaw>(
            r#"
            DELETE FROM passes
            WHERE event_uid = $1 AND user_id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(user_id)
        .bind(PassStatus::Pending.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(Pass::try_from)
        .transpose()
    }
}
