use super::INotificationRepo;
use passgate_domain::{NotificationRecord, ReminderKind, ID};
use sqlx::PgPool;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn exists(&self, event_id: &ID, user_id: i64, kind: ReminderKind) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notification_records
                WHERE event_uid = $1 AND user_id = $2 AND kind = $3
            )
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(user_id)
        .bind(kind.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, record: &NotificationRecord) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO notification_records(event_uid, user_id, kind, created_at)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (event_uid, user_id, kind) DO NOTHING
            "#,
        )
        .bind(record.event_id.inner_ref())
        .bind(record.user_id)
        .bind(record.kind.to_string())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn find_notified_members(
        &self,
        event_id: &ID,
        kind: ReminderKind,
    ) -> anyhow::Result<Vec<i64>> {
        let members: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM notification_records WHERE event_uid = $1 AND kind = $2",
        )
        .bind(event_id.inner_ref())
        .bind(kind.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}
