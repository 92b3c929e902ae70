use super::IMemberRepo;
use passgate_domain::{Member, Role};
use sqlx::{FromRow, PgPool};

pub struct PostgresMemberRepo {
    pool: PgPool,
}

impl PostgresMemberRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MemberRaw {
    user_id: i64,
    full_name: String,
    role: String,
    email: Option<String>,
    is_banned: bool,
}

impl From<MemberRaw> for Member {
    fn from(m: MemberRaw) -> Self {
        Self {
            id: m.user_id,
            full_name: m.full_name,
            role: Role::new(m.role),
            email: m.email,
            is_banned: m.is_banned,
        }
    }
}

#[async_trait::async_trait]
impl IMemberRepo for PostgresMemberRepo {
    async fn save(&self, member: &Member) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members(user_id, full_name, role, email, is_banned)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                role = EXCLUDED.role,
                email = EXCLUDED.email,
                is_banned = EXCLUDED.is_banned
            "#,
        )
        .bind(member.id)
        .bind(&member.full_name)
        .bind(member.role.as_str())
        .bind(&member.email)
        .bind(member.is_banned)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, user_id: i64) -> anyhow::Result<Option<Member>> {
        let member = sqlx::query_as::<_, MemberRaw>("SELECT * FROM members WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member.map(Member::from))
    }

    async fn find_many(&self, user_ids: &[i64]) -> anyhow::Result<Vec<Member>> {
        let members =
            sqlx::query_as::<_, MemberRaw>("SELECT * FROM members WHERE user_id = ANY($1)")
                .bind(user_ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(members.into_iter().map(Member::from).collect())
    }
}
