use super::IClubOwnerRepo;
use passgate_domain::{ClubOwner, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresClubOwnerRepo {
    pool: PgPool,
}

impl PostgresClubOwnerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClubOwnerRaw {
    club_uid: Uuid,
    user_id: i64,
    warnings: bool,
}

impl From<ClubOwnerRaw> for ClubOwner {
    fn from(o: ClubOwnerRaw) -> Self {
        Self {
            club_id: o.club_uid.into(),
            user_id: o.user_id,
            warnings: o.warnings,
        }
    }
}

#[async_trait::async_trait]
impl IClubOwnerRepo for PostgresClubOwnerRepo {
    async fn insert(&self, owner: &ClubOwner) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO club_owners(club_uid, user_id, warnings)
            VALUES($1, $2, $3)
            ON CONFLICT (club_uid, user_id) DO UPDATE SET warnings = EXCLUDED.warnings
            "#,
        )
        .bind(owner.club_id.inner_ref())
        .bind(owner.user_id)
        .bind(owner.warnings)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_club(&self, club_id: &ID) -> anyhow::Result<Vec<ClubOwner>> {
        let owners =
            sqlx::query_as::<_, ClubOwnerRaw>("SELECT * FROM club_owners WHERE club_uid = $1")
                .bind(club_id.inner_ref())
                .fetch_all(&self.pool)
                .await?;
        Ok(owners.into_iter().map(ClubOwner::from).collect())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<ClubOwner>> {
        let owners = sqlx::query_as::<_, ClubOwnerRaw>("SELECT * FROM club_owners")
            .fetch_all(&self.pool)
            .await?;
        Ok(owners.into_iter().map(ClubOwner::from).collect())
    }
}
