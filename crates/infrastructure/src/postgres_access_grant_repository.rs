use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::info;

use staffdesk_application::AccessGrantRepository;
use staffdesk_core::{AppError, AppResult};
use staffdesk_domain::{
    AccessGrant, AccessGrantId, AccessLevel, MembershipChanges, TeamId, UserId,
};

/// PostgreSQL-backed repository for team access grants.
#[derive(Clone)]
pub struct PostgresAccessGrantRepository {
    pool: PgPool,
}

impl PostgresAccessGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

#[derive(Debug, FromRow)]
struct AccessGrantRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    team_id: uuid::Uuid,
    access_level: String,
}

impl TryFrom<AccessGrantRow> for AccessGrant {
    type Error = AppError;

    fn try_from(row: AccessGrantRow) -> Result<Self, Self::Error> {
        Ok(AccessGrant::from_parts(
            AccessGrantId::from_uuid(row.id),
            UserId::from_uuid(row.user_id),
            TeamId::from_uuid(row.team_id),
            AccessLevel::from_transport(row.access_level.as_str())?,
        ))
    }
}

#[async_trait]
impl AccessGrantRepository for PostgresAccessGrantRepository {
    async fn find_grant(
        &self,
        user_id: UserId,
        team_id: TeamId,
    ) -> AppResult<Option<AccessGrant>> {
        sqlx::query_as::<_, AccessGrantRow>(
            r#"
            SELECT id, user_id, team_id, access_level
            FROM team_access_grants
            WHERE user_id = $1 AND team_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(team_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find access grant: {error}")))?
        .map(AccessGrant::try_from)
        .transpose()
    }

    async fn list_grants_for_team(&self, team_id: TeamId) -> AppResult<Vec<AccessGrant>> {
        sqlx::query_as::<_, AccessGrantRow>(
            r#"
            SELECT id, user_id, team_id, access_level
            FROM team_access_grants
            WHERE team_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(team_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list access grants for team '{team_id}': {error}"
            ))
        })?
        .into_iter()
        .map(AccessGrant::try_from)
        .collect()
    }

    async fn grant_viewer_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        grantee: UserId,
    ) -> AppResult<AccessGrant> {
        let mut transaction = self.begin().await?;
        lock_owner_grant(&mut transaction, team_id, owner).await?;

        let candidate = AccessGrant::viewer(grantee, team_id);
        sqlx::query(
            r#"
            INSERT INTO team_access_grants (id, user_id, team_id, access_level)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, team_id) DO NOTHING
            "#,
        )
        .bind(candidate.id().as_uuid())
        .bind(grantee.as_uuid())
        .bind(team_id.as_uuid())
        .bind(AccessLevel::Viewer.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| user_missing_or_internal(error, grantee, "grant access"))?;

        let grant = sqlx::query_as::<_, AccessGrantRow>(
            r#"
            SELECT id, user_id, team_id, access_level
            FROM team_access_grants
            WHERE user_id = $1 AND team_id = $2
            "#,
        )
        .bind(grantee.as_uuid())
        .bind(team_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read access grant: {error}")))
        .and_then(AccessGrant::try_from)?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        info!(%team_id, %owner, %grantee, level = grant.level().as_str(), "team access granted");
        Ok(grant)
    }

    async fn revoke_viewer_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        user_id: UserId,
    ) -> AppResult<bool> {
        let mut transaction = self.begin().await?;
        lock_owner_grant(&mut transaction, team_id, owner).await?;

        let level = sqlx::query_scalar::<_, String>(
            r#"
            SELECT access_level
            FROM team_access_grants
            WHERE team_id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(team_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve access grant: {error}")))?;

        let Some(level) = level else {
            return Ok(false);
        };

        if AccessLevel::from_transport(level.as_str())? == AccessLevel::Owner {
            return Err(AppError::Conflict(format!(
                "owner grant of user '{user_id}' on team '{team_id}' cannot be revoked; transfer ownership instead"
            )));
        }

        sqlx::query(
            r#"
            DELETE FROM team_access_grants
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke access grant: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        info!(%team_id, %owner, %user_id, "team access revoked");
        Ok(true)
    }

    async fn transfer_ownership_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        new_owner: UserId,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        lock_owner_grant(&mut transaction, team_id, owner).await?;

        sqlx::query(
            r#"
            UPDATE team_access_grants
            SET access_level = $3
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id.as_uuid())
        .bind(owner.as_uuid())
        .bind(AccessLevel::Viewer.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to demote previous owner: {error}")))?;

        let promoted = AccessGrant::owner(new_owner, team_id);
        sqlx::query(
            r#"
            INSERT INTO team_access_grants (id, user_id, team_id, access_level)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, team_id)
            DO UPDATE SET access_level = EXCLUDED.access_level
            "#,
        )
        .bind(promoted.id().as_uuid())
        .bind(new_owner.as_uuid())
        .bind(team_id.as_uuid())
        .bind(AccessLevel::Owner.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| user_missing_or_internal(error, new_owner, "promote new owner"))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        info!(%team_id, previous_owner = %owner, %new_owner, "team ownership transferred");
        Ok(())
    }

    async fn apply_membership_changes_as_owner(
        &self,
        team_id: TeamId,
        owner: UserId,
        changes: &MembershipChanges,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        lock_owner_grant(&mut transaction, team_id, owner).await?;

        if !changes.revoked.is_empty() {
            let revoked: Vec<uuid::Uuid> = changes.revoked.iter().map(UserId::as_uuid).collect();
            sqlx::query(
                r#"
                DELETE FROM team_access_grants
                WHERE team_id = $1
                    AND access_level = $2
                    AND user_id = ANY($3)
                "#,
            )
            .bind(team_id.as_uuid())
            .bind(AccessLevel::Viewer.as_str())
            .bind(revoked)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to revoke team members: {error}"))
            })?;
        }

        for user_id in &changes.added {
            let grant = AccessGrant::viewer(*user_id, team_id);
            sqlx::query(
                r#"
                INSERT INTO team_access_grants (id, user_id, team_id, access_level)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, team_id) DO NOTHING
                "#,
            )
            .bind(grant.id().as_uuid())
            .bind(user_id.as_uuid())
            .bind(team_id.as_uuid())
            .bind(AccessLevel::Viewer.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| user_missing_or_internal(error, *user_id, "add team member"))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        info!(
            %team_id,
            %owner,
            revoked = changes.revoked.len(),
            added = changes.added.len(),
            "team members reconciled"
        );
        Ok(())
    }
}

/// Locks the acting user's grant row and ensures it is an owner grant.
/// Locks `owner`'s grant row for the rest of the transaction and checks it
/// still carries owner rights.
pub(crate) async fn lock_owner_grant(
    transaction: &mut Transaction<'_, Postgres>,
    team_id: TeamId,
    owner: UserId,
) -> AppResult<()> {
    let level = sqlx::query_scalar::<_, String>(
        r#"
        SELECT access_level
        FROM team_access_grants
        WHERE team_id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(team_id.as_uuid())
    .bind(owner.as_uuid())
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to resolve owner grant: {error}")))?;

    match level.as_deref().map(AccessLevel::from_transport).transpose()? {
        Some(level) if level.can_share() => Ok(()),
        _ => Err(AppError::Forbidden(format!(
            "only owner can change access to team '{team_id}'"
        ))),
    }
}

fn user_missing_or_internal(error: sqlx::Error, user_id: UserId, operation: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!("user '{user_id}' not found"));
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

#[cfg(test)]
mod tests;
