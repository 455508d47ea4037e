use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::info;

use staffdesk_application::TeamRepository;
use staffdesk_core::{AppError, AppResult};
use staffdesk_domain::{AccessGrant, AccessLevel, Team, TeamId, TeamMembership, UserId};

use crate::postgres_access_grant_repository::lock_owner_grant;

/// PostgreSQL-backed team repository.
#[derive(Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TeamRow {
    id: uuid::Uuid,
    name: String,
}

#[derive(Debug, FromRow)]
struct TeamMembershipRow {
    id: uuid::Uuid,
    name: String,
    access_level: String,
}

impl TryFrom<TeamRow> for Team {
    type Error = AppError;

    fn try_from(row: TeamRow) -> Result<Self, Self::Error> {
        Team::new(TeamId::from_uuid(row.id), row.name)
    }
}

impl TryFrom<TeamMembershipRow> for TeamMembership {
    type Error = AppError;

    fn try_from(row: TeamMembershipRow) -> Result<Self, Self::Error> {
        Ok(TeamMembership {
            team: Team::new(TeamId::from_uuid(row.id), row.name)?,
            level: AccessLevel::from_transport(row.access_level.as_str())?,
        })
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn create_team_with_owner(&self, team: Team, owner_grant: AccessGrant) -> AppResult<()> {
        let owner = owner_grant.user_id();
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO teams (id, name)
            VALUES ($1, $2)
            "#,
        )
        .bind(team.id().as_uuid())
        .bind(team.name().as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create team: {error}")))?;

        let owner_exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM app_users
                WHERE id = $1
            )
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve team owner: {error}")))?;

        if !owner_exists {
            return Err(AppError::NotFound(format!("user '{owner}' not found")));
        }

        sqlx::query(
            r#"
            INSERT INTO team_access_grants (id, user_id, team_id, access_level)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(owner_grant.id().as_uuid())
        .bind(owner.as_uuid())
        .bind(team.id().as_uuid())
        .bind(AccessLevel::Owner.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| owner_missing_or_internal(error, owner))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        info!(team_id = %team.id(), %owner, "team created");
        Ok(())
    }

    async fn find_team(&self, team_id: TeamId) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, name
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(team_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find team '{team_id}': {error}")))?
        .map(Team::try_from)
        .transpose()
    }

    async fn rename_team_as_owner(&self, team: Team, owner: UserId) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;
        lock_owner_grant(&mut transaction, team.id(), owner).await?;

        let result = sqlx::query(
            r#"
            UPDATE teams
            SET name = $2,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(team.id().as_uuid())
        .bind(team.name().as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to rename team: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("team '{}' not found", team.id())));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        info!(team_id = %team.id(), %owner, "team renamed");
        Ok(())
    }

    async fn list_teams_for_user(&self, user_id: UserId) -> AppResult<Vec<TeamMembership>> {
        sqlx::query_as::<_, TeamMembershipRow>(
            r#"
            SELECT teams.id, teams.name, grants.access_level
            FROM team_access_grants AS grants
            INNER JOIN teams
                ON teams.id = grants.team_id
            WHERE grants.user_id = $1
            ORDER BY teams.name, teams.id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list teams for user '{user_id}': {error}"))
        })?
        .into_iter()
        .map(TeamMembership::try_from)
        .collect()
    }

    async fn delete_team_as_owner(&self, team_id: TeamId, owner: UserId) -> AppResult<bool> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;
        lock_owner_grant(&mut transaction, team_id, owner).await?;

        let removed_grants = sqlx::query(
            r#"
            DELETE FROM team_access_grants
            WHERE team_id = $1
            "#,
        )
        .bind(team_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete team grants: {error}")))?
        .rows_affected();

        let removed_teams = sqlx::query(
            r#"
            DELETE FROM teams
            WHERE id = $1
            "#,
        )
        .bind(team_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete team: {error}")))?
        .rows_affected();

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        if removed_teams == 0 {
            return Ok(false);
        }

        info!(%team_id, %owner, removed_grants, "team deleted");
        Ok(true)
    }
}

fn owner_missing_or_internal(error: sqlx::Error, owner: UserId) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!("user '{owner}' not found"));
    }

    AppError::Internal(format!("failed to create owner grant: {error}"))
}
