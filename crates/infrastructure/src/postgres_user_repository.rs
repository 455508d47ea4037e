//! PostgreSQL-backed user lookups.

use async_trait::async_trait;
use sqlx::PgPool;

use staffdesk_application::UserRepository;
use staffdesk_core::{AppError, AppResult};
use staffdesk_domain::{User, UserId};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    login: String,
    display_name: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        User::new(UserId::from_uuid(row.id), row.login, row.display_name)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, login, display_name
            FROM app_users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user '{user_id}': {error}")))?
        .map(User::try_from)
        .transpose()
    }

    async fn find_user_by_login(&self, login: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, login, display_name
            FROM app_users
            WHERE login = lower($1)
            "#,
        )
        .bind(login.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user by login '{login}': {error}"))
        })?
        .map(User::try_from)
        .transpose()
    }

    async fn find_users(&self, user_ids: &[UserId]) -> AppResult<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<uuid::Uuid> = user_ids.iter().map(UserId::as_uuid).collect();
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, login, display_name
            FROM app_users
            WHERE id = ANY($1)
            ORDER BY login
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?
        .into_iter()
        .map(User::try_from)
        .collect()
    }
}
