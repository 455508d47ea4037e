use std::collections::BTreeSet;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use staffdesk_application::{AccessGrantRepository, TeamRepository, UserRepository};
use staffdesk_core::AppError;
use staffdesk_domain::{
    AccessGrant, AccessLevel, MembershipChanges, Team, TeamId, UserId, plan_membership_changes,
};

use super::PostgresAccessGrantRepository;
use crate::{PostgresTeamRepository, PostgresUserRepository};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres team access tests: {error}");
    }

    Some(pool)
}

async fn insert_user(pool: &PgPool, login_prefix: &str) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query(
        r#"
            INSERT INTO app_users (id, login, display_name)
            VALUES ($1, $2, $3)
            "#,
    )
    .bind(user_id.as_uuid())
    .bind(format!("{login_prefix}-{}", user_id.as_uuid().simple()))
    .bind(login_prefix)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    user_id
}

async fn create_team(pool: &PgPool, owner: UserId, name: &str) -> Team {
    let team = Team::new(TeamId::new(), name).unwrap_or_else(|_| panic!("test"));
    let created = PostgresTeamRepository::new(pool.clone())
        .create_team_with_owner(team.clone(), AccessGrant::owner(owner, team.id()))
        .await;
    assert!(created.is_ok());
    team
}

#[tokio::test]
async fn create_team_with_unknown_owner_rolls_back_team_insert() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let teams = PostgresTeamRepository::new(pool.clone());
    let team = Team::new(TeamId::new(), "Orphan").unwrap_or_else(|_| panic!("test"));
    let missing_owner = UserId::new();

    let result = teams
        .create_team_with_owner(team.clone(), AccessGrant::owner(missing_owner, team.id()))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    let stored = teams.find_team(team.id()).await;
    assert!(matches!(stored, Ok(None)));
}

#[tokio::test]
async fn grant_viewer_is_upsert_and_owner_only() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let outsider = insert_user(&pool, "outsider").await;
    let team = create_team(&pool, owner, "Maintenance").await;
    let grants = PostgresAccessGrantRepository::new(pool.clone());

    let first = grants.grant_viewer_as_owner(team.id(), owner, viewer).await;
    let second = grants.grant_viewer_as_owner(team.id(), owner, viewer).await;
    let denied = grants
        .grant_viewer_as_owner(team.id(), viewer, outsider)
        .await;

    assert_eq!(
        first.as_ref().ok().map(AccessGrant::level),
        Some(AccessLevel::Viewer)
    );
    assert_eq!(
        first.ok().map(|grant| grant.id()),
        second.ok().map(|grant| grant.id())
    );
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let listed = grants.list_grants_for_team(team.id()).await;
    assert_eq!(listed.map(|grants| grants.len()).ok(), Some(2));
}

#[tokio::test]
async fn grant_to_missing_user_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = insert_user(&pool, "owner").await;
    let team = create_team(&pool, owner, "Maintenance").await;
    let grants = PostgresAccessGrantRepository::new(pool.clone());

    let result = grants
        .grant_viewer_as_owner(team.id(), owner, UserId::new())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn delete_team_removes_grants_before_team() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let team = create_team(&pool, owner, "Logistics").await;
    let grants = PostgresAccessGrantRepository::new(pool.clone());
    let teams = PostgresTeamRepository::new(pool.clone());
    assert!(
        grants
            .grant_viewer_as_owner(team.id(), owner, viewer)
            .await
            .is_ok()
    );

    assert!(matches!(
        teams.delete_team_as_owner(team.id(), owner).await,
        Ok(true)
    ));
    assert!(matches!(
        teams.delete_team_as_owner(team.id(), owner).await,
        Err(AppError::Forbidden(_))
    ));

    let remaining = grants.list_grants_for_team(team.id()).await;
    assert_eq!(remaining.map(|grants| grants.len()).ok(), Some(0));
}

#[tokio::test]
async fn demoted_owner_cannot_rename_or_delete_team() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = insert_user(&pool, "owner").await;
    let successor = insert_user(&pool, "successor").await;
    let team = create_team(&pool, owner, "Dispatch").await;
    let grants = PostgresAccessGrantRepository::new(pool.clone());
    let teams = PostgresTeamRepository::new(pool.clone());
    assert!(
        grants
            .transfer_ownership_as_owner(team.id(), owner, successor)
            .await
            .is_ok()
    );
    let renamed = team.renamed("Hijacked").unwrap_or_else(|_| panic!("test"));

    let rename = teams.rename_team_as_owner(renamed, owner).await;
    let delete = teams.delete_team_as_owner(team.id(), owner).await;

    assert!(matches!(rename, Err(AppError::Forbidden(_))));
    assert!(matches!(delete, Err(AppError::Forbidden(_))));
    let stored = teams
        .find_team(team.id())
        .await
        .unwrap_or_else(|error| panic!("find failed: {error}"));
    assert_eq!(
        stored.map(|team| team.name().as_str().to_owned()),
        Some("Dispatch".to_owned())
    );
    let listed = grants.list_grants_for_team(team.id()).await;
    assert_eq!(listed.map(|grants| grants.len()).ok(), Some(2));
}

#[tokio::test]
async fn delete_team_waits_for_concurrent_grant_and_removes_it() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = insert_user(&pool, "owner").await;
    let late_viewer = insert_user(&pool, "late-viewer").await;
    let team = create_team(&pool, owner, "Night Desk").await;
    let team_id = team.id();

    let mut holder = pool
        .begin()
        .await
        .unwrap_or_else(|error| panic!("begin failed: {error}"));
    let locked = sqlx::query(
        r#"
        SELECT id
        FROM team_access_grants
        WHERE team_id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(team_id.as_uuid())
    .bind(owner.as_uuid())
    .execute(&mut *holder)
    .await;
    assert!(locked.is_ok());

    let teams = PostgresTeamRepository::new(pool.clone());
    let delete = tokio::spawn(async move { teams.delete_team_as_owner(team_id, owner).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!delete.is_finished());

    let granted = sqlx::query(
        r#"
        INSERT INTO team_access_grants (id, user_id, team_id, access_level)
        VALUES ($1, $2, $3, 'viewer')
        "#,
    )
    .bind(AccessGrant::viewer(late_viewer, team_id).id().as_uuid())
    .bind(late_viewer.as_uuid())
    .bind(team_id.as_uuid())
    .execute(&mut *holder)
    .await;
    assert!(granted.is_ok());
    assert!(holder.commit().await.is_ok());

    let deleted = delete
        .await
        .unwrap_or_else(|error| panic!("delete task failed: {error}"));
    assert!(matches!(deleted, Ok(true)));

    let grants = PostgresAccessGrantRepository::new(pool.clone());
    let remaining = grants.list_grants_for_team(team_id).await;
    assert_eq!(remaining.map(|grants| grants.len()).ok(), Some(0));
}

#[tokio::test]
async fn revoke_rejects_owner_and_removes_viewer() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let team = create_team(&pool, owner, "Training").await;
    let grants = PostgresAccessGrantRepository::new(pool.clone());
    assert!(
        grants
            .grant_viewer_as_owner(team.id(), owner, viewer)
            .await
            .is_ok()
    );

    let owner_revoke = grants.revoke_viewer_as_owner(team.id(), owner, owner).await;
    let viewer_revoke = grants
        .revoke_viewer_as_owner(team.id(), owner, viewer)
        .await;

    assert!(matches!(owner_revoke, Err(AppError::Conflict(_))));
    assert!(matches!(viewer_revoke, Ok(true)));
    assert!(matches!(
        grants.find_grant(viewer, team.id()).await,
        Ok(None)
    ));
}

#[tokio::test]
async fn transfer_ownership_swaps_levels() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = insert_user(&pool, "owner").await;
    let successor = insert_user(&pool, "successor").await;
    let team = create_team(&pool, owner, "Audit").await;
    let grants = PostgresAccessGrantRepository::new(pool.clone());

    let result = grants
        .transfer_ownership_as_owner(team.id(), owner, successor)
        .await;
    assert!(result.is_ok());

    let previous = grants.find_grant(owner, team.id()).await;
    let current = grants.find_grant(successor, team.id()).await;
    assert_eq!(
        previous.ok().flatten().map(|grant| grant.level()),
        Some(AccessLevel::Viewer)
    );
    assert_eq!(
        current.ok().flatten().map(|grant| grant.level()),
        Some(AccessLevel::Owner)
    );
}

#[tokio::test]
async fn membership_changes_keep_owner_grant() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = insert_user(&pool, "owner").await;
    let leaving = insert_user(&pool, "leaving").await;
    let joining = insert_user(&pool, "joining").await;
    let team = create_team(&pool, owner, "Procurement").await;
    let grants = PostgresAccessGrantRepository::new(pool.clone());
    assert!(
        grants
            .grant_viewer_as_owner(team.id(), owner, leaving)
            .await
            .is_ok()
    );

    let current = grants
        .list_grants_for_team(team.id())
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    let changes = plan_membership_changes(&current, &BTreeSet::from([joining]));
    assert_eq!(
        changes,
        MembershipChanges {
            revoked: vec![leaving],
            added: vec![joining],
        }
    );

    let applied = grants
        .apply_membership_changes_as_owner(team.id(), owner, &changes)
        .await;
    assert!(applied.is_ok());

    let holders: BTreeSet<(UserId, AccessLevel)> = grants
        .list_grants_for_team(team.id())
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"))
        .iter()
        .map(|grant| (grant.user_id(), grant.level()))
        .collect();
    assert_eq!(
        holders,
        BTreeSet::from([(owner, AccessLevel::Owner), (joining, AccessLevel::Viewer)])
    );
}

#[tokio::test]
async fn deleting_user_cascades_to_grants_and_lookups_ignore_case_and_padding() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let owner = insert_user(&pool, "owner").await;
    let viewer = insert_user(&pool, "viewer").await;
    let team = create_team(&pool, owner, "Field Crew").await;
    let grants = PostgresAccessGrantRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    assert!(
        grants
            .grant_viewer_as_owner(team.id(), owner, viewer)
            .await
            .is_ok()
    );

    let stored = users
        .find_user(viewer)
        .await
        .unwrap_or_else(|error| panic!("lookup failed: {error}"))
        .unwrap_or_else(|| panic!("viewer should exist"));
    let by_login = users
        .find_user_by_login(stored.login().as_str().to_uppercase().as_str())
        .await;
    assert_eq!(by_login.ok().flatten().map(|user| user.id()), Some(viewer));
    let padded = format!("  {}\t", stored.login().as_str());
    let by_padded_login = users.find_user_by_login(padded.as_str()).await;
    assert_eq!(
        by_padded_login.ok().flatten().map(|user| user.id()),
        Some(viewer)
    );

    let deleted = sqlx::query("DELETE FROM app_users WHERE id = $1")
        .bind(viewer.as_uuid())
        .execute(&pool)
        .await;
    assert!(deleted.is_ok());

    assert!(matches!(
        grants.find_grant(viewer, team.id()).await,
        Ok(None)
    ));
}
