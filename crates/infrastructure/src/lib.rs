//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_team_access_repository;
mod postgres_access_grant_repository;
mod postgres_team_repository;
mod postgres_user_repository;

pub use in_memory_team_access_repository::InMemoryTeamAccessRepository;
pub use postgres_access_grant_repository::PostgresAccessGrantRepository;
pub use postgres_team_repository::PostgresTeamRepository;
pub use postgres_user_repository::PostgresUserRepository;
