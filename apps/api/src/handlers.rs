use staffdesk_core::{AppError, AppResult, UserIdentity};
use staffdesk_domain::UserId;

pub mod access;
pub mod health;
pub mod me;
pub mod teams;

fn actor_id(user: &UserIdentity) -> UserId {
    UserId::from_uuid(user.user_id())
}

fn parse_user_id(value: &str) -> AppResult<UserId> {
    uuid::Uuid::parse_str(value.trim())
        .map(UserId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
}
