//! User account types referenced by team access grants.

use serde::{Deserialize, Serialize};
use staffdesk_core::{AppError, AppResult, NonEmptyString};
use uuid::Uuid;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Maximum login length accepted by account provisioning.
pub const LOGIN_MAX_LENGTH: usize = 50;

/// Validated, lowercased user login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Login(String);

impl Login {
    /// Creates a validated login.
    ///
    /// Logins are case-insensitive and stored lowercased. Allowed characters
    /// are ASCII letters, digits, `_`, `.`, `@` and `-`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation("login must not be empty".to_owned()));
        }

        if normalized.chars().count() > LOGIN_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "login must not exceed {LOGIN_MAX_LENGTH} characters"
            )));
        }

        if let Some(invalid) = normalized
            .chars()
            .find(|character| !is_login_character(*character))
        {
            return Err(AppError::Validation(format!(
                "login contains invalid character '{invalid}'"
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized login.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Login> for String {
    fn from(value: Login) -> Self {
        value.0
    }
}

fn is_login_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '_' | '.' | '@' | '-')
}

/// User account as seen by team access control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    login: Login,
    display_name: NonEmptyString,
}

impl User {
    /// Creates a validated user record.
    pub fn new(
        id: UserId,
        login: impl Into<String>,
        display_name: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            login: Login::new(login)?,
            display_name: NonEmptyString::new(display_name)?,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the unique login.
    #[must_use]
    pub fn login(&self) -> &Login {
        &self.login
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }
}
