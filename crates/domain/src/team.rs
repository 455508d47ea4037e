use serde::{Deserialize, Serialize};
use staffdesk_core::{AppError, AppResult, NonEmptyString};
use uuid::Uuid;

use crate::AccessLevel;

/// Maximum team name length.
pub const TEAM_NAME_MAX_LENGTH: usize = 200;

/// Unique identifier for a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(Uuid);

impl TeamId {
    /// Creates a new random team identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a team identifier from an existing UUID value.
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

impl Default for TeamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Named collection whose access is governed by owner and viewer grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: NonEmptyString,
}

impl Team {
    /// Creates a validated team.
    pub fn new(id: TeamId, name: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            id,
            name: validate_team_name(name)?,
        })
    }

    /// Returns the team identifier.
    #[must_use]
    pub fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the team name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns a copy of this team carrying a new validated name.
    pub fn renamed(&self, name: impl Into<String>) -> AppResult<Self> {
        Self::new(self.id, name)
    }
}

fn validate_team_name(name: impl Into<String>) -> AppResult<NonEmptyString> {
    let name = NonEmptyString::new(name)?;
    if name.as_str().chars().count() > TEAM_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "team name must not exceed {TEAM_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(name)
}

/// A team together with the access level one user holds on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    /// Team the user can access.
    pub team: Team,
    /// Access level held by the user.
    pub level: AccessLevel,
}
