use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated caller resolved from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: Uuid,
    subject: String,
    display_name: String,
}

impl UserIdentity {
    /// Creates a user identity from the stored user record and token subject.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        subject: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            subject: subject.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns the persisted user identifier.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Returns the token subject, which is the user's login.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}
