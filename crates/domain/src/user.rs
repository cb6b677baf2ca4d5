//! User identity as seen by the authorization core.
//!
//! Users are owned by the surrounding authentication subsystem; this core
//! treats them as immutable values passed by reference per call.

use std::fmt::{Display, Formatter};

use masthead_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::security::Role;

/// Unique identifier for a user account.
///
/// Identifiers are opaque strings assigned by the authentication subsystem.
/// Colons are rejected because the identifier is embedded as the final
/// segment of colon-separated cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::Validation(
                "user id must not be empty".to_owned(),
            ));
        }

        if value.contains(':') || value.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "user id '{value}' must not contain ':' or whitespace"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for UserId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Authenticated user identity supplied by callers for permission checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    role: Role,
    is_active: bool,
}

impl User {
    /// Creates a user value from authentication data.
    #[must_use]
    pub fn new(id: UserId, role: Role, is_active: bool) -> Self {
        Self {
            id,
            role,
            is_active,
        }
    }

    /// Returns the unique user identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the assigned role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns whether the account is active. Inactive accounts are denied
    /// every permission.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
