//! User model
//!
//! Users created by the importer carry a name and a status only; they have no
//! password or email and cannot log in until an administrator sets one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Globally unique identifier recorded in the creation log
    pub uuid: String,
    /// Account name (unique)
    pub name: String,
    /// Whether the account is enabled
    pub status: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub name: String,
    pub status: bool,
}

impl CreateUserInput {
    /// An enabled account with no credentials
    pub fn enabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: true,
        }
    }
}
