//! Managed file model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// URI scheme prefix for files in the public directory
pub const PUBLIC_SCHEME: &str = "public://";

/// A file tracked by the content store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedFile {
    pub id: i64,
    pub uuid: String,
    /// Location such as `public://hero.jpg`
    pub uri: String,
    /// Permanent (true) or temporary file
    pub status: bool,
    pub created_at: DateTime<Utc>,
}
