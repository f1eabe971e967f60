//! Taxonomy term model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vocabulary that article tags belong to
pub const TAGS_VOCABULARY: &str = "tags";

/// A term scoped to a vocabulary; (name, vocabulary) is unique
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Term {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub vocabulary: String,
    /// URL alias, e.g. `/tags/rust`
    pub alias: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a term
#[derive(Debug, Clone)]
pub struct CreateTermInput {
    pub name: String,
    pub vocabulary: String,
    pub alias: Option<String>,
}
