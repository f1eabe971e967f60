//! Entity type names shared by the repositories and the creation log.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of entity the importer creates.
///
/// The ordering is the order groups are deleted in: content items go first so
/// nothing is left pointing at a removed user, term or file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Content item (article, video or page)
    Node,
    /// Taxonomy term
    TaxonomyTerm,
    /// Managed public file
    File,
    /// User account
    User,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Node,
        EntityType::TaxonomyTerm,
        EntityType::File,
        EntityType::User,
    ];

    /// Name stored in the creation log
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Node => "node",
            EntityType::TaxonomyTerm => "taxonomy_term",
            EntityType::File => "file",
            EntityType::User => "user",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown entity type: {}", s))
    }
}

/// Identity of a persisted entity: its row id and its UUID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub id: i64,
    pub uuid: String,
}

/// Generate a fresh entity UUID
pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
