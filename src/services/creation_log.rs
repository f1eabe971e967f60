//! Creation log
//!
//! Every entity the importer creates is recorded here as `uuid -> entity type
//! name` under a single state key, so the whole import can be rolled back
//! later. Recording is additive: an existing entry is never overwritten or
//! dropped by a later `record` call.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repositories::StateRepository;
use crate::models::EntityType;

/// UUIDs recorded under one state key, grouped for deletion
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GroupedUuids {
    /// Recorded UUIDs per known entity type
    pub by_type: BTreeMap<EntityType, Vec<String>>,
    /// Entries whose type name is not one this crate manages
    pub unknown: Vec<(String, String)>,
}

/// Durable record of created entities
pub struct CreationLog {
    state: Arc<dyn StateRepository>,
    key: String,
}

impl CreationLog {
    pub fn new(state: Arc<dyn StateRepository>, key: impl Into<String>) -> Self {
        Self {
            state,
            key: key.into(),
        }
    }

    /// State key the log is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the whole log; an absent key reads as empty
    pub async fn entries(&self) -> Result<BTreeMap<String, String>> {
        match self.state.get(&self.key).await? {
            Some(value) => serde_json::from_value(value)
                .with_context(|| format!("State '{}' is not a uuid map", self.key)),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Merge `batch` into the log. Entries already present keep their type.
    pub async fn record(&self, batch: &BTreeMap<String, EntityType>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut entries = self.entries().await?;
        let before = entries.len();
        for (uuid, entity_type) in batch {
            entries
                .entry(uuid.clone())
                .or_insert_with(|| entity_type.as_str().to_string());
        }

        self.write(&entries).await?;
        tracing::debug!(
            "Recorded {} new uuid(s) in '{}'",
            entries.len() - before,
            self.key
        );
        Ok(())
    }

    /// Record a single entity
    pub async fn record_one(&self, uuid: &str, entity_type: EntityType) -> Result<()> {
        let mut batch = BTreeMap::new();
        batch.insert(uuid.to_string(), entity_type);
        self.record(&batch).await
    }

    /// Read the log grouped by entity type
    pub async fn grouped(&self) -> Result<GroupedUuids> {
        let mut grouped = GroupedUuids::default();
        for (uuid, type_name) in self.entries().await? {
            match type_name.parse::<EntityType>() {
                Ok(entity_type) => grouped.by_type.entry(entity_type).or_default().push(uuid),
                Err(_) => grouped.unknown.push((uuid, type_name)),
            }
        }
        Ok(grouped)
    }

    /// Drop the given UUIDs from the log, leaving everything else in place.
    /// The state key is removed once the log is empty.
    pub async fn forget(&self, uuids: &[String]) -> Result<()> {
        let mut entries = self.entries().await?;
        for uuid in uuids {
            entries.remove(uuid);
        }

        if entries.is_empty() {
            self.state.delete(&self.key).await
        } else {
            self.write(&entries).await
        }
    }

    async fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let value = serde_json::to_value(entries).context("Failed to encode creation log")?;
        self.state.set(&self.key, &value).await
    }
}
