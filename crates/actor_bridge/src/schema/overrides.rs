//! Hand-written schemas for well-known actors that publish none.

use std::collections::HashMap;
use std::path::Path;

use actor_structs::{ActorDetail, InputSchema};
use anyhow::Context;

const BUILTIN_OVERRIDES: &str = include_str!("../../data/schema_overrides.json");

/// Schemas keyed by actor id or `username~name`.
#[derive(Debug, Clone, Default)]
pub struct SchemaOverrides {
    schemas: HashMap<String, InputSchema>,
}

impl SchemaOverrides {
    /// Parses an override table from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a map of schemas, or if two
    /// keys name the same actor once `/` is read as `~`.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let parsed: HashMap<String, InputSchema> =
            serde_json::from_str(json).context("Failed to parse schema override table")?;

        let mut schemas = HashMap::with_capacity(parsed.len());
        for (key, schema) in parsed {
            let key = key.replace('/', "~");
            anyhow::ensure!(
                !schemas.contains_key(&key),
                "Schema override table lists {key} more than once"
            );
            schemas.insert(key, schema.retain_declared_required());
        }

        Ok(Self { schemas })
    }

    /// Returns the table shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded table is malformed.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_json(BUILTIN_OVERRIDES)
    }

    /// Loads a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Looks up the override for an actor by any of its names.
    #[must_use]
    pub fn lookup(&self, requested_id: &str, detail: &ActorDetail) -> Option<&InputSchema> {
        let actor = &detail.actor;
        [
            Some(requested_id.replace('/', "~")),
            Some(actor.id.clone()),
            actor.qualified_name(),
        ]
        .into_iter()
        .flatten()
        .find_map(|key| self.schemas.get(&key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    #[cfg(test)]
    pub fn insert(&mut self, key: &str, schema: InputSchema) {
        self.schemas.insert(key.to_owned(), schema);
    }
}
