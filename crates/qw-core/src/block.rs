use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A block as reported by the host in a world event: a namespaced type id
/// plus its block states.
///
/// The engine never queries the world for blocks directly; events carry the
/// block they concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Namespaced type id, e.g. `minecraft:oak_log`.
    pub id: String,
    /// Block states, e.g. `axis=y`. Ordered so equality is stable.
    pub states: BTreeMap<String, String>,
}

impl Block {
    /// Create a block with no states.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            states: BTreeMap::new(),
        }
    }

    /// Add a block state.
    pub fn with_state(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.states.insert(key.into(), value.into());
        self
    }

    /// The namespace part of the id, defaulting to `minecraft`.
    pub fn namespace(&self) -> &str {
        self.id.split_once(':').map_or("minecraft", |(ns, _)| ns)
    }

    /// The name part of the id, without the namespace.
    pub fn name(&self) -> &str {
        self.id.split_once(':').map_or(self.id.as_str(), |(_, n)| n)
    }
}
