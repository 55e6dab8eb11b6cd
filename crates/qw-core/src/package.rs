use std::fmt;

use serde::{Deserialize, Serialize};

/// A quest package: the namespace a group of instructions, conditions,
/// objectives, and conversations is defined in.
///
/// Every instruction belongs to exactly one package, and variable markers
/// inside it resolve against that package's scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestPackage {
    name: String,
}

impl QuestPackage {
    /// Create a package with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualify a local identifier with this package's name (`package.id`).
    pub fn qualify(&self, id: &str) -> String {
        format!("{}.{id}", self.name)
    }
}

impl fmt::Display for QuestPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
