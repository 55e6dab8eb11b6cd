//! Narrow interfaces to the host game server.
//!
//! The engine consumes the host through these traits and nothing else: live
//! game state is read through [`GameQuery`], text reaches players through a
//! [`MessageSink`], and persisted quest data goes through a
//! [`PlayerDataStore`]. Hosts implement them over whatever plugin API and
//! storage they have; tests implement them over hash maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::WorldLocation;
use crate::profile::ProfileId;

/// A player's class as reported by the host's class system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerClass {
    /// Class name, e.g. `mage`.
    pub name: String,
    /// Class level.
    pub level: i64,
}

/// Read access to live game state, keyed by player.
///
/// All methods return `None` (or zero) when the host has no data, e.g. for
/// an offline player. Callers decide whether that is an error.
pub trait GameQuery: Send + Sync {
    /// The player's display name.
    fn player_name(&self, profile: ProfileId) -> Option<String>;

    /// The player's current position.
    fn player_location(&self, profile: ProfileId) -> Option<WorldLocation>;

    /// The player's class, if the host has a class system.
    fn player_class(&self, profile: ProfileId) -> Option<PlayerClass>;

    /// The player's point total in a category. Zero when absent.
    fn point(&self, profile: ProfileId, category: &str) -> i64;

    /// A global (player-independent) point total. Zero when absent.
    fn global_point(&self, category: &str) -> i64;
}

/// Delivery of formatted text to a single player.
pub trait MessageSink: Send + Sync {
    /// Send a message to the player. Delivery to offline players is the
    /// host's problem; the engine fires and forgets.
    fn send(&self, profile: ProfileId, message: &str);
}

/// A persisted journal pointer: which entry a player unlocked, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalPointer {
    /// Package-qualified journal entry id.
    pub entry_id: String,
    /// When the entry was added to the journal.
    pub timestamp: DateTime<Utc>,
}

/// Persistence of per-player quest data.
///
/// Assumed synchronous from the engine's point of view; any blocking I/O is
/// the implementation's concern.
pub trait PlayerDataStore: Send + Sync {
    /// The player's journal pointers, in insertion order.
    fn journal_pointers(&self, profile: ProfileId) -> Vec<JournalPointer>;

    /// Replace the player's journal pointers.
    fn write_journal_pointers(&self, profile: ProfileId, pointers: &[JournalPointer]);

    /// Add to the player's point total in a category.
    fn add_point(&self, profile: ProfileId, category: &str, delta: i64);
}
