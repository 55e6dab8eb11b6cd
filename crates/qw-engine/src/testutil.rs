//! Shared test doubles for this crate's unit tests.

use std::collections::HashMap;

use parking_lot::Mutex;
use qw_core::host::{GameQuery, JournalPointer, MessageSink, PlayerClass, PlayerDataStore};
use qw_core::location::WorldLocation;
use qw_core::profile::ProfileId;

/// Fixed-answer game state: every player gets the same answers.
#[derive(Debug, Default)]
pub struct FakeQuery {
    /// The display name reported for every player.
    pub name: Option<String>,
    /// The position reported for every player.
    pub location: Option<WorldLocation>,
    /// The class reported for every player.
    pub class: Option<PlayerClass>,
    /// Per-category point totals.
    pub points: HashMap<String, i64>,
    /// Per-category global point totals.
    pub global_points: HashMap<String, i64>,
}

impl FakeQuery {
    /// Builder shorthand for a query reporting the given class.
    pub fn with_class(mut self, name: &str, level: i64) -> Self {
        self.class = Some(PlayerClass {
            name: name.to_string(),
            level,
        });
        self
    }
}

impl GameQuery for FakeQuery {
    fn player_name(&self, _profile: ProfileId) -> Option<String> {
        self.name.clone()
    }

    fn player_location(&self, _profile: ProfileId) -> Option<WorldLocation> {
        self.location.clone()
    }

    fn player_class(&self, _profile: ProfileId) -> Option<PlayerClass> {
        self.class.clone()
    }

    fn point(&self, _profile: ProfileId, category: &str) -> i64 {
        self.points.get(category).copied().unwrap_or(0)
    }

    fn global_point(&self, category: &str) -> i64 {
        self.global_points.get(category).copied().unwrap_or(0)
    }
}

/// A sink that records every delivered message.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Delivered messages, in delivery order.
    pub messages: Mutex<Vec<(ProfileId, String)>>,
}

impl RecordingSink {
    /// The recorded message texts, delivery order, players dropped.
    pub fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl MessageSink for RecordingSink {
    fn send(&self, profile: ProfileId, message: &str) {
        self.messages.lock().push((profile, message.to_string()));
    }
}

/// In-memory player data persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    journals: Mutex<HashMap<ProfileId, Vec<JournalPointer>>>,
    /// Per-player, per-category point totals.
    pub points: Mutex<HashMap<(ProfileId, String), i64>>,
}

impl PlayerDataStore for MemoryStore {
    fn journal_pointers(&self, profile: ProfileId) -> Vec<JournalPointer> {
        self.journals.lock().get(&profile).cloned().unwrap_or_default()
    }

    fn write_journal_pointers(&self, profile: ProfileId, pointers: &[JournalPointer]) {
        self.journals.lock().insert(profile, pointers.to_vec());
    }

    fn add_point(&self, profile: ProfileId, category: &str, delta: i64) {
        *self
            .points
            .lock()
            .entry((profile, category.to_string()))
            .or_insert(0) += delta;
    }
}
