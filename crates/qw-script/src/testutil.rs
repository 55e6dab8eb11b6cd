//! Shared test doubles for this crate's unit tests.

use std::collections::HashMap;

use qw_core::host::{GameQuery, PlayerClass};
use qw_core::location::WorldLocation;
use qw_core::profile::ProfileId;

/// Fixed-answer game state: every player gets the same answers.
#[derive(Debug, Default)]
pub struct FakeQuery {
    /// The display name reported for every player.
    pub name: Option<String>,
    /// The position reported for every player.
    pub location: Option<WorldLocation>,
    /// Per-category point totals.
    pub points: HashMap<String, i64>,
    /// Per-category global point totals.
    pub global_points: HashMap<String, i64>,
}

impl GameQuery for FakeQuery {
    fn player_name(&self, _profile: ProfileId) -> Option<String> {
        self.name.clone()
    }

    fn player_location(&self, _profile: ProfileId) -> Option<WorldLocation> {
        self.location.clone()
    }

    fn player_class(&self, _profile: ProfileId) -> Option<PlayerClass> {
        None
    }

    fn point(&self, _profile: ProfileId, category: &str) -> i64 {
        self.points.get(category).copied().unwrap_or(0)
    }

    fn global_point(&self, category: &str) -> i64 {
        self.global_points.get(category).copied().unwrap_or(0)
    }
}
