//! Objectives: long-lived tasks tracking per-player progress.

pub mod block;

pub use block::BlockObjective;

use qw_core::profile::ProfileId;

/// Notified when a player finishes an objective.
///
/// The host wires this to whatever reacts to completion (firing follow-up
/// events, persisting tags). Called outside the objective's progress lock,
/// after the player's progress entry has already been removed.
pub trait ObjectiveListener: Send + Sync {
    /// The player completed the named objective.
    fn completed(&self, profile: ProfileId, objective: &str);
}

/// Per-player progress toward a signed counting target.
///
/// The sign of the target decides the direction: a positive target counts
/// up from zero, a negative one counts down. Completion is "reached or
/// passed the target" in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountingData {
    target: i64,
    amount: i64,
}

impl CountingData {
    /// Fresh progress toward the given target, starting at zero.
    pub fn new(target: i64) -> Self {
        Self { target, amount: 0 }
    }

    /// The target amount.
    pub fn target(&self) -> i64 {
        self.target
    }

    /// The current amount.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// `1` for a counting-up target, `-1` for a counting-down one.
    pub fn direction_factor(&self) -> i64 {
        if self.target < 0 { -1 } else { 1 }
    }

    /// Count one unit forward.
    pub fn add(&mut self) {
        self.amount += 1;
    }

    /// Count one unit backward.
    pub fn subtract(&mut self) {
        self.amount -= 1;
    }

    /// Whether the target has been reached or passed.
    pub fn completed(&self) -> bool {
        if self.direction_factor() > 0 {
            self.amount >= self.target
        } else {
            self.amount <= self.target
        }
    }
}
