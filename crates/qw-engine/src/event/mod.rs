//! Events: fire-and-forget actions run for a player.

pub mod journal;
pub mod notify;
pub mod point;

pub use journal::JournalEvent;
pub use notify::{IngameNotificationSender, NoNotificationSender, NotificationSender, NotifyEvent};
pub use point::PointEvent;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use qw_core::error::{ParseError, ParseResult, RuntimeResult};
use qw_core::profile::ProfileId;
use qw_script::instruction::Instruction;

/// An action executed for a player: granting points, adding journal
/// entries, sending a notification.
///
/// Execution is synchronous and must not block. A failed execution is a
/// [`qw_core::error::RuntimeError`] for the caller to log; it never aborts
/// the batch of events being fired.
pub trait QuestEvent: fmt::Debug + Send + Sync {
    /// Run the action for the given player.
    fn execute(&self, profile: ProfileId) -> RuntimeResult<()>;
}

/// Factory constructing an event from an instruction line.
pub type EventFactory = Box<dyn Fn(Instruction) -> ParseResult<Arc<dyn QuestEvent>> + Send + Sync>;

/// Registry of event types, keyed by instruction kind.
///
/// Built-in event types need host collaborators (the data store, the
/// delivery sink), so the host registers closures capturing them during
/// init; the registry itself starts empty and is read-only afterwards.
#[derive(Default)]
pub struct EventRegistry {
    factories: HashMap<String, EventFactory>,
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("EventRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl EventRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event type. Replaces any previous factory of that name.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(Instruction) -> ParseResult<Arc<dyn QuestEvent>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Construct an event from an instruction line.
    pub fn create(&self, instruction: Instruction) -> ParseResult<Arc<dyn QuestEvent>> {
        let kind = instruction.kind().to_string();
        let factory = self
            .factories
            .get(&kind)
            .ok_or_else(|| ParseError::UnknownType {
                category: "event".to_string(),
                kind,
            })?;
        factory(instruction)
    }
}

/// Run a batch of events for a player, logging failures instead of
/// propagating them. Events later in the batch still run after an earlier
/// one fails.
pub fn execute_all(events: &[Arc<dyn QuestEvent>], profile: ProfileId) {
    for event in events {
        if let Err(error) = event.execute(profile) {
            tracing::error!(player = %profile, %error, ?event, "event failed");
        }
    }
}
