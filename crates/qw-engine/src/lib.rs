//! The Questweave runtime: objectives, conversations, journals, and events.
//!
//! The host adapter owns the registries (populated once at init), feeds
//! world events into the [`Engine`], and routes outbound chat through
//! [`Engine::delivery_sink`] so conversations can intercept it. Everything
//! player-facing flows back out through the host's
//! [`qw_core::host::MessageSink`].

/// World-event fan-out.
pub mod bus;
/// Conditions: boolean checks against live player state.
pub mod condition;
/// Conversations: interactive dialogue trees between NPCs and players.
pub mod conversation;
/// Events: fire-and-forget actions run for a player.
pub mod event;
/// The quest journal.
pub mod journal;
/// Objectives: long-lived tasks tracking per-player progress.
pub mod objective;

#[cfg(test)]
mod testutil;

pub use bus::{EventBus, EventListener, WorldEvent};
pub use condition::{Condition, ConditionRegistry};
pub use conversation::{
    Conversation, ConversationBuilder, ConversationData, InterceptingSink, Interceptor,
    InterceptorRegistry, NodeBuilder, OptionBuilder, SessionRegistry, StyleSheet, StyleSource,
};
pub use event::{EventRegistry, NotificationSender, QuestEvent};
pub use journal::{Journal, JournalTexts};
pub use objective::{BlockObjective, CountingData, ObjectiveListener};

use std::sync::Arc;

use parking_lot::RwLock;
use qw_core::error::ParseResult;
use qw_core::host::{GameQuery, MessageSink};
use qw_core::profile::ProfileId;

/// The runtime's shared plumbing: the event bus, chat interception, and the
/// current conversation styles.
///
/// Element registries (variables, conditions, events) stay with the loader;
/// the engine only owns what must be shared between running pieces. All
/// methods take `&self` and are safe to call from any thread.
pub struct Engine {
    bus: Arc<EventBus>,
    sessions: Arc<SessionRegistry>,
    interceptors: InterceptorRegistry,
    delivery: Arc<dyn MessageSink>,
    styles: RwLock<Arc<StyleSheet>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("bus", &self.bus)
            .field("sessions", &self.sessions)
            .field("interceptors", &self.interceptors)
            .finish()
    }
}

impl Engine {
    /// Build the engine around the host's delivery sink.
    ///
    /// The built-in interceptor kinds are registered against the sink as
    /// given; route ordinary chat through [`Engine::delivery_sink`] instead
    /// of the raw sink, or nothing will ever be intercepted.
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        let sessions = Arc::new(SessionRegistry::new());
        let interceptors = InterceptorRegistry::with_builtins(Arc::clone(&sink));
        let delivery = Arc::new(InterceptingSink::new(
            Arc::clone(&sink),
            Arc::clone(&sessions),
        ));
        Self {
            bus: Arc::new(EventBus::new()),
            sessions,
            interceptors,
            delivery,
            styles: RwLock::new(Arc::new(StyleSheet::default())),
        }
    }

    /// The bus objectives subscribe to.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The sink the host must route ordinary outbound chat through.
    pub fn delivery_sink(&self) -> Arc<dyn MessageSink> {
        Arc::clone(&self.delivery)
    }

    /// Register an additional interceptor kind, e.g. a chat-bridge pause
    /// delegate. Init-time only, hence `&mut self`.
    pub fn register_interceptor<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(ProfileId) -> Arc<dyn Interceptor> + Send + Sync + 'static,
    {
        self.interceptors.register(kind, factory);
    }

    /// The current conversation styles.
    ///
    /// Returns a snapshot: a running conversation keeps the sheet it started
    /// with even across a reload.
    pub fn styles(&self) -> Arc<StyleSheet> {
        Arc::clone(&self.styles.read())
    }

    /// Replace the conversation styles wholesale, as part of a reload.
    pub fn reload_styles(&self, source: &StyleSource) {
        *self.styles.write() = Arc::new(StyleSheet::parse(source));
    }

    /// Start a conversation for a player.
    pub fn begin_conversation(
        &self,
        data: Arc<ConversationData>,
        profile: ProfileId,
        query: Arc<dyn GameQuery>,
    ) -> ParseResult<Conversation> {
        Conversation::begin(
            data,
            profile,
            query,
            self.styles(),
            &self.interceptors,
            Arc::clone(&self.sessions),
        )
    }

    /// Feed one world event through the engine.
    ///
    /// A quitting player's interception session is closed (flushing held
    /// chat) before the event reaches the listeners.
    pub fn handle_event(&self, event: &WorldEvent) {
        if let WorldEvent::PlayerQuit { profile } = event {
            self.sessions.end(*profile);
        }
        self.bus.dispatch(event);
    }

    /// Close every interception session, flushing held chat. Called when
    /// the host shuts down or reloads.
    pub fn shutdown(&self) {
        self.sessions.end_all();
    }
}
