//! Chat interception during conversations.
//!
//! While a conversation runs, ordinary chat traffic to the player can be
//! held back so the dialogue stays readable. The host routes all outbound
//! chat through an [`InterceptingSink`]; the sink consults the
//! [`SessionRegistry`] and lets the active [`Interceptor`], if any, decide
//! whether a message is delivered now, buffered, or handed to an external
//! pause mechanism. Conversation prompts bypass interception via
//! [`Interceptor::send_message`].

use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use qw_core::error::{ParseError, ParseResult};
use qw_core::host::MessageSink;
use qw_core::profile::ProfileId;

/// Per-player chat interception for the lifetime of one conversation.
pub trait Interceptor: Send + Sync {
    /// Deliver a message immediately, bypassing interception.
    fn send_message(&self, message: &str);

    /// Offer an ordinary chat message. Returns `true` when the interceptor
    /// consumed it (the caller must not deliver it).
    fn intercept(&self, message: &str) -> bool;

    /// End the session, releasing whatever was held back. Idempotent.
    fn end(&self);
}

/// No interception: everything is delivered as it arrives.
pub struct PassthroughInterceptor {
    profile: ProfileId,
    sink: Arc<dyn MessageSink>,
}

impl PassthroughInterceptor {
    /// An interceptor that never holds anything back.
    pub fn new(profile: ProfileId, sink: Arc<dyn MessageSink>) -> Self {
        Self { profile, sink }
    }
}

impl Interceptor for PassthroughInterceptor {
    fn send_message(&self, message: &str) {
        self.sink.send(self.profile, message);
    }

    fn intercept(&self, _message: &str) -> bool {
        false
    }

    fn end(&self) {}
}

/// Buffers intercepted messages and flushes them when the session ends.
///
/// The flush drains the buffer, so each held message is delivered exactly
/// once even if `end` is called more than once.
pub struct BufferingInterceptor {
    profile: ProfileId,
    sink: Arc<dyn MessageSink>,
    held: Mutex<Vec<String>>,
}

impl BufferingInterceptor {
    /// An interceptor that holds chat until the session ends.
    pub fn new(profile: ProfileId, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            profile,
            sink,
            held: Mutex::new(Vec::new()),
        }
    }
}

impl Interceptor for BufferingInterceptor {
    fn send_message(&self, message: &str) {
        self.sink.send(self.profile, message);
    }

    fn intercept(&self, message: &str) -> bool {
        self.held.lock().push(message.to_string());
        true
    }

    fn end(&self) {
        let held = mem::take(&mut *self.held.lock());
        for message in held {
            self.sink.send(self.profile, &message);
        }
    }
}

/// An external chat-holding mechanism, e.g. a cross-server chat bridge.
pub trait ChatPauser: Send + Sync {
    /// Stop delivering chat to the player.
    fn pause_chat(&self, profile: ProfileId);

    /// Resume delivering chat, including anything held while paused.
    fn unpause_chat(&self, profile: ProfileId);
}

/// Delegates holding to an external [`ChatPauser`].
///
/// Chat is paused on construction and unpaused when the session ends; the
/// external system owns the held messages, so nothing is buffered here.
/// Ending twice (session cleanup plus a later conversation drop) unpauses
/// only once.
pub struct PauseDelegateInterceptor {
    profile: ProfileId,
    sink: Arc<dyn MessageSink>,
    pauser: Arc<dyn ChatPauser>,
    ended: AtomicBool,
}

impl PauseDelegateInterceptor {
    /// Pause the player's chat and return the interceptor.
    pub fn new(
        profile: ProfileId,
        sink: Arc<dyn MessageSink>,
        pauser: Arc<dyn ChatPauser>,
    ) -> Self {
        pauser.pause_chat(profile);
        Self {
            profile,
            sink,
            pauser,
            ended: AtomicBool::new(false),
        }
    }
}

impl Interceptor for PauseDelegateInterceptor {
    fn send_message(&self, message: &str) {
        self.sink.send(self.profile, message);
    }

    fn intercept(&self, _message: &str) -> bool {
        // The external system is already holding chat.
        false
    }

    fn end(&self) {
        if !self.ended.swap(true, Ordering::SeqCst) {
            self.pauser.unpause_chat(self.profile);
        }
    }
}

/// Which players currently have an interception session.
///
/// At most one session per player: beginning a new one replaces (and ends)
/// any previous session.
#[derive(Default)]
pub struct SessionRegistry {
    active: Mutex<HashMap<ProfileId, Arc<dyn Interceptor>>>,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("active", &self.active.lock().len())
            .finish()
    }
}

impl SessionRegistry {
    /// A registry with no active sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session for the player, ending any previous one.
    pub fn begin(&self, profile: ProfileId, interceptor: Arc<dyn Interceptor>) {
        let previous = self.active.lock().insert(profile, interceptor);
        if let Some(previous) = previous {
            previous.end();
        }
    }

    /// The player's active interceptor, if any.
    pub fn active(&self, profile: ProfileId) -> Option<Arc<dyn Interceptor>> {
        self.active.lock().get(&profile).cloned()
    }

    /// Remove the player's session without ending it.
    pub fn release(&self, profile: ProfileId) -> Option<Arc<dyn Interceptor>> {
        self.active.lock().remove(&profile)
    }

    /// Remove the player's session only if it is exactly the given
    /// interceptor. A conversation whose session was already replaced must
    /// not deregister its successor on teardown.
    pub fn release_if(&self, profile: ProfileId, interceptor: &Arc<dyn Interceptor>) -> bool {
        let mut active = self.active.lock();
        if active
            .get(&profile)
            .is_some_and(|current| Arc::ptr_eq(current, interceptor))
        {
            active.remove(&profile);
            return true;
        }
        false
    }

    /// End and remove the player's session.
    pub fn end(&self, profile: ProfileId) {
        if let Some(interceptor) = self.release(profile) {
            interceptor.end();
        }
    }

    /// End and remove every session. Used at shutdown so no held chat is
    /// lost.
    pub fn end_all(&self) {
        let drained: Vec<Arc<dyn Interceptor>> =
            self.active.lock().drain().map(|(_, i)| i).collect();
        for interceptor in drained {
            interceptor.end();
        }
    }
}

/// The sink the host routes ordinary outbound chat through.
///
/// Messages to players with an active session are offered to their
/// interceptor first; everything else goes straight to the inner sink.
pub struct InterceptingSink {
    inner: Arc<dyn MessageSink>,
    sessions: Arc<SessionRegistry>,
}

impl InterceptingSink {
    /// Wrap the host's delivery sink.
    pub fn new(inner: Arc<dyn MessageSink>, sessions: Arc<SessionRegistry>) -> Self {
        Self { inner, sessions }
    }
}

impl MessageSink for InterceptingSink {
    fn send(&self, profile: ProfileId, message: &str) {
        if let Some(interceptor) = self.sessions.active(profile) {
            if interceptor.intercept(message) {
                return;
            }
        }
        self.inner.send(profile, message);
    }
}

/// Factory constructing an interceptor for one player's session.
///
/// Factories capture the *direct* delivery sink, never the intercepting one,
/// so a flush cannot be re-intercepted.
pub type InterceptorFactory = Box<dyn Fn(ProfileId) -> Arc<dyn Interceptor> + Send + Sync>;

/// Registry of interceptor types, keyed by the name conversations use.
#[derive(Default)]
pub struct InterceptorRegistry {
    factories: HashMap<String, InterceptorFactory>,
}

impl fmt::Debug for InterceptorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("InterceptorRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl InterceptorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in interceptor types registered:
    /// `none` (passthrough) and `simple` (buffering).
    pub fn with_builtins(sink: Arc<dyn MessageSink>) -> Self {
        let mut registry = Self::new();
        let passthrough_sink = Arc::clone(&sink);
        registry.register("none", move |profile| {
            Arc::new(PassthroughInterceptor::new(
                profile,
                Arc::clone(&passthrough_sink),
            ))
        });
        registry.register("simple", move |profile| {
            Arc::new(BufferingInterceptor::new(profile, Arc::clone(&sink)))
        });
        registry
    }

    /// Register an interceptor type. Replaces any previous factory.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(ProfileId) -> Arc<dyn Interceptor> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Construct an interceptor for the player.
    pub fn create(&self, kind: &str, profile: ProfileId) -> ParseResult<Arc<dyn Interceptor>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| ParseError::UnknownType {
                category: "interceptor".to_string(),
                kind: kind.to_string(),
            })?;
        Ok(factory(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RecordingSink;

    #[test]
    fn buffering_holds_chat_and_flushes_once_on_end() {
        let sink = Arc::new(RecordingSink::default());
        let sessions = Arc::new(SessionRegistry::new());
        let outbound = InterceptingSink::new(
            Arc::clone(&sink) as Arc<dyn MessageSink>,
            Arc::clone(&sessions),
        );

        let profile = ProfileId::new();
        let interceptor: Arc<dyn Interceptor> = Arc::new(BufferingInterceptor::new(
            profile,
            Arc::clone(&sink) as Arc<dyn MessageSink>,
        ));
        sessions.begin(profile, Arc::clone(&interceptor));

        interceptor.send_message("npc: hello");
        outbound.send(profile, "guild chat 1");
        outbound.send(profile, "guild chat 2");
        assert_eq!(sink.texts(), vec!["npc: hello"]);

        sessions.end(profile);
        assert_eq!(
            sink.texts(),
            vec!["npc: hello", "guild chat 1", "guild chat 2"]
        );

        // A second end must not re-deliver.
        interceptor.end();
        assert_eq!(sink.texts().len(), 3);
    }

    #[test]
    fn chat_flows_normally_without_a_session() {
        let sink = Arc::new(RecordingSink::default());
        let sessions = Arc::new(SessionRegistry::new());
        let outbound = InterceptingSink::new(
            Arc::clone(&sink) as Arc<dyn MessageSink>,
            Arc::clone(&sessions),
        );

        let profile = ProfileId::new();
        outbound.send(profile, "hello");
        assert_eq!(sink.texts(), vec!["hello"]);
    }

    #[test]
    fn sessions_are_per_player() {
        let sink = Arc::new(RecordingSink::default());
        let sessions = Arc::new(SessionRegistry::new());
        let outbound = InterceptingSink::new(
            Arc::clone(&sink) as Arc<dyn MessageSink>,
            Arc::clone(&sessions),
        );

        let talking = ProfileId::new();
        let bystander = ProfileId::new();
        sessions.begin(
            talking,
            Arc::new(BufferingInterceptor::new(
                talking,
                Arc::clone(&sink) as Arc<dyn MessageSink>,
            )),
        );

        outbound.send(talking, "held");
        outbound.send(bystander, "delivered");
        assert_eq!(sink.texts(), vec!["delivered"]);
    }

    #[test]
    fn passthrough_never_holds() {
        let sink = Arc::new(RecordingSink::default());
        let profile = ProfileId::new();
        let interceptor =
            PassthroughInterceptor::new(profile, Arc::clone(&sink) as Arc<dyn MessageSink>);
        assert!(!interceptor.intercept("chatter"));
        interceptor.send_message("prompt");
        assert_eq!(sink.texts(), vec!["prompt"]);
    }

    #[test]
    fn pause_delegate_brackets_the_session() {
        #[derive(Default)]
        struct FakePauser {
            log: Mutex<Vec<String>>,
        }
        impl ChatPauser for FakePauser {
            fn pause_chat(&self, _profile: ProfileId) {
                self.log.lock().push("pause".to_string());
            }
            fn unpause_chat(&self, _profile: ProfileId) {
                self.log.lock().push("unpause".to_string());
            }
        }

        let sink = Arc::new(RecordingSink::default());
        let pauser = Arc::new(FakePauser::default());
        let interceptor = PauseDelegateInterceptor::new(
            ProfileId::new(),
            Arc::clone(&sink) as Arc<dyn MessageSink>,
            Arc::clone(&pauser) as Arc<dyn ChatPauser>,
        );
        assert_eq!(*pauser.log.lock(), vec!["pause"]);
        assert!(!interceptor.intercept("bridged"));
        interceptor.end();
        assert_eq!(*pauser.log.lock(), vec!["pause", "unpause"]);

        // The quit path ends via the registry and the conversation teardown
        // ends again; the external system must see one unpause.
        interceptor.end();
        assert_eq!(*pauser.log.lock(), vec!["pause", "unpause"]);
    }

    #[test]
    fn release_if_only_removes_the_owning_session() {
        let sink = Arc::new(RecordingSink::default());
        let sessions = SessionRegistry::new();
        let profile = ProfileId::new();

        let first: Arc<dyn Interceptor> = Arc::new(BufferingInterceptor::new(
            profile,
            Arc::clone(&sink) as Arc<dyn MessageSink>,
        ));
        let second: Arc<dyn Interceptor> = Arc::new(BufferingInterceptor::new(
            profile,
            Arc::clone(&sink) as Arc<dyn MessageSink>,
        ));
        sessions.begin(profile, Arc::clone(&first));
        sessions.begin(profile, Arc::clone(&second));

        assert!(!sessions.release_if(profile, &first));
        assert!(sessions.active(profile).is_some());

        assert!(sessions.release_if(profile, &second));
        assert!(sessions.active(profile).is_none());
    }

    #[test]
    fn beginning_a_new_session_ends_the_previous_one() {
        let sink = Arc::new(RecordingSink::default());
        let sessions = SessionRegistry::new();
        let profile = ProfileId::new();

        let first: Arc<dyn Interceptor> = Arc::new(BufferingInterceptor::new(
            profile,
            Arc::clone(&sink) as Arc<dyn MessageSink>,
        ));
        sessions.begin(profile, Arc::clone(&first));
        first.intercept("held by first");

        sessions.begin(
            profile,
            Arc::new(BufferingInterceptor::new(
                profile,
                Arc::clone(&sink) as Arc<dyn MessageSink>,
            )),
        );
        assert_eq!(sink.texts(), vec!["held by first"]);
    }

    #[test]
    fn end_all_flushes_every_session() {
        let sink = Arc::new(RecordingSink::default());
        let sessions = SessionRegistry::new();
        for text in ["one", "two"] {
            let profile = ProfileId::new();
            let interceptor: Arc<dyn Interceptor> = Arc::new(BufferingInterceptor::new(
                profile,
                Arc::clone(&sink) as Arc<dyn MessageSink>,
            ));
            sessions.begin(profile, Arc::clone(&interceptor));
            interceptor.intercept(text);
        }
        sessions.end_all();
        let mut texts = sink.texts();
        texts.sort();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn registry_builds_builtin_kinds() {
        let sink = Arc::new(RecordingSink::default());
        let registry = InterceptorRegistry::with_builtins(sink as Arc<dyn MessageSink>);
        assert!(registry.create("simple", ProfileId::new()).is_ok());
        assert!(registry.create("none", ProfileId::new()).is_ok());
        assert!(matches!(
            registry.create("redis", ProfileId::new()),
            Err(ParseError::UnknownType { category, .. }) if category == "interceptor"
        ));
    }
}
