//! Conversations: interactive dialogue trees between NPCs and players.

pub mod interceptor;
pub mod style;

pub use interceptor::{
    BufferingInterceptor, ChatPauser, InterceptingSink, Interceptor, InterceptorRegistry,
    PassthroughInterceptor, PauseDelegateInterceptor, SessionRegistry,
};
pub use style::{Style, StyleSheet, StyleSource};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use qw_core::error::{ParseError, ParseResult};
use qw_core::host::GameQuery;
use qw_core::package::QuestPackage;
use qw_core::profile::ProfileId;
use qw_core::text::legacy_to_tagged;
use qw_script::template::Template;
use qw_script::variable::{ResolutionContext, VariableRegistry};

use crate::condition::Condition;
use crate::event::{self, QuestEvent};

/// Where a chosen option leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Continue at the named NPC node.
    Node(String),
    /// End the conversation.
    End,
}

/// A selectable player answer inside a compiled node.
pub struct PlayerOption {
    text: Template,
    conditions: Vec<Arc<dyn Condition>>,
    events: Vec<Arc<dyn QuestEvent>>,
    next: Transition,
}

impl fmt::Debug for PlayerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerOption")
            .field("text", &self.text.raw())
            .field("next", &self.next)
            .finish()
    }
}

/// One compiled NPC node: what the NPC says and the player's answers.
#[derive(Debug)]
pub struct ConversationNode {
    text: Template,
    options: Vec<PlayerOption>,
    fallback: Option<String>,
}

/// A compiled, validated conversation.
///
/// Every transition target was checked at compile time, so a running
/// conversation can never step onto a missing node.
#[derive(Debug)]
pub struct ConversationData {
    package: QuestPackage,
    name: String,
    npc_name: Template,
    interceptor: String,
    start: String,
    nodes: HashMap<String, ConversationNode>,
}

impl ConversationData {
    /// The conversation's name, unqualified.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package the conversation is defined in.
    pub fn package(&self) -> &QuestPackage {
        &self.package
    }

    /// The interceptor kind sessions of this conversation use.
    pub fn interceptor(&self) -> &str {
        &self.interceptor
    }
}

/// Builder for one player option.
pub struct OptionBuilder {
    text: String,
    conditions: Vec<Arc<dyn Condition>>,
    events: Vec<Arc<dyn QuestEvent>>,
    next: Transition,
}

impl OptionBuilder {
    /// An option with the given raw text, ending the conversation unless
    /// [`Self::leads_to`] is called.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            conditions: Vec::new(),
            events: Vec::new(),
            next: Transition::End,
        }
    }

    /// Show the option only when the condition holds.
    pub fn visible_when(mut self, condition: Arc<dyn Condition>) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Fire the event when the option is chosen.
    pub fn fires(mut self, event: Arc<dyn QuestEvent>) -> Self {
        self.events.push(event);
        self
    }

    /// Continue at the named node when the option is chosen.
    pub fn leads_to(mut self, node: impl Into<String>) -> Self {
        self.next = Transition::Node(node.into());
        self
    }
}

/// Builder for one NPC node.
pub struct NodeBuilder {
    id: String,
    text: String,
    fallback: Option<String>,
    options: Vec<OptionBuilder>,
}

impl NodeBuilder {
    /// A node with the given id and raw NPC text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            fallback: None,
            options: Vec::new(),
        }
    }

    /// Continue at the named node when no option is visible.
    pub fn fallback(mut self, node: impl Into<String>) -> Self {
        self.fallback = Some(node.into());
        self
    }

    /// Add a player option. Declaration order is display order.
    pub fn option(mut self, option: OptionBuilder) -> Self {
        self.options.push(option);
        self
    }
}

/// Builder for a whole conversation.
pub struct ConversationBuilder {
    package: QuestPackage,
    name: String,
    npc_name: String,
    interceptor: String,
    start: String,
    nodes: Vec<NodeBuilder>,
}

impl ConversationBuilder {
    /// A conversation named `name` in `package`, speaking as `npc_name`
    /// (underscores become spaces) and starting at the `start` node.
    ///
    /// The `simple` buffering interceptor is used unless
    /// [`Self::interceptor`] overrides it.
    pub fn new(
        package: QuestPackage,
        name: impl Into<String>,
        npc_name: impl Into<String>,
        start: impl Into<String>,
    ) -> Self {
        Self {
            package,
            name: name.into(),
            npc_name: npc_name.into(),
            interceptor: "simple".to_string(),
            start: start.into(),
            nodes: Vec::new(),
        }
    }

    /// Use the named interceptor kind for this conversation's sessions.
    pub fn interceptor(mut self, kind: impl Into<String>) -> Self {
        self.interceptor = kind.into();
        self
    }

    /// Add an NPC node.
    pub fn node(mut self, node: NodeBuilder) -> Self {
        self.nodes.push(node);
        self
    }

    /// Compile and validate the conversation.
    ///
    /// All templates are parsed against the registry and every transition
    /// target, fallback, and the start node are checked to exist.
    pub fn compile(self, registry: &VariableRegistry) -> ParseResult<ConversationData> {
        let npc_name =
            Template::parse_replacing_underscores(&self.package, registry, &self.npc_name)?;

        let mut nodes = HashMap::new();
        for node in self.nodes {
            let text = Template::parse_replacing_underscores(&self.package, registry, &node.text)?;
            let mut options = Vec::new();
            for option in node.options {
                options.push(PlayerOption {
                    text: Template::parse_replacing_underscores(
                        &self.package,
                        registry,
                        &option.text,
                    )?,
                    conditions: option.conditions,
                    events: option.events,
                    next: option.next,
                });
            }
            nodes.insert(
                node.id,
                ConversationNode {
                    text,
                    options,
                    fallback: node.fallback,
                },
            );
        }

        let unknown = |node: &str| ParseError::UnknownConversationNode {
            conversation: self.package.qualify(&self.name),
            node: node.to_string(),
        };
        if !nodes.contains_key(&self.start) {
            return Err(unknown(&self.start));
        }
        for node in nodes.values() {
            if let Some(fallback) = &node.fallback {
                if !nodes.contains_key(fallback) {
                    return Err(unknown(fallback));
                }
            }
            for option in &node.options {
                if let Transition::Node(target) = &option.next {
                    if !nodes.contains_key(target) {
                        return Err(unknown(target));
                    }
                }
            }
        }

        Ok(ConversationData {
            package: self.package,
            name: self.name,
            npc_name,
            interceptor: self.interceptor,
            start: self.start,
            nodes,
        })
    }
}

/// A running conversation for one player.
///
/// Beginning a conversation opens a chat-interception session; prompts and
/// echoed answers bypass it, ordinary chat is held by it. The session is
/// closed exactly once, when the conversation ends, by whichever comes
/// first: an end transition, a node with nothing to say, an explicit
/// [`Conversation::end`], or the value being dropped.
pub struct Conversation {
    data: Arc<ConversationData>,
    profile: ProfileId,
    query: Arc<dyn GameQuery>,
    styles: Arc<StyleSheet>,
    interceptor: Arc<dyn Interceptor>,
    sessions: Arc<SessionRegistry>,
    current: Option<String>,
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("name", &self.data.name)
            .field("player", &self.profile)
            .field("current", &self.current)
            .finish()
    }
}

impl Conversation {
    /// Begin the conversation: open the interception session and send the
    /// starting node's prompt.
    pub fn begin(
        data: Arc<ConversationData>,
        profile: ProfileId,
        query: Arc<dyn GameQuery>,
        styles: Arc<StyleSheet>,
        interceptors: &InterceptorRegistry,
        sessions: Arc<SessionRegistry>,
    ) -> ParseResult<Self> {
        let interceptor = interceptors.create(&data.interceptor, profile)?;
        sessions.begin(profile, Arc::clone(&interceptor));
        let start = data.start.clone();
        let mut conversation = Self {
            data,
            profile,
            query,
            styles,
            interceptor,
            sessions,
            current: Some(start),
        };
        conversation.enter();
        Ok(conversation)
    }

    /// The player this conversation is with.
    pub fn profile(&self) -> ProfileId {
        self.profile
    }

    /// Whether the conversation is still running.
    pub fn active(&self) -> bool {
        self.current.is_some()
    }

    /// The currently visible options, rendered and numbered, in declaration
    /// order. Conditions are re-evaluated on every call.
    pub fn options(&self) -> Vec<String> {
        let Some(node) = self.current_node() else {
            return Vec::new();
        };
        self.visible_options(node)
            .iter()
            .enumerate()
            .map(|(i, option)| self.render_option(i + 1, option))
            .collect()
    }

    /// Choose a visible option by its displayed number (1-based).
    ///
    /// Echoes the answer back, fires the option's events (failures are
    /// logged, the conversation continues), and follows the transition.
    /// Returns `false` when the conversation has ended or no such option is
    /// visible right now.
    pub fn select(&mut self, number: usize) -> bool {
        let Some(node_id) = self.current.clone() else {
            return false;
        };
        let Some(node) = self.data.nodes.get(&node_id) else {
            return false;
        };
        let visible = self.visible_options(node);
        let Some(option) = number.checked_sub(1).and_then(|i| visible.get(i).copied()) else {
            return false;
        };

        self.echo_answer(option);
        event::execute_all(&option.events, self.profile);
        match option.next.clone() {
            Transition::End => self.finish(),
            Transition::Node(target) => {
                self.current = Some(target);
                self.enter();
            }
        }
        true
    }

    /// End the conversation, closing the interception session. Idempotent.
    pub fn end(&mut self) {
        self.finish();
    }

    fn current_node(&self) -> Option<&ConversationNode> {
        self.data.nodes.get(self.current.as_ref()?)
    }

    /// Enter the current node: say its text, then make sure the player has
    /// something to answer. A node with no visible options follows its
    /// fallback (saying each intermediate node's text); without one the
    /// conversation ends after the NPC's final line.
    fn enter(&mut self) {
        let mut hops = 0;
        loop {
            let Some(node) = self.current_node() else {
                return;
            };
            self.say(node);
            if !self.visible_options(node).is_empty() {
                self.send_options(node);
                return;
            }
            match node.fallback.clone() {
                Some(fallback) if hops < self.data.nodes.len() => {
                    hops += 1;
                    self.current = Some(fallback);
                }
                _ => {
                    self.finish();
                    return;
                }
            }
        }
    }

    fn visible_options<'a>(&self, node: &'a ConversationNode) -> Vec<&'a PlayerOption> {
        let ctx = ResolutionContext::for_player(self.profile, self.query.as_ref());
        node.options
            .iter()
            .filter(|option| {
                option.conditions.iter().all(|condition| {
                    match condition.check(&ctx) {
                        Ok(passed) => passed,
                        Err(error) => {
                            tracing::error!(
                                conversation = %self.data.name,
                                player = %self.profile,
                                %error,
                                "option condition failed, hiding option"
                            );
                            false
                        }
                    }
                })
            })
            .collect()
    }

    fn resolve(&self, template: &Template) -> String {
        let ctx = ResolutionContext::for_player(self.profile, self.query.as_ref());
        match template.resolve(&ctx) {
            Ok(text) => legacy_to_tagged(&text),
            Err(error) => {
                tracing::error!(
                    conversation = %self.data.name,
                    player = %self.profile,
                    %error,
                    "conversation text failed to resolve, showing raw text"
                );
                template.raw().to_string()
            }
        }
    }

    fn say(&self, node: &ConversationNode) {
        let name = self.styles.npc.apply(&self.resolve(&self.data.npc_name));
        let text = self.styles.text.apply(&self.resolve(&node.text));
        self.interceptor.send_message(&format!("{name}: {text}"));
    }

    fn render_option(&self, number: usize, option: &PlayerOption) -> String {
        let number = self.styles.number.apply(&format!("{number}."));
        let text = self.styles.option.apply(&self.resolve(&option.text));
        format!("{number} {text}")
    }

    fn send_options(&self, node: &ConversationNode) {
        for (i, option) in self.visible_options(node).iter().enumerate() {
            self.interceptor
                .send_message(&self.render_option(i + 1, option));
        }
    }

    fn echo_answer(&self, option: &PlayerOption) {
        let name = match self.query.player_name(self.profile) {
            Some(name) => name,
            None => self.profile.to_string(),
        };
        let name = self.styles.player.apply(&name);
        let answer = self.styles.answer.apply(&self.resolve(&option.text));
        self.interceptor.send_message(&format!("{name}: {answer}"));
    }

    fn finish(&mut self) {
        if self.current.take().is_some() {
            self.sessions.release_if(self.profile, &self.interceptor);
            self.interceptor.end();
        }
    }
}

impl Drop for Conversation {
    fn drop(&mut self) {
        self.finish();
    }
}
