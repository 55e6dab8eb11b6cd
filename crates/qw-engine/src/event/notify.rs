//! Player notifications.

use std::fmt;
use std::sync::Arc;

use qw_core::host::{GameQuery, MessageSink};
use qw_core::profile::ProfileId;
use qw_core::text::legacy_to_tagged;
use qw_script::template::Template;
use qw_script::variable::ResolutionContext;

use crate::event::QuestEvent;

/// Side-channel notification attached to another action.
///
/// Events that change player state (journal mutations, point grants) carry
/// one of these and invoke it strictly *after* the state change, so the
/// player is never told about something that has not happened yet.
pub trait NotificationSender: fmt::Debug + Send + Sync {
    /// Notify the player. Failures are swallowed and logged; a notification
    /// must never fail the action it is attached to.
    fn send_notification(&self, profile: ProfileId);
}

/// Resolves a message template for the player and delivers it.
pub struct IngameNotificationSender {
    message: Template,
    query: Arc<dyn GameQuery>,
    sink: Arc<dyn MessageSink>,
}

impl fmt::Debug for IngameNotificationSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngameNotificationSender")
            .field("message", &self.message.raw())
            .finish()
    }
}

impl IngameNotificationSender {
    /// A sender delivering the resolved, format-converted message.
    pub fn new(message: Template, query: Arc<dyn GameQuery>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            message,
            query,
            sink,
        }
    }
}

impl NotificationSender for IngameNotificationSender {
    fn send_notification(&self, profile: ProfileId) {
        let ctx = ResolutionContext::for_player(profile, self.query.as_ref());
        match self.message.resolve(&ctx) {
            Ok(text) => self.sink.send(profile, &legacy_to_tagged(&text)),
            Err(error) => {
                tracing::error!(player = %profile, %error, "notification failed to resolve");
            }
        }
    }
}

/// A sender that stays silent.
#[derive(Debug, Default)]
pub struct NoNotificationSender;

impl NotificationSender for NoNotificationSender {
    fn send_notification(&self, _profile: ProfileId) {}
}

/// The `notify` event: its whole action is sending a message.
pub struct NotifyEvent {
    sender: IngameNotificationSender,
}

impl fmt::Debug for NotifyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyEvent")
            .field("sender", &self.sender)
            .finish()
    }
}

impl NotifyEvent {
    /// An event delivering the given message.
    pub fn new(message: Template, query: Arc<dyn GameQuery>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            sender: IngameNotificationSender::new(message, query, sink),
        }
    }
}

impl QuestEvent for NotifyEvent {
    fn execute(&self, profile: ProfileId) -> qw_core::error::RuntimeResult<()> {
        self.sender.send_notification(profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeQuery, RecordingSink};
    use qw_core::package::QuestPackage;
    use qw_script::variable::VariableRegistry;

    fn template(raw: &str) -> Template {
        Template::parse_replacing_underscores(
            &QuestPackage::new("castle"),
            &VariableRegistry::with_builtins(),
            raw,
        )
        .unwrap()
    }

    #[test]
    fn notification_resolves_and_converts_formatting() {
        let sink = Arc::new(RecordingSink::default());
        let query = Arc::new(FakeQuery {
            name: Some("Steve".to_string()),
            ..FakeQuery::default()
        });
        let sender = IngameNotificationSender::new(
            template("&6Well_done,_%player%!"),
            query,
            Arc::clone(&sink) as Arc<dyn MessageSink>,
        );
        sender.send_notification(ProfileId::new());
        assert_eq!(sink.texts(), vec!["<reset><gold>Well done, Steve!"]);
    }

    #[test]
    fn failed_resolution_sends_nothing() {
        let sink = Arc::new(RecordingSink::default());
        // No player name available: %player% cannot resolve.
        let query = Arc::new(FakeQuery::default());
        let sender = IngameNotificationSender::new(
            template("Hi_%player%"),
            query,
            Arc::clone(&sink) as Arc<dyn MessageSink>,
        );
        sender.send_notification(ProfileId::new());
        assert!(sink.texts().is_empty());
    }

    #[test]
    fn notify_event_delivers() {
        let sink = Arc::new(RecordingSink::default());
        let event = NotifyEvent::new(
            template("The_gate_opens."),
            Arc::new(FakeQuery::default()),
            Arc::clone(&sink) as Arc<dyn MessageSink>,
        );
        event.execute(ProfileId::new()).unwrap();
        assert_eq!(sink.texts(), vec!["The gate opens."]);
    }
}
