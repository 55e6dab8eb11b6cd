//! The `journal` event: unlock a journal entry for a player.

use std::fmt;
use std::sync::Arc;

use qw_core::error::RuntimeResult;
use qw_core::host::PlayerDataStore;
use qw_core::package::QuestPackage;
use qw_core::profile::ProfileId;

use crate::event::{NotificationSender, QuestEvent};
use crate::journal::Journal;

/// Appends a pointer to the player's journal and notifies them.
///
/// The journal mutation is persisted before the notification is sent, so
/// "your journal was updated" can never precede the update. The entry id is
/// qualified with the defining package's name.
pub struct JournalEvent {
    entry_id: String,
    store: Arc<dyn PlayerDataStore>,
    notify: Arc<dyn NotificationSender>,
}

impl fmt::Debug for JournalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JournalEvent")
            .field("entry_id", &self.entry_id)
            .finish()
    }
}

impl JournalEvent {
    /// An event unlocking `<package>.<entry>`.
    pub fn new(
        package: &QuestPackage,
        entry: &str,
        store: Arc<dyn PlayerDataStore>,
        notify: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            entry_id: package.qualify(entry),
            store,
            notify,
        }
    }

    /// The qualified entry id this event unlocks.
    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }
}

impl QuestEvent for JournalEvent {
    fn execute(&self, profile: ProfileId) -> RuntimeResult<()> {
        let mut journal = Journal::load(self.store.as_ref(), profile);
        journal.add_pointer(self.entry_id.clone());
        journal.update(self.store.as_ref());
        self.notify.send_notification(profile);
        Ok(())
    }
}
