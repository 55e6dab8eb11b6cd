//! The quest journal: an ordered, append-only log of unlocked entries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use qw_core::host::{JournalPointer, PlayerDataStore};
use qw_core::profile::ProfileId;
use qw_core::text::legacy_to_tagged;
use qw_script::template::Template;
use qw_script::variable::ResolutionContext;

/// The entry texts a journal renders against, keyed by package-qualified
/// entry id.
///
/// Built at load time from the packages' journal sections; the pointers a
/// player holds may outlive the entry definitions, so rendering tolerates
/// ids with no text.
#[derive(Debug, Default)]
pub struct JournalTexts {
    entries: HashMap<String, Template>,
}

impl JournalTexts {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry text. Replaces any previous text for the id.
    pub fn insert(&mut self, entry_id: impl Into<String>, text: Template) {
        self.entries.insert(entry_id.into(), text);
    }

    /// The text for an entry, if defined.
    pub fn get(&self, entry_id: &str) -> Option<&Template> {
        self.entries.get(entry_id)
    }
}

/// One player's journal.
///
/// Pointers record *which* entries the player unlocked and *when*; the texts
/// live in [`JournalTexts`] and are resolved per render, so a variable in an
/// entry always shows current state. The pointer list is append-only.
#[derive(Debug)]
pub struct Journal {
    profile: ProfileId,
    pointers: Vec<JournalPointer>,
}

impl Journal {
    /// Load the player's journal from the store.
    pub fn load(store: &dyn PlayerDataStore, profile: ProfileId) -> Self {
        Self {
            profile,
            pointers: store.journal_pointers(profile),
        }
    }

    /// The player this journal belongs to.
    pub fn profile(&self) -> ProfileId {
        self.profile
    }

    /// The pointers, oldest first.
    pub fn pointers(&self) -> &[JournalPointer] {
        &self.pointers
    }

    /// Whether the journal holds a pointer to the entry.
    pub fn has_entry(&self, entry_id: &str) -> bool {
        self.pointers.iter().any(|p| p.entry_id == entry_id)
    }

    /// Append a pointer to the entry, stamped now. A duplicate id is
    /// ignored.
    pub fn add_pointer(&mut self, entry_id: impl Into<String>) {
        self.add_pointer_at(entry_id, Utc::now());
    }

    /// Append a pointer with an explicit timestamp. A duplicate id is
    /// ignored.
    pub fn add_pointer_at(&mut self, entry_id: impl Into<String>, timestamp: DateTime<Utc>) {
        let entry_id = entry_id.into();
        if self.has_entry(&entry_id) {
            return;
        }
        self.pointers.push(JournalPointer {
            entry_id,
            timestamp,
        });
    }

    /// Persist the journal.
    pub fn update(&self, store: &dyn PlayerDataStore) {
        store.write_journal_pointers(self.profile, &self.pointers);
    }

    /// Render the journal as dated entries, oldest first.
    ///
    /// Each entry is a `dd.MM.yyyy HH:mm` date line followed by the resolved
    /// text, legacy format codes converted. A pointer whose entry has no
    /// text, or whose text fails to resolve, is logged and skipped.
    pub fn render(&self, texts: &JournalTexts, ctx: &ResolutionContext<'_>) -> String {
        let mut rendered = Vec::new();
        for pointer in &self.pointers {
            let Some(template) = texts.get(&pointer.entry_id) else {
                tracing::warn!(
                    entry = %pointer.entry_id,
                    player = %self.profile,
                    "journal pointer has no entry text, skipping"
                );
                continue;
            };
            let text = match template.resolve(ctx) {
                Ok(text) => text,
                Err(error) => {
                    tracing::error!(
                        entry = %pointer.entry_id,
                        player = %self.profile,
                        %error,
                        "journal entry failed to resolve, skipping"
                    );
                    continue;
                }
            };
            let date = pointer.timestamp.format("%d.%m.%Y %H:%M");
            rendered.push(format!("{date}\n{}", legacy_to_tagged(&text)));
        }
        rendered.join("\n\n")
    }
}
