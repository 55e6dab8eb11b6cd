//! The `point` event: change a player's point total.

use std::fmt;
use std::sync::Arc;

use qw_core::error::{ParseResult, RuntimeResult};
use qw_core::host::{GameQuery, PlayerDataStore};
use qw_core::profile::ProfileId;
use qw_script::instruction::Instruction;
use qw_script::number::VariableNumber;
use qw_script::variable::ResolutionContext;

use crate::event::{NotificationSender, QuestEvent};

/// Adds to (or, with a negative amount, subtracts from) a player's point
/// total in a category, then notifies them.
///
/// `point <category> <amount>`
pub struct PointEvent {
    category: String,
    amount: VariableNumber,
    store: Arc<dyn PlayerDataStore>,
    query: Arc<dyn GameQuery>,
    notify: Arc<dyn NotificationSender>,
}

impl fmt::Debug for PointEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointEvent")
            .field("category", &self.category)
            .finish()
    }
}

impl PointEvent {
    /// Parse from `point <category> <amount>`.
    pub fn parse(
        mut instruction: Instruction,
        store: Arc<dyn PlayerDataStore>,
        query: Arc<dyn GameQuery>,
        notify: Arc<dyn NotificationSender>,
    ) -> ParseResult<Self> {
        let category = instruction.next()?;
        let amount = instruction.get_var_num()?;
        Ok(Self {
            category,
            amount,
            store,
            query,
            notify,
        })
    }
}

impl QuestEvent for PointEvent {
    fn execute(&self, profile: ProfileId) -> RuntimeResult<()> {
        let ctx = ResolutionContext::for_player(profile, self.query.as_ref());
        let delta = self.amount.int_value(&ctx)?;
        self.store.add_point(profile, &self.category, delta);
        self.notify.send_notification(profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NoNotificationSender;
    use crate::testutil::{FakeQuery, MemoryStore};
    use qw_core::package::QuestPackage;
    use qw_script::variable::VariableRegistry;

    fn event(line: &str, store: Arc<MemoryStore>, query: FakeQuery) -> PointEvent {
        let instruction = Instruction::new(
            QuestPackage::new("castle"),
            Arc::new(VariableRegistry::with_builtins()),
            line,
        )
        .unwrap();
        PointEvent::parse(
            instruction,
            store as Arc<dyn PlayerDataStore>,
            Arc::new(query),
            Arc::new(NoNotificationSender),
        )
        .unwrap()
    }

    #[test]
    fn points_accumulate() {
        let store = Arc::new(MemoryStore::default());
        let event = event("point bravery 5", Arc::clone(&store), FakeQuery::default());
        let profile = ProfileId::new();

        event.execute(profile).unwrap();
        event.execute(profile).unwrap();
        assert_eq!(
            store.points.lock()[&(profile, "bravery".to_string())],
            10
        );
    }

    #[test]
    fn negative_amounts_subtract() {
        let store = Arc::new(MemoryStore::default());
        let event = event("point bravery -3", Arc::clone(&store), FakeQuery::default());
        let profile = ProfileId::new();

        event.execute(profile).unwrap();
        assert_eq!(store.points.lock()[&(profile, "bravery".to_string())], -3);
    }

    #[test]
    fn variable_amount_resolves_at_execution_time() {
        let store = Arc::new(MemoryStore::default());
        let mut query = FakeQuery::default();
        query.points.insert("level".to_string(), 4);
        let event = event(
            "point bravery %point.level.amount%",
            Arc::clone(&store),
            query,
        );
        let profile = ProfileId::new();

        event.execute(profile).unwrap();
        assert_eq!(store.points.lock()[&(profile, "bravery".to_string())], 4);
    }
}
