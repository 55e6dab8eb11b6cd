//! The block objective: place or break a number of matching blocks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use qw_core::error::{ParseResult, RuntimeResult};
use qw_core::host::GameQuery;
use qw_core::location::WorldLocation;
use qw_core::package::QuestPackage;
use qw_core::profile::ProfileId;
use qw_script::instruction::Instruction;
use qw_script::location::CompoundLocation;
use qw_script::number::VariableNumber;
use qw_script::selector::BlockSelector;
use qw_script::variable::ResolutionContext;

use crate::bus::{EventBus, EventListener, SubscriptionHandle, WorldEvent};
use crate::condition::Condition;
use crate::objective::{CountingData, ObjectiveListener};

/// Tracks block placements and breaks against a signed target.
///
/// `block <selector> <target> [exactMatch] [noSafety] [ignorecancel]
/// [loc:<location>] [region:<location>]`
///
/// A positive target counts placements up; a negative one counts breaks
/// down. Without `noSafety`, the opposing action moves the counter the other
/// way, so progress gained by placing can be undone by breaking and vice
/// versa. With `noSafety` set, the opposing action is ignored entirely.
///
/// `loc` restricts matches to one block position; adding `region` widens
/// that to the axis-aligned box between the two corners. Both corners may be
/// variable-backed; a resolution failure is logged and treated as "no
/// match". Corners in different worlds never match.
pub struct BlockObjective {
    label: String,
    package: QuestPackage,
    selector: BlockSelector,
    target: VariableNumber,
    exact_match: bool,
    no_safety: bool,
    ignore_cancel: bool,
    location: Option<CompoundLocation>,
    region: Option<CompoundLocation>,
    conditions: Vec<Arc<dyn Condition>>,
    progress: Mutex<HashMap<ProfileId, CountingData>>,
    subscription: Mutex<Option<SubscriptionHandle>>,
    query: Arc<dyn GameQuery>,
    listener: Arc<dyn ObjectiveListener>,
}

impl std::fmt::Debug for BlockObjective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockObjective")
            .field("label", &self.label)
            .field("selector", &self.selector)
            .field("players", &self.progress.lock().len())
            .finish()
    }
}

impl BlockObjective {
    /// Parse the objective from its instruction line.
    ///
    /// `label` identifies the objective in completion callbacks; conditions
    /// were resolved by the loader from the instruction's condition list.
    pub fn parse(
        label: impl Into<String>,
        mut instruction: Instruction,
        conditions: Vec<Arc<dyn Condition>>,
        query: Arc<dyn GameQuery>,
        listener: Arc<dyn ObjectiveListener>,
    ) -> ParseResult<Self> {
        let selector = instruction.get_block_selector()?;
        let target = instruction.get_var_num()?;
        let exact_match = instruction.has_argument("exactMatch");
        let no_safety = instruction.has_argument("noSafety");
        let ignore_cancel = instruction.has_argument("ignorecancel");
        let location = instruction.get_location("loc")?;
        let region = instruction.get_location("region")?;
        Ok(Self {
            label: label.into(),
            package: instruction.package().clone(),
            selector,
            target,
            exact_match,
            no_safety,
            ignore_cancel,
            location,
            region,
            conditions,
            progress: Mutex::new(HashMap::new()),
            subscription: Mutex::new(None),
            query,
            listener,
        })
    }

    /// The objective's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Subscribe to world events. Idempotent per bus.
    pub fn start(self: &Arc<Self>, bus: &EventBus) {
        let mut subscription = self.subscription.lock();
        if subscription.is_none() {
            let listener = Arc::clone(self) as Arc<dyn EventListener>;
            *subscription = Some(bus.subscribe(listener));
        }
    }

    /// Unsubscribe from world events.
    pub fn stop(&self, bus: &EventBus) {
        if let Some(handle) = self.subscription.lock().take() {
            bus.unsubscribe(handle);
        }
    }

    /// Begin tracking the player, with the target resolved for them.
    pub fn add_player(&self, profile: ProfileId) -> RuntimeResult<()> {
        let ctx = ResolutionContext::for_player(profile, self.query.as_ref());
        let target = self.target.int_value(&ctx)?;
        self.progress.lock().insert(profile, CountingData::new(target));
        Ok(())
    }

    /// Whether the player is currently tracked.
    pub fn contains_player(&self, profile: ProfileId) -> bool {
        self.progress.lock().contains_key(&profile)
    }

    /// Stop tracking the player, discarding progress.
    pub fn remove_player(&self, profile: ProfileId) {
        self.progress.lock().remove(&profile);
    }

    /// The player's current progress, if tracked.
    pub fn progress_of(&self, profile: ProfileId) -> Option<CountingData> {
        self.progress.lock().get(&profile).copied()
    }

    fn conditions_met(&self, profile: ProfileId) -> bool {
        let ctx = ResolutionContext::for_player(profile, self.query.as_ref());
        for condition in &self.conditions {
            match condition.check(&ctx) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(error) => {
                    tracing::error!(
                        package = %self.package,
                        objective = %self.label,
                        %error,
                        "condition check failed, treating as not met"
                    );
                    return false;
                }
            }
        }
        true
    }

    fn location_matches(&self, profile: ProfileId, at: &WorldLocation) -> bool {
        let Some(location) = &self.location else {
            return true;
        };
        match self.resolve_and_compare(location, profile, at) {
            Ok(matches) => matches,
            Err(error) => {
                tracing::error!(
                    package = %self.package,
                    objective = %self.label,
                    %error,
                    "location resolution failed, treating as no match"
                );
                false
            }
        }
    }

    fn resolve_and_compare(
        &self,
        location: &CompoundLocation,
        profile: ProfileId,
        at: &WorldLocation,
    ) -> RuntimeResult<bool> {
        let ctx = ResolutionContext::for_player(profile, self.query.as_ref());
        let corner = location.resolve(&ctx)?.block();
        match &self.region {
            Some(region) => {
                let other = region.resolve(&ctx)?.block();
                Ok(at.block().in_box(&corner, &other))
            }
            None => Ok(at.block() == corner),
        }
    }

    fn handle(
        &self,
        profile: ProfileId,
        block: &qw_core::block::Block,
        location: &WorldLocation,
        cancelled: bool,
        breaking: bool,
    ) {
        if cancelled && !self.ignore_cancel {
            return;
        }
        if !self.contains_player(profile) {
            return;
        }
        if !self.selector.matches(block, self.exact_match) {
            return;
        }
        if !self.conditions_met(profile) {
            return;
        }
        if !self.location_matches(profile, location) {
            return;
        }

        let done = {
            let mut progress = self.progress.lock();
            let Some(data) = progress.get_mut(&profile) else {
                return;
            };
            if breaking {
                if self.no_safety && data.direction_factor() > 0 {
                    return;
                }
                data.subtract();
            } else {
                if self.no_safety && data.direction_factor() < 0 {
                    return;
                }
                data.add();
            }
            if data.completed() {
                progress.remove(&profile);
                true
            } else {
                false
            }
        };
        if done {
            self.listener.completed(profile, &self.label);
        }
    }
}

impl EventListener for BlockObjective {
    fn on_event(&self, event: &WorldEvent) {
        match event {
            WorldEvent::BlockPlace {
                profile,
                block,
                location,
                cancelled,
            } => self.handle(*profile, block, location, *cancelled, false),
            WorldEvent::BlockBreak {
                profile,
                block,
                location,
                cancelled,
            } => self.handle(*profile, block, location, *cancelled, true),
            _ => {}
        }
    }
}
