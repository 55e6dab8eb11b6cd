//! Conditions: boolean checks against live player state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use qw_core::error::{ParseError, ParseResult, RuntimeError, RuntimeResult};
use qw_script::instruction::Instruction;
use qw_script::number::VariableNumber;
use qw_script::variable::ResolutionContext;

/// A boolean check evaluated against a player at runtime.
///
/// Checks are read-only and must be cheap: objectives evaluate them on every
/// qualifying world event. A failed evaluation is a [`RuntimeError`] for the
/// caller to log and treat as "condition not met".
pub trait Condition: fmt::Debug + Send + Sync {
    /// Evaluate the check for the given context.
    fn check(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<bool>;
}

/// Factory constructing a condition from an instruction line.
pub type ConditionFactory =
    Box<dyn Fn(Instruction) -> ParseResult<Arc<dyn Condition>> + Send + Sync>;

/// Registry of condition types, keyed by instruction kind.
///
/// Populated once at process init and read-only afterwards.
#[derive(Default)]
pub struct ConditionRegistry {
    factories: HashMap<String, ConditionFactory>,
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("ConditionRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl ConditionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in condition types registered:
    /// `point` and `class`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("point", PointCondition::parse);
        registry.register("class", ClassCondition::parse);
        registry
    }

    /// Register a condition type. Replaces any previous factory of that name.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(Instruction) -> ParseResult<Arc<dyn Condition>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Construct a condition from an instruction line.
    pub fn create(&self, instruction: Instruction) -> ParseResult<Arc<dyn Condition>> {
        let kind = instruction.kind().to_string();
        let factory = self
            .factories
            .get(&kind)
            .ok_or_else(|| ParseError::UnknownType {
                category: "condition".to_string(),
                kind,
            })?;
        factory(instruction)
    }
}

/// Checks a player's point total in a category.
///
/// `point <category> <count> [equal]`: true when the total is at least
/// `count`, or exactly `count` with the `equal` flag.
#[derive(Debug)]
pub struct PointCondition {
    category: String,
    count: VariableNumber,
    equal: bool,
}

impl PointCondition {
    /// Parse from `point <category> <count> [equal]`.
    pub fn parse(mut instruction: Instruction) -> ParseResult<Arc<dyn Condition>> {
        let category = instruction.next()?;
        let count = instruction.get_var_num()?;
        let equal = instruction.has_argument("equal");
        Ok(Arc::new(Self {
            category,
            count,
            equal,
        }))
    }
}

impl Condition for PointCondition {
    fn check(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<bool> {
        let profile = ctx.require_profile("point condition")?;
        let have = ctx.query.point(profile, &self.category);
        let needed = self.count.int_value(ctx)?;
        Ok(if self.equal {
            have == needed
        } else {
            have >= needed
        })
    }
}

/// Checks a player's class and, optionally, class level.
///
/// `class <name> [level] [equal]`: the name `*` matches any chosen class,
/// i.e. anything but the default `human`. Without `equal` the level check is
/// "at least".
#[derive(Debug)]
pub struct ClassCondition {
    target: String,
    level: Option<VariableNumber>,
    equal: bool,
}

impl ClassCondition {
    /// Parse from `class <name> [level] [equal]`.
    pub fn parse(mut instruction: Instruction) -> ParseResult<Arc<dyn Condition>> {
        let target = instruction.next()?;
        let level = if instruction.has_next() {
            let token = instruction.next()?;
            if token.eq_ignore_ascii_case("equal") {
                None
            } else {
                Some(instruction.var_num_of(&token)?)
            }
        } else {
            None
        };
        let equal = instruction.has_argument("equal");
        Ok(Arc::new(Self {
            target,
            level,
            equal,
        }))
    }

    fn name_matches(&self, class_name: &str) -> bool {
        if self.target == "*" {
            return !class_name.eq_ignore_ascii_case("human");
        }
        class_name.eq_ignore_ascii_case(&self.target)
    }
}

impl Condition for ClassCondition {
    fn check(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<bool> {
        let profile = ctx.require_profile("class condition")?;
        let class = ctx
            .query
            .player_class(profile)
            .ok_or(RuntimeError::PlayerUnavailable { profile })?;
        if !self.name_matches(&class.name) {
            return Ok(false);
        }
        match &self.level {
            None => Ok(true),
            Some(level) => {
                let required = level.int_value(ctx)?;
                Ok(if self.equal {
                    class.level == required
                } else {
                    class.level >= required
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeQuery;
    use qw_core::package::QuestPackage;
    use qw_core::profile::ProfileId;
    use qw_script::variable::VariableRegistry;

    fn condition(line: &str) -> Arc<dyn Condition> {
        ConditionRegistry::with_builtins()
            .create(
                Instruction::new(
                    QuestPackage::new("test"),
                    Arc::new(VariableRegistry::with_builtins()),
                    line,
                )
                .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn point_condition_is_at_least_by_default() {
        let condition = condition("point bravery 10");
        let mut query = FakeQuery::default();
        query.points.insert("bravery".to_string(), 12);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(condition.check(&ctx).unwrap());

        query.points.insert("bravery".to_string(), 9);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(!condition.check(&ctx).unwrap());
    }

    #[test]
    fn point_condition_equal_flag_requires_exact_total() {
        let condition = condition("point bravery 10 equal");
        let mut query = FakeQuery::default();
        query.points.insert("bravery".to_string(), 12);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(!condition.check(&ctx).unwrap());

        query.points.insert("bravery".to_string(), 10);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(condition.check(&ctx).unwrap());
    }

    #[test]
    fn point_condition_without_player_is_a_runtime_error() {
        let condition = condition("point bravery 10");
        let query = FakeQuery::default();
        let ctx = ResolutionContext::global(&query);
        assert!(matches!(
            condition.check(&ctx),
            Err(RuntimeError::MissingProfile { .. })
        ));
    }

    #[test]
    fn class_name_matching_is_case_insensitive() {
        let condition = condition("class Mage");
        let query = FakeQuery::default().with_class("mage", 5);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(condition.check(&ctx).unwrap());

        let query = FakeQuery::default().with_class("warrior", 5);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(!condition.check(&ctx).unwrap());
    }

    #[test]
    fn class_wildcard_matches_any_chosen_class() {
        let condition = condition("class *");
        let query = FakeQuery::default().with_class("mage", 1);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(condition.check(&ctx).unwrap());

        let query = FakeQuery::default().with_class("Human", 1);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(!condition.check(&ctx).unwrap());
    }

    #[test]
    fn class_level_is_at_least_unless_equal() {
        let at_least = condition("class mage 5");
        let exactly = condition("class mage 5 equal");
        let query = FakeQuery::default().with_class("mage", 7);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(at_least.check(&ctx).unwrap());
        assert!(!exactly.check(&ctx).unwrap());

        let query = FakeQuery::default().with_class("mage", 5);
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(at_least.check(&ctx).unwrap());
        assert!(exactly.check(&ctx).unwrap());
    }

    #[test]
    fn class_without_host_data_is_a_runtime_error() {
        let condition = condition("class mage");
        let query = FakeQuery::default();
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(matches!(
            condition.check(&ctx),
            Err(RuntimeError::PlayerUnavailable { .. })
        ));
    }

    #[test]
    fn unknown_condition_type_is_rejected() {
        let instruction = Instruction::new(
            QuestPackage::new("test"),
            Arc::new(VariableRegistry::with_builtins()),
            "weather sunny",
        )
        .unwrap();
        assert!(matches!(
            ConditionRegistry::with_builtins().create(instruction),
            Err(ParseError::UnknownType { category, kind })
                if category == "condition" && kind == "weather"
        ));
    }
}
