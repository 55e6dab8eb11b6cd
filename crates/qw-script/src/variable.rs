//! The variable capability, registry, and built-in variables.
//!
//! A variable marker has the form `%<type>.<args...>%`. The leading dotted
//! segment selects a registered factory; the remaining segments are handed
//! to it. Factories run at load time, so a bad marker fails the whole
//! element it appears in. Resolution runs per evaluation call against an
//! optional player context.

use std::collections::HashMap;
use std::fmt;

use qw_core::error::{ParseError, ParseResult, RuntimeError, RuntimeResult};
use qw_core::host::GameQuery;
use qw_core::package::QuestPackage;
use qw_core::profile::ProfileId;

/// Evaluation context for a single resolution call.
///
/// The player is optional: player-independent variables (global points)
/// resolve without one, player-bound variables fail with
/// [`RuntimeError::MissingProfile`].
pub struct ResolutionContext<'a> {
    /// The player the resolution is for, if any.
    pub profile: Option<ProfileId>,
    /// Read access to live game state.
    pub query: &'a dyn GameQuery,
}

impl<'a> ResolutionContext<'a> {
    /// Context for a specific player.
    pub fn for_player(profile: ProfileId, query: &'a dyn GameQuery) -> Self {
        Self {
            profile: Some(profile),
            query,
        }
    }

    /// Player-independent context.
    pub fn global(query: &'a dyn GameQuery) -> Self {
        Self {
            profile: None,
            query,
        }
    }

    /// The player, or a [`RuntimeError::MissingProfile`] naming the variable
    /// that needed one.
    pub fn require_profile(&self, variable: &str) -> RuntimeResult<ProfileId> {
        self.profile.ok_or_else(|| RuntimeError::MissingProfile {
            variable: variable.to_string(),
        })
    }
}

/// A value that resolves against per-player game state.
pub trait Variable: fmt::Debug + Send + Sync {
    /// Resolve the variable to its textual value.
    fn resolve(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<String>;
}

/// Factory constructing a variable from its marker arguments.
///
/// Receives the defining package and the dot-separated segments after the
/// type name. Runs at load time; failures surface as parse errors.
pub type VariableFactory =
    Box<dyn Fn(&QuestPackage, &[String]) -> ParseResult<Box<dyn Variable>> + Send + Sync>;

/// Registry of variable types, keyed by the marker's leading segment.
///
/// Populated once at process init and read-only afterwards; concurrent
/// lookups need no locking.
#[derive(Default)]
pub struct VariableRegistry {
    factories: HashMap<String, VariableFactory>,
}

impl fmt::Debug for VariableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("VariableRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl VariableRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in variable types registered:
    /// `player`, `point`, `globalpoint`, and `location`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("player", |_, args| {
            if args.is_empty() {
                Ok(Box::new(PlayerNameVariable))
            } else {
                Err(ParseError::InvalidVariable {
                    reason: "player takes no arguments".to_string(),
                })
            }
        });
        registry.register("point", |_, args| point_variable(args, false));
        registry.register("globalpoint", |_, args| point_variable(args, true));
        registry.register("location", |_, args| location_variable(args));
        registry
    }

    /// Register a variable type. Replaces any previous factory of that name.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&QuestPackage, &[String]) -> ParseResult<Box<dyn Variable>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Whether a type name is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Construct a variable from the inside of a marker (the text between
    /// the `%` delimiters).
    pub fn create(&self, package: &QuestPackage, inner: &str) -> ParseResult<Box<dyn Variable>> {
        let mut parts = inner.split('.');
        let kind = parts.next().unwrap_or("");
        let args: Vec<String> = parts.map(str::to_string).collect();
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| ParseError::UnknownVariableType {
                kind: kind.to_string(),
            })?;
        factory(package, &args)
    }
}

/// `%player%` — the player's display name.
#[derive(Debug)]
struct PlayerNameVariable;

impl Variable for PlayerNameVariable {
    fn resolve(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<String> {
        let profile = ctx.require_profile("player")?;
        ctx.query
            .player_name(profile)
            .ok_or(RuntimeError::PlayerUnavailable { profile })
    }
}

/// How a point variable reports its category.
#[derive(Debug)]
enum PointQuery {
    /// The raw amount.
    Amount,
    /// How much is left until the given target.
    Left(i64),
}

/// `%point.<category>.amount%`, `%point.<category>.left.<n>%`, and the
/// `globalpoint` equivalents.
#[derive(Debug)]
struct PointVariable {
    category: String,
    query: PointQuery,
    global: bool,
}

impl Variable for PointVariable {
    fn resolve(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<String> {
        let amount = if self.global {
            ctx.query.global_point(&self.category)
        } else {
            let profile = ctx.require_profile(&format!("point.{}", self.category))?;
            ctx.query.point(profile, &self.category)
        };
        Ok(match self.query {
            PointQuery::Amount => amount.to_string(),
            PointQuery::Left(target) => (target - amount).to_string(),
        })
    }
}

fn point_variable(args: &[String], global: bool) -> ParseResult<Box<dyn Variable>> {
    let category = args
        .first()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseError::InvalidVariable {
            reason: "missing point category".to_string(),
        })?
        .clone();
    let query = match args.get(1).map(String::as_str) {
        None | Some("amount") => PointQuery::Amount,
        Some("left") => {
            let target = args.get(2).ok_or_else(|| ParseError::InvalidVariable {
                reason: "left needs a target amount".to_string(),
            })?;
            PointQuery::Left(target.parse().map_err(|_| ParseError::InvalidNumber {
                token: target.clone(),
            })?)
        }
        Some(other) => {
            return Err(ParseError::InvalidVariable {
                reason: format!("unknown point query \"{other}\""),
            });
        }
    };
    Ok(Box::new(PointVariable {
        category,
        query,
        global,
    }))
}

/// Which part of the player's position a location variable reports.
#[derive(Debug)]
enum Axis {
    X,
    Y,
    Z,
    World,
}

/// `%location.<x|y|z|world>%` — the player's current position.
#[derive(Debug)]
struct LocationVariable {
    axis: Axis,
}

impl Variable for LocationVariable {
    fn resolve(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<String> {
        let profile = ctx.require_profile("location")?;
        let location = ctx
            .query
            .player_location(profile)
            .ok_or(RuntimeError::PlayerUnavailable { profile })?;
        Ok(match self.axis {
            Axis::X => location.x.to_string(),
            Axis::Y => location.y.to_string(),
            Axis::Z => location.z.to_string(),
            Axis::World => location.world,
        })
    }
}

fn location_variable(args: &[String]) -> ParseResult<Box<dyn Variable>> {
    let axis = match args.first().map(String::as_str) {
        Some("x") => Axis::X,
        Some("y") => Axis::Y,
        Some("z") => Axis::Z,
        Some("world") => Axis::World,
        other => {
            return Err(ParseError::InvalidVariable {
                reason: format!(
                    "location axis must be x, y, z, or world, got \"{}\"",
                    other.unwrap_or("")
                ),
            });
        }
    };
    Ok(Box::new(LocationVariable { axis }))
}
