//! Compound locations with variable-backed coordinates.

use qw_core::error::{ParseError, ParseResult, RuntimeError, RuntimeResult};
use qw_core::location::WorldLocation;
use qw_core::package::QuestPackage;

use crate::template::Template;
use crate::variable::{ResolutionContext, VariableRegistry};

/// A location expression of the form `x;y;z;world`, any part of which may
/// come from a `%variable%`.
///
/// Marker-free expressions are parsed eagerly, so malformed coordinates
/// fail at load time. Variable-backed expressions are re-parsed after every
/// substitution; a malformed resolved value is a runtime error for the
/// caller to log and treat as "no match".
#[derive(Debug)]
pub struct CompoundLocation {
    template: Template,
    fixed: Option<WorldLocation>,
}

impl CompoundLocation {
    /// Parse a location expression.
    pub fn parse(
        package: &QuestPackage,
        registry: &VariableRegistry,
        raw: &str,
    ) -> ParseResult<Self> {
        let template = Template::parse(package, registry, raw)?;
        let fixed = if template.contains_variables() {
            None
        } else {
            Some(
                parse_location(raw).map_err(|reason| ParseError::InvalidLocation {
                    token: raw.to_string(),
                    reason,
                })?,
            )
        };
        Ok(Self { template, fixed })
    }

    /// Whether the expression depends on variables.
    pub fn contains_variables(&self) -> bool {
        self.fixed.is_none()
    }

    /// Resolve to a concrete location for the given context.
    pub fn resolve(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<WorldLocation> {
        if let Some(fixed) = &self.fixed {
            return Ok(fixed.clone());
        }
        let resolved = self.template.resolve(ctx)?;
        parse_location(&resolved).map_err(|reason| RuntimeError::MalformedLocation {
            value: resolved,
            reason,
        })
    }
}

/// Parse `x;y;z;world`. Extra parts (yaw, pitch) are tolerated and ignored.
fn parse_location(raw: &str) -> Result<WorldLocation, String> {
    let parts: Vec<&str> = raw.split(';').collect();
    if parts.len() < 4 {
        return Err(format!("expected x;y;z;world, got {} part(s)", parts.len()));
    }
    let x = parse_coordinate(parts[0], "x")?;
    let y = parse_coordinate(parts[1], "y")?;
    let z = parse_coordinate(parts[2], "z")?;
    let world = parts[3].trim();
    if world.is_empty() {
        return Err("world name is empty".to_string());
    }
    Ok(WorldLocation::new(world, x, y, z))
}

fn parse_coordinate(part: &str, axis: &str) -> Result<f64, String> {
    part.trim()
        .parse()
        .map_err(|_| format!("{axis} coordinate \"{part}\" is not a number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeQuery;
    use qw_core::profile::ProfileId;

    fn package() -> QuestPackage {
        QuestPackage::new("test")
    }

    #[test]
    fn fixed_location_parses_eagerly() {
        let registry = VariableRegistry::with_builtins();
        let location =
            CompoundLocation::parse(&package(), &registry, "100;64;-200;overworld").unwrap();
        assert!(!location.contains_variables());

        let query = FakeQuery::default();
        let ctx = ResolutionContext::global(&query);
        let resolved = location.resolve(&ctx).unwrap();
        assert_eq!(resolved, WorldLocation::new("overworld", 100.0, 64.0, -200.0));
    }

    #[test]
    fn malformed_fixed_location_fails_at_load() {
        let registry = VariableRegistry::with_builtins();
        assert!(matches!(
            CompoundLocation::parse(&package(), &registry, "100;64;overworld"),
            Err(ParseError::InvalidLocation { .. })
        ));
        assert!(matches!(
            CompoundLocation::parse(&package(), &registry, "a;64;-200;overworld"),
            Err(ParseError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn variable_backed_location_resolves_per_player() {
        let registry = VariableRegistry::with_builtins();
        let location = CompoundLocation::parse(
            &package(),
            &registry,
            "%location.x%;%location.y%;%location.z%;%location.world%",
        )
        .unwrap();
        assert!(location.contains_variables());

        let query = FakeQuery {
            location: Some(WorldLocation::new("nether", 10.0, 32.0, 7.5)),
            ..FakeQuery::default()
        };
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        let resolved = location.resolve(&ctx).unwrap();
        assert_eq!(resolved, WorldLocation::new("nether", 10.0, 32.0, 7.5));
    }

    #[test]
    fn malformed_resolution_is_a_runtime_error() {
        let registry = VariableRegistry::with_builtins();
        let location =
            CompoundLocation::parse(&package(), &registry, "%player%;64;0;overworld").unwrap();

        let query = FakeQuery {
            name: Some("Steve".to_string()),
            ..FakeQuery::default()
        };
        let ctx = ResolutionContext::for_player(ProfileId::new(), &query);
        assert!(matches!(
            location.resolve(&ctx),
            Err(RuntimeError::MalformedLocation { .. })
        ));
    }

    #[test]
    fn extra_parts_are_tolerated() {
        let registry = VariableRegistry::with_builtins();
        let location =
            CompoundLocation::parse(&package(), &registry, "1;2;3;overworld;90;0").unwrap();
        let query = FakeQuery::default();
        let ctx = ResolutionContext::global(&query);
        assert_eq!(
            location.resolve(&ctx).unwrap(),
            WorldLocation::new("overworld", 1.0, 2.0, 3.0)
        );
    }
}
