//! Numeric expressions that may embed variables.

use qw_core::error::{ParseError, ParseResult, RuntimeError, RuntimeResult};
use qw_core::package::QuestPackage;

use crate::variable::{ResolutionContext, Variable, VariableRegistry};

/// A number given either literally or as a `%variable%` marker.
///
/// The variable form is validated at load time; the resolved value is parsed
/// per evaluation call, so a per-player variable can yield a different
/// target for every player.
#[derive(Debug)]
pub enum VariableNumber {
    /// A plain numeric literal.
    Literal(f64),
    /// A variable resolved and parsed at evaluation time.
    Variable {
        /// The full marker, kept for error messages.
        marker: String,
        /// The constructed variable.
        variable: Box<dyn Variable>,
    },
}

impl VariableNumber {
    /// Parse a token as a literal number or a whole-token variable marker.
    pub fn parse(
        package: &QuestPackage,
        registry: &VariableRegistry,
        token: &str,
    ) -> ParseResult<Self> {
        if token.len() > 2 && token.starts_with('%') && token.ends_with('%') {
            let inner = &token[1..token.len() - 1];
            let variable =
                registry
                    .create(package, inner)
                    .map_err(|source| ParseError::Variable {
                        marker: token.to_string(),
                        source: Box::new(source),
                    })?;
            return Ok(Self::Variable {
                marker: token.to_string(),
                variable,
            });
        }
        token
            .parse::<f64>()
            .map(Self::Literal)
            .map_err(|_| ParseError::InvalidNumber {
                token: token.to_string(),
            })
    }

    /// The value as a float.
    pub fn double_value(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<f64> {
        match self {
            Self::Literal(value) => Ok(*value),
            Self::Variable { variable, .. } => {
                let resolved = variable.resolve(ctx)?;
                resolved
                    .trim()
                    .parse()
                    .map_err(|_| RuntimeError::NotANumber { value: resolved })
            }
        }
    }

    /// The value truncated to an integer.
    pub fn int_value(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<i64> {
        Ok(self.double_value(ctx)? as i64)
    }
}
