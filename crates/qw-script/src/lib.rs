//! Quest instruction parsing and variable resolution for Questweave.
//!
//! A quest definition is one line of whitespace-delimited tokens. This crate
//! turns such lines into typed [`Instruction`]s, and turns `%type.args%`
//! markers inside them into lazily evaluated [`Variable`]s through a
//! pluggable registry. All syntax is validated once at load time; runtime
//! evaluation only ever resolves values.

/// Instruction lines and their typed accessors.
pub mod instruction;
/// Compound locations with variable-backed coordinates.
pub mod location;
/// Numeric expressions that may embed variables.
pub mod number;
/// Block-type selectors with wildcards and state filters.
pub mod selector;
/// Template strings containing variable markers.
pub mod template;
/// The variable capability, registry, and built-in variables.
pub mod variable;

#[cfg(test)]
mod testutil;

pub use instruction::Instruction;
pub use location::CompoundLocation;
pub use number::VariableNumber;
pub use selector::BlockSelector;
pub use template::Template;
pub use variable::{ResolutionContext, Variable, VariableRegistry};
