//! Instruction lines and their typed accessors.

use std::sync::Arc;

use qw_core::error::{ParseError, ParseResult};
use qw_core::package::QuestPackage;

use crate::location::CompoundLocation;
use crate::number::VariableNumber;
use crate::selector::BlockSelector;
use crate::variable::VariableRegistry;

/// One parsed quest-definition line.
///
/// The first token names the kind of element being defined (objective type,
/// condition type, ...); the rest are its arguments. Tokens are
/// whitespace-delimited; `key:value` tokens are optional arguments, bare
/// tokens double as boolean flags. An instruction belongs to exactly one
/// package and carries the variable registry so typed accessors can
/// validate markers at load time.
///
/// All accessors fail with a [`ParseError`] on malformed input, so runtime
/// evaluation never needs to re-validate syntax.
#[derive(Debug)]
pub struct Instruction {
    package: QuestPackage,
    registry: Arc<VariableRegistry>,
    line: String,
    tokens: Vec<String>,
    cursor: usize,
}

impl Instruction {
    /// Parse a raw line into an instruction.
    pub fn new(
        package: QuestPackage,
        registry: Arc<VariableRegistry>,
        line: &str,
    ) -> ParseResult<Self> {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return Err(ParseError::EmptyInstruction {
                package: package.name().to_string(),
            });
        }
        Ok(Self {
            package,
            registry,
            line: line.to_string(),
            tokens,
            // Token 0 is the element kind; positional reads start after it.
            cursor: 1,
        })
    }

    /// The package this instruction is defined in.
    pub fn package(&self) -> &QuestPackage {
        &self.package
    }

    /// The variable registry this instruction validates markers against.
    pub fn registry(&self) -> &Arc<VariableRegistry> {
        &self.registry
    }

    /// The raw line.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// The element kind (the first token).
    pub fn kind(&self) -> &str {
        &self.tokens[0]
    }

    /// Total number of tokens, including the kind.
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    /// Random access to a token by index.
    pub fn part(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Whether another positional token is available.
    pub fn has_next(&self) -> bool {
        self.cursor < self.tokens.len()
    }

    /// The next positional token.
    pub fn next(&mut self) -> ParseResult<String> {
        if self.cursor >= self.tokens.len() {
            return Err(ParseError::EndOfInstruction {
                package: self.package.name().to_string(),
                instruction: self.line.clone(),
            });
        }
        let token = self.tokens[self.cursor].clone();
        self.cursor += 1;
        Ok(token)
    }

    /// The value of a `key:value` token, if present.
    pub fn get_optional(&self, key: &str) -> Option<String> {
        self.tokens.iter().find_map(|token| {
            token
                .split_once(':')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
    }

    /// Whether a bare flag token is present (case-insensitive).
    pub fn has_argument(&self, flag: &str) -> bool {
        self.tokens.iter().any(|token| token.eq_ignore_ascii_case(flag))
    }

    /// Parse the next positional token as a number.
    pub fn get_var_num(&mut self) -> ParseResult<VariableNumber> {
        let token = self.next()?;
        self.var_num_of(&token)
    }

    /// Parse an arbitrary token as a number.
    pub fn var_num_of(&self, token: &str) -> ParseResult<VariableNumber> {
        VariableNumber::parse(&self.package, &self.registry, token)
    }

    /// Parse the value of a `key:value` token as a location, if present.
    pub fn get_location(&self, key: &str) -> ParseResult<Option<CompoundLocation>> {
        match self.get_optional(key) {
            Some(raw) => Ok(Some(CompoundLocation::parse(
                &self.package,
                &self.registry,
                &raw,
            )?)),
            None => Ok(None),
        }
    }

    /// Parse the next positional token as a block selector.
    pub fn get_block_selector(&mut self) -> ParseResult<BlockSelector> {
        let token = self.next()?;
        BlockSelector::parse(&token)
    }
}
