//! Template strings containing variable markers.

use qw_core::error::{ParseError, ParseResult, RuntimeResult};
use qw_core::package::QuestPackage;

use crate::variable::{ResolutionContext, Variable, VariableRegistry};

/// A string that may contain `%variable%` markers.
///
/// Markers are found and their variables constructed once, at load time;
/// construction fails if any marker names an unknown or malformed variable,
/// and a failed template registers nothing. Resolution is a pure function of
/// (package, player context): each distinct marker is looked up exactly once
/// per call and substituted literally throughout the text.
///
/// Substitution is single-pass: if a resolved value happens to contain
/// marker-shaped text, that text is *not* scanned again.
#[derive(Debug)]
pub struct Template {
    text: String,
    variables: Vec<(String, Box<dyn Variable>)>,
}

impl Template {
    /// Parse a template. Underscores are kept as-is.
    pub fn parse(
        package: &QuestPackage,
        registry: &VariableRegistry,
        raw: &str,
    ) -> ParseResult<Self> {
        Self::build(package, registry, raw.to_string())
    }

    /// Parse a template, first replacing underscores with spaces.
    ///
    /// A backslash escapes an underscore (`\_` stays a literal `_`). The
    /// transform runs exactly once, before marker scanning — never again at
    /// resolution time.
    pub fn parse_replacing_underscores(
        package: &QuestPackage,
        registry: &VariableRegistry,
        raw: &str,
    ) -> ParseResult<Self> {
        Self::build(package, registry, underscores_to_spaces(raw))
    }

    fn build(
        package: &QuestPackage,
        registry: &VariableRegistry,
        text: String,
    ) -> ParseResult<Self> {
        let mut variables: Vec<(String, Box<dyn Variable>)> = Vec::new();
        for marker in scan_markers(&text) {
            if variables.iter().any(|(m, _)| m == &marker) {
                continue;
            }
            let inner = &marker[1..marker.len() - 1];
            let variable =
                registry
                    .create(package, inner)
                    .map_err(|source| ParseError::Variable {
                        marker: marker.clone(),
                        source: Box::new(source),
                    })?;
            variables.push((marker, variable));
        }
        Ok(Self { text, variables })
    }

    /// The template text after preprocessing, markers unresolved.
    pub fn raw(&self) -> &str {
        &self.text
    }

    /// Whether the template contains any variable markers.
    pub fn contains_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    /// Resolve all markers against the given context.
    ///
    /// Repeated occurrences of the same marker get the same resolved value
    /// from a single lookup.
    pub fn resolve(&self, ctx: &ResolutionContext<'_>) -> RuntimeResult<String> {
        let mut resolved = self.text.clone();
        for (marker, variable) in &self.variables {
            let value = variable.resolve(ctx)?;
            resolved = resolved.replace(marker.as_str(), &value);
        }
        Ok(resolved)
    }
}

/// Find all `%...%` markers: non-empty, whitespace-free runs between two
/// percent signs. Returned in order of occurrence, duplicates included.
fn scan_markers(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut markers = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%' {
            let mut j = i + 1;
            let mut end = None;
            while j < chars.len() {
                let c = chars[j];
                if c == '%' {
                    if j > i + 1 {
                        end = Some(j);
                    }
                    break;
                }
                if c.is_whitespace() {
                    break;
                }
                j += 1;
            }
            if let Some(end) = end {
                markers.push(chars[i..=end].iter().collect());
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    markers
}

/// Replace underscores with spaces, honoring the `\_` escape.
fn underscores_to_spaces(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'_') {
            chars.next();
            out.push('_');
        } else if c == '_' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}
