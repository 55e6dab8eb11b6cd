//! Block-type selectors with wildcards and state filters.

use std::collections::BTreeMap;

use qw_core::block::Block;
use qw_core::error::{ParseError, ParseResult};

/// A block-type selector: `[namespace:]name[state=value,...]`.
///
/// The namespace defaults to `minecraft` and may be `*`. The name may
/// contain `*` wildcards. Matching is case-insensitive on namespace and
/// name. Declared states must be present on the block; with `exact`
/// matching, the block's states must equal the declared list.
#[derive(Debug, Clone)]
pub struct BlockSelector {
    namespace: String,
    name: String,
    states: BTreeMap<String, String>,
}

impl BlockSelector {
    /// Parse a selector token.
    pub fn parse(token: &str) -> ParseResult<Self> {
        let malformed = |reason: &str| ParseError::InvalidSelector {
            token: token.to_string(),
            reason: reason.to_string(),
        };

        let (base, states_part) = match token.split_once('[') {
            Some((base, rest)) => {
                let inner = rest
                    .strip_suffix(']')
                    .ok_or_else(|| malformed("missing closing bracket"))?;
                (base, Some(inner))
            }
            None => (token, None),
        };

        let (namespace, name) = match base.split_once(':') {
            Some((ns, name)) => (ns, name),
            None => ("minecraft", base),
        };
        if name.is_empty() {
            return Err(malformed("missing block name"));
        }

        let mut states = BTreeMap::new();
        if let Some(inner) = states_part {
            for pair in inner.split(',') {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| malformed("state is not key=value"))?;
                states.insert(
                    key.trim().to_ascii_lowercase(),
                    value.trim().to_ascii_lowercase(),
                );
            }
        }

        Ok(Self {
            namespace: namespace.to_ascii_lowercase(),
            name: name.to_ascii_lowercase(),
            states,
        })
    }

    /// Whether the selector matches the given block.
    ///
    /// With `exact` set and states declared, the block's states must equal
    /// the declared list; otherwise declared states only need to be present.
    pub fn matches(&self, block: &Block, exact: bool) -> bool {
        if self.namespace != "*" && self.namespace != block.namespace().to_ascii_lowercase() {
            return false;
        }
        if !wildcard_match(&self.name, &block.name().to_ascii_lowercase()) {
            return false;
        }
        if self.states.is_empty() {
            return true;
        }
        let block_states: BTreeMap<String, String> = block
            .states
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_ascii_lowercase()))
            .collect();
        if exact {
            block_states == self.states
        } else {
            self.states
                .iter()
                .all(|(k, v)| block_states.get(k) == Some(v))
        }
    }
}

/// Match `text` against a pattern where `*` stands for any run of
/// characters.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == text;
    }
    let segments: Vec<&str> = pattern.split('*').collect();
    let first = segments[0];
    let last = segments[segments.len() - 1];
    if !text.starts_with(first) {
        return false;
    }
    let mut rest = &text[first.len()..];
    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(index) => rest = &rest[index + segment.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
