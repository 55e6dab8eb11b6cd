use crate::profile::ProfileId;

/// Alias for `Result<T, ParseError>`.
pub type ParseResult<T> = Result<T, ParseError>;

/// Alias for `Result<T, RuntimeError>`.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised while parsing quest definitions at load time.
///
/// A parse error is fatal to the single element being constructed: the
/// element is reported to the operator and not activated. It never brings
/// down the host process.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// An instruction line contained no tokens at all.
    #[error("empty instruction in package \"{package}\"")]
    EmptyInstruction {
        /// The package the instruction belongs to.
        package: String,
    },

    /// A required argument was requested past the end of the instruction.
    #[error("instruction \"{instruction}\" in package \"{package}\" ran out of arguments")]
    EndOfInstruction {
        /// The package the instruction belongs to.
        package: String,
        /// The raw instruction line.
        instruction: String,
    },

    /// A token could not be parsed as a number.
    #[error("\"{token}\" is not a valid number")]
    InvalidNumber {
        /// The offending token.
        token: String,
    },

    /// A location expression was malformed.
    #[error("malformed location \"{token}\": {reason}")]
    InvalidLocation {
        /// The offending token.
        token: String,
        /// What exactly was wrong with it.
        reason: String,
    },

    /// A block selector expression was malformed.
    #[error("malformed block selector \"{token}\": {reason}")]
    InvalidSelector {
        /// The offending token.
        token: String,
        /// What exactly was wrong with it.
        reason: String,
    },

    /// A variable marker named a type with no registered factory.
    #[error("unknown variable type \"{kind}\"")]
    UnknownVariableType {
        /// The unrecognized type name.
        kind: String,
    },

    /// A variable factory rejected its arguments.
    #[error("variable takes invalid arguments: {reason}")]
    InvalidVariable {
        /// What exactly was wrong with the arguments.
        reason: String,
    },

    /// A variable inside a template could not be constructed.
    ///
    /// Wraps the underlying failure and names the offending marker, so the
    /// operator sees which part of the template broke.
    #[error("could not create \"{marker}\" variable: {source}")]
    Variable {
        /// The full `%...%` marker that failed.
        marker: String,
        /// The underlying construction failure.
        #[source]
        source: Box<ParseError>,
    },

    /// A registry lookup for a condition, event, or interceptor type failed.
    #[error("unknown {category} type \"{kind}\"")]
    UnknownType {
        /// The registry that was consulted ("condition", "event", ...).
        category: String,
        /// The unrecognized type name.
        kind: String,
    },

    /// A conversation option points at a node that does not exist.
    #[error("conversation \"{conversation}\" references unknown node \"{node}\"")]
    UnknownConversationNode {
        /// The conversation being compiled.
        conversation: String,
        /// The missing node id.
        node: String,
    },
}

/// Errors raised while evaluating quest state for a player at runtime.
///
/// Runtime errors are recoverable by design: callers catch them at the point
/// of use, log them with package context, and treat the enclosing check as
/// "no match". World-event delivery must never abort because of one.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A player-bound variable was resolved without a player context.
    #[error("variable \"{variable}\" requires a player context")]
    MissingProfile {
        /// The variable that needed a player.
        variable: String,
    },

    /// The host has no live data for the given player.
    #[error("no live data for player {profile}")]
    PlayerUnavailable {
        /// The player whose data was requested.
        profile: ProfileId,
    },

    /// A resolved value was expected to be numeric but was not.
    #[error("resolved value \"{value}\" is not a number")]
    NotANumber {
        /// The non-numeric resolved value.
        value: String,
    },

    /// A resolved location string did not have the `x;y;z;world` shape.
    #[error("resolved location \"{value}\" is malformed: {reason}")]
    MalformedLocation {
        /// The resolved location string.
        value: String,
        /// What exactly was wrong with it.
        reason: String,
    },
}
