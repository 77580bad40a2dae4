//! Parse failures.
//!
//! Every failure mode is a variant of [`ParseError`] returned to the caller.
//! The library never writes to stdout/stderr and never terminates the
//! process; printing and exit codes belong to the embedding program.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A flag token matched no specification while strict mode was on.
    #[error("invalid argument: {0}")]
    UnknownArgument(String),

    /// A non-accumulating action targeted a key that is already populated.
    #[error("duplicate key {0}")]
    DuplicateKey(String),

    /// One or more required keys were absent after full token consumption.
    #[error("missing required args: [{}]", .0.join(", "))]
    MissingRequiredArgs(Vec<String>),

    /// A value-taking argument found no eligible token.
    #[error("missing value for {0}")]
    MissingValue(String),

    /// An exact-count quantifier found fewer tokens than it requires.
    #[error("{key} expects {expected} values, found {found}")]
    NotEnoughValues {
        key: String,
        expected: usize,
        found: usize,
    },

    /// A positional token arrived after all positional specs were consumed.
    #[error("unexpected positional argument: {0}")]
    ExtraPositional(String),

    /// A token was not among the argument's allowed literal values.
    #[error("invalid value '{value}' for {key}. possible values: {}", .choices.join(", "))]
    InvalidChoice {
        key: String,
        value: String,
        choices: Vec<String>,
    },

    /// A token could not be converted to the argument's declared type.
    #[error("invalid {kind} value '{value}' for {key}")]
    InvalidValue {
        key: String,
        kind: &'static str,
        value: String,
    },

    /// An inline `=value` was given to a flag whose action consumes no tokens.
    #[error("flag does not take a value: {0}")]
    UnexpectedValue(String),
}
