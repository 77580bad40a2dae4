//! Parser configuration: argument specifications and parser-wide settings.

use crate::error::ParseError;
use crate::value::Value;

/// How many tokens a single argument occurrence consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// Exactly `n` tokens. Fewer available is a hard error.
    Exact(usize),
    /// Zero tokens if the stream is empty or the next token looks like a
    /// flag, otherwise exactly one.
    Optional,
    /// Every token up to (not including) the next flag-looking token.
    ZeroOrMore,
    /// Like [`Nargs::ZeroOrMore`], but taking zero tokens is an error.
    OneOrMore,
    /// Everything left in the stream, flags included.
    Remainder,
}

/// Conversion applied to each consumed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    #[default]
    Str,
    Int,
    Float,
    Bool,
}

impl ValueType {
    pub(crate) fn convert(self, key: &str, raw: &str) -> Result<Value, ParseError> {
        match self {
            Self::Str => Ok(Value::Str(raw.to_string())),
            Self::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| {
                ParseError::InvalidValue {
                    key: key.to_string(),
                    kind: "int",
                    value: raw.to_string(),
                }
            }),
            Self::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| {
                ParseError::InvalidValue {
                    key: key.to_string(),
                    kind: "float",
                    value: raw.to_string(),
                }
            }),
            Self::Bool => match raw {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(ParseError::InvalidValue {
                    key: key.to_string(),
                    kind: "bool",
                    value: raw.to_string(),
                }),
            },
        }
    }
}

/// What an argument occurrence does to the result mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Store the consumed token(s), converted per the spec's value type.
    Store,
    StoreTrue,
    StoreFalse,
    StoreConst(Value),
    /// Like [`Action::Store`], but accumulate into a list in encounter order.
    Append,
    /// Append a constant to a list under `dest`, which is deliberately
    /// distinct from the triggering flag's own key.
    AppendConst { dest: String, value: Value },
    /// Previous count plus one, starting from zero.
    Count,
    Help,
    Version,
}

impl Action {
    /// Accumulating actions are exempt from the duplicate-key check:
    /// `count` reads the previous value, so it must be exempt too.
    pub(crate) fn accumulates(&self) -> bool {
        matches!(self, Self::Append | Self::AppendConst { .. } | Self::Count)
    }
}

/// One argument specification: a positional (single bare name) or a flag
/// (one or more aliases such as `-v`, `--verbose`).
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub(crate) names: Vec<String>,
    pub(crate) action: Action,
    pub(crate) nargs: Option<Nargs>,
    pub(crate) value_type: ValueType,
    pub(crate) choices: Vec<String>,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) help: String,
    pub(crate) value_name: Option<String>,
}

impl ArgSpec {
    fn with_names(names: Vec<String>) -> Self {
        Self {
            names,
            action: Action::Store,
            nargs: None,
            value_type: ValueType::Str,
            choices: Vec::new(),
            required: false,
            default: None,
            help: String::new(),
            value_name: None,
        }
    }

    /// A positional argument, identified by stream position.
    pub fn positional(name: impl Into<String>) -> Self {
        Self::with_names(vec![name.into()])
    }

    /// A flag argument with one or more aliases (e.g. `["-v", "--verbose"]`).
    pub fn flag<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_names(aliases.into_iter().map(Into::into).collect())
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Restrict consumed tokens to these literal values.
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value inserted by the validator when the key is never written.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Display name used in help output instead of the derived key.
    pub fn value_name(mut self, name: impl Into<String>) -> Self {
        self.value_name = Some(name.into());
        self
    }

    pub fn names(&self) -> &[String] {
        self.names.as_slice()
    }
}

/// Derive the result-mapping key for a specification.
///
/// Positionals use their bare name. Flags use the longest alias with its
/// leading prefix characters stripped, so `["-v", "--verbose"]` keys as
/// `verbose`. Computed once per parse; uniqueness is enforced lazily at the
/// first conflicting write ([`ParseError::DuplicateKey`]).
pub fn derive_key(spec: &ArgSpec, prefix: char) -> String {
    spec.names
        .iter()
        .max_by_key(|name| name.chars().count())
        .map(|name| name.trim_start_matches(prefix).to_string())
        .unwrap_or_default()
}

/// Immutable parser configuration, built once by the caller.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub(crate) flags: Vec<ArgSpec>,
    pub(crate) positionals: Vec<ArgSpec>,
    pub(crate) description: String,
    pub(crate) epilog: String,
    pub(crate) prefix: char,
    pub(crate) add_help: bool,
    pub(crate) strict: bool,
    pub(crate) version: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            flags: Vec::new(),
            positionals: Vec::new(),
            description: String::new(),
            epilog: String::new(),
            prefix: '-',
            add_help: true,
            strict: true,
            version: None,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn epilog(mut self, text: impl Into<String>) -> Self {
        self.epilog = text.into();
        self
    }

    /// Prefix character that introduces flags. Default `-`.
    pub fn prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }

    /// Handle `-h`/`--help` automatically. Default on.
    pub fn add_help(mut self, on: bool) -> Self {
        self.add_help = on;
        self
    }

    /// Reject unknown flags instead of synthesizing ad hoc store specs.
    /// Default on.
    pub fn strict(mut self, on: bool) -> Self {
        self.strict = on;
        self
    }

    /// Version string emitted by the `version` action.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Append a flag specification. Declaration order is display order.
    pub fn flag(mut self, spec: ArgSpec) -> Self {
        self.flags.push(spec);
        self
    }

    /// Append a positional specification. Declaration order is match order.
    pub fn positional(mut self, spec: ArgSpec) -> Self {
        self.positionals.push(spec);
        self
    }
}
