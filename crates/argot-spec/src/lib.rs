//! JSON data model for parser specifications.
//!
//! A [`SpecDoc`] is the serialized form of an [`argot::ParserConfig`]: a
//! document declaring flags, positionals, actions, quantifiers, and parser
//! settings. The `argot` binary loads one of these and parses a token list
//! against it; other tools can generate or inspect them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use argot::{Action, ArgSpec, Nargs, ParserConfig, Value, ValueType};

fn default_true() -> bool {
    true
}

/// A complete parser specification document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpecDoc {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub epilog: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<char>,
    #[serde(default = "default_true")]
    pub add_help: bool,
    #[serde(default = "default_true")]
    pub strict: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<ArgEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positionals: Vec<ArgEntry>,
}

impl Default for SpecDoc {
    fn default() -> Self {
        Self {
            description: String::new(),
            epilog: String::new(),
            version: None,
            prefix: None,
            add_help: true,
            strict: true,
            flags: Vec::new(),
            positionals: Vec::new(),
        }
    }
}

/// One argument entry: a flag (`aliases`) or a positional (`name`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ArgEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Action name: `store`, `store-true`, `store-false`, `store-const`,
    /// `append`, `append-const`, `count`, `help`, `version`. Default `store`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Quantifier: an integer, `?`, `*`, `+`, or `remainder`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nargs: Option<String>,
    /// Converter: `str`, `int`, `float`, `bool`. Default `str`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Constant for `store-const` / `append-const`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<serde_json::Value>,
    /// Destination key for `append-const`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("invalid nargs '{0}'")]
    InvalidNargs(String),
    #[error("unknown value type '{0}'")]
    UnknownValueType(String),
    #[error("action '{0}' needs a constant")]
    MissingConstant(String),
    #[error("append-const needs a dest key")]
    MissingDest,
    #[error("flag entry needs at least one alias")]
    MissingAliases,
    #[error("positional entry needs a name")]
    MissingName,
    #[error("unsupported JSON value: {0}")]
    UnsupportedValue(serde_json::Value),
}

fn json_to_value(json: &serde_json::Value) -> Result<Value, SpecError> {
    match json {
        serde_json::Value::String(s) => Ok(Value::Str(s.clone())),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(x) = n.as_f64() {
                Ok(Value::Float(x))
            } else {
                Err(SpecError::UnsupportedValue(json.clone()))
            }
        }
        serde_json::Value::Array(items) => Ok(Value::List(
            items.iter().map(json_to_value).collect::<Result<_, _>>()?,
        )),
        other => Err(SpecError::UnsupportedValue(other.clone())),
    }
}

fn parse_nargs(raw: &str) -> Result<Nargs, SpecError> {
    match raw {
        "?" => Ok(Nargs::Optional),
        "*" => Ok(Nargs::ZeroOrMore),
        "+" => Ok(Nargs::OneOrMore),
        "remainder" | "..." => Ok(Nargs::Remainder),
        _ => raw
            .parse::<usize>()
            .map(Nargs::Exact)
            .map_err(|_| SpecError::InvalidNargs(raw.to_string())),
    }
}

fn parse_value_type(raw: &str) -> Result<ValueType, SpecError> {
    match raw {
        "str" => Ok(ValueType::Str),
        "int" => Ok(ValueType::Int),
        "float" => Ok(ValueType::Float),
        "bool" => Ok(ValueType::Bool),
        other => Err(SpecError::UnknownValueType(other.to_string())),
    }
}

impl ArgEntry {
    fn action(&self) -> Result<Action, SpecError> {
        let name = self.action.as_deref().unwrap_or("store");
        let constant = || {
            self.constant
                .as_ref()
                .ok_or_else(|| SpecError::MissingConstant(name.to_string()))
                .and_then(json_to_value)
        };
        match name {
            "store" => Ok(Action::Store),
            "store-true" => Ok(Action::StoreTrue),
            "store-false" => Ok(Action::StoreFalse),
            "store-const" => Ok(Action::StoreConst(constant()?)),
            "append" => Ok(Action::Append),
            "append-const" => Ok(Action::AppendConst {
                dest: self.dest.clone().ok_or(SpecError::MissingDest)?,
                value: constant()?,
            }),
            "count" => Ok(Action::Count),
            "help" => Ok(Action::Help),
            "version" => Ok(Action::Version),
            other => Err(SpecError::UnknownAction(other.to_string())),
        }
    }

    fn to_spec(&self, positional: bool) -> Result<ArgSpec, SpecError> {
        let mut spec = if positional {
            let name = self.name.clone().ok_or(SpecError::MissingName)?;
            ArgSpec::positional(name)
        } else {
            if self.aliases.is_empty() {
                return Err(SpecError::MissingAliases);
            }
            ArgSpec::flag(self.aliases.clone())
        };

        spec = spec.action(self.action()?);
        if let Some(nargs) = &self.nargs {
            spec = spec.nargs(parse_nargs(nargs)?);
        }
        if let Some(value_type) = &self.value_type {
            spec = spec.value_type(parse_value_type(value_type)?);
        }
        if !self.choices.is_empty() {
            spec = spec.choices(self.choices.clone());
        }
        if self.required {
            spec = spec.required();
        }
        if let Some(default) = &self.default {
            spec = spec.default_value(json_to_value(default)?);
        }
        if !self.help.is_empty() {
            spec = spec.help(self.help.clone());
        }
        if let Some(value_name) = &self.value_name {
            spec = spec.value_name(value_name.clone());
        }
        Ok(spec)
    }
}

impl SpecDoc {
    /// Deserialize a document from JSON text.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Build the parser configuration this document declares.
    pub fn to_config(&self) -> Result<ParserConfig, SpecError> {
        let mut config = ParserConfig::new()
            .add_help(self.add_help)
            .strict(self.strict);
        if !self.description.is_empty() {
            config = config.description(self.description.clone());
        }
        if !self.epilog.is_empty() {
            config = config.epilog(self.epilog.clone());
        }
        if let Some(version) = &self.version {
            config = config.version(version.clone());
        }
        if let Some(prefix) = self.prefix {
            config = config.prefix(prefix);
        }
        for entry in &self.flags {
            config = config.flag(entry.to_spec(false)?);
        }
        for entry in &self.positionals {
            config = config.positional(entry.to_spec(true)?);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argot::{ParseOutcome, Value};

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn document_round_trips_through_a_parse() {
        let raw = r#"{
            "description": "Demo tool",
            "version": "0.3.0",
            "flags": [
                {"aliases": ["-v", "--verbose"], "action": "count", "help": "More output"},
                {"aliases": ["--format"], "choices": ["plain", "json"], "default": "plain"},
                {"aliases": ["--dims"], "nargs": "2", "value-type": "int"}
            ],
            "positionals": [
                {"name": "input", "required": true},
                {"name": "rest", "nargs": "*"}
            ]
        }"#;
        let doc = SpecDoc::from_json(raw).unwrap();
        let config = doc.to_config().unwrap();

        let outcome = argot::parse(
            &config,
            &argv(&["-vv", "--dims", "3", "4", "in.txt", "a", "b"]),
        )
        .unwrap();
        let ParseOutcome::Matches(m) = outcome else {
            panic!("expected Matches");
        };
        assert_eq!(m.get("verbose"), Some(&Value::Int(2)));
        assert_eq!(m.get_str("format"), Some("plain"));
        assert_eq!(
            m.get("dims"),
            Some(&Value::List(vec![Value::Int(3), Value::Int(4)]))
        );
        assert_eq!(m.get_str("input"), Some("in.txt"));
        assert_eq!(
            m.get("rest"),
            Some(&Value::List(vec![
                Value::Str("a".into()),
                Value::Str("b".into()),
            ]))
        );
    }

    #[test]
    fn unknown_action_is_rejected() {
        let doc = SpecDoc {
            flags: vec![ArgEntry {
                aliases: vec!["--x".to_string()],
                action: Some("explode".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = doc.to_config().unwrap_err();
        assert!(matches!(err, SpecError::UnknownAction(a) if a == "explode"));
    }

    #[test]
    fn store_const_requires_a_constant() {
        let doc = SpecDoc {
            flags: vec![ArgEntry {
                aliases: vec!["--fast".to_string()],
                action: Some("store-const".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = doc.to_config().unwrap_err();
        assert!(matches!(err, SpecError::MissingConstant(_)));
    }

    #[test]
    fn nargs_strings_cover_every_quantifier() {
        assert_eq!(parse_nargs("3").unwrap(), Nargs::Exact(3));
        assert_eq!(parse_nargs("?").unwrap(), Nargs::Optional);
        assert_eq!(parse_nargs("*").unwrap(), Nargs::ZeroOrMore);
        assert_eq!(parse_nargs("+").unwrap(), Nargs::OneOrMore);
        assert_eq!(parse_nargs("remainder").unwrap(), Nargs::Remainder);
        assert!(parse_nargs("many").is_err());
    }

    #[test]
    fn flag_entry_without_aliases_is_rejected() {
        let doc = SpecDoc {
            flags: vec![ArgEntry::default()],
            ..Default::default()
        };
        assert!(matches!(doc.to_config(), Err(SpecError::MissingAliases)));
    }

    #[test]
    fn serialization_skips_empty_fields() {
        let doc = SpecDoc {
            description: "Tiny".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["description"], "Tiny");
        assert!(json.get("flags").is_none());
        assert!(json.get("epilog").is_none());
    }
}
