//! The parsing engine: token dispatch, flag matching, bundle expansion,
//! action application, nargs resolution, and post-parse validation.
//!
//! The token stream is threaded through every step as a shrinking slice and
//! the result mapping as a moved-in, moved-out accumulator; nothing is
//! mutated behind the caller's back, so a parse is pure given its inputs.

use std::borrow::Cow;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::config::{Action, ArgSpec, Nargs, ParserConfig, derive_key};
use crate::error::ParseError;
use crate::help;
use crate::value::Value;

/// The result mapping: derived key to parsed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matches {
    values: IndexMap<String, Value>,
}

impl Matches {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Convenience accessor for string-valued keys.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn is_present(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn push_list(&mut self, key: &str, value: Value) {
        let entry = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| Value::List(Vec::new()));
        if let Value::List(items) = entry {
            items.push(value);
        } else {
            *entry = Value::List(vec![value]);
        }
    }
}

/// What a successful parse produced.
///
/// Help and version are outcomes, not side effects: the caller decides
/// whether to print them and what exit code to use.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Matches(Matches),
    Help(String),
    Version(String),
}

/// A flag specification with its key derived up front.
struct FlagEntry<'c> {
    key: String,
    spec: &'c ArgSpec,
}

/// Result of applying one argument: either the remaining stream plus the
/// updated mapping, or a terminal help/version request.
enum Applied<'t> {
    Continue(&'t [String], Matches),
    Help,
    Version,
}

/// Parse `tokens` against `config`.
///
/// Flags may appear anywhere; positionals are matched strictly in
/// declaration order. Tokens after a bare `--` are all positional.
pub fn parse(config: &ParserConfig, tokens: &[String]) -> Result<ParseOutcome, ParseError> {
    let prefix = config.prefix;
    let long_prefix: String = [prefix, prefix].iter().collect();
    let help_short = format!("{prefix}h");
    let help_long = format!("{long_prefix}help");

    let flags: Vec<FlagEntry<'_>> = config
        .flags
        .iter()
        .map(|spec| FlagEntry {
            key: derive_key(spec, prefix),
            spec,
        })
        .collect();

    let mut rest: &[String] = tokens;
    let mut mapping = Matches::default();
    let mut pos_cursor = 0usize;
    let mut flags_done = false;

    loop {
        let Some(head) = rest.first() else {
            return finish(config, &flags, mapping).map(ParseOutcome::Matches);
        };
        let head = head.as_str();

        if !flags_done {
            if config.add_help && (head == help_short || head == help_long) {
                return Ok(ParseOutcome::Help(help::render(config)));
            }

            if head == long_prefix {
                flags_done = true;
                rest = &rest[1..];
                continue;
            }

            if head.starts_with(&long_prefix) {
                trace!(token = %head, "long flag");
                let (name, inline) = match head.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (head, None),
                };
                let (key, spec) = match_flag(name, &flags, config)?;

                if let Some(value) = inline {
                    // Splice the inline value in front of the remaining
                    // stream so nargs resolution sees it first.
                    let spliced: Vec<String> = std::iter::once(value.to_string())
                        .chain(rest[1..].iter().cloned())
                        .collect();
                    match apply_action(spec.as_ref(), &key, config, &spliced, true, mapping)? {
                        Applied::Continue(left, updated) => {
                            let consumed = spliced.len() - left.len();
                            if consumed == 0 {
                                return Err(ParseError::UnexpectedValue(name.to_string()));
                            }
                            mapping = updated;
                            rest = &rest[consumed..];
                            continue;
                        }
                        Applied::Help => return Ok(ParseOutcome::Help(help::render(config))),
                        Applied::Version => {
                            return Ok(ParseOutcome::Version(help::version(config)));
                        }
                    }
                }

                match apply_action(spec.as_ref(), &key, config, &rest[1..], true, mapping)? {
                    Applied::Continue(left, updated) => {
                        mapping = updated;
                        rest = left;
                        continue;
                    }
                    Applied::Help => return Ok(ParseOutcome::Help(help::render(config))),
                    Applied::Version => return Ok(ParseOutcome::Version(help::version(config))),
                }
            }

            if let Some(body) = head.strip_prefix(prefix) {
                if !body.is_empty() {
                    trace!(token = %head, "short flag bundle");
                    match apply_bundle(body, &flags, config, &rest[1..], mapping)? {
                        Applied::Continue(left, updated) => {
                            mapping = updated;
                            rest = left;
                            continue;
                        }
                        Applied::Help => return Ok(ParseOutcome::Help(help::render(config))),
                        Applied::Version => {
                            return Ok(ParseOutcome::Version(help::version(config)));
                        }
                    }
                }
            }
        }

        // Positional: next unconsumed spec in declaration order.
        trace!(token = %head, "positional");
        let Some(spec) = config.positionals.get(pos_cursor) else {
            debug!(token = %head, "no positional spec left for token");
            return Err(ParseError::ExtraPositional(head.to_string()));
        };
        pos_cursor += 1;
        let key = derive_key(spec, prefix);
        match apply_action(spec, &key, config, rest, !flags_done, mapping)? {
            Applied::Continue(left, updated) => {
                mapping = updated;
                rest = left;
            }
            Applied::Help => return Ok(ParseOutcome::Help(help::render(config))),
            Applied::Version => return Ok(ParseOutcome::Version(help::version(config))),
        }
    }
}

/// Resolve a flag token against the known flag specifications.
///
/// Strict mode makes an unmatched token fatal. Non-strict mode synthesizes
/// an ad hoc `store` spec keyed by the token with its prefix stripped.
fn match_flag<'c>(
    token: &str,
    flags: &'c [FlagEntry<'c>],
    config: &ParserConfig,
) -> Result<(String, Cow<'c, ArgSpec>), ParseError> {
    for entry in flags {
        if entry.spec.names().iter().any(|name| name == token) {
            return Ok((entry.key.clone(), Cow::Borrowed(entry.spec)));
        }
    }
    if config.strict {
        debug!(token = %token, "no specification matches flag");
        return Err(ParseError::UnknownArgument(token.to_string()));
    }
    let key = token.trim_start_matches(config.prefix).to_string();
    Ok((key, Cow::Owned(ArgSpec::flag([token]))))
}

/// Apply one bundled short-flag token, one argument per character.
///
/// Every character resolves through the matcher under the same strictness
/// policy and consumes from the shared remaining stream, so `-xy VALUE`
/// behaves exactly like `-x -y VALUE`.
fn apply_bundle<'t>(
    body: &str,
    flags: &[FlagEntry<'_>],
    config: &ParserConfig,
    mut rest: &'t [String],
    mut mapping: Matches,
) -> Result<Applied<'t>, ParseError> {
    for c in body.chars() {
        let token = format!("{}{}", config.prefix, c);
        let (key, spec) = match_flag(&token, flags, config)?;
        match apply_action(spec.as_ref(), &key, config, rest, true, mapping)? {
            Applied::Continue(left, updated) => {
                rest = left;
                mapping = updated;
            }
            Applied::Help => return Ok(Applied::Help),
            Applied::Version => return Ok(Applied::Version),
        }
    }
    Ok(Applied::Continue(rest, mapping))
}

/// Apply an argument's action, consuming value tokens from the front of
/// `tokens` and updating the mapping under `key`. `flags_active` is false
/// once the `--` separator has been seen, so quantifier scans stop treating
/// prefix-leading tokens as flags.
fn apply_action<'t>(
    spec: &ArgSpec,
    key: &str,
    config: &ParserConfig,
    tokens: &'t [String],
    flags_active: bool,
    mut mapping: Matches,
) -> Result<Applied<'t>, ParseError> {
    let writes = !matches!(spec.action, Action::Help | Action::Version);
    if writes && !spec.action.accumulates() && mapping.is_present(key) {
        return Err(ParseError::DuplicateKey(key.to_string()));
    }

    match &spec.action {
        Action::Help => Ok(Applied::Help),
        Action::Version => Ok(Applied::Version),
        Action::StoreTrue => {
            mapping.insert(key, Value::Bool(true));
            Ok(Applied::Continue(tokens, mapping))
        }
        Action::StoreFalse => {
            mapping.insert(key, Value::Bool(false));
            Ok(Applied::Continue(tokens, mapping))
        }
        Action::StoreConst(value) => {
            mapping.insert(key, value.clone());
            Ok(Applied::Continue(tokens, mapping))
        }
        Action::Count => {
            let previous = match mapping.get(key) {
                Some(Value::Int(n)) => *n,
                _ => 0,
            };
            mapping.insert(key, Value::Int(previous + 1));
            Ok(Applied::Continue(tokens, mapping))
        }
        Action::AppendConst { dest, value } => {
            mapping.push_list(dest, value.clone());
            Ok(Applied::Continue(tokens, mapping))
        }
        Action::Store | Action::Append => {
            let (value, left) = consume_value(spec, key, config, tokens, flags_active)?;
            if let Some(value) = value {
                if matches!(spec.action, Action::Append) {
                    mapping.push_list(key, value);
                } else {
                    mapping.insert(key, value);
                }
            }
            Ok(Applied::Continue(left, mapping))
        }
    }
}

/// Consume the token(s) belonging to a store/append occurrence and convert
/// them. `None` means the occurrence legitimately consumed nothing
/// (an optional quantifier in front of a flag).
fn consume_value<'t>(
    spec: &ArgSpec,
    key: &str,
    config: &ParserConfig,
    tokens: &'t [String],
    flags_active: bool,
) -> Result<(Option<Value>, &'t [String]), ParseError> {
    let prefix = flags_active.then_some(config.prefix);
    match spec.nargs {
        None => {
            let Some(raw) = tokens.first() else {
                return Err(ParseError::MissingValue(key.to_string()));
            };
            check_choice(spec, key, raw)?;
            let value = spec.value_type.convert(key, raw)?;
            Ok((Some(value), &tokens[1..]))
        }
        Some(Nargs::Optional) => {
            let (taken, left) = resolve_nargs(Nargs::Optional, prefix, key, tokens)?;
            match taken.first() {
                Some(raw) => {
                    check_choice(spec, key, raw)?;
                    let value = spec.value_type.convert(key, raw)?;
                    Ok((Some(value), left))
                }
                None => Ok((None, left)),
            }
        }
        Some(nargs) => {
            let (taken, left) = resolve_nargs(nargs, prefix, key, tokens)?;
            let mut items = Vec::with_capacity(taken.len());
            for raw in &taken {
                check_choice(spec, key, raw)?;
                items.push(spec.value_type.convert(key, raw)?);
            }
            Ok((Some(Value::List(items)), left))
        }
    }
}

/// Split off the tokens belonging to the current argument.
///
/// "Looks like a flag" means the token starts with the configured prefix
/// character; that test bounds the greedy quantifiers. `prefix` is `None`
/// once the `--` separator has disabled flag recognition, after which no
/// token looks like a flag.
pub(crate) fn resolve_nargs<'t>(
    nargs: Nargs,
    prefix: Option<char>,
    key: &str,
    tokens: &'t [String],
) -> Result<(Vec<&'t str>, &'t [String]), ParseError> {
    let flagish = |token: &str| prefix.is_some_and(|p| token.starts_with(p));
    match nargs {
        Nargs::Exact(n) => {
            if tokens.len() < n {
                return Err(ParseError::NotEnoughValues {
                    key: key.to_string(),
                    expected: n,
                    found: tokens.len(),
                });
            }
            Ok((
                tokens[..n].iter().map(String::as_str).collect(),
                &tokens[n..],
            ))
        }
        Nargs::Remainder => Ok((
            tokens.iter().map(String::as_str).collect(),
            &tokens[tokens.len()..],
        )),
        Nargs::ZeroOrMore | Nargs::OneOrMore => {
            let end = tokens
                .iter()
                .position(|token| flagish(token))
                .unwrap_or(tokens.len());
            if end == 0 && nargs == Nargs::OneOrMore {
                return Err(ParseError::MissingValue(key.to_string()));
            }
            Ok((
                tokens[..end].iter().map(String::as_str).collect(),
                &tokens[end..],
            ))
        }
        Nargs::Optional => match tokens.first() {
            Some(token) if !flagish(token) => Ok((vec![token.as_str()], &tokens[1..])),
            _ => Ok((Vec::new(), tokens)),
        },
    }
}

fn check_choice(spec: &ArgSpec, key: &str, raw: &str) -> Result<(), ParseError> {
    if spec.choices.is_empty() || spec.choices.iter().any(|choice| choice == raw) {
        return Ok(());
    }
    Err(ParseError::InvalidChoice {
        key: key.to_string(),
        value: raw.to_string(),
        choices: spec.choices.clone(),
    })
}

/// Post-parse validation: apply defaults, then report every required key
/// that is still absent.
fn finish(
    config: &ParserConfig,
    flags: &[FlagEntry<'_>],
    mut mapping: Matches,
) -> Result<Matches, ParseError> {
    let mut missing: Vec<String> = Vec::new();
    let positionals = config
        .positionals
        .iter()
        .map(|spec| (derive_key(spec, config.prefix), spec));
    let all = flags
        .iter()
        .map(|entry| (entry.key.clone(), entry.spec))
        .chain(positionals);

    for (key, spec) in all {
        if mapping.is_present(&key) {
            continue;
        }
        if let Some(default) = &spec.default {
            mapping.insert(&key, default.clone());
            continue;
        }
        if spec.required {
            missing.push(key);
        }
    }

    if !missing.is_empty() {
        return Err(ParseError::MissingRequiredArgs(missing));
    }
    Ok(mapping)
}
