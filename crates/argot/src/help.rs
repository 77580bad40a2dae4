//! Help and version text rendering.
//!
//! Rendering is deliberately separate from the engine: the parser returns
//! the rendered text inside [`crate::ParseOutcome`] and the caller decides
//! what to do with it.

use crate::config::{Action, ArgSpec, Nargs, ParserConfig, derive_key};

fn value_name(spec: &ArgSpec, prefix: char) -> String {
    spec.value_name
        .clone()
        .unwrap_or_else(|| derive_key(spec, prefix).to_ascii_uppercase())
}

fn takes_tokens(spec: &ArgSpec) -> bool {
    matches!(spec.action, Action::Store | Action::Append)
}

fn positional_left(spec: &ArgSpec, prefix: char) -> String {
    let name = value_name(spec, prefix);
    if spec.required {
        format!("<{name}>")
    } else {
        format!("[{name}]")
    }
}

fn flag_left(spec: &ArgSpec, prefix: char) -> String {
    let mut out = spec.names.join(", ");
    if takes_tokens(spec) {
        let name = value_name(spec, prefix);
        // Mirror the arity the quantifier enforces.
        match spec.nargs {
            None => out.push_str(&format!(" <{name}>")),
            Some(Nargs::Exact(n)) => {
                for _ in 0..n {
                    out.push_str(&format!(" <{name}>"));
                }
            }
            Some(Nargs::Optional) => out.push_str(&format!(" [{name}]")),
            Some(Nargs::ZeroOrMore) | Some(Nargs::Remainder) => {
                out.push_str(&format!(" [{name}...]"));
            }
            Some(Nargs::OneOrMore) => out.push_str(&format!(" <{name}>...")),
        }
    }
    out
}

fn right_column(spec: &ArgSpec) -> String {
    let mut out = spec.help.trim().to_string();
    if spec.required {
        if out.is_empty() {
            out.push_str("required");
        } else {
            out.push_str(" (required)");
        }
    }
    if let Some(default) = &spec.default {
        if out.is_empty() {
            out.push_str(&format!("[default: {default}]"));
        } else {
            out.push_str(&format!(" [default: {default}]"));
        }
    }
    out
}

fn push_rows(out: &mut String, rows: Vec<(String, String)>) {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

/// Render the help text: description, positional list, flag list, epilog.
pub fn render(config: &ParserConfig) -> String {
    let prefix = config.prefix;
    let mut out = String::new();

    if !config.description.trim().is_empty() {
        out.push_str(config.description.trim_end());
        out.push('\n');
    }

    if !config.positionals.is_empty() {
        out.push_str("\nArguments:\n");
        let rows = config
            .positionals
            .iter()
            .map(|spec| (positional_left(spec, prefix), right_column(spec)))
            .collect();
        push_rows(&mut out, rows);
    }

    if !config.flags.is_empty() || config.add_help {
        out.push_str("\nOptions:\n");
        let mut rows: Vec<(String, String)> = config
            .flags
            .iter()
            .map(|spec| (flag_left(spec, prefix), right_column(spec)))
            .collect();
        if config.add_help {
            rows.push((
                format!("{prefix}h, {prefix}{prefix}help"),
                "Show help information".to_string(),
            ));
        }
        push_rows(&mut out, rows);
    }

    if !config.epilog.trim().is_empty() {
        out.push('\n');
        out.push_str(config.epilog.trim_end());
        out.push('\n');
    }

    out
}

/// Render the version string emitted by the `version` action.
pub fn version(config: &ParserConfig) -> String {
    format!("{}\n", config.version.as_deref().unwrap_or_default().trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Action, ArgSpec, ParserConfig};

    #[test]
    fn render_lists_every_section() {
        let config = ParserConfig::new()
            .description("Copy things around.")
            .epilog("See the manual for details.")
            .flag(
                ArgSpec::flag(["-v", "--verbose"])
                    .action(Action::Count)
                    .help("Increase verbosity"),
            )
            .flag(ArgSpec::flag(["--format"]).default_value("plain"))
            .positional(ArgSpec::positional("src").required().help("Source path"))
            .positional(ArgSpec::positional("dst").value_name("DEST"));

        let text = render(&config);
        assert!(text.contains("Copy things around."));
        assert!(text.contains("Arguments:"));
        assert!(text.contains("<SRC>"));
        assert!(text.contains("[DEST]"));
        assert!(text.contains("Options:"));
        assert!(text.contains("-v, --verbose"));
        assert!(text.contains("--format <FORMAT>"));
        assert!(text.contains("[default: plain]"));
        assert!(text.contains("-h, --help"));
        assert!(text.contains("See the manual for details."));
    }

    #[test]
    fn render_shows_quantifier_arity() {
        let config = ParserConfig::new()
            .flag(ArgSpec::flag(["--dims"]).nargs(Nargs::Exact(2)))
            .flag(ArgSpec::flag(["--tag"]).nargs(Nargs::OneOrMore))
            .flag(ArgSpec::flag(["--level"]).nargs(Nargs::Optional))
            .flag(ArgSpec::flag(["--rest"]).nargs(Nargs::ZeroOrMore));
        let text = render(&config);
        assert!(text.contains("--dims <DIMS> <DIMS>"));
        assert!(text.contains("--tag <TAG>..."));
        assert!(text.contains("--level [LEVEL]"));
        assert!(text.contains("--rest [REST...]"));
    }

    #[test]
    fn render_omits_builtin_help_when_disabled() {
        let config = ParserConfig::new().add_help(false);
        let text = render(&config);
        assert!(!text.contains("--help"));
    }

    #[test]
    fn version_falls_back_to_empty() {
        let config = ParserConfig::new();
        assert_eq!(version(&config), "\n");
        let config = config.version("2.0.0");
        assert_eq!(version(&config), "2.0.0\n");
    }
}
