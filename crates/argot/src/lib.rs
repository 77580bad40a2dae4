//! Declarative argv parsing.
//!
//! Callers describe the arguments a program accepts — flags with aliases,
//! positionals, actions, quantifiers, converters — and [`parse`] turns a raw
//! token list into a key/value mapping, a help/version request, or a
//! [`ParseError`]. The library never prints and never exits; terminal
//! behavior belongs to the embedding program.
//!
//! ```
//! use argot::{Action, ArgSpec, Nargs, ParseOutcome, ParserConfig};
//!
//! let config = ParserConfig::new()
//!     .description("Copy files")
//!     .flag(ArgSpec::flag(["-v", "--verbose"]).action(Action::Count))
//!     .positional(ArgSpec::positional("src").required())
//!     .positional(ArgSpec::positional("dst").required());
//!
//! let argv: Vec<String> = ["-v", "a.txt", "b.txt"].iter().map(|s| s.to_string()).collect();
//! let ParseOutcome::Matches(m) = argot::parse(&config, &argv).unwrap() else {
//!     unreachable!();
//! };
//! assert_eq!(m.get_str("src"), Some("a.txt"));
//! ```

pub mod config;
pub mod error;
pub mod help;
pub mod parser;
pub mod value;

pub use config::{Action, ArgSpec, Nargs, ParserConfig, ValueType, derive_key};
pub use error::ParseError;
pub use parser::{Matches, ParseOutcome, parse};
pub use value::Value;
