//! Grammar tables and the argv matching engine.
//!
//! This crate models a command-line interface as three flat tables — options,
//! commands, and positional argument slots — and matches an argument vector
//! against them in a single left-to-right pass:
//!
//! - [`Grammar`] — the table bundle one match invocation owns and mutates.
//! - [`OptionSpec`] — an option with short/long forms, value-taking state,
//!   and an optional projection default.
//! - [`CommandSpec`] — a bare command word that may activate a
//!   command-scoped argument subset.
//! - [`ArgSlot`] / [`ArgTable`] — positional slots, including a trailing
//!   repeat sink (`<name>...`).
//! - [`match_argv`] — the matching engine; fails fast with a [`MatchError`]
//!   on malformed input and never terminates the process.
//! - [`validate_grammar`] — structural checks on ready-made tables.
//! - [`Grammar::project`] — the final table state as a flat named record.
//!
//! Grammars serialize with [`serde`], so a table declared in JSON or YAML
//! round-trips into a matchable [`Grammar`].
//!
//! # Example
//!
//! ```
//! use argmatch_core::*;
//!
//! // naval_fate ship <name> move <x> <y> [--speed=<kn>]
//! let mut grammar = Grammar::new();
//! grammar.options.push(
//!     OptionSpec::with_value(None, Some("--speed")).with_default("10"),
//! );
//! let name = grammar.add_subset(ArgTable::new(vec![ArgSlot::new("<name>")]));
//! let coords = grammar.add_subset(ArgTable::new(vec![
//!     ArgSlot::new("<x>"),
//!     ArgSlot::new("<y>"),
//! ]));
//! grammar.commands.push(CommandSpec::new("ship").with_subset(name));
//! grammar.commands.push(CommandSpec::new("move").with_subset(coords));
//!
//! assert!(validate_grammar(&grammar).is_empty());
//!
//! let args: Vec<String> = ["ship", "Titanic", "move", "10", "20", "--speed=20"]
//!     .iter().map(|s| s.to_string()).collect();
//! match_argv(&mut grammar, &args).unwrap();
//!
//! assert!(grammar.command("move").unwrap().matched);
//! assert_eq!(grammar.argument("<x>").unwrap().first_value.as_deref(), Some("10"));
//! assert_eq!(grammar.option("--speed").unwrap().argument.as_deref(), Some("20"));
//! ```

mod cursor;
mod matcher;
mod project;
mod types;
mod validate;

pub use cursor::TokenCursor;
pub use matcher::{MatchError, match_argv};
pub use types::*;
pub use validate::{ValidationError, validate_grammar};
