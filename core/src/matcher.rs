//! The argv matching engine.
//!
//! [`match_argv`] consumes an argument vector left-to-right against a
//! [`Grammar`], mutating the grammar's tables in place. Each token is
//! classified by shape and handed to one of three parsers:
//!
//! - a short-option cluster (`-ab`, `-oFILE`) against the option table,
//! - a long option (`--all`, `--speed=10`) against the option table, with
//!   unique-prefix matching,
//! - a bare word against the command table, falling back to positional
//!   capture into the active argument table.
//!
//! Matching is fail-fast: the first malformed token aborts the parse and
//! the error propagates to the caller. The engine never prints and never
//! exits the process; presentation is the caller's concern.

use thiserror::Error;
use tracing::{debug, trace};

use crate::cursor::TokenCursor;
use crate::types::{ArgTable, Grammar};

/// A malformed token in the argument vector.
///
/// Every variant is detected synchronously at the offending token and
/// aborts the remaining parse; table state past the failure point is
/// unspecified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The token names no declared option.
    #[error("{token} is not recognized")]
    UnrecognizedOption { token: String },
    /// A value-taking option appeared with no value and no following token.
    #[error("{option} requires an argument")]
    MissingArgument { option: String },
    /// A no-value long option was given an `=value`.
    #[error("{option} must not have an argument")]
    UnexpectedArgument { option: String },
    /// A long-option prefix matched more than one declared option.
    #[error("{token} is not a unique prefix")]
    AmbiguousPrefix { token: String },
}

/// The positional table currently receiving bare tokens.
///
/// Starts at the grammar's top-level table; a matched command carrying a
/// subset replaces it for the remainder of the parse. Replacement is
/// one-directional: there is no stack and no restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveArgs {
    Root,
    Subset(usize),
}

fn active_table<'g>(grammar: &'g mut Grammar, active: ActiveArgs) -> &'g mut ArgTable {
    match active {
        ActiveArgs::Root => &mut grammar.arguments,
        ActiveArgs::Subset(index) => {
            if index < grammar.subsets.len() {
                &mut grammar.subsets[index]
            } else {
                &mut grammar.arguments
            }
        }
    }
}

/// Matches an argument vector against a grammar.
///
/// `args` excludes the program name: index 0 is the first real token.
/// The grammar's tables are mutated in place; read them back through
/// [`Grammar::option`], [`Grammar::command`], and [`Grammar::argument`],
/// or project them with [`Grammar::project`].
///
/// Tokens after a literal `--` are always captured as positionals, never
/// interpreted as options or commands.
///
/// # Examples
///
/// ```
/// use argmatch_core::*;
///
/// let mut grammar = Grammar::new();
/// grammar.options.push(OptionSpec::with_value(None, Some("--speed")));
/// let names = grammar.add_subset(ArgTable::new(vec![
///     ArgSlot::new("<name>").allow_repeat(),
/// ]));
/// grammar.commands.push(CommandSpec::new("create").with_subset(names));
///
/// let args: Vec<String> = ["create", "Titanic", "--speed=20"]
///     .iter().map(|s| s.to_string()).collect();
/// match_argv(&mut grammar, &args).unwrap();
///
/// assert!(grammar.command("create").unwrap().matched);
/// assert_eq!(grammar.argument("<name>").unwrap().first_value.as_deref(), Some("Titanic"));
/// assert_eq!(grammar.option("--speed").unwrap().argument.as_deref(), Some("20"));
/// ```
pub fn match_argv(grammar: &mut Grammar, args: &[String]) -> Result<(), MatchError> {
    let mut ts = TokenCursor::new(args);
    let mut active = ActiveArgs::Root;

    while let Some(token) = ts.current() {
        if token == "--" {
            ts.advance();
            while let Some(rest) = ts.current() {
                capture_positional(&mut ts, rest, grammar, active);
            }
        } else if token.starts_with("--") {
            parse_long(&mut ts, token, grammar)?;
        } else if token.len() > 1 && token.starts_with('-') {
            parse_shorts(&mut ts, token, grammar)?;
        } else {
            parse_bare(&mut ts, token, grammar, &mut active);
        }
    }

    Ok(())
}

/// Consumes a short-option cluster token (`-abc`, `-oFILE`).
///
/// The cursor is advanced past the cluster on entry. Flags are resolved one
/// character at a time; the first value-taking flag swallows the rest of
/// the cluster (or the next token) as its value and ends the cluster.
fn parse_shorts(
    ts: &mut TokenCursor<'_>,
    token: &str,
    grammar: &mut Grammar,
) -> Result<(), MatchError> {
    let cluster = &token[1..];
    ts.advance();

    let mut chars = cluster.chars();
    while let Some(flag) = chars.next() {
        let Some(opt) = grammar.options.iter_mut().find(|o| o.matches_short(flag)) else {
            return Err(MatchError::UnrecognizedOption {
                token: format!("-{flag}"),
            });
        };

        if !opt.takes_value {
            opt.value = true;
            trace!(option = %format!("-{flag}"), "Set short flag");
            continue;
        }

        // The rest of the cluster is the value, never more flags.
        let rest = chars.as_str();
        if rest.is_empty() {
            let Some(value) = ts.current() else {
                return Err(MatchError::MissingArgument {
                    option: format!("-{flag}"),
                });
            };
            opt.argument = Some(value.to_string());
            ts.advance();
        } else {
            opt.argument = Some(rest.to_string());
        }
        trace!(option = %format!("-{flag}"), "Captured short option value");
        break;
    }

    Ok(())
}

/// Consumes a long-option token (`--all`, `--speed=10`).
///
/// The token is split non-destructively at the first `=`. An exact
/// long-form match always wins; otherwise the name must be a prefix of
/// exactly one declared long form.
fn parse_long(
    ts: &mut TokenCursor<'_>,
    token: &str,
    grammar: &mut Grammar,
) -> Result<(), MatchError> {
    let (name, attached) = match token.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
    };

    let mut exact = None;
    let mut prefixed = Vec::new();
    for (index, opt) in grammar.options.iter().enumerate() {
        let Some(long) = opt.long.as_deref() else {
            continue;
        };
        if long == name {
            exact = Some(index);
            break;
        }
        if long.starts_with(name) {
            prefixed.push(index);
        }
    }

    let index = match exact {
        Some(index) => index,
        None => match prefixed.as_slice() {
            [] => {
                return Err(MatchError::UnrecognizedOption {
                    token: name.to_string(),
                });
            }
            [index] => *index,
            _ => {
                return Err(MatchError::AmbiguousPrefix {
                    token: name.to_string(),
                });
            }
        },
    };

    ts.advance();
    let opt = &mut grammar.options[index];
    let long = opt.canonical_name().to_string();

    if opt.takes_value {
        match attached {
            Some(value) => opt.argument = Some(value.to_string()),
            None => {
                let Some(value) = ts.current() else {
                    return Err(MatchError::MissingArgument { option: long });
                };
                opt.argument = Some(value.to_string());
                ts.advance();
            }
        }
        trace!(option = %long, "Captured long option value");
    } else if attached.is_some() {
        return Err(MatchError::UnexpectedArgument { option: long });
    } else {
        opt.value = true;
        trace!(option = %long, "Set long flag");
    }

    Ok(())
}

/// Consumes a bare token: an exact command-name match, or positional
/// capture into the active argument table.
fn parse_bare(
    ts: &mut TokenCursor<'_>,
    token: &str,
    grammar: &mut Grammar,
    active: &mut ActiveArgs,
) {
    if let Some(cmd) = grammar.commands.iter_mut().find(|c| c.name == token) {
        cmd.matched = true;
        let subset = cmd.subset;
        ts.advance();
        if let Some(index) = subset {
            if index < grammar.subsets.len() {
                *active = ActiveArgs::Subset(index);
                debug!(command = token, subset = index, "Switched active argument table");
            } else {
                debug!(
                    command = token,
                    subset = index,
                    "Command references missing subset; table unchanged"
                );
            }
        }
        return;
    }

    capture_positional(ts, token, grammar, *active);
}

/// Assigns a token to the first unfilled slot of the active table, or
/// extends a trailing repeat sink once the table is full. With no open
/// slot the token is discarded, not rejected.
fn capture_positional(
    ts: &mut TokenCursor<'_>,
    token: &str,
    grammar: &mut Grammar,
    active: ActiveArgs,
) {
    let table = active_table(grammar, active);
    if let Some(slot) = table.first_unfilled_mut() {
        slot.capture(token);
        trace!(slot = %slot.name, token, "Captured positional");
    } else if let Some(last) = table.slots.last_mut().filter(|s| s.repeating) {
        last.capture(token);
        trace!(slot = %last.name, token, count = last.count, "Extended repeating slot");
    } else {
        debug!(token, "No open argument slot; token ignored");
    }
    ts.advance();
}

#[cfg(test)]
mod tests {
    use crate::types::{ArgSlot, ArgTable, CommandSpec, Grammar, OptionSpec};

    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn flags(specs: &[(&str, bool)]) -> Grammar {
        let mut grammar = Grammar::new();
        for (form, takes_value) in specs {
            let (short, long) = if form.starts_with("--") {
                (None, Some(*form))
            } else {
                (Some(*form), None)
            };
            grammar.options.push(if *takes_value {
                OptionSpec::with_value(short, long)
            } else {
                OptionSpec::flag(short, long)
            });
        }
        grammar
    }

    #[test]
    fn test_short_flag_sets_value() {
        let mut grammar = flags(&[("-a", false)]);
        match_argv(&mut grammar, &argv(&["-a"])).unwrap();

        let opt = grammar.option("-a").unwrap();
        assert!(opt.value);
        assert!(opt.argument.is_none());
    }

    #[test]
    fn test_short_cluster_sets_all_flags() {
        let mut grammar = flags(&[("-a", false), ("-b", false)]);
        match_argv(&mut grammar, &argv(&["-ab"])).unwrap();

        assert!(grammar.option("-a").unwrap().value);
        assert!(grammar.option("-b").unwrap().value);
    }

    #[test]
    fn test_short_flag_leaves_others_untouched() {
        let mut grammar = flags(&[("-a", false), ("-b", false)]);
        match_argv(&mut grammar, &argv(&["-b"])).unwrap();

        assert!(!grammar.option("-a").unwrap().value);
        assert!(grammar.option("-b").unwrap().value);
    }

    #[test]
    fn test_short_inline_value() {
        let mut grammar = flags(&[("-a", true)]);
        match_argv(&mut grammar, &argv(&["-aARG"])).unwrap();

        let opt = grammar.option("-a").unwrap();
        assert!(!opt.value);
        assert_eq!(opt.argument.as_deref(), Some("ARG"));
    }

    #[test]
    fn test_short_separate_value() {
        let mut grammar = flags(&[("-a", true)]);
        match_argv(&mut grammar, &argv(&["-a", "ARG"])).unwrap();

        assert_eq!(grammar.option("-a").unwrap().argument.as_deref(), Some("ARG"));
    }

    #[test]
    fn test_short_value_swallows_cluster_remainder() {
        // -Wall: -W takes a value, so "all" is the value, not flags.
        let mut grammar = flags(&[("--all", false), ("-b", false), ("-W", true)]);
        match_argv(&mut grammar, &argv(&["-Wall"])).unwrap();

        assert!(!grammar.option("--all").unwrap().value);
        assert!(!grammar.option("-b").unwrap().value);
        assert_eq!(grammar.option("-W").unwrap().argument.as_deref(), Some("all"));
    }

    #[test]
    fn test_short_unrecognized() {
        let mut grammar = flags(&[("-a", false)]);
        let err = match_argv(&mut grammar, &argv(&["-z"])).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnrecognizedOption {
                token: "-z".to_string()
            }
        );
    }

    #[test]
    fn test_short_missing_argument() {
        let mut grammar = flags(&[("-a", true)]);
        let err = match_argv(&mut grammar, &argv(&["-a"])).unwrap_err();
        assert_eq!(
            err,
            MatchError::MissingArgument {
                option: "-a".to_string()
            }
        );
    }

    #[test]
    fn test_long_flag_sets_value() {
        let mut grammar = flags(&[("--all", false), ("--not", false)]);
        match_argv(&mut grammar, &argv(&["--all"])).unwrap();

        assert!(grammar.option("--all").unwrap().value);
        assert!(!grammar.option("--not").unwrap().value);
    }

    #[test]
    fn test_long_attached_value() {
        let mut grammar = flags(&[("--all", true)]);
        match_argv(&mut grammar, &argv(&["--all=ARG"])).unwrap();

        let opt = grammar.option("--all").unwrap();
        assert!(!opt.value);
        assert_eq!(opt.argument.as_deref(), Some("ARG"));
    }

    #[test]
    fn test_long_separate_value() {
        let mut grammar = flags(&[("--all", true)]);
        match_argv(&mut grammar, &argv(&["--all", "ARG"])).unwrap();

        assert_eq!(grammar.option("--all").unwrap().argument.as_deref(), Some("ARG"));
    }

    #[test]
    fn test_long_missing_argument() {
        let mut grammar = flags(&[("--all", true)]);
        let err = match_argv(&mut grammar, &argv(&["--all"])).unwrap_err();
        assert_eq!(
            err,
            MatchError::MissingArgument {
                option: "--all".to_string()
            }
        );
    }

    #[test]
    fn test_long_unexpected_argument() {
        let mut grammar = flags(&[("--all", false)]);
        let err = match_argv(&mut grammar, &argv(&["--all=ARG"])).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnexpectedArgument {
                option: "--all".to_string()
            }
        );
    }

    #[test]
    fn test_long_unrecognized() {
        let mut grammar = flags(&[("--all", false)]);
        let err = match_argv(&mut grammar, &argv(&["--none"])).unwrap_err();
        assert_eq!(
            err,
            MatchError::UnrecognizedOption {
                token: "--none".to_string()
            }
        );
    }

    #[test]
    fn test_long_unique_prefix_matches() {
        let mut grammar = flags(&[("--version", false), ("--all", false)]);
        match_argv(&mut grammar, &argv(&["--ver"])).unwrap();

        assert!(grammar.option("--version").unwrap().value);
    }

    #[test]
    fn test_long_ambiguous_prefix_fails() {
        let mut grammar = flags(&[("--version", false), ("--verbose", false)]);
        let err = match_argv(&mut grammar, &argv(&["--ver"])).unwrap_err();
        assert_eq!(
            err,
            MatchError::AmbiguousPrefix {
                token: "--ver".to_string()
            }
        );
    }

    #[test]
    fn test_long_exact_match_wins_over_prefix() {
        let mut grammar = flags(&[("--all", false), ("--all-files", false)]);
        match_argv(&mut grammar, &argv(&["--all"])).unwrap();

        assert!(grammar.option("--all").unwrap().value);
        assert!(!grammar.option("--all-files").unwrap().value);
    }

    #[test]
    fn test_mixed_options_and_ignored_bare_token() {
        // "ARG" has no slot to land in and is discarded rather than
        // rejected; tightening this into an error would break callers that
        // declare no positionals at all.
        let mut grammar = flags(&[("--all", false), ("-b", false), ("-W", true)]);
        match_argv(&mut grammar, &argv(&["ARG", "-Wall"])).unwrap();

        assert!(!grammar.option("--all").unwrap().value);
        assert!(!grammar.option("-b").unwrap().value);
        assert_eq!(grammar.option("-W").unwrap().argument.as_deref(), Some("all"));
    }

    #[test]
    fn test_positionals_fill_in_declaration_order() {
        let mut grammar = Grammar::new();
        grammar.arguments = ArgTable::new(vec![ArgSlot::new("<x>"), ArgSlot::new("<y>")]);
        match_argv(&mut grammar, &argv(&["10", "20"])).unwrap();

        assert_eq!(grammar.argument("<x>").unwrap().first_value.as_deref(), Some("10"));
        assert_eq!(grammar.argument("<y>").unwrap().first_value.as_deref(), Some("20"));
    }

    #[test]
    fn test_repeating_slot_absorbs_trailing_tokens() {
        let mut grammar = Grammar::new();
        grammar.arguments = ArgTable::new(vec![ArgSlot::new("<name>").allow_repeat()]);
        match_argv(&mut grammar, &argv(&["a", "b", "c"])).unwrap();

        let slot = grammar.argument("<name>").unwrap();
        assert_eq!(slot.captured, vec!["a", "b", "c"]);
        assert_eq!(slot.count, 3);
        assert_eq!(slot.first_value.as_deref(), Some("a"));
    }

    #[test]
    fn test_filled_non_repeating_table_discards_extra_tokens() {
        let mut grammar = Grammar::new();
        grammar.arguments = ArgTable::new(vec![ArgSlot::new("<x>")]);
        match_argv(&mut grammar, &argv(&["10", "20"])).unwrap();

        let slot = grammar.argument("<x>").unwrap();
        assert_eq!(slot.captured, vec!["10"]);
        assert_eq!(slot.count, 1);
    }

    #[test]
    fn test_command_match_switches_argument_subset() {
        let mut grammar = Grammar::new();
        let names = grammar.add_subset(ArgTable::new(vec![
            ArgSlot::new("<name>").allow_repeat(),
        ]));
        grammar.commands.push(CommandSpec::new("create").with_subset(names));
        match_argv(&mut grammar, &argv(&["create", "a", "b"])).unwrap();

        assert!(grammar.command("create").unwrap().matched);
        let slot = grammar.argument("<name>").unwrap();
        assert_eq!(slot.captured, vec!["a", "b"]);
    }

    #[test]
    fn test_second_command_replaces_subset() {
        // ship <name> move <x> <y>: the table narrows twice, never restores.
        let mut grammar = Grammar::new();
        let name = grammar.add_subset(ArgTable::new(vec![ArgSlot::new("<name>")]));
        let coords =
            grammar.add_subset(ArgTable::new(vec![ArgSlot::new("<x>"), ArgSlot::new("<y>")]));
        grammar.commands.push(CommandSpec::new("ship").with_subset(name));
        grammar.commands.push(CommandSpec::new("move").with_subset(coords));
        match_argv(&mut grammar, &argv(&["ship", "Titanic", "move", "10", "20"])).unwrap();

        assert!(grammar.command("ship").unwrap().matched);
        assert!(grammar.command("move").unwrap().matched);
        assert_eq!(
            grammar.argument("<name>").unwrap().first_value.as_deref(),
            Some("Titanic")
        );
        assert_eq!(grammar.argument("<x>").unwrap().first_value.as_deref(), Some("10"));
        assert_eq!(grammar.argument("<y>").unwrap().first_value.as_deref(), Some("20"));
    }

    #[test]
    fn test_command_without_subset_keeps_active_table() {
        let mut grammar = Grammar::new();
        grammar.commands.push(CommandSpec::new("status"));
        grammar.arguments = ArgTable::new(vec![ArgSlot::new("<target>")]);
        match_argv(&mut grammar, &argv(&["status", "origin"])).unwrap();

        assert!(grammar.command("status").unwrap().matched);
        assert_eq!(
            grammar.argument("<target>").unwrap().first_value.as_deref(),
            Some("origin")
        );
    }

    #[test]
    fn test_double_dash_captures_rest_as_positionals() {
        let mut grammar = flags(&[("-a", false)]);
        grammar.arguments = ArgTable::new(vec![ArgSlot::new("<file>").allow_repeat()]);
        grammar.commands.push(CommandSpec::new("ship"));
        match_argv(&mut grammar, &argv(&["--", "-a", "ship"])).unwrap();

        // Neither option parsing nor command matching applies after "--".
        assert!(!grammar.option("-a").unwrap().value);
        assert!(!grammar.command("ship").unwrap().matched);
        assert_eq!(grammar.argument("<file>").unwrap().captured, vec!["-a", "ship"]);
    }

    #[test]
    fn test_double_dash_with_no_slots_discards_rest() {
        let mut grammar = flags(&[("-a", false)]);
        match_argv(&mut grammar, &argv(&["--", "-a", "x"])).unwrap();

        assert!(!grammar.option("-a").unwrap().value);
    }

    #[test]
    fn test_single_dash_is_a_bare_token() {
        let mut grammar = Grammar::new();
        grammar.arguments = ArgTable::new(vec![ArgSlot::new("<file>")]);
        match_argv(&mut grammar, &argv(&["-"])).unwrap();

        assert_eq!(grammar.argument("<file>").unwrap().first_value.as_deref(), Some("-"));
    }

    #[test]
    fn test_fresh_instances_produce_identical_results() {
        let mut template = Grammar::new();
        template.options.push(OptionSpec::with_value(None, Some("--speed")));
        let names = template.add_subset(ArgTable::new(vec![
            ArgSlot::new("<name>").allow_repeat(),
        ]));
        template.commands.push(CommandSpec::new("create").with_subset(names));

        let args = argv(&["create", "a", "b", "--speed=9"]);
        let mut first = template.clone();
        let mut second = template.clone();
        match_argv(&mut first, &args).unwrap();
        match_argv(&mut second, &args).unwrap();

        assert_eq!(first, second);
        // The template itself is untouched.
        assert!(!template.commands[0].matched);
    }

    #[test]
    fn test_failure_aborts_remaining_parse() {
        let mut grammar = flags(&[("-a", false)]);
        grammar.arguments = ArgTable::new(vec![ArgSlot::new("<x>")]);
        let err = match_argv(&mut grammar, &argv(&["-z", "10"])).unwrap_err();

        assert_eq!(
            err,
            MatchError::UnrecognizedOption {
                token: "-z".to_string()
            }
        );
        // Fail-fast: the token after the failure was never dispatched.
        assert!(!grammar.arguments.slots[0].is_filled());
    }
}
