//! Grammar validation.
//!
//! The matcher operates on ready-made tables and assumes they are
//! well-formed; a malformed table (an option with no form, a subset index
//! past the arena, a repeat sink in the middle of a table) would corrupt
//! matching rather than fail cleanly. `validate_grammar` checks those
//! structural invariants up front.
//!
//! # Examples
//!
//! ```
//! use argmatch_core::*;
//!
//! let mut grammar = Grammar::new();
//! grammar.options.push(OptionSpec::flag(Some("-v"), Some("--verbose")));
//! assert!(validate_grammar(&grammar).is_empty());
//!
//! // Invalid: short form missing the leading dash
//! let mut bad = Grammar::new();
//! bad.options.push(OptionSpec::flag(Some("v"), Some("--verbose")));
//! assert!(!validate_grammar(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{ArgTable, Grammar};

/// Grammar validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An option declares neither a short nor a long form.
    #[error("option must define short or long form")]
    MissingOptionForm,
    /// Short form is not a dash followed by one character (e.g., `"v"`).
    #[error("invalid short option form: {0}")]
    InvalidShortForm(String),
    /// Long form does not start with `--` or is too short.
    #[error("invalid long option form: {0}")]
    InvalidLongForm(String),
    /// Two options share a short or long form.
    #[error("duplicate option form: {0}")]
    DuplicateOptionForm(String),
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Two commands share a name.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
    /// A command references a subset index past the arena.
    #[error("command '{command}' references unknown subset {subset}")]
    UnknownSubset { command: String, subset: usize },
    /// Argument slot name is empty or whitespace-only.
    #[error("argument slot name cannot be empty")]
    EmptySlotName,
    /// Two slots in the same table share a name.
    #[error("duplicate argument slot: {0}")]
    DuplicateSlot(String),
    /// A repeating slot is not the last slot of its table.
    #[error("repeating slot must be last in its table: {0}")]
    RepeatNotLast(String),
}

/// Validates a grammar.
///
/// Checks option forms, command names, subset references, and every
/// argument table (top-level and subsets). Returns the errors found;
/// an empty vector means the grammar is safe to match against.
///
/// # Examples
///
/// ```
/// use argmatch_core::*;
///
/// let mut grammar = Grammar::new();
/// grammar.commands.push(CommandSpec::new("ship").with_subset(3));
/// let errors = validate_grammar(&grammar);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::UnknownSubset { .. })));
/// ```
pub fn validate_grammar(grammar: &Grammar) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_options(grammar));
    if !errors.is_empty() {
        return errors;
    }

    errors.extend(validate_commands(grammar));
    if !errors.is_empty() {
        return errors;
    }

    errors.extend(validate_table(&grammar.arguments));
    if !errors.is_empty() {
        return errors;
    }

    for table in &grammar.subsets {
        errors.extend(validate_table(table));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_options(grammar: &Grammar) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for opt in &grammar.options {
        if opt.short.is_none() && opt.long.is_none() {
            errors.push(ValidationError::MissingOptionForm);
            return errors;
        }

        if let Some(short) = &opt.short {
            if !short.starts_with('-') || short.starts_with("--") || short.chars().count() != 2 {
                errors.push(ValidationError::InvalidShortForm(short.clone()));
                return errors;
            }
            if !seen.insert(short) {
                errors.push(ValidationError::DuplicateOptionForm(short.clone()));
                return errors;
            }
        }

        if let Some(long) = &opt.long {
            if !long.starts_with("--") || long.len() < 3 {
                errors.push(ValidationError::InvalidLongForm(long.clone()));
                return errors;
            }
            if !seen.insert(long) {
                errors.push(ValidationError::DuplicateOptionForm(long.clone()));
                return errors;
            }
        }
    }

    errors
}

fn validate_commands(grammar: &Grammar) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for cmd in &grammar.commands {
        let name = cmd.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyCommandName);
            return errors;
        }
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateCommand(name.to_string()));
            return errors;
        }
        if let Some(subset) = cmd.subset {
            if subset >= grammar.subsets.len() {
                errors.push(ValidationError::UnknownSubset {
                    command: name.to_string(),
                    subset,
                });
                return errors;
            }
        }
    }

    errors
}

fn validate_table(table: &ArgTable) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let last = table.slots.len().saturating_sub(1);

    for (i, slot) in table.slots.iter().enumerate() {
        let name = slot.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptySlotName);
            return errors;
        }
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateSlot(name.to_string()));
            return errors;
        }
        if slot.repeating && i != last {
            errors.push(ValidationError::RepeatNotLast(name.to_string()));
            return errors;
        }
    }

    errors
}
