//! Grammar table definitions for argv matching.
//!
//! This module defines the data model the matching engine operates on: a
//! [`Grammar`] bundles the option, command, and positional-argument tables
//! for one command-line interface. The types are designed for serialization
//! with [`serde`] so grammars can round-trip through JSON and YAML; the
//! parse-state fields (`value`, `argument`, `matched`, `captured`) default
//! to empty, so a grammar file declares only shape.
//!
//! A `Grammar` instance is exclusively owned by a single match invocation.
//! Construct a fresh instance (or clone an immutable template) per parse;
//! never share a mutated instance across parses without [`Grammar::reset`].

use serde::{Deserialize, Serialize};

/// An option descriptor: short and/or long form plus per-parse state.
///
/// At least one of `short`/`long` must be present (enforced by
/// [`validate_grammar`](crate::validate_grammar)). A no-value option records
/// its appearance in `value`; a value-taking option records the supplied
/// text in `argument`. `argument` being set implies `takes_value`.
///
/// # Examples
///
/// ```
/// use argmatch_core::OptionSpec;
///
/// let verbose = OptionSpec::flag(Some("-v"), Some("--verbose"));
/// assert!(!verbose.takes_value);
/// assert_eq!(verbose.canonical_name(), "--verbose");
///
/// let speed = OptionSpec::with_value(None, Some("--speed")).with_default("10");
/// assert!(speed.takes_value);
/// assert_eq!(speed.default_value.as_deref(), Some("10"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Short form (e.g., "-h").
    pub short: Option<String>,
    /// Long form (e.g., "--help").
    pub long: Option<String>,
    /// Whether this option consumes a value.
    pub takes_value: bool,
    /// Value projected when a value-taking option never appears.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Set when a no-value option appears.
    #[serde(default)]
    pub value: bool,
    /// The captured value of a value-taking option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,
}

impl OptionSpec {
    /// Creates a no-value option (a boolean flag).
    ///
    /// # Examples
    ///
    /// ```
    /// use argmatch_core::OptionSpec;
    ///
    /// let flag = OptionSpec::flag(Some("-h"), Some("--help"));
    /// assert!(flag.matches("-h"));
    /// assert!(flag.matches("--help"));
    /// assert!(!flag.matches("--version"));
    /// ```
    pub fn flag(short: Option<&str>, long: Option<&str>) -> Self {
        Self {
            short: short.map(String::from),
            long: long.map(String::from),
            takes_value: false,
            default_value: None,
            value: false,
            argument: None,
        }
    }

    /// Creates a value-taking option.
    ///
    /// # Examples
    ///
    /// ```
    /// use argmatch_core::OptionSpec;
    ///
    /// let speed = OptionSpec::with_value(None, Some("--speed"));
    /// assert!(speed.takes_value);
    /// assert!(speed.argument.is_none());
    /// ```
    pub fn with_value(short: Option<&str>, long: Option<&str>) -> Self {
        Self {
            short: short.map(String::from),
            long: long.map(String::from),
            takes_value: true,
            default_value: None,
            value: false,
            argument: None,
        }
    }

    /// Sets the value projected when the option never appears.
    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    /// Returns the canonical name (long form preferred, falls back to short).
    pub fn canonical_name(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or("unknown")
    }

    /// Checks if this option matches a given string (short or long form).
    pub fn matches(&self, s: &str) -> bool {
        self.short.as_deref() == Some(s) || self.long.as_deref() == Some(s)
    }

    /// Checks if this option's short form carries the given flag character.
    ///
    /// The short form is `-` plus one character; `matches_short('v')` is
    /// true for an option declared as `-v`.
    pub fn matches_short(&self, c: char) -> bool {
        self.short
            .as_deref()
            .and_then(|s| s.chars().nth(1))
            .is_some_and(|flag| flag == c)
    }

    /// Clears per-parse state, keeping the declared shape.
    pub fn reset(&mut self) {
        self.value = false;
        self.argument = None;
    }
}

/// A command descriptor: a bare word that may narrow the positional grammar.
///
/// When a command with a `subset` matches, the argument table at that index
/// in [`Grammar::subsets`] becomes the active positional table for the rest
/// of the parse.
///
/// # Examples
///
/// ```
/// use argmatch_core::CommandSpec;
///
/// let ship = CommandSpec::new("ship");
/// assert!(!ship.matched);
/// assert!(ship.subset.is_none());
///
/// let create = CommandSpec::new("create").with_subset(0);
/// assert_eq!(create.subset, Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// The command word (e.g., "ship").
    pub name: String,
    /// Set when the command appears in the argument vector.
    #[serde(default)]
    pub matched: bool,
    /// Index into [`Grammar::subsets`] of the argument table this command
    /// activates, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<usize>,
}

impl CommandSpec {
    /// Creates a command descriptor with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            matched: false,
            subset: None,
        }
    }

    /// Attaches the argument subset this command activates.
    pub fn with_subset(mut self, subset: usize) -> Self {
        self.subset = Some(subset);
        self
    }

    /// Clears per-parse state.
    pub fn reset(&mut self) {
        self.matched = false;
    }
}

/// A positional argument slot.
///
/// A slot is filled once `captured` is non-empty; `first_value` and `count`
/// are maintained alongside. A `repeating` slot in the final position of its
/// table absorbs every unmatched bare token once the table is full.
///
/// # Examples
///
/// ```
/// use argmatch_core::ArgSlot;
///
/// let name = ArgSlot::new("<name>").allow_repeat();
/// assert!(name.repeating);
/// assert!(!name.is_filled());
/// assert_eq!(name.count, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSlot {
    /// Bracketed placeholder name (e.g., "<name>").
    pub name: String,
    /// Whether this slot absorbs trailing tokens (`<name>...`).
    #[serde(default)]
    pub repeating: bool,
    /// The first captured token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_value: Option<String>,
    /// All captured tokens, in argument-vector order.
    #[serde(default)]
    pub captured: Vec<String>,
    /// Number of captured tokens.
    #[serde(default)]
    pub count: usize,
}

impl ArgSlot {
    /// Creates a single-value slot.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            repeating: false,
            first_value: None,
            captured: Vec::new(),
            count: 0,
        }
    }

    /// Marks the slot as a trailing repeat sink.
    pub fn allow_repeat(mut self) -> Self {
        self.repeating = true;
        self
    }

    /// Whether this slot has captured at least one token.
    pub fn is_filled(&self) -> bool {
        !self.captured.is_empty()
    }

    /// Captures one token into this slot.
    pub fn capture(&mut self, token: &str) {
        if self.captured.is_empty() {
            self.first_value = Some(token.to_string());
        }
        self.captured.push(token.to_string());
        self.count += 1;
    }

    /// Clears per-parse state.
    pub fn reset(&mut self) {
        self.first_value = None;
        self.captured.clear();
        self.count = 0;
    }
}

/// An ordered table of positional argument slots.
///
/// # Examples
///
/// ```
/// use argmatch_core::{ArgSlot, ArgTable};
///
/// let table = ArgTable::new(vec![ArgSlot::new("<x>"), ArgSlot::new("<y>")]);
/// assert_eq!(table.slots.len(), 2);
/// assert_eq!(table.first_unfilled().map(|s| s.name.as_str()), Some("<x>"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgTable {
    /// The slots, in declaration order.
    pub slots: Vec<ArgSlot>,
}

impl ArgTable {
    /// Creates a table from slots in declaration order.
    pub fn new(slots: Vec<ArgSlot>) -> Self {
        Self { slots }
    }

    /// Returns the first slot that has captured nothing yet.
    pub fn first_unfilled(&self) -> Option<&ArgSlot> {
        self.slots.iter().find(|slot| !slot.is_filled())
    }

    pub(crate) fn first_unfilled_mut(&mut self) -> Option<&mut ArgSlot> {
        self.slots.iter_mut().find(|slot| !slot.is_filled())
    }

    /// Finds a slot by placeholder name.
    pub fn slot(&self, name: &str) -> Option<&ArgSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }
}

/// The full grammar for one command-line interface.
///
/// Bundles the three tables the matcher mutates in place: options, commands,
/// and positional arguments. `subsets` is an arena of command-scoped
/// argument tables that [`CommandSpec::subset`] indexes into; `arguments` is
/// the table active before any command switches it.
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
/// assert!(grammar.command("create").is_some());
/// assert!(grammar.option("--speed").is_some());
/// assert!(validate_grammar(&grammar).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    /// Option descriptors, shared by every usage form.
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    /// Command descriptors; the command table is fixed for a whole parse.
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
    /// The top-level positional table, active until a command switches it.
    #[serde(default)]
    pub arguments: ArgTable,
    /// Command-scoped argument tables, addressed by [`CommandSpec::subset`].
    #[serde(default)]
    pub subsets: Vec<ArgTable>,
}

impl Grammar {
    /// Creates an empty grammar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument subset and returns its index for
    /// [`CommandSpec::with_subset`].
    pub fn add_subset(&mut self, table: ArgTable) -> usize {
        self.subsets.push(table);
        self.subsets.len() - 1
    }

    /// Finds an option descriptor by short or long form.
    ///
    /// # Examples
    ///
    /// ```
    /// use argmatch_core::{Grammar, OptionSpec};
    ///
    /// let mut grammar = Grammar::new();
    /// grammar.options.push(OptionSpec::flag(Some("-h"), Some("--help")));
    /// assert!(grammar.option("-h").is_some());
    /// assert!(grammar.option("--help").is_some());
    /// assert!(grammar.option("--version").is_none());
    /// ```
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|opt| opt.matches(name))
    }

    /// Finds a command descriptor by name.
    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|cmd| cmd.name == name)
    }

    /// Finds an argument slot by placeholder name.
    ///
    /// Searches the top-level table and then each subset in declaration
    /// order. When the same placeholder appears in more than one table, a
    /// filled slot is preferred over an unfilled one, so projection sees
    /// captured values regardless of which table was active at capture time.
    pub fn argument(&self, name: &str) -> Option<&ArgSlot> {
        let mut first: Option<&ArgSlot> = None;
        for table in std::iter::once(&self.arguments).chain(self.subsets.iter()) {
            if let Some(slot) = table.slot(name) {
                if slot.is_filled() {
                    return Some(slot);
                }
                first.get_or_insert(slot);
            }
        }
        first
    }

    /// Clears all per-parse state, keeping the declared shape.
    ///
    /// Equivalent to rebuilding the grammar from its template; lets one
    /// instance be reused across parses without cross-invocation
    /// contamination.
    pub fn reset(&mut self) {
        for opt in &mut self.options {
            opt.reset();
        }
        for cmd in &mut self.commands {
            cmd.reset();
        }
        for slot in &mut self.arguments.slots {
            slot.reset();
        }
        for table in &mut self.subsets {
            for slot in &mut table.slots {
                slot.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_spec_creation() {
        let flag = OptionSpec::flag(Some("-v"), Some("--verbose"));
        assert_eq!(flag.short, Some("-v".to_string()));
        assert_eq!(flag.long, Some("--verbose".to_string()));
        assert!(!flag.takes_value);
        assert_eq!(flag.canonical_name(), "--verbose");
    }

    #[test]
    fn test_option_matches_short_char() {
        let flag = OptionSpec::flag(Some("-v"), None);
        assert!(flag.matches_short('v'));
        assert!(!flag.matches_short('x'));

        let long_only = OptionSpec::flag(None, Some("--verbose"));
        assert!(!long_only.matches_short('v'));
    }

    #[test]
    fn test_arg_slot_capture_tracks_first_value_and_count() {
        let mut slot = ArgSlot::new("<name>").allow_repeat();
        slot.capture("a");
        slot.capture("b");

        assert_eq!(slot.first_value.as_deref(), Some("a"));
        assert_eq!(slot.captured, vec!["a", "b"]);
        assert_eq!(slot.count, 2);
    }

    #[test]
    fn test_grammar_argument_prefers_filled_slot() {
        let mut grammar = Grammar::new();
        grammar.add_subset(ArgTable::new(vec![ArgSlot::new("<x>")]));
        grammar.add_subset(ArgTable::new(vec![ArgSlot::new("<x>")]));
        grammar.subsets[1].slots[0].capture("10");

        let slot = grammar.argument("<x>").unwrap();
        assert_eq!(slot.first_value.as_deref(), Some("10"));
    }

    #[test]
    fn test_grammar_reset_clears_parse_state() {
        let mut grammar = Grammar::new();
        grammar.options.push(OptionSpec::flag(Some("-a"), None));
        grammar.commands.push(CommandSpec::new("ship"));
        grammar.arguments = ArgTable::new(vec![ArgSlot::new("<x>")]);

        grammar.options[0].value = true;
        grammar.commands[0].matched = true;
        grammar.arguments.slots[0].capture("10");

        grammar.reset();
        assert!(!grammar.options[0].value);
        assert!(!grammar.commands[0].matched);
        assert!(!grammar.arguments.slots[0].is_filled());
        assert_eq!(grammar.arguments.slots[0].count, 0);
    }

    #[test]
    fn test_grammar_json_round_trip() {
        let mut grammar = Grammar::new();
        grammar
            .options
            .push(OptionSpec::with_value(None, Some("--speed")).with_default("10"));
        let subset = grammar.add_subset(ArgTable::new(vec![
            ArgSlot::new("<name>").allow_repeat(),
        ]));
        grammar
            .commands
            .push(CommandSpec::new("create").with_subset(subset));

        let json = serde_json::to_string(&grammar).unwrap();
        let back: Grammar = serde_json::from_str(&json).unwrap();
        assert_eq!(grammar, back);
    }

    #[test]
    fn test_grammar_deserializes_shape_only_json() {
        let json = r#"{
            "options": [{"short": "-h", "long": "--help", "takes_value": false}],
            "commands": [{"name": "ship", "subset": 0}],
            "subsets": [[{"name": "<name>", "repeating": true}]]
        }"#;
        let grammar: Grammar = serde_json::from_str(json).unwrap();

        assert!(!grammar.options[0].value);
        assert!(!grammar.commands[0].matched);
        assert_eq!(grammar.subsets[0].slots[0].count, 0);
        assert!(grammar.arguments.slots.is_empty());
    }
}
