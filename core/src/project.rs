//! Projection of final table state into a flat named record.
//!
//! After a match, callers that want a struct-like view of the result (the
//! "did this command appear, what value does this option hold" record) can
//! take a flat [`serde_json::Map`] keyed by descriptor name. Mapping those
//! descriptor names onto language-level field names is left to the caller;
//! this module only fixes the value shapes.

use serde_json::{Map, Value};

use crate::types::Grammar;

impl Grammar {
    /// Projects the final table state into a flat name → value record.
    ///
    /// - commands → `bool` (`matched`)
    /// - no-value options → `bool` (`value`)
    /// - value-taking options → captured string, else `default_value`,
    ///   else `null`
    /// - single slots → captured string or `null`
    /// - repeating slots → array of captured strings
    ///
    /// When the same placeholder name appears in several argument tables,
    /// the first filled occurrence wins (see [`Grammar::argument`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use argmatch_core::*;
    ///
    /// let mut grammar = Grammar::new();
    /// grammar.options.push(
    ///     OptionSpec::with_value(None, Some("--speed")).with_default("10"),
    /// );
    /// grammar.commands.push(CommandSpec::new("ship"));
    ///
    /// let record = grammar.project();
    /// assert_eq!(record["ship"], serde_json::json!(false));
    /// assert_eq!(record["--speed"], serde_json::json!("10"));
    /// ```
    pub fn project(&self) -> Map<String, Value> {
        let mut record = Map::new();

        for cmd in &self.commands {
            record.insert(cmd.name.clone(), Value::Bool(cmd.matched));
        }

        for opt in &self.options {
            let key = opt.canonical_name().to_string();
            if opt.takes_value {
                let value = opt
                    .argument
                    .clone()
                    .or_else(|| opt.default_value.clone())
                    .map_or(Value::Null, Value::String);
                record.insert(key, value);
            } else {
                record.insert(key, Value::Bool(opt.value));
            }
        }

        for table in std::iter::once(&self.arguments).chain(self.subsets.iter()) {
            for slot in &table.slots {
                if record.contains_key(&slot.name) {
                    continue;
                }
                // Re-resolve by name so a filled twin in another table wins.
                let resolved = self.argument(&slot.name).unwrap_or(slot);
                let value = if resolved.repeating {
                    Value::Array(
                        resolved
                            .captured
                            .iter()
                            .cloned()
                            .map(Value::String)
                            .collect(),
                    )
                } else {
                    resolved
                        .first_value
                        .clone()
                        .map_or(Value::Null, Value::String)
                };
                record.insert(slot.name.clone(), value);
            }
        }

        record
    }
}
