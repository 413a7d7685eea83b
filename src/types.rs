//! The parsed unit of work the execution driver operates on.
//!
//! `PipelineCommand` is plain data: an external parser (out of scope here,
//! see spec §1) is the only thing expected to construct it from script
//! text. Everything downstream — the registry, the factory expander, the
//! execution driver — only ever reads and, in the filter-dispatch case,
//! rewrites these fields.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name of the implicit current-text variable slot.
pub const GLOBAL_VAR: &str = "__global";
/// Label reserved for the synthetic terminal sink appended before execution.
pub const END_LABEL: &str = "end";

/// An argument key: either a positional index or a named key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArgKey {
    /// A zero-indexed positional argument.
    Positional(u32),
    /// A named argument.
    Named(String),
}

/// One invocation of a named filter with arguments, routing, and labeling.
///
/// Argument values prefixed with `$` denote variable references, resolved
/// against the variable store at dispatch time rather than at parse time
/// (see the execution driver).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineCommand {
    /// `category.name`, case-insensitive. The canonical registry lookup key
    /// is this string's normalized form; this field itself keeps whatever
    /// casing the source script used, for display and logging.
    pub qualified_name: String,
    /// Positional and named arguments, raw (unresolved) string values.
    pub args: HashMap<ArgKey, String>,
    /// Variable slot the filter reads its input string from.
    pub input_variable: String,
    /// Variable slot the filter's output is written to.
    pub output_variable: String,
    /// When true, the filter's output is appended to the output slot's
    /// current contents instead of replacing them.
    pub append_to_output: bool,
    /// This command's label in the execution queue. Unique within one
    /// pipeline; defaults to a synthetic, process-unique label.
    pub label: String,
    /// Label of the command to run next; `None` terminates the pipeline.
    pub send_to_label: Option<String>,
    /// Original script text, kept for diagnostics and log entries.
    pub original_text: String,
    /// When this command was emitted by a command factory, the text of the
    /// command that triggered the expansion.
    pub command_factory_source: Option<String>,
}

fn next_synthetic_label() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("__label_{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

impl PipelineCommand {
    /// Construct a command with spec-mandated defaults: input and output
    /// variables both `__global`, no append, a synthetic unique label, and
    /// no routing (terminates the pipeline unless later linked).
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        Self {
            original_text: qualified_name.clone(),
            qualified_name,
            args: HashMap::new(),
            input_variable: GLOBAL_VAR.to_string(),
            output_variable: GLOBAL_VAR.to_string(),
            append_to_output: false,
            label: next_synthetic_label(),
            send_to_label: None,
            command_factory_source: None,
        }
    }

    /// Set a positional argument.
    pub fn with_positional(mut self, index: u32, value: impl Into<String>) -> Self {
        self.args.insert(ArgKey::Positional(index), value.into());
        self
    }

    /// Set a named argument.
    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(ArgKey::Named(key.into()), value.into());
        self
    }

    /// Override this command's label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the label to run next.
    pub fn with_send_to(mut self, label: impl Into<String>) -> Self {
        self.send_to_label = Some(label.into());
        self
    }

    /// Override the input variable slot.
    pub fn with_input_variable(mut self, name: impl Into<String>) -> Self {
        self.input_variable = name.into();
        self
    }

    /// Override the output variable slot.
    pub fn with_output_variable(mut self, name: impl Into<String>) -> Self {
        self.output_variable = name.into();
        self
    }

    /// Set the append-to-output flag.
    pub fn with_append(mut self, append: bool) -> Self {
        self.append_to_output = append;
        self
    }

    /// Original text, overridden (tests/fixtures building commands by hand
    /// otherwise get the qualified name as a placeholder original text).
    pub fn with_original_text(mut self, text: impl Into<String>) -> Self {
        self.original_text = text.into();
        self
    }

    /// Fetch a positional argument by index.
    pub fn positional(&self, index: u32) -> Option<&str> {
        self.args.get(&ArgKey::Positional(index)).map(String::as_str)
    }

    /// Fetch a named argument by key.
    pub fn named(&self, key: &str) -> Option<&str> {
        self.args.get(&ArgKey::Named(key.to_string())).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_command_defaults_to_global_var_and_no_routing() {
        let cmd = PipelineCommand::new("Text.Append");
        assert_eq!(cmd.input_variable, GLOBAL_VAR);
        assert_eq!(cmd.output_variable, GLOBAL_VAR);
        assert!(!cmd.append_to_output);
        assert!(cmd.send_to_label.is_none());
        assert!(cmd.command_factory_source.is_none());
    }

    #[test]
    fn synthetic_labels_are_unique() {
        let a = PipelineCommand::new("a.b");
        let b = PipelineCommand::new("a.b");
        assert_ne!(a.label, b.label);
    }

    #[test]
    fn positional_and_named_args_round_trip() {
        let cmd = PipelineCommand::new("a.b").with_positional(0, "x").with_named("flag", "y");
        assert_eq!(cmd.positional(0), Some("x"));
        assert_eq!(cmd.named("flag"), Some("y"));
        assert_eq!(cmd.positional(1), None);
    }
}
