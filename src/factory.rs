//! Command-factory expansion: rewrites commands matching a registered
//! wildcard pattern into their replacement sequence, before execution
//! begins.

use crate::types::PipelineCommand;
use regex::Regex;
use std::sync::{Arc, RwLock};

/// A factory function: given the matched command, produce the sequence of
/// commands that should replace it.
pub type FactoryFn = Arc<dyn Fn(&PipelineCommand) -> Vec<PipelineCommand> + Send + Sync>;

struct CompiledFactory {
    pattern: Regex,
    function: FactoryFn,
}

/// Ordered table of wildcard-pattern command factories.
#[derive(Default)]
pub struct FactoryTable {
    entries: RwLock<Vec<CompiledFactory>>,
}

impl FactoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a wildcard pattern (`*` matches any run of
    /// characters, `?` matches exactly one). Matching is case-insensitive
    /// over the lowercased qualified name; later registrations are tried
    /// only if earlier ones in registration order don't match.
    pub fn register(&self, pattern: &str, function: FactoryFn) {
        let compiled = compile_wildcard(pattern);
        self.entries
            .write()
            .expect("factory table lock poisoned")
            .push(CompiledFactory { pattern: compiled, function });
    }

    fn first_match(&self, qualified_name_lower: &str) -> Option<FactoryFn> {
        let entries = self.entries.read().expect("factory table lock poisoned");
        entries.iter().find(|e| e.pattern.is_match(qualified_name_lower)).map(|e| e.function.clone())
    }

    /// Expand `commands` to a fixed point: the cursor does not advance past
    /// a freshly emitted command, so emitted commands are themselves
    /// checked against the table before anything moves on. A position only
    /// advances once it no longer matches any factory, so by the time this
    /// returns, no command in the result matches any registered pattern —
    /// which is exactly what "a full pass finds no matches" means, just
    /// computed in one walk instead of repeated passes.
    pub fn expand(&self, mut commands: Vec<PipelineCommand>) -> Vec<PipelineCommand> {
        let mut i = 0;
        while i < commands.len() {
            let lower = commands[i].qualified_name.to_lowercase();
            let matched_function = self.first_match(&lower);
            let Some(function) = matched_function else {
                i += 1;
                continue;
            };
            let matched = commands.remove(i);
            let mut replacements = (function)(&matched);
            for cmd in &mut replacements {
                cmd.command_factory_source = Some(matched.original_text.clone());
            }
            let emitted = replacements.len();
            for (offset, cmd) in replacements.into_iter().enumerate() {
                commands.insert(i + offset, cmd);
            }
            if emitted == 0 {
                // The matched command vanished with nothing to replace it;
                // stay at `i` so whatever shifted into this slot is checked.
                continue;
            }
            // Re-check position `i` — the first emitted command — before
            // advancing past it.
        }
        commands
    }
}

fn compile_wildcard(pattern: &str) -> Regex {
    let mut out = String::from("(?i)^");
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    Regex::new(&out).expect("compiled wildcard pattern is always a valid regex")
}
