//! Minimal, intentionally partial line parser used only by this crate's
//! own tests. It is NOT a reference grammar implementation — turning
//! script text into [`PipelineCommand`]s is an external, out-of-scope
//! collaborator. This exists so tests can build a `Vec<PipelineCommand>`
//! from a short textual fixture instead of hand-assembling builders for
//! every case.
//!
//! Supported line shape (no quoting, no escaping):
//!
//! ```text
//! category.name arg1 arg2 key=value => outVar <= inVar +> #label
//! ```
//!
//! A token starting with `=>` sets the output variable, `<=` sets the
//! input variable, `+>` sets append-to-output (and may carry an output
//! variable name immediately after it), and `#label` sets the label.
//! Anything else containing `=` is a named argument; everything else is
//! positional, in order of appearance.

use crate::types::PipelineCommand;

/// Parse a newline-separated fixture into commands. Blank lines and lines
/// starting with `#` (full-line comments) are skipped.
#[doc(hidden)]
pub fn parse_lines(script: &str) -> Vec<PipelineCommand> {
    script.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#')).map(parse_line).collect()
}

fn parse_line(line: &str) -> PipelineCommand {
    let mut tokens = line.split_whitespace();
    let qualified_name = tokens.next().unwrap_or_default().to_string();
    let mut command = PipelineCommand::new(qualified_name).with_original_text(line.to_string());
    let mut positional_index = 0u32;

    for token in tokens {
        if let Some(rest) = token.strip_prefix("=>") {
            command = command.with_output_variable(rest);
        } else if let Some(rest) = token.strip_prefix("<=") {
            command = command.with_input_variable(rest);
        } else if let Some(rest) = token.strip_prefix("+>") {
            command = command.with_append(true);
            if !rest.is_empty() {
                command = command.with_output_variable(rest);
            }
        } else if let Some(rest) = token.strip_prefix('#') {
            command = command.with_label(rest);
        } else if let Some((key, value)) = token.split_once('=') {
            command = command.with_named(key, value);
        } else {
            command = command.with_positional(positional_index, token);
            positional_index += 1;
        }
    }

    command
}
