//! Error taxonomy for the pipeline engine.

use std::error::Error as StdError;
use std::fmt;

/// Errors raised while running or configuring a [`Pipeline`](crate::exec::Pipeline).
///
/// Registration-time dependency failures are never raised through this type;
/// they are recorded as hidden-command entries in the registry and only
/// surface here if a script later invokes the name (as [`CommandUnavailable`](PipelineError::CommandUnavailable)).
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// The invoked name has no live registration and no hidden-command record.
    #[error("command missing: `{qualified_name}` (in `{command_text}`)")]
    CommandMissing {
        /// The lowercased, normalized qualified name that was looked up.
        qualified_name: String,
        /// The originating command text, for diagnostics.
        command_text: String,
    },

    /// The invoked name matches a hidden-command record; `reason` is the
    /// recorded explanation (missing dependency or explicit removal).
    #[error("command unavailable: `{qualified_name}`: {reason} (in `{command_text}`)")]
    CommandUnavailable {
        /// The lowercased, normalized qualified name that was looked up.
        qualified_name: String,
        /// The reason recorded when the command was hidden.
        reason: String,
        /// The originating command text, for diagnostics.
        command_text: String,
    },

    /// The interpreter's `nextLabel` does not name any command in the queue.
    #[error("unknown label: `{label}`")]
    UnknownLabel {
        /// The label that could not be resolved.
        label: String,
    },

    /// Retrieval of a variable name not present in the consulted store(s).
    #[error("unknown variable: `{name}`")]
    UnknownVariable {
        /// The normalized variable name.
        name: String,
    },

    /// A `safeSet` was attempted on a variable marked read-only.
    #[error("variable is read-only: `{name}`")]
    ReadOnlyViolation {
        /// The normalized variable name.
        name: String,
    },

    /// A filter raised an error; annotated with the failing command's text
    /// and normalized name, then re-raised.
    #[error("filter `{qualified_name}` failed (in `{command_text}`): {source}")]
    FilterFailure {
        /// The lowercased, normalized qualified name of the failing filter.
        qualified_name: String,
        /// The originating command text, for diagnostics.
        command_text: String,
        /// The error returned by the filter, unwrapped.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// The error type returned by filter callables.
///
/// Filters are ordinary callables; they don't need to know about
/// [`PipelineError`] at all. Whatever they return that implements
/// `std::error::Error` is wrapped into [`PipelineError::FilterFailure`]
/// at the point the execution driver observes it, per spec.
pub type FilterError = Box<dyn StdError + Send + Sync>;

/// Convenience wrapper so filters can return a plain message without
/// defining their own error type.
#[derive(Debug)]
pub struct FilterMessage(pub String);

impl fmt::Display for FilterMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for FilterMessage {}

impl From<&str> for FilterMessage {
    fn from(s: &str) -> Self {
        FilterMessage(s.to_string())
    }
}

impl From<String> for FilterMessage {
    fn from(s: String) -> Self {
        FilterMessage(s)
    }
}
