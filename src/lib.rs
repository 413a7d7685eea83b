#![forbid(unsafe_code)]

//! # pipewright
//!
//! An embeddable pipeline interpreter: a process-global registry of named
//! filters, driven by a labeled, non-linear command script.
//!
//! ## Quick start
//!
//! ```rust
//! use pipewright::{
//!     engine, reflect::FilterDescriptor, Pipeline, PipelineCommand,
//! };
//! use std::sync::Arc;
//!
//! engine().registry.register_method(
//!     "Text",
//!     FilterDescriptor::new("Upper").with_description("uppercases its input"),
//!     Arc::new(|input: &str, _command, _log| Ok(input.to_uppercase())),
//! );
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.add_command(PipelineCommand::new("Text.Upper"));
//! let output = pipeline.execute(Some("hello".to_string())).expect("pipeline runs");
//! assert_eq!(output, "HELLO");
//! ```
//!
//! ## Layout
//!
//! - [`types`] — [`PipelineCommand`], the parsed unit of work.
//! - [`vars`] — [`VariableStore`], the local/global variable slots.
//! - [`registry`] — [`FilterRegistry`], the process-global filter catalog.
//! - [`reflect`] — structured registration ([`FilterBundle`], [`FilterDescriptor`]).
//! - [`factory`] — [`FactoryTable`], wildcard command-factory expansion.
//! - [`hooks`] — [`HookRegistry`], the generic subscriber-list dispatcher.
//! - [`exec`] — [`Pipeline`], the execution driver.
//! - [`config`] — pre-parsed configuration input ([`PipelineConfig`]).
//! - [`log`] — [`ExecutionLog`], the per-run dispatch history.
//! - [`error`] — [`PipelineError`], the engine's error taxonomy.
//! - [`clock`] — the monotonic clock used to time dispatch.
//! - [`globals`] — process-global [`Engine`] state, shared by every pipeline.

pub mod clock;
pub mod config;
pub mod error;
pub mod exec;
pub mod factory;
pub mod globals;
pub mod hooks;
pub mod log;
#[doc(hidden)]
pub mod parse_stub;
pub mod reflect;
pub mod registry;
pub mod types;
pub mod vars;

pub use clock::{Clock, MonotonicClock};
pub use config::{GlobalSeed, PipelineConfig};
pub use error::{FilterError, FilterMessage, PipelineError};
pub use exec::{FilterExecutedEvent, FilterExecutingEvent, Pipeline, PipelineCompleteEvent};
pub use factory::{FactoryFn, FactoryTable};
pub use globals::{engine, Engine};
pub use hooks::HookRegistry;
pub use log::{ExecutionLog, LogEntry};
pub use reflect::{FilterBundle, FilterDescriptor, FilterEntry};
pub use registry::{CategoryDocLoadingEvent, CommandLoadingEvent, Filter, FilterDocLoadingEvent, FilterRegistry};
pub use types::{ArgKey, PipelineCommand, END_LABEL, GLOBAL_VAR};
pub use vars::{VariableRetrievedEvent, VariableRetrievingEvent, VariableStore};

pub mod prelude;
