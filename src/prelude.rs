//! Convenient re-exports for common pipewright types.
pub use crate::{
    config::{GlobalSeed, PipelineConfig},
    error::{FilterError, FilterMessage, PipelineError},
    exec::{FilterExecutedEvent, FilterExecutingEvent, Pipeline, PipelineCompleteEvent},
    factory::{FactoryFn, FactoryTable},
    globals::engine,
    hooks::HookRegistry,
    log::{ExecutionLog, LogEntry},
    reflect::{FilterBundle, FilterDescriptor, FilterEntry},
    registry::{CategoryDocLoadingEvent, CommandLoadingEvent, Filter, FilterDocLoadingEvent, FilterRegistry},
    types::{ArgKey, PipelineCommand, END_LABEL, GLOBAL_VAR},
    vars::{VariableRetrievedEvent, VariableRetrievingEvent, VariableStore},
};
