//! Process-global engine state shared by every pipeline instance.

use crate::exec::{Pipeline, PipelineCompleteEvent};
use crate::hooks::HookRegistry;
use crate::registry::FilterRegistry;
use crate::vars::VariableStore;
use once_cell::sync::Lazy;

/// Everything shared across pipelines: the filter registry (with its
/// embedded factory table, hidden-command map, and category/doc indexes),
/// the global variable store, and the two process-global pipeline-
/// lifecycle hooks. The other three process-global hooks — command-
/// loading, filter-doc-loading, category-doc-loading — live on
/// [`FilterRegistry`] itself, since they're specifically about registry
/// lifecycle rather than pipeline lifecycle.
#[derive(Default)]
pub struct Engine {
    pub registry: FilterRegistry,
    pub globals: VariableStore,
    pub pipeline_created: HookRegistry<Pipeline>,
    pub pipeline_complete: HookRegistry<PipelineCompleteEvent>,
}

static ENGINE: Lazy<Engine> = Lazy::new(Engine::default);

/// Access the process-global engine state.
pub fn engine() -> &'static Engine {
    &ENGINE
}
