//! The process-global filter catalog: qualified-name -> callable, plus the
//! hidden-command and documentation shadows around it.

use crate::factory::{FactoryFn, FactoryTable};
use crate::hooks::HookRegistry;
use crate::log::LogEntry;
use crate::types::PipelineCommand;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// A registered filter callable: `(input, command, log) -> output`.
///
/// `command` is handed to the filter by mutable reference so a filter can
/// redirect control flow by rewriting `command.send_to_label` before
/// returning — the execution driver reads it back after the call.
pub type Filter =
    Arc<dyn Fn(&str, &mut PipelineCommand, &mut LogEntry) -> Result<String, crate::error::FilterError> + Send + Sync>;

/// Normalize a `category`, `name` pair into the canonical registry key:
/// each segment lowercased and stripped of non-alphanumeric characters,
/// joined with `.`.
pub fn normalize_qualified_name(category: &str, name: &str) -> String {
    format!("{}.{}", normalize_segment(category), normalize_segment(name))
}

/// Normalize a full `category.name` (or bare) string the same way
/// [`normalize_qualified_name`] normalizes its two halves, splitting on the
/// first `.`. This is the form used for registry lookups at dispatch time,
/// so a command's qualified name resolves to the same key its filter was
/// registered under.
pub fn normalize_dispatch_name(qualified_name: &str) -> String {
    match qualified_name.split_once('.') {
        Some((category, name)) => normalize_qualified_name(category, name),
        None => normalize_segment(qualified_name),
    }
}

fn normalize_segment(segment: &str) -> String {
    segment.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_lowercase()
}

/// The built-in pseudo-commands spec §6 reserves: the execution driver
/// intercepts these before ever consulting the registry, so a registration
/// under one of these names would be dead weight at best and misleading at
/// worst. `add_filter` refuses them outright, the same way a missing
/// dependency refuses registration.
const RESERVED_NAMES: &[&str] = &["core.label", "core.readfrom", "core.writeto", "core.include"];

/// Fired when a filter is about to be added to the registry. Setting
/// `cancel` suppresses the registration entirely — nothing is recorded,
/// not even as hidden.
#[derive(Debug, Clone)]
pub struct CommandLoadingEvent {
    pub qualified_name: String,
    pub category: String,
    pub description: Option<String>,
    pub cancel: bool,
}

/// Fired after a filter registers successfully, before its description is
/// written to the documentation index.
#[derive(Debug, Clone)]
pub struct FilterDocLoadingEvent {
    pub qualified_name: String,
    pub description: Option<String>,
    pub cancel: bool,
}

/// Fired the first time a category is seen, before it's written to the
/// category index.
#[derive(Debug, Clone)]
pub struct CategoryDocLoadingEvent {
    pub category: String,
    pub cancel: bool,
}

/// The process-global filter catalog, plus the factory table, hidden-
/// command shadow, and documentation indexes that live alongside it.
pub struct FilterRegistry {
    filters: RwLock<HashMap<String, Filter>>,
    hidden: RwLock<HashMap<String, String>>,
    categories: RwLock<HashSet<String>>,
    filter_docs: RwLock<HashMap<String, Option<String>>>,
    pub(crate) factories: FactoryTable,
    pub command_loading: HookRegistry<CommandLoadingEvent>,
    pub filter_doc_loading: HookRegistry<FilterDocLoadingEvent>,
    pub category_doc_loading: HookRegistry<CategoryDocLoadingEvent>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self {
            filters: RwLock::new(HashMap::new()),
            hidden: RwLock::new(HashMap::new()),
            categories: RwLock::new(HashSet::new()),
            filter_docs: RwLock::new(HashMap::new()),
            factories: FactoryTable::new(),
            command_loading: HookRegistry::new(),
            filter_doc_loading: HookRegistry::new(),
            category_doc_loading: HookRegistry::new(),
        }
    }
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter under `category.name`, evaluating `dependencies`
    /// first. A dependency is satisfied when it names an already-live
    /// (registered, not hidden) qualified name; if any dependency is
    /// unsatisfied, the filter is recorded as hidden instead of being
    /// registered, and the command-loading hook never fires.
    pub fn add_filter(
        &self,
        filter: Filter,
        category: &str,
        name: &str,
        description: Option<String>,
        dependencies: &[String],
    ) {
        let qualified = normalize_qualified_name(category, name);

        if RESERVED_NAMES.contains(&qualified.as_str()) {
            tracing::warn!(qualified_name = %qualified, "filter hidden: name is reserved for a built-in pseudo-command");
            self.hidden
                .write()
                .expect("registry lock poisoned")
                .insert(qualified, "reserved for a built-in pseudo-command".to_string());
            return;
        }

        for dep in dependencies {
            let dep_key = normalize_dispatch_name(dep);
            if !self.contains(&dep_key) {
                tracing::warn!(qualified_name = %qualified, dependency = %dep_key, "filter hidden: missing dependency");
                self.hidden
                    .write()
                    .expect("registry lock poisoned")
                    .insert(qualified.clone(), format!("missing dependency: `{dep}`"));
                return;
            }
        }

        let mut loading = CommandLoadingEvent {
            qualified_name: qualified.clone(),
            category: normalize_segment(category),
            description,
            cancel: false,
        };
        self.command_loading.fire(&mut loading);
        if loading.cancel {
            tracing::debug!(qualified_name = %qualified, "filter registration cancelled by command-loading hook");
            return;
        }

        self.filters.write().expect("registry lock poisoned").insert(qualified.clone(), filter);
        self.hidden.write().expect("registry lock poisoned").remove(&qualified);
        tracing::debug!(qualified_name = %qualified, "filter registered");

        let cat_key = normalize_segment(category);
        let is_new_category = !self.categories.read().expect("registry lock poisoned").contains(&cat_key);
        if is_new_category {
            let mut cat_event = CategoryDocLoadingEvent { category: cat_key.clone(), cancel: false };
            self.category_doc_loading.fire(&mut cat_event);
            if !cat_event.cancel {
                self.categories.write().expect("registry lock poisoned").insert(cat_key);
            }
        }

        let mut doc_event =
            FilterDocLoadingEvent { qualified_name: qualified.clone(), description: loading.description, cancel: false };
        self.filter_doc_loading.fire(&mut doc_event);
        if !doc_event.cancel {
            self.filter_docs.write().expect("registry lock poisoned").insert(qualified, doc_event.description);
        }
    }

    /// Remove a single filter by qualified name, recording it as hidden
    /// with `reason` (defaulting to `"removed"`).
    pub fn remove(&self, qualified_name: &str, reason: Option<&str>) {
        let qualified = normalize_dispatch_name(qualified_name);
        self.filters.write().expect("registry lock poisoned").remove(&qualified);
        let reason = reason.unwrap_or("removed").to_string();
        tracing::info!(qualified_name = %qualified, %reason, "filter removed");
        self.hidden.write().expect("registry lock poisoned").insert(qualified, reason);
    }

    /// Remove every filter registered under `category`, recording each as
    /// hidden with `reason`.
    pub fn remove_category(&self, category: &str, reason: Option<&str>) {
        let prefix = format!("{}.", normalize_segment(category));
        let reason = reason.unwrap_or("removed").to_string();
        let mut filters = self.filters.write().expect("registry lock poisoned");
        let matching: Vec<String> = filters.keys().filter(|k| k.starts_with(&prefix)).cloned().collect();
        let mut hidden = self.hidden.write().expect("registry lock poisoned");
        for key in matching {
            filters.remove(&key);
            hidden.insert(key, reason.clone());
        }
    }

    /// Register a command factory under a wildcard pattern. See
    /// [`FactoryTable::register`] for matching semantics.
    pub fn register_factory(&self, pattern: &str, function: FactoryFn) {
        self.factories.register(pattern, function);
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.filters.read().expect("registry lock poisoned").contains_key(qualified_name)
    }

    pub fn get(&self, qualified_name: &str) -> Option<Filter> {
        self.filters.read().expect("registry lock poisoned").get(qualified_name).cloned()
    }

    pub fn hidden_reason(&self, qualified_name: &str) -> Option<String> {
        self.hidden.read().expect("registry lock poisoned").get(qualified_name).cloned()
    }

    pub fn filter_docs(&self) -> HashMap<String, Option<String>> {
        self.filter_docs.read().expect("registry lock poisoned").clone()
    }

    pub fn categories(&self) -> HashSet<String> {
        self.categories.read().expect("registry lock poisoned").clone()
    }
}
