//! Structured registration façade.
//!
//! Rust has no runtime reflection, so the annotation-driven discovery this
//! component is named for becomes explicit data: a [`FilterDescriptor`]
//! carries what an annotation would have carried (name, description,
//! dependencies), and a [`FilterBundle`] groups several descriptors under
//! a shared default category, the way a type's annotation would.

use crate::registry::{Filter, FilterRegistry};

/// One filter's registration metadata.
#[derive(Clone)]
pub struct FilterDescriptor {
    pub name: String,
    pub description: Option<String>,
    /// Qualified names that must already be registered for this filter to
    /// load; unsatisfied dependencies hide the filter instead of failing
    /// registration outright.
    pub dependencies: Vec<String>,
}

impl FilterDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: None, dependencies: Vec::new() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }
}

/// One entry inside a [`FilterBundle`]: metadata plus the callable, and an
/// optional per-entry category override (a single filter in a bundle can
/// be annotated for a different category than the bundle's default).
pub struct FilterEntry {
    pub descriptor: FilterDescriptor,
    pub category: Option<String>,
    pub filter: Filter,
}

impl FilterEntry {
    pub fn new(descriptor: FilterDescriptor, filter: Filter) -> Self {
        Self { descriptor, category: None, filter }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A bundle of related filters sharing a default category — the Rust-
/// native stand-in for an annotated type.
pub struct FilterBundle {
    pub default_category: String,
    pub entries: Vec<FilterEntry>,
}

impl FilterBundle {
    pub fn new(default_category: impl Into<String>) -> Self {
        Self { default_category: default_category.into(), entries: Vec::new() }
    }

    pub fn with_entry(mut self, entry: FilterEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

impl FilterRegistry {
    /// Register every entry in `bundle`. `category_override`, when given,
    /// takes precedence over both a per-entry category and the bundle's
    /// default category.
    pub fn register_type(&self, bundle: FilterBundle, category_override: Option<&str>) {
        for entry in bundle.entries {
            let category = category_override
                .map(str::to_string)
                .or(entry.category)
                .unwrap_or_else(|| bundle.default_category.clone());
            self.add_filter(
                entry.filter,
                &category,
                &entry.descriptor.name,
                entry.descriptor.description,
                &entry.descriptor.dependencies,
            );
        }
    }

    /// Register a single callable under an explicit category and
    /// descriptor — the "one method" path, as opposed to a whole bundle.
    pub fn register_method(&self, category: &str, descriptor: FilterDescriptor, filter: Filter) {
        self.add_filter(filter, category, &descriptor.name, descriptor.description, &descriptor.dependencies);
    }
}
