//! Pre-parsed configuration input consumed when a pipeline is constructed.
//!
//! Parsing a config file or environment is out of scope here (an external
//! concern per spec §1's Non-goals); this module only describes the shape
//! a host hands in after doing that parsing itself.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One global variable to seed before a pipeline's first execution.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlobalSeed {
    pub name: String,
    pub value: String,
    pub read_only: bool,
}

impl GlobalSeed {
    pub fn new(name: impl Into<String>, value: impl Into<String>, read_only: bool) -> Self {
        Self { name: name.into(), value: value.into(), read_only }
    }
}

/// A set of global key/value pairs to apply before a pipeline runs.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    pub seeds: Vec<GlobalSeed>,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: GlobalSeed) -> Self {
        self.seeds.push(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_seeds_in_order() {
        let config = PipelineConfig::new()
            .with_seed(GlobalSeed::new("name", "Bond", false))
            .with_seed(GlobalSeed::new("pin", "1234", true));
        assert_eq!(config.seeds.len(), 2);
        assert_eq!(config.seeds[0].name, "name");
        assert!(config.seeds[1].read_only);
    }
}
