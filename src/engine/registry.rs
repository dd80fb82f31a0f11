//! Effect registry
//!
//! Maps effect names to constructors. Each constructed effect validates its
//! own argument list in `Effect::configure`.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Effect;

/// Constructor capability for one effect type
pub type EffectConstructor = Arc<dyn Fn() -> Box<dyn Effect> + Send + Sync>;

/// Descriptive metadata for a registered effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectInfo {
    pub name: String,
    /// Argument synopsis, e.g. `[-q|-h|-v] RATE[k]`
    pub usage: String,
    pub description: String,
}

impl EffectInfo {
    pub fn new(name: &str, usage: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            usage: usage.to_string(),
            description: description.to_string(),
        }
    }
}

/// Registry of effects an engine can instantiate
#[derive(Default, Clone)]
pub struct EffectRegistry {
    effects: BTreeMap<String, (EffectInfo, EffectConstructor)>,
}

impl EffectRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect, replacing any previous entry of the same name
    pub fn register<F>(&mut self, info: EffectInfo, constructor: F)
    where
        F: Fn() -> Box<dyn Effect> + Send + Sync + 'static,
    {
        let name = info.name.clone();
        self.effects.insert(name, (info, Arc::new(constructor)));
    }

    /// Instantiate an effect by name
    pub fn create(&self, name: &str) -> Option<Box<dyn Effect>> {
        self.effects.get(name).map(|(_, constructor)| constructor())
    }

    /// Get effect metadata by name
    pub fn info(&self, name: &str) -> Option<&EffectInfo> {
        self.effects.get(name).map(|(info, _)| info)
    }

    /// Check if an effect is registered
    pub fn contains(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.effects.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("effects", &self.names())
            .finish()
    }
}
