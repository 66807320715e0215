//! # Configuration
//!
//! A minimal, framework-agnostic configuration system based on a simple
//! string key/value store, mirroring Feathers' `app.set()` / `app.get()`
//! API. [`crate::pipeline_config::PipelineConfig::from_env`] layers the
//! environment variables from SPEC_FULL.md §6/§10.3 on top of this store;
//! this module itself stays format- and environment-agnostic so other
//! loaders (files, Consul, Vault, …) stay possible without touching it.
//!
//! ## Setting and reading values
//! ```rust
//! use lecture_core::config::DogConfig;
//! let mut cfg = DogConfig::new();
//!
//! cfg.set("paginate.default", "10");
//! cfg.set("paginate.max", "50");
//!
//! assert_eq!(cfg.get("paginate.default"), Some("10"));
//! ```
//!
//! A read-only [`DogConfigSnapshot`] is handed to components at construction
//! so configuration access never blocks on a lock during request handling.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct DogConfig {
    values: HashMap<String, String>,
}

impl DogConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    ///
    /// Example: app.set("paginate.default", "10")
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    ///
    /// Returns None if the key is not present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
    pub fn snapshot(&self) -> DogConfigSnapshot {
        DogConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DogConfigSnapshot {
    map: HashMap<String, String>,
}

impl DogConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }
}
