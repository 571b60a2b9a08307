//! Platform registry.
//!
//! Provides a `PlatformRegistry` struct for registering and retrieving
//! platform factories. Constructed at startup and passed to `CodegenCore`
//! by value, so builds are testable in isolation.

use ppd_common::config::{ConfigError, ConfigPath};
use ppd_common::platform::{Platform, PlatformFactory};
use std::collections::HashMap;

use crate::platforms::register_all_platforms;

/// Registry of available platforms, keyed by platform name.
pub struct PlatformRegistry {
    factories: HashMap<&'static str, PlatformFactory>,
}

impl PlatformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in platform.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        register_all_platforms(&mut registry);
        registry
    }

    /// Register a platform factory.
    ///
    /// # Panics
    /// Panics if a platform with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: PlatformFactory) {
        if self.factories.contains_key(name) {
            panic!("Platform '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a platform factory by name.
    pub fn get_factory(&self, name: &str) -> Option<PlatformFactory> {
        self.factories.get(name).copied()
    }

    /// Create a platform instance for the block at `path`.
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownPlatform` if no platform with the given
    /// name is registered.
    pub fn create_platform(
        &self,
        name: &str,
        path: &ConfigPath,
    ) -> Result<Box<dyn Platform>, ConfigError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| ConfigError::UnknownPlatform {
                platform: name.to_string(),
                path: path.to_string(),
            })?;
        Ok(factory())
    }

    /// List all registered platform names, sorted.
    pub fn list_platforms(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}
