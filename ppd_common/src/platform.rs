//! Platform trait and build context.
//!
//! This module defines:
//! - `Platform` trait - Interface for pluggable component platforms
//! - `PlatformConfig` trait - A validated block, ready to emit code
//! - `PlatformFactory` type alias - Factory function type
//! - `BuildContext` struct - Everything a platform may read or extend during a build
//!
//! # Lifecycle
//!
//! 1. `Platform::validate()` - Called once per block, in document order.
//!    Declares identifiers, checks references. Nothing is emitted.
//! 2. `PlatformConfig::to_code()` - Called once per validated block, only
//!    after every block has validated. Emits statements.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;

use crate::codegen::{CodeGen, Expression};
use crate::component::{Component, ComponentRegistry};
use crate::config::{ConfigError, ConfigPath};
use crate::id::{ComponentId, IdRegistry};
use crate::uart::UartBus;

/// Factory function type for creating platform instances.
pub type PlatformFactory = fn() -> Box<dyn Platform>;

/// A named implementation of a component domain (`sensor.ppd42x`).
pub trait Platform: Send + Sync {
    /// Platform name as written in the `platform` key.
    fn name(&self) -> &'static str;

    /// Component domain the platform belongs to.
    fn domain(&self) -> &'static str {
        "sensor"
    }

    /// Component domains that must be configured for this platform to build.
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// Validate one block and declare its identifiers.
    ///
    /// # Errors
    /// Returns the first schema violation found in the block.
    fn validate(
        &self,
        block: &toml::Table,
        path: &ConfigPath,
        ctx: &mut BuildContext,
    ) -> Result<Box<dyn PlatformConfig>, ConfigError>;
}

/// A block that passed validation.
pub trait PlatformConfig: Send + Sync + fmt::Debug {
    /// Emit the code for this block and return the driver model.
    ///
    /// # Errors
    /// Returns an error only for inconsistencies that validation could not
    /// see; the build is aborted.
    fn to_code(&self, ctx: &mut BuildContext) -> Result<Box<dyn Component>, ConfigError>;
}

/// Deserialize a raw block into its typed schema.
///
/// Type mismatches surface as `ConfigError::Invalid` at the offending key
/// below `path` (`sensor[0].pm_2_5.accuracy_decimals`). Unknown and missing
/// keys are reported at `path` with the key named in the message.
pub fn deserialize_block<T: DeserializeOwned>(
    block: &toml::Table,
    path: &ConfigPath,
) -> Result<T, ConfigError> {
    serde_path_to_error::deserialize(toml::Value::Table(block.clone())).map_err(
        |e: serde_path_to_error::Error<toml::de::Error>| {
            let at = e.path().iter().fold(path.clone(), |at, segment| match segment {
                Segment::Map { key } => at.key(key),
                Segment::Seq { index } => at.index(*index),
                _ => at,
            });
            ConfigError::invalid(&at, e.into_inner().to_string().trim().to_string())
        },
    )
}

/// State shared by all platforms during one build.
#[derive(Debug, Default)]
pub struct BuildContext {
    /// Every identifier in the build.
    pub ids: IdRegistry,
    /// Code emission buffer.
    pub cg: CodeGen,
    /// Lifecycle registrations.
    pub components: ComponentRegistry,
    uart_buses: Vec<UartBus>,
    domains: BTreeSet<String>,
}

impl BuildContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a component domain as configured.
    pub fn add_domain(&mut self, domain: &str) {
        self.domains.insert(domain.to_string());
    }

    /// True if `domain` is configured.
    pub fn has_domain(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Add a validated serial bus. Marks the `uart` domain.
    pub fn add_uart_bus(&mut self, bus: UartBus) {
        self.add_domain("uart");
        self.uart_buses.push(bus);
    }

    /// All serial buses, in document order.
    pub fn uart_buses(&self) -> &[UartBus] {
        &self.uart_buses
    }

    /// Serial bus by id.
    pub fn uart_bus(&self, id: &ComponentId) -> Option<&UartBus> {
        self.uart_buses.iter().find(|bus| &bus.id == id)
    }

    /// Register `var` with the application lifecycle.
    pub fn register_component(
        &mut self,
        var: &Expression,
        id: &ComponentId,
        class: &str,
        default_priority: f64,
        priority_override: Option<f64>,
    ) {
        self.components.register_component(
            &mut self.cg,
            var,
            id,
            class,
            default_priority,
            priority_override,
        );
    }
}
