//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that platforms can do `use ppd_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use ppd_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    BuildConfig, ConfigError, ConfigLoader, ConfigPath, FirmwareConfig, LogLevel,
};

// ─── Identifiers ────────────────────────────────────────────────────
pub use crate::id::{ComponentId, IdKind, IdRegistry, IdSpec};

// ─── Code Emission ──────────────────────────────────────────────────
pub use crate::codegen::{CodeGen, Expression, Statement};

// ─── Components & Platforms ─────────────────────────────────────────
pub use crate::component::{Component, ComponentRegistry, RegisteredComponent, setup_priority};
pub use crate::platform::{BuildContext, Platform, PlatformConfig, PlatformFactory};

// ─── Sensors & Buses ────────────────────────────────────────────────
pub use crate::sensor::{SensorConfig, SensorHandle, SensorOptions, SensorSchema, StateClass};
pub use crate::uart::{UartBus, UartConfig};
