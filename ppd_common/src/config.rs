//! Configuration loading traits and types.
//!
//! This module provides the firmware document model and a standardized way
//! to load it from TOML.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ppd_common::config::{ConfigError, ConfigLoader, FirmwareConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = FirmwareConfig::load(Path::new("firmware.toml"))?;
//!     config.validate()?;
//!     println!("Node: {}", config.build.name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::consts::MAX_NODE_NAME_LEN;
use crate::uart::UartConfig;

/// Error type for configuration loading and validation.
///
/// Every variant aborts the build; nothing is emitted once one is raised.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A key holds a value that does not satisfy its schema.
    #[error("{path}: {message}")]
    Invalid {
        /// Location of the offending key.
        path: String,
        /// What is wrong with it.
        message: String,
    },

    /// The same identifier is declared twice.
    #[error("{path}: ID '{id}' redefined (first declared at {first})")]
    DuplicateId {
        /// The identifier.
        id: String,
        /// Location of the first declaration.
        first: String,
        /// Location of the second declaration.
        path: String,
    },

    /// A reference names an identifier that does not exist or has the wrong kind.
    #[error("{path}: couldn't find ID '{id}' ({reason})")]
    UnknownId {
        /// The referenced identifier.
        id: String,
        /// Location of the reference.
        path: String,
        /// Why the lookup failed.
        reason: String,
    },

    /// No platform with this name is registered.
    #[error("{path}: platform '{platform}' not found")]
    UnknownPlatform {
        /// Requested platform name.
        platform: String,
        /// Location of the block.
        path: String,
    },

    /// A platform needs a component that is not configured.
    #[error("Component {component} requires component {dependency}")]
    MissingDependency {
        /// Component that declared the dependency.
        component: String,
        /// Missing component domain.
        dependency: String,
    },
}

impl ConfigError {
    /// Build an [`ConfigError::Invalid`] for `path`.
    pub fn invalid(path: &ConfigPath, message: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

// ─── Config Path ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside the configuration tree.
///
/// Renders as `sensor[0].pm_2_5.icon`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPath {
    segments: Vec<PathSegment>,
}

impl ConfigPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of `key` below this one.
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self { segments }
    }

    /// Path of list element `index` below this one.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

// ─── Log Level ──────────────────────────────────────────────────────

/// Log level for the generator's own output.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about generator operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic configurations.
    Warn,
    /// Error messages only.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

// ─── Document ───────────────────────────────────────────────────────

/// `[build]` section: node-wide settings.
///
/// # TOML Example
///
/// ```toml
/// [build]
/// name = "living-room"
/// log_level = "debug"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Firmware node name.
    pub name: String,

    /// Generator logging verbosity.
    #[serde(default)]
    pub log_level: LogLevel,
}

impl BuildConfig {
    /// Validate the node name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the name is empty, too long, or
    /// contains anything other than lowercase letters, digits and `-`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = ConfigPath::root().key("build").key("name");
        if self.name.is_empty() {
            return Err(ConfigError::invalid(&path, "name cannot be empty"));
        }
        if self.name.len() > MAX_NODE_NAME_LEN {
            return Err(ConfigError::invalid(
                &path,
                format!(
                    "name '{}' is too long ({} > {} characters)",
                    self.name,
                    self.name.len(),
                    MAX_NODE_NAME_LEN
                ),
            ));
        }
        if let Some(c) = self
            .name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(ConfigError::invalid(
                &path,
                format!("name '{}' contains invalid character '{c}'", self.name),
            ));
        }
        Ok(())
    }
}

/// Whole firmware configuration document.
///
/// Component domain blocks (`[[sensor]]`) are kept as raw tables: their
/// schema depends on the `platform` key and is applied by the platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FirmwareConfig {
    /// Node-wide settings.
    pub build: BuildConfig,

    /// Serial buses.
    #[serde(default)]
    pub uart: Vec<UartConfig>,

    /// Sensor platform blocks.
    #[serde(default)]
    pub sensor: Vec<toml::Table>,
}

impl FirmwareConfig {
    /// Parse a document from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate the parts of the document that do not depend on platforms.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build.validate()
    }
}

/// Trait for loading configuration from TOML files.
///
/// This trait provides a default implementation that works with any type
/// implementing `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid or a
///   value has the wrong type
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
