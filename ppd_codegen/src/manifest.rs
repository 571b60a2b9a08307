//! Build manifest.
//!
//! A JSON summary of what a build registered, written next to the
//! generated program for tooling that needs the component list without
//! parsing C++.

use ppd_common::component::RegisteredComponent;
use serde::Serialize;
use std::path::Path;

use crate::core::{BuildOutput, write_text};
use crate::error::CodegenError;

/// Summary of one build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildManifest {
    /// Firmware node name.
    pub name: String,
    /// Generator version.
    pub generator_version: String,
    /// Headers the program includes.
    pub includes: Vec<String>,
    /// Lifecycle components in registration order.
    pub components: Vec<RegisteredComponent>,
}

impl BuildManifest {
    /// Summarize a finished build.
    pub fn from_output(output: &BuildOutput) -> Self {
        Self {
            name: output.name.clone(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            includes: output.includes.clone(),
            components: output.registered.clone(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CodegenError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest to `path`.
    pub fn write(&self, path: &Path) -> Result<(), CodegenError> {
        write_text(path, &self.to_json()?)
    }
}
