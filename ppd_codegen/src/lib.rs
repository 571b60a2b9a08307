//! # PPD Codegen Library
//!
//! Firmware code generator with a pluggable platform architecture.
//!
//! This crate provides the `ppd_codegen` binary and the platform modules that
//! bind configuration blocks to generated C++ component registrations.
//! Platforms implement the `Platform` trait defined in `ppd_common::platform`.
//!
//! # Module Structure
//!
//! - [`core`] - CodegenCore struct, validation and emission phases
//! - [`platform_registry`] - Platform factory registration
//! - [`platforms`] - Platform implementations
//! - [`manifest`] - JSON build manifest
//! - [`error`] - Generator error type
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     ppd_codegen (single crate)                   │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │ firmware    │───►│ CodegenCore  │◄──►│  Platform Registry  │  │
//! │  │ .toml       │    │ (2 phases)   │    │                     │  │
//! │  └─────────────┘    └──────┬───────┘    └─────────────────────┘  │
//! │                            │                                     │
//! │                            ▼                                     │
//! │                   ┌────────────────┐        ┌────────────────┐   │
//! │                   │  Platform      │───────►│  main.cpp      │   │
//! │                   │  trait         │        │  build.json    │   │
//! │                   └────────────────┘        └────────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod core;
pub mod error;
pub mod manifest;
pub mod platform_registry;
pub mod platforms;

// Re-export key types for convenience
pub use crate::core::{BuildOutput, CodegenCore};
pub use crate::error::CodegenError;
pub use crate::manifest::BuildManifest;
pub use crate::platform_registry::PlatformRegistry;
