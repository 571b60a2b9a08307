//! PPD Common Library
//!
//! This crate provides the configuration schema, identifier registry and
//! code emission primitives shared by the ppd workspace crates.
//!
//! # Module Structure
//!
//! - [`config`] - Document model, configuration errors and TOML loading
//! - [`id`] - Component identifiers and the build-wide registry
//! - [`time`] - Time period parsing and validation
//! - [`codegen`] - C++ expressions, statements and the program buffer
//! - [`component`] - Component lifecycle model and registration
//! - [`platform`] - Platform trait and build context
//! - [`sensor`] - Generic measurement sensor schema and factory
//! - [`uart`] - Serial buses and device attachment
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use ppd_common::prelude::*;
//! ```

pub mod codegen;
pub mod component;
pub mod config;
pub mod consts;
pub mod id;
pub mod platform;
pub mod prelude;
pub mod sensor;
pub mod time;
pub mod uart;
