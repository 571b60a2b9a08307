//! Platform implementations.
//!
//! This module contains all built-in platforms:
//!
//! - [`ppd42x`] - PPD42x particulate matter sensor on a serial bus
//!
//! # Adding New Platforms
//!
//! 1. Create a new submodule under `platforms/`
//! 2. Implement the `Platform` trait from `ppd_common::platform`
//! 3. Register the platform in [`register_all_platforms`]

pub mod ppd42x;

use crate::platform_registry::PlatformRegistry;

/// Register all built-in platforms.
pub fn register_all_platforms(registry: &mut PlatformRegistry) {
    registry.register(ppd42x::PLATFORM_NAME, ppd42x::create_platform);
}
