//! Component lifecycle model.
//!
//! This module defines:
//! - `Component` trait - Build-time model of a firmware object with a lifecycle
//! - `ComponentRegistry` - Registration order of all lifecycle components
//! - `setup_priority` - Standard setup priorities

use std::any::Any;

use serde::Serialize;
use tracing::debug;

use crate::codegen::{APP, CodeGen, Expression};
use crate::id::ComponentId;

/// Standard setup priorities. Higher values are set up first.
pub mod setup_priority {
    /// Communication buses.
    pub const BUS: f64 = 1000.0;
    /// Port expanders and other I/O providers.
    pub const IO: f64 = 900.0;
    /// Sensors and other hardware that talks to buses.
    pub const HARDWARE: f64 = 800.0;
    /// Components that only process data.
    pub const DATA: f64 = 600.0;
    /// Hardware that should come up after the rest of the hardware.
    pub const HARDWARE_LATE: f64 = 50.0;
    /// Everything that should run last.
    pub const LATE: f64 = -100.0;
}

/// Build-time model of a firmware component.
///
/// Platforms return one of these for every driver instance they emit. The
/// model mirrors the setters called in the generated program.
pub trait Component: Send + Sync {
    /// Variable name of the instance.
    fn id(&self) -> &ComponentId;

    /// Fully qualified C++ class.
    fn class_name(&self) -> &'static str;

    /// Effective setup priority.
    fn setup_priority(&self) -> f64;

    /// Log the resolved configuration.
    fn dump_config(&self);

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
}

/// A component registered with the application lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredComponent {
    /// Variable name.
    pub id: ComponentId,
    /// Fully qualified C++ class.
    pub class: String,
    /// Effective setup priority.
    pub setup_priority: f64,
}

/// Lifecycle registrations in the order they were emitted.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: Vec<RegisteredComponent>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `var` with the application.
    ///
    /// Emits `App.register_component(var)` and, when `priority_override`
    /// is set, `var->set_setup_priority(p)`.
    pub fn register_component(
        &mut self,
        cg: &mut CodeGen,
        var: &Expression,
        id: &ComponentId,
        class: &str,
        default_priority: f64,
        priority_override: Option<f64>,
    ) {
        cg.add(Expression::call(
            format!("{APP}.register_component"),
            vec![var.clone()],
        ));
        if let Some(priority) = priority_override {
            cg.add(var.method("set_setup_priority", vec![priority.into()]));
        }

        let setup_priority = priority_override.unwrap_or(default_priority);
        debug!("Registered component {} ({}) priority={}", id, class, setup_priority);
        self.entries.push(RegisteredComponent {
            id: id.clone(),
            class: class.to_string(),
            setup_priority,
        });
    }

    /// Registered components in registration order.
    pub fn entries(&self) -> &[RegisteredComponent] {
        &self.entries
    }

    /// Look up a registration by id.
    pub fn get(&self, id: &ComponentId) -> Option<&RegisteredComponent> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigPath;

    #[test]
    fn register_emits_call_and_records_entry() {
        let mut cg = CodeGen::new();
        let mut registry = ComponentRegistry::new();
        let id = ComponentId::parse("ppd", &ConfigPath::root()).unwrap();
        let var = Expression::id(&id);

        registry.register_component(&mut cg, &var, &id, "ppd42x::PPD42XComponent", 50.0, None);

        assert_eq!(cg.statements().len(), 1);
        assert_eq!(
            cg.statements()[0].to_string(),
            "App.register_component(ppd);"
        );
        let entry = registry.get(&id).unwrap();
        assert_eq!(entry.setup_priority, 50.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn priority_override_emits_setter() {
        let mut cg = CodeGen::new();
        let mut registry = ComponentRegistry::new();
        let id = ComponentId::parse("ppd", &ConfigPath::root()).unwrap();
        let var = Expression::id(&id);

        registry.register_component(&mut cg, &var, &id, "x::Y", 50.0, Some(-10.0));

        assert_eq!(
            cg.statements()[1].to_string(),
            "ppd->set_setup_priority(-10.0f);"
        );
        assert_eq!(registry.entries()[0].setup_priority, -10.0);
    }

    #[test]
    fn priorities_are_ordered() {
        assert!(setup_priority::BUS > setup_priority::IO);
        assert!(setup_priority::IO > setup_priority::HARDWARE);
        assert!(setup_priority::HARDWARE > setup_priority::DATA);
        assert!(setup_priority::DATA > setup_priority::HARDWARE_LATE);
        assert!(setup_priority::HARDWARE_LATE > setup_priority::LATE);
    }
}
