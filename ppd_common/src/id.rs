//! Component identifiers and the build-wide identifier registry.
//!
//! Every object the generated program declares has a C++ variable name.
//! Names are either declared by the user (`id = "ppd"`) or generated from a
//! base when omitted. Declared names are registered while validating;
//! generated ones are resolved afterwards, so they can never shadow a
//! declaration that appears later in the document.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::config::{ConfigError, ConfigPath};
use crate::consts::RESERVED_IDS;

/// Validated C++ variable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Validate `name` as an identifier.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` at `path` if the name is empty, starts
    /// with a digit, contains anything but ASCII letters, digits and `_`, or
    /// is a reserved word.
    pub fn parse(name: &str, path: &ConfigPath) -> Result<Self, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::invalid(path, "ID must not be empty"));
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(ConfigError::invalid(
                path,
                format!("ID '{name}' must not start with a digit"),
            ));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(ConfigError::invalid(
                path,
                format!("ID '{name}' contains invalid character '{c}'; only letters, digits and '_' are allowed"),
            ));
        }
        if RESERVED_IDS.contains(&name) {
            return Err(ConfigError::invalid(
                path,
                format!("ID '{name}' is a reserved word"),
            ));
        }
        Ok(Self(name.to_string()))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// A serial bus.
    UartBus,
    /// A measurement sensor object.
    Sensor,
    /// Any other lifecycle-managed component (drivers).
    Component,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UartBus => write!(f, "uart bus"),
            Self::Sensor => write!(f, "sensor"),
            Self::Component => write!(f, "component"),
        }
    }
}

/// Identifier of an object before generated names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSpec {
    /// Name given in the configuration.
    Declared(ComponentId),
    /// No name given; one is derived from `base` at resolution time.
    Generated {
        /// Preferred name.
        base: String,
    },
}

#[derive(Debug, Clone)]
struct IdEntry {
    kind: IdKind,
    path: String,
}

/// Registry of every identifier in the build.
#[derive(Debug, Default)]
pub struct IdRegistry {
    entries: HashMap<ComponentId, IdEntry>,
}

impl IdRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a user-declared identifier.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the name is malformed and
    /// `ConfigError::DuplicateId` if it is already taken.
    pub fn declare(
        &mut self,
        name: &str,
        kind: IdKind,
        path: &ConfigPath,
    ) -> Result<ComponentId, ConfigError> {
        let id = ComponentId::parse(name, path)?;
        if let Some(existing) = self.entries.get(&id) {
            return Err(ConfigError::DuplicateId {
                id: id.to_string(),
                first: existing.path.clone(),
                path: path.to_string(),
            });
        }
        self.entries.insert(
            id.clone(),
            IdEntry {
                kind,
                path: path.to_string(),
            },
        );
        Ok(id)
    }

    /// Look up a reference to an identifier of the given kind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownId` if the name is not registered or
    /// names an object of another kind.
    pub fn lookup(
        &self,
        name: &str,
        kind: IdKind,
        path: &ConfigPath,
    ) -> Result<ComponentId, ConfigError> {
        let id = ComponentId::parse(name, path)?;
        match self.entries.get(&id) {
            Some(entry) if entry.kind == kind => Ok(id),
            Some(entry) => Err(ConfigError::UnknownId {
                id: id.to_string(),
                path: path.to_string(),
                reason: format!("it names a {} but a {kind} is required", entry.kind),
            }),
            None => Err(ConfigError::UnknownId {
                id: id.to_string(),
                path: path.to_string(),
                reason: format!("no {kind} with this ID is declared"),
            }),
        }
    }

    /// Resolve an [`IdSpec`] to a concrete identifier.
    ///
    /// Declared identifiers are returned as-is. Generated identifiers take
    /// `base`, or `base_N` for the smallest `N >= 2` that is free, and are
    /// registered under `kind`.
    pub fn resolve(&mut self, spec: &IdSpec, kind: IdKind) -> ComponentId {
        match spec {
            IdSpec::Declared(id) => id.clone(),
            IdSpec::Generated { base } => {
                let mut candidate = ComponentId(base.clone());
                let mut suffix = 2usize;
                while self.entries.contains_key(&candidate) {
                    candidate = ComponentId(format!("{base}_{suffix}"));
                    suffix += 1;
                }
                self.entries.insert(
                    candidate.clone(),
                    IdEntry {
                        kind,
                        path: "<generated>".to_string(),
                    },
                );
                candidate
            }
        }
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&ComponentId(name.to_string()))
    }

    /// Number of registered identifiers.
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

    fn path() -> ConfigPath {
        ConfigPath::root().key("sensor").index(0).key("id")
    }

    #[test]
    fn parse_accepts_valid_names() {
        for name in ["ppd", "u1", "_hidden", "ppd_pm_2_5", "PPD"] {
            assert_eq!(ComponentId::parse(name, &path()).unwrap().as_str(), name);
        }
    }

    #[test]
    fn parse_rejects_invalid_names() {
        for name in ["", "1uart", "my-sensor", "pm 2.5", "App", "class"] {
            let err = ComponentId::parse(name, &path()).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{name}: {err}");
            assert!(err.to_string().starts_with("sensor[0].id:"));
        }
    }

    #[test]
    fn declare_rejects_duplicates() {
        let mut ids = IdRegistry::new();
        let first = ConfigPath::root().key("sensor").index(0).key("id");
        let second = ConfigPath::root().key("sensor").index(1).key("id");

        ids.declare("ppd", IdKind::Component, &first).unwrap();
        let err = ids.declare("ppd", IdKind::Component, &second).unwrap_err();
        match err {
            ConfigError::DuplicateId { id, first, path } => {
                assert_eq!(id, "ppd");
                assert_eq!(first, "sensor[0].id");
                assert_eq!(path, "sensor[1].id");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn lookup_checks_kind() {
        let mut ids = IdRegistry::new();
        ids.declare("u1", IdKind::UartBus, &path()).unwrap();
        ids.declare("ppd", IdKind::Component, &path()).unwrap();

        assert_eq!(
            ids.lookup("u1", IdKind::UartBus, &path()).unwrap().as_str(),
            "u1"
        );
        assert!(matches!(
            ids.lookup("ppd", IdKind::UartBus, &path()),
            Err(ConfigError::UnknownId { .. })
        ));
        assert!(matches!(
            ids.lookup("u2", IdKind::UartBus, &path()),
            Err(ConfigError::UnknownId { .. })
        ));
    }

    #[test]
    fn generated_ids_avoid_declared_names() {
        let mut ids = IdRegistry::new();
        ids.declare("ppd_pm_2_5", IdKind::Sensor, &path()).unwrap();

        let spec = IdSpec::Generated {
            base: "ppd_pm_2_5".to_string(),
        };
        assert_eq!(ids.resolve(&spec, IdKind::Sensor).as_str(), "ppd_pm_2_5_2");
        assert_eq!(ids.resolve(&spec, IdKind::Sensor).as_str(), "ppd_pm_2_5_3");
        assert!(ids.contains("ppd_pm_2_5_3"));
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn declared_spec_resolves_to_itself() {
        let mut ids = IdRegistry::new();
        let id = ids.declare("pm25", IdKind::Sensor, &path()).unwrap();
        let resolved = ids.resolve(&IdSpec::Declared(id.clone()), IdKind::Sensor);
        assert_eq!(resolved, id);
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("pm25"));
    }
}
