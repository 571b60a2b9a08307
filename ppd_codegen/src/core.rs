//! Build core.
//!
//! The `CodegenCore` struct is the main entry point for a build. It owns the
//! loaded document and the platform registry and runs the two build phases:
//!
//! 1. Validate: every serial bus and every sensor block, in document order.
//!    Identifiers are declared here; the first violation aborts the build.
//! 2. Emit: buses first, then each validated block's `to_code()`. Generated
//!    identifiers are resolved here, after all declared ones are known.
//!
//! Nothing leaves the core until both phases succeed.

use ppd_common::codegen::Statement;
use ppd_common::component::{Component, RegisteredComponent};
use ppd_common::config::{ConfigError, ConfigLoader, ConfigPath, FirmwareConfig};
use ppd_common::consts::CONF_PLATFORM;
use ppd_common::platform::{BuildContext, PlatformConfig};
use ppd_common::uart::uart_to_code;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::CodegenError;
use crate::manifest::BuildManifest;
use crate::platform_registry::PlatformRegistry;

/// Result of a successful build.
pub struct BuildOutput {
    /// Firmware node name.
    pub name: String,
    /// Rendered C++ program.
    pub program: String,
    /// Headers the program includes.
    pub includes: Vec<String>,
    /// `setup()` statements in emission order.
    pub statements: Vec<Statement>,
    /// Lifecycle registrations in order.
    pub registered: Vec<RegisteredComponent>,
    /// Driver models, one per platform block.
    pub components: Vec<Box<dyn Component>>,
}

impl BuildOutput {
    /// Driver model with the given id, downcast to its concrete type.
    pub fn component<T: 'static>(&self, id: &str) -> Option<&T> {
        self.components
            .iter()
            .find(|c| c.id().as_str() == id)
            .and_then(|c| c.as_any().downcast_ref::<T>())
    }

    /// Write the rendered program to `path`.
    pub fn write_program(&self, path: &Path) -> Result<(), CodegenError> {
        write_text(path, &self.program)
    }

    /// Write the program and, when `manifest` is given, its build manifest.
    ///
    /// The manifest is serialized before anything is written. If writing the
    /// manifest fails, the program file is removed again.
    pub fn write_files(&self, program: &Path, manifest: Option<&Path>) -> Result<(), CodegenError> {
        let manifest_json = manifest
            .map(|_| BuildManifest::from_output(self).to_json())
            .transpose()?;

        self.write_program(program)?;
        if let (Some(path), Some(json)) = (manifest, manifest_json) {
            if let Err(e) = write_text(path, &json) {
                let _ = fs::remove_file(program);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Write `text` to `path`, reporting failures against `path`.
pub(crate) fn write_text(path: &Path, text: &str) -> Result<(), CodegenError> {
    fs::write(path, text).map_err(|source| CodegenError::Output {
        path: path.to_path_buf(),
        source,
    })
}

/// Outcome of the validation phase.
pub struct Validated {
    /// Context holding declared identifiers and serial buses.
    pub ctx: BuildContext,
    /// Validated blocks, in document order.
    pub blocks: Vec<(String, Box<dyn PlatformConfig>)>,
}

/// Build core: validates a firmware document and emits its program.
pub struct CodegenCore {
    /// Loaded document.
    config: FirmwareConfig,
    /// Available platforms.
    registry: PlatformRegistry,
}

impl CodegenCore {
    /// Create a core for `config` using the platforms in `registry`.
    pub fn new(config: FirmwareConfig, registry: PlatformRegistry) -> Self {
        info!(
            "CodegenCore created for node '{}': {} uart buses, {} sensor blocks",
            config.build.name,
            config.uart.len(),
            config.sensor.len()
        );
        Self { config, registry }
    }

    /// Load a firmware document from a TOML file.
    ///
    /// # Errors
    /// Returns `ConfigError::FileNotFound` or `ConfigError::ParseError`.
    pub fn load_config(config_path: &Path) -> Result<FirmwareConfig, ConfigError> {
        info!("Loading configuration from {:?}", config_path);
        let config = FirmwareConfig::load(config_path)?;
        debug!(
            "Loaded config: node={}, {} uart, {} sensor",
            config.build.name,
            config.uart.len(),
            config.sensor.len()
        );
        Ok(config)
    }

    /// The loaded document.
    pub fn config(&self) -> &FirmwareConfig {
        &self.config
    }

    /// Run the validation phase.
    ///
    /// # Errors
    /// Returns the first configuration error; nothing has been emitted.
    pub fn validate(&self) -> Result<Validated, ConfigError> {
        self.config.validate()?;

        let root = ConfigPath::root();
        let mut ctx = BuildContext::new();

        for (idx, uart) in self.config.uart.iter().enumerate() {
            let bus = uart.validate(&root.key("uart").index(idx), &mut ctx)?;
            debug!("  Validated uart bus {}", bus.id);
            ctx.add_uart_bus(bus);
        }
        if !self.config.sensor.is_empty() {
            ctx.add_domain("sensor");
        }

        let mut blocks = Vec::with_capacity(self.config.sensor.len());
        for (idx, block) in self.config.sensor.iter().enumerate() {
            let path = root.key("sensor").index(idx);
            let name = platform_name(block, &path)?;
            let platform = self.registry.create_platform(name, &path)?;

            for dependency in platform.dependencies() {
                if !ctx.has_domain(dependency) {
                    return Err(ConfigError::MissingDependency {
                        component: format!("{}.{}", platform.domain(), platform.name()),
                        dependency: dependency.to_string(),
                    });
                }
            }

            let validated = platform.validate(block, &path, &mut ctx)?;
            blocks.push((format!("{}.{}", platform.domain(), platform.name()), validated));
        }

        info!(
            "Configuration valid: {} identifiers, {} platform blocks",
            ctx.ids.len(),
            blocks.len()
        );
        Ok(Validated { ctx, blocks })
    }

    /// Validate, then emit the complete program.
    ///
    /// # Errors
    /// Returns the first configuration error. No partial output exists.
    pub fn build(&self) -> Result<BuildOutput, CodegenError> {
        let Validated { mut ctx, blocks } = self.validate()?;

        let buses = ctx.uart_buses().to_vec();
        for bus in &buses {
            ctx.cg.add_comment(format!("uart: {}", bus.id));
            uart_to_code(bus, &mut ctx);
        }

        let mut components = Vec::with_capacity(blocks.len());
        for (label, block) in &blocks {
            ctx.cg.add_comment(label.clone());
            components.push(block.to_code(&mut ctx)?);
        }

        for component in &components {
            component.dump_config();
        }

        let program = ctx.cg.render(&self.config.build.name);
        info!(
            "Generated {} statements, {} components registered",
            ctx.cg.statements().len(),
            ctx.components.len()
        );

        Ok(BuildOutput {
            name: self.config.build.name.clone(),
            program,
            includes: ctx.cg.includes().to_vec(),
            statements: ctx.cg.statements().to_vec(),
            registered: ctx.components.entries().to_vec(),
            components,
        })
    }
}

/// Read the `platform` key of a block.
fn platform_name<'a>(block: &'a toml::Table, path: &ConfigPath) -> Result<&'a str, ConfigError> {
    match block.get(CONF_PLATFORM) {
        Some(toml::Value::String(name)) => Ok(name.as_str()),
        Some(other) => Err(ConfigError::invalid(
            &path.key(CONF_PLATFORM),
            format!("expected a string, got {}", other.type_str()),
        )),
        None => Err(ConfigError::invalid(
            path,
            format!("required key '{CONF_PLATFORM}' not provided"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(text: &str) -> CodegenCore {
        let config = FirmwareConfig::from_toml(text).expect("parse");
        CodegenCore::new(config, PlatformRegistry::with_builtin())
    }

    #[test]
    fn missing_platform_key() {
        let core = core(
            r#"
[build]
name = "node"

[[uart]]
id = "u1"
rx_pin = 16
baud_rate = 9600

[[sensor]]
id = "ppd"
"#,
        );
        let err = core.validate().err().expect("should fail");
        assert_eq!(err.to_string(), "sensor[0]: required key 'platform' not provided");
    }

    #[test]
    fn non_string_platform_key() {
        let core = core(
            r#"
[build]
name = "node"

[[sensor]]
platform = 42
"#,
        );
        let err = core.validate().err().expect("should fail");
        assert!(err.to_string().starts_with("sensor[0].platform:"), "{err}");
    }

    #[test]
    fn empty_document_builds_bare_program() {
        let core = core("[build]\nname = \"node\"\n");
        let output = core.build().expect("build");
        assert!(output.statements.is_empty());
        assert!(output.components.is_empty());
        assert!(output.program.contains("App.pre_setup(\"node\""));
    }
}
