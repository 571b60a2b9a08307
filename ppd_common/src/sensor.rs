//! Generic measurement sensor schema and factory.
//!
//! A platform describes each of its measurement channels with a
//! [`SensorSchema`] holding the defaults for that channel. User options in
//! the channel table override the defaults.
//!
//! # TOML Example
//!
//! ```toml
//! [sensor.pm_2_5]
//! name = "Living Room PM2.5"
//! accuracy_decimals = 0
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::codegen::{APP, Expression};
use crate::config::{ConfigError, ConfigPath};
use crate::consts::{CONF_ID, KNOWN_DEVICE_CLASSES};
use crate::id::{ComponentId, IdKind, IdSpec};
use crate::platform::BuildContext;

/// C++ class of a measurement sensor.
pub const SENSOR_CLASS: &str = "sensor::Sensor";

/// Header declaring the sensor classes.
pub const SENSOR_HEADER: &str = "esphome/components/sensor/sensor.h";

/// Allowed range for `accuracy_decimals`.
pub const ACCURACY_DECIMALS_RANGE: std::ops::RangeInclusive<i8> = -3..=10;

/// Aggregation class of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    /// Instantaneous reading.
    Measurement,
    /// Running total that may decrease.
    Total,
    /// Running total that only increases.
    TotalIncreasing,
}

impl StateClass {
    fn cpp_constant(&self) -> &'static str {
        match self {
            Self::Measurement => "sensor::STATE_CLASS_MEASUREMENT",
            Self::Total => "sensor::STATE_CLASS_TOTAL",
            Self::TotalIncreasing => "sensor::STATE_CLASS_TOTAL_INCREASING",
        }
    }
}

/// Per-channel defaults supplied by a platform.
#[derive(Debug, Clone, Default)]
pub struct SensorSchema {
    /// Default unit.
    pub unit_of_measurement: Option<&'static str>,
    /// Default icon.
    pub icon: Option<&'static str>,
    /// Default decimal precision.
    pub accuracy_decimals: Option<i8>,
    /// Default device class.
    pub device_class: Option<&'static str>,
    /// Default state class.
    pub state_class: Option<StateClass>,
}

/// Channel table as written by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorOptions {
    /// Sensor identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Friendly name.
    #[serde(default)]
    pub name: Option<String>,
    /// Unit of measurement.
    #[serde(default)]
    pub unit_of_measurement: Option<String>,
    /// Icon (`prefix:name`).
    #[serde(default)]
    pub icon: Option<String>,
    /// Decimal precision.
    #[serde(default)]
    pub accuracy_decimals: Option<i8>,
    /// Device class.
    #[serde(default)]
    pub device_class: Option<String>,
    /// State class.
    #[serde(default)]
    pub state_class: Option<StateClass>,
    /// Hide from frontends.
    #[serde(default)]
    pub internal: bool,
    /// Disable in frontends by default.
    #[serde(default)]
    pub disabled_by_default: bool,
    /// Publish every reading even when unchanged.
    #[serde(default)]
    pub force_update: bool,
}

/// A validated measurement sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    /// Identifier, possibly still to be generated.
    pub id: IdSpec,
    /// Friendly name.
    pub name: Option<String>,
    /// Unit of measurement.
    pub unit_of_measurement: Option<String>,
    /// Icon.
    pub icon: Option<String>,
    /// Decimal precision.
    pub accuracy_decimals: Option<i8>,
    /// Device class.
    pub device_class: Option<String>,
    /// State class.
    pub state_class: Option<StateClass>,
    /// Hide from frontends.
    pub internal: bool,
    /// Disable in frontends by default.
    pub disabled_by_default: bool,
    /// Publish every reading even when unchanged.
    pub force_update: bool,
}

fn validate_icon(icon: &str, path: &ConfigPath) -> Result<(), ConfigError> {
    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    };
    match icon.split_once(':') {
        Some((prefix, name)) if valid_part(prefix) && valid_part(name) => Ok(()),
        _ => Err(ConfigError::invalid(
            path,
            format!("icons must match the format '[icon pack]:[icon]', e.g. 'mdi:home-assistant', got '{icon}'"),
        )),
    }
}

impl SensorSchema {
    /// Validate a channel table against this schema.
    ///
    /// Declares the sensor id if one is given; otherwise the id is
    /// generated from `default_id_base` when code is emitted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for malformed options and
    /// `ConfigError::DuplicateId` for a taken id.
    pub fn validate(
        &self,
        options: &SensorOptions,
        default_id_base: &str,
        path: &ConfigPath,
        ctx: &mut BuildContext,
    ) -> Result<SensorConfig, ConfigError> {
        if let Some(name) = &options.name {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid(&path.key("name"), "name cannot be empty"));
            }
        }

        let icon = options
            .icon
            .clone()
            .or_else(|| self.icon.map(str::to_string));
        if let Some(icon) = &icon {
            validate_icon(icon, &path.key("icon"))?;
        }

        let accuracy_decimals = options.accuracy_decimals.or(self.accuracy_decimals);
        if let Some(decimals) = accuracy_decimals {
            if !ACCURACY_DECIMALS_RANGE.contains(&decimals) {
                return Err(ConfigError::invalid(
                    &path.key("accuracy_decimals"),
                    format!(
                        "accuracy_decimals must be between {} and {}, got {decimals}",
                        ACCURACY_DECIMALS_RANGE.start(),
                        ACCURACY_DECIMALS_RANGE.end()
                    ),
                ));
            }
        }

        let device_class = options
            .device_class
            .clone()
            .or_else(|| self.device_class.map(str::to_string));
        if let Some(class) = &device_class {
            if !KNOWN_DEVICE_CLASSES.contains(&class.as_str()) {
                return Err(ConfigError::invalid(
                    &path.key("device_class"),
                    format!("unknown device class '{class}'"),
                ));
            }
        }

        let id = match &options.id {
            Some(name) => IdSpec::Declared(ctx.ids.declare(name, IdKind::Sensor, &path.key(CONF_ID))?),
            None => IdSpec::Generated {
                base: default_id_base.to_string(),
            },
        };

        Ok(SensorConfig {
            id,
            name: options.name.clone(),
            unit_of_measurement: options
                .unit_of_measurement
                .clone()
                .or_else(|| self.unit_of_measurement.map(str::to_string)),
            icon,
            accuracy_decimals,
            device_class,
            state_class: options.state_class.or(self.state_class),
            internal: options.internal,
            disabled_by_default: options.disabled_by_default,
            force_update: options.force_update,
        })
    }
}

/// Handle to an emitted sensor object.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorHandle {
    /// Resolved variable name.
    pub id: ComponentId,
    /// Options the sensor was built with.
    pub config: SensorConfig,
}

impl SensorHandle {
    /// Expression referencing the sensor.
    pub fn expr(&self) -> Expression {
        Expression::id(&self.id)
    }

    /// Log the sensor options, prefixed by `prefix`.
    pub fn log(&self, prefix: &str, label: &str) {
        let config = &self.config;
        info!(
            "{}{} '{}' ({})",
            prefix,
            label,
            config.name.as_deref().unwrap_or(""),
            self.id
        );
        if let Some(class) = &config.device_class {
            info!("{}  Device Class: '{}'", prefix, class);
        }
        if let Some(state_class) = config.state_class {
            info!("{}  State Class: '{:?}'", prefix, state_class);
        }
        if let Some(unit) = &config.unit_of_measurement {
            info!("{}  Unit of Measurement: '{}'", prefix, unit);
        }
        if let Some(decimals) = config.accuracy_decimals {
            info!("{}  Accuracy Decimals: {}", prefix, decimals);
        }
        if let Some(icon) = &config.icon {
            info!("{}  Icon: '{}'", prefix, icon);
        }
        if config.force_update {
            info!("{}  Force Update: YES", prefix);
        }
    }
}

/// Declare and register a sensor object and apply its options.
pub fn new_sensor(config: &SensorConfig, ctx: &mut BuildContext) -> SensorHandle {
    ctx.cg.add_include(SENSOR_HEADER);
    let id = ctx.ids.resolve(&config.id, IdKind::Sensor);
    let var = ctx.cg.new_pvariable(&id, SENSOR_CLASS);
    ctx.cg
        .add(Expression::call(format!("{APP}.register_sensor"), vec![var.clone()]));

    if let Some(name) = &config.name {
        ctx.cg.add(var.method("set_name", vec![name.as_str().into()]));
    }
    ctx.cg.add(var.method(
        "set_disabled_by_default",
        vec![config.disabled_by_default.into()],
    ));
    if config.internal {
        ctx.cg.add(var.method("set_internal", vec![true.into()]));
    }
    if let Some(class) = &config.device_class {
        ctx.cg.add(var.method("set_device_class", vec![class.as_str().into()]));
    }
    if let Some(state_class) = config.state_class {
        ctx.cg.add(var.method(
            "set_state_class",
            vec![Expression::raw(state_class.cpp_constant())],
        ));
    }
    if let Some(unit) = &config.unit_of_measurement {
        ctx.cg
            .add(var.method("set_unit_of_measurement", vec![unit.as_str().into()]));
    }
    if let Some(decimals) = config.accuracy_decimals {
        ctx.cg.add(var.method(
            "set_accuracy_decimals",
            vec![Expression::Int(i64::from(decimals))],
        ));
    }
    ctx.cg
        .add(var.method("set_force_update", vec![config.force_update.into()]));
    if let Some(icon) = &config.icon {
        ctx.cg.add(var.method("set_icon", vec![icon.as_str().into()]));
    }

    debug!("Emitted sensor {}", id);
    SensorHandle {
        id,
        config: config.clone(),
    }
}
