//! `sensor.ppd42x` schema.
//!
//! # TOML Example
//!
//! ```toml
//! [[sensor]]
//! platform = "ppd42x"
//! id = "ppd"
//! uart_id = "u1"
//! rx_only = true
//! update_interval = "5min"
//!
//! [sensor.pm_2_5]
//! name = "PM2.5"
//!
//! [sensor.pm_10_0]
//! name = "PM10.0"
//! ```

use serde::Deserialize;

use ppd_common::config::{ConfigError, ConfigPath};
use ppd_common::consts::{
    CONF_ID, CONF_PM_10_0, CONF_PM_2_5, CONF_SETUP_PRIORITY, CONF_UPDATE_INTERVAL, DEVICE_CLASS_PM10,
    DEVICE_CLASS_PM25, ICON_CHEMICAL_WEAPON, UNIT_MICROGRAMS_PER_CUBIC_METER,
};
use ppd_common::id::{ComponentId, IdKind};
use ppd_common::platform::{BuildContext, deserialize_block};
use ppd_common::sensor::{SensorConfig, SensorOptions, SensorSchema, StateClass};
use ppd_common::time::positive_time_period_minutes;
use ppd_common::uart::{final_validate_device, resolve_uart_id};

/// Keys as written by the user.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct Ppd42xSchema {
    #[allow(dead_code)]
    platform: String,
    id: String,
    #[serde(default)]
    uart_id: Option<String>,
    #[serde(default)]
    pm_2_5: Option<SensorOptions>,
    #[serde(default)]
    pm_10_0: Option<SensorOptions>,
    #[serde(default)]
    rx_only: bool,
    #[serde(default)]
    update_interval: Option<toml::Value>,
    #[serde(default)]
    setup_priority: Option<f64>,
}

/// Defaults for a particulate channel of the given device class.
pub fn particulate_schema(device_class: &'static str) -> SensorSchema {
    SensorSchema {
        unit_of_measurement: Some(UNIT_MICROGRAMS_PER_CUBIC_METER),
        icon: Some(ICON_CHEMICAL_WEAPON),
        accuracy_decimals: Some(1),
        device_class: Some(device_class),
        state_class: Some(StateClass::Measurement),
    }
}

/// A validated `ppd42x` block.
#[derive(Debug, Clone)]
pub struct Ppd42xConfig {
    /// Driver identifier.
    pub id: ComponentId,
    /// Serial bus the driver listens on.
    pub uart_id: ComponentId,
    /// PM2.5 channel.
    pub pm_2_5: Option<SensorConfig>,
    /// PM10.0 channel.
    pub pm_10_0: Option<SensorConfig>,
    /// Only listen, never transmit.
    pub rx_only: bool,
    /// Update interval in minutes, when configured.
    pub update_interval_min: Option<u32>,
    /// Setup priority override.
    pub setup_priority: Option<f64>,
}

impl Ppd42xConfig {
    /// Validate a raw block and declare its identifiers.
    ///
    /// # Errors
    ///
    /// Returns the first violation: malformed or unknown keys, a taken id,
    /// an unresolvable `uart_id`, a bus without the pins the driver needs,
    /// a bad update interval or an invalid channel table.
    pub fn validate(
        block: &toml::Table,
        path: &ConfigPath,
        ctx: &mut BuildContext,
    ) -> Result<Self, ConfigError> {
        let schema: Ppd42xSchema = deserialize_block(block, path)?;

        let id = ctx.ids.declare(&schema.id, IdKind::Component, &path.key(CONF_ID))?;

        let uart_id = resolve_uart_id(schema.uart_id.as_deref(), path, ctx)?;
        final_validate_device(&uart_id, !schema.rx_only, true, path, ctx)?;

        let update_interval_min = schema
            .update_interval
            .as_ref()
            .map(|value| positive_time_period_minutes(value, &path.key(CONF_UPDATE_INTERVAL)))
            .transpose()?;

        if let Some(priority) = schema.setup_priority {
            if !priority.is_finite() {
                return Err(ConfigError::invalid(
                    &path.key(CONF_SETUP_PRIORITY),
                    format!("setup_priority must be a finite number, got {priority}"),
                ));
            }
        }

        let pm_2_5 = schema
            .pm_2_5
            .as_ref()
            .map(|options| {
                particulate_schema(DEVICE_CLASS_PM25).validate(
                    options,
                    &format!("{id}_{CONF_PM_2_5}"),
                    &path.key(CONF_PM_2_5),
                    ctx,
                )
            })
            .transpose()?;
        let pm_10_0 = schema
            .pm_10_0
            .as_ref()
            .map(|options| {
                particulate_schema(DEVICE_CLASS_PM10).validate(
                    options,
                    &format!("{id}_{CONF_PM_10_0}"),
                    &path.key(CONF_PM_10_0),
                    ctx,
                )
            })
            .transpose()?;

        Ok(Self {
            id,
            uart_id,
            pm_2_5,
            pm_10_0,
            rx_only: schema.rx_only,
            update_interval_min,
            setup_priority: schema.setup_priority,
        })
    }
}
