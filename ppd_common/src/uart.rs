//! Serial (UART) buses and device attachment.
//!
//! Buses are declared in `[[uart]]` tables and emitted before any device.
//! Devices reference a bus through `uart_id`; when omitted and exactly one
//! bus exists, that bus is used.
//!
//! # TOML Example
//!
//! ```toml
//! [[uart]]
//! id = "u1"
//! rx_pin = 16
//! tx_pin = 17
//! baud_rate = 9600
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codegen::Expression;
use crate::component::setup_priority;
use crate::config::{ConfigError, ConfigPath};
use crate::consts::{
    CONF_ID, CONF_UART_ID, DEFAULT_DATA_BITS, DEFAULT_RX_BUFFER_SIZE, DEFAULT_STOP_BITS,
};
use crate::id::{ComponentId, IdKind};
use crate::platform::BuildContext;

/// C++ class of a serial bus.
pub const UART_CLASS: &str = "uart::UARTComponent";

/// Header declaring the serial classes.
pub const UART_HEADER: &str = "esphome/components/uart/uart.h";

fn default_rx_buffer_size() -> u32 {
    DEFAULT_RX_BUFFER_SIZE
}

fn default_data_bits() -> u8 {
    DEFAULT_DATA_BITS
}

fn default_stop_bits() -> u8 {
    DEFAULT_STOP_BITS
}

/// Parity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// No parity bit.
    #[default]
    None,
    /// Even parity.
    Even,
    /// Odd parity.
    Odd,
}

impl Parity {
    fn cpp_constant(&self) -> &'static str {
        match self {
            Self::None => "uart::UART_CONFIG_PARITY_NONE",
            Self::Even => "uart::UART_CONFIG_PARITY_EVEN",
            Self::Odd => "uart::UART_CONFIG_PARITY_ODD",
        }
    }
}

/// One `[[uart]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UartConfig {
    /// Bus identifier.
    pub id: String,
    /// Transmit GPIO.
    #[serde(default)]
    pub tx_pin: Option<u8>,
    /// Receive GPIO.
    #[serde(default)]
    pub rx_pin: Option<u8>,
    /// Baud rate.
    pub baud_rate: u32,
    /// Receive buffer size in bytes.
    #[serde(default = "default_rx_buffer_size")]
    pub rx_buffer_size: u32,
    /// Data bits per frame (5..=8).
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    /// Parity.
    #[serde(default)]
    pub parity: Parity,
    /// Stop bits (1 or 2).
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
}

/// A validated serial bus.
#[derive(Debug, Clone)]
pub struct UartBus {
    /// Bus identifier.
    pub id: ComponentId,
    /// Validated settings.
    pub config: UartConfig,
}

impl UartConfig {
    /// Validate the bus and declare its identifier.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if no pin is set, `baud_rate` or
    /// `rx_buffer_size` is zero, `data_bits` is outside 5..=8 or
    /// `stop_bits` is not 1 or 2; `ConfigError::DuplicateId` if the
    /// identifier is taken.
    pub fn validate(&self, path: &ConfigPath, ctx: &mut BuildContext) -> Result<UartBus, ConfigError> {
        if self.tx_pin.is_none() && self.rx_pin.is_none() {
            return Err(ConfigError::invalid(
                path,
                "at least one of 'tx_pin' or 'rx_pin' is required",
            ));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::invalid(
                &path.key("baud_rate"),
                "baud_rate must be greater than 0",
            ));
        }
        if self.rx_buffer_size == 0 {
            return Err(ConfigError::invalid(
                &path.key("rx_buffer_size"),
                "rx_buffer_size must be greater than 0",
            ));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(ConfigError::invalid(
                &path.key("data_bits"),
                format!("data_bits must be between 5 and 8, got {}", self.data_bits),
            ));
        }
        if !matches!(self.stop_bits, 1 | 2) {
            return Err(ConfigError::invalid(
                &path.key("stop_bits"),
                format!("stop_bits must be 1 or 2, got {}", self.stop_bits),
            ));
        }

        let id = ctx.ids.declare(&self.id, IdKind::UartBus, &path.key(CONF_ID))?;
        Ok(UartBus {
            id,
            config: self.clone(),
        })
    }
}

/// Emit the declaration and settings of a serial bus.
pub fn uart_to_code(bus: &UartBus, ctx: &mut BuildContext) {
    ctx.cg.add_include(UART_HEADER);
    let var = ctx.cg.new_pvariable(&bus.id, UART_CLASS);
    ctx.register_component(&var, &bus.id, UART_CLASS, setup_priority::BUS, None);

    let config = &bus.config;
    ctx.cg.add(var.method("set_baud_rate", vec![config.baud_rate.into()]));
    if let Some(pin) = config.tx_pin {
        ctx.cg.add(var.method("set_tx_pin", vec![u32::from(pin).into()]));
    }
    if let Some(pin) = config.rx_pin {
        ctx.cg.add(var.method("set_rx_pin", vec![u32::from(pin).into()]));
    }
    ctx.cg.add(var.method("set_rx_buffer_size", vec![config.rx_buffer_size.into()]));
    ctx.cg.add(var.method("set_data_bits", vec![u32::from(config.data_bits).into()]));
    ctx.cg.add(var.method(
        "set_parity",
        vec![Expression::raw(config.parity.cpp_constant())],
    ));
    ctx.cg.add(var.method("set_stop_bits", vec![u32::from(config.stop_bits).into()]));
    debug!("Emitted uart bus {} @ {} baud", bus.id, config.baud_rate);
}

/// Resolve the bus a device attaches to.
///
/// With an explicit `uart_id` the bus must exist. Without one, the single
/// configured bus is used.
///
/// # Errors
///
/// Returns `ConfigError::UnknownId` for a dangling reference and
/// `ConfigError::Invalid` when no bus or several buses are configured and
/// none is named.
pub fn resolve_uart_id(
    uart_id: Option<&str>,
    path: &ConfigPath,
    ctx: &BuildContext,
) -> Result<ComponentId, ConfigError> {
    match uart_id {
        Some(name) => ctx.ids.lookup(name, IdKind::UartBus, &path.key(CONF_UART_ID)),
        None => match ctx.uart_buses() {
            [bus] => Ok(bus.id.clone()),
            [] => Err(ConfigError::invalid(
                path,
                "no uart bus is configured; add a [[uart]] table",
            )),
            _ => Err(ConfigError::invalid(
                path,
                "several uart buses are configured; set 'uart_id' to pick one",
            )),
        },
    }
}

/// Check that a bus has the pins a device needs.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` at `path` naming the missing pin.
pub fn final_validate_device(
    bus_id: &ComponentId,
    require_tx: bool,
    require_rx: bool,
    path: &ConfigPath,
    ctx: &BuildContext,
) -> Result<(), ConfigError> {
    let bus = ctx.uart_bus(bus_id).ok_or_else(|| ConfigError::UnknownId {
        id: bus_id.to_string(),
        path: path.to_string(),
        reason: "uart bus not validated".to_string(),
    })?;
    if require_tx && bus.config.tx_pin.is_none() {
        return Err(ConfigError::invalid(
            path,
            format!("uart bus '{bus_id}' has no tx_pin, but this device needs to transmit"),
        ));
    }
    if require_rx && bus.config.rx_pin.is_none() {
        return Err(ConfigError::invalid(
            path,
            format!("uart bus '{bus_id}' has no rx_pin, but this device needs to receive"),
        ));
    }
    Ok(())
}

/// Attach a device to its serial bus: `var->set_uart_parent(bus)`.
pub fn register_uart_device(var: &Expression, bus_id: &ComponentId, ctx: &mut BuildContext) {
    ctx.cg.add_include(UART_HEADER);
    ctx.cg.add(var.method("set_uart_parent", vec![Expression::id(bus_id)]));
}
