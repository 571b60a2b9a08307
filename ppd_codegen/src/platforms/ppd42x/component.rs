//! Build-time model of a PPD42x driver instance.

use std::any::Any;

use ppd_common::component::{Component, setup_priority};
use ppd_common::id::ComponentId;
use ppd_common::sensor::SensorHandle;
use tracing::info;

use super::PPD42X_CLASS;

/// A PPD42x driver as the generated program configures it.
///
/// Each setter corresponds to one emitted call on the C++ instance.
#[derive(Debug, Clone)]
pub struct Ppd42xComponent {
    id: ComponentId,
    uart_parent: Option<ComponentId>,
    pm_2_5_sensor: Option<SensorHandle>,
    pm_10_0_sensor: Option<SensorHandle>,
    update_interval_min: Option<u32>,
    rx_mode_only: bool,
    setup_priority: f64,
}

impl Ppd42xComponent {
    /// Fresh instance: no bus, no channels, default interval, transmitting.
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            uart_parent: None,
            pm_2_5_sensor: None,
            pm_10_0_sensor: None,
            update_interval_min: None,
            rx_mode_only: false,
            setup_priority: setup_priority::HARDWARE_LATE,
        }
    }

    /// Bind the serial bus.
    pub fn set_uart_parent(&mut self, uart: ComponentId) {
        self.uart_parent = Some(uart);
    }

    /// Set the update interval in minutes.
    pub fn set_update_interval_min(&mut self, minutes: u32) {
        self.update_interval_min = Some(minutes);
    }

    /// Set receive-only mode.
    pub fn set_rx_mode_only(&mut self, rx_only: bool) {
        self.rx_mode_only = rx_only;
    }

    /// Attach the PM2.5 channel.
    pub fn set_pm_2_5_sensor(&mut self, sensor: SensorHandle) {
        self.pm_2_5_sensor = Some(sensor);
    }

    /// Attach the PM10.0 channel.
    pub fn set_pm_10_0_sensor(&mut self, sensor: SensorHandle) {
        self.pm_10_0_sensor = Some(sensor);
    }

    /// Override the setup priority.
    pub fn set_setup_priority(&mut self, priority: f64) {
        self.setup_priority = priority;
    }

    /// Bound serial bus.
    pub fn uart_parent(&self) -> Option<&ComponentId> {
        self.uart_parent.as_ref()
    }

    /// PM2.5 channel, if attached.
    pub fn pm_2_5_sensor(&self) -> Option<&SensorHandle> {
        self.pm_2_5_sensor.as_ref()
    }

    /// PM10.0 channel, if attached.
    pub fn pm_10_0_sensor(&self) -> Option<&SensorHandle> {
        self.pm_10_0_sensor.as_ref()
    }

    /// Configured update interval; `None` keeps the driver default.
    pub fn update_interval_min(&self) -> Option<u32> {
        self.update_interval_min
    }

    /// Receive-only mode.
    pub fn rx_mode_only(&self) -> bool {
        self.rx_mode_only
    }
}

impl Component for Ppd42xComponent {
    fn id(&self) -> &ComponentId {
        &self.id
    }

    fn class_name(&self) -> &'static str {
        PPD42X_CLASS
    }

    fn setup_priority(&self) -> f64 {
        self.setup_priority
    }

    fn dump_config(&self) {
        info!("PPD42X '{}':", self.id);
        if let Some(uart) = &self.uart_parent {
            info!("  UART: {}", uart);
        }
        info!("  RX Only: {}", if self.rx_mode_only { "YES" } else { "NO" });
        match self.update_interval_min {
            Some(minutes) => info!("  Update Interval: {}min", minutes),
            None => info!("  Update Interval: default"),
        }
        if let Some(sensor) = &self.pm_2_5_sensor {
            sensor.log("  ", "PM2.5");
        }
        if let Some(sensor) = &self.pm_10_0_sensor {
            sensor.log("  ", "PM10.0");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
