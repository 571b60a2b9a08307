//! PPD42x particulate matter sensor platform.
//!
//! Binds a `[[sensor]]` block with `platform = "ppd42x"` to a
//! `ppd42x::PPD42XComponent` instance: the driver is declared, registered
//! with the application, attached to its serial bus, configured, and given
//! up to two measurement channels (PM2.5 and PM10.0).

mod component;
mod config;

pub use component::Ppd42xComponent;
pub use config::{Ppd42xConfig, particulate_schema};

use ppd_common::prelude::*;
use ppd_common::{sensor, uart};
use tracing::debug;

/// Value of the `platform` key.
pub const PLATFORM_NAME: &str = "ppd42x";

/// C++ class of the driver.
pub const PPD42X_CLASS: &str = "ppd42x::PPD42XComponent";

/// Header declaring the driver.
pub const PPD42X_HEADER: &str = "esphome/components/ppd42x/ppd42x.h";

/// The `ppd42x` sensor platform.
pub struct Ppd42xPlatform;

impl Platform for Ppd42xPlatform {
    fn name(&self) -> &'static str {
        PLATFORM_NAME
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["uart"]
    }

    fn validate(
        &self,
        block: &toml::Table,
        path: &ConfigPath,
        ctx: &mut BuildContext,
    ) -> Result<Box<dyn PlatformConfig>, ConfigError> {
        let config = Ppd42xConfig::validate(block, path, ctx)?;
        debug!("Validated {} block '{}' at {}", PLATFORM_NAME, config.id, path);
        Ok(Box::new(config))
    }
}

impl PlatformConfig for Ppd42xConfig {
    fn to_code(&self, ctx: &mut BuildContext) -> Result<Box<dyn Component>, ConfigError> {
        ctx.cg.add_include(PPD42X_HEADER);

        let var = ctx.cg.new_pvariable(&self.id, PPD42X_CLASS);
        let mut component = Ppd42xComponent::new(self.id.clone());

        ctx.register_component(
            &var,
            &self.id,
            PPD42X_CLASS,
            setup_priority::HARDWARE_LATE,
            self.setup_priority,
        );
        if let Some(priority) = self.setup_priority {
            component.set_setup_priority(priority);
        }

        uart::register_uart_device(&var, &self.uart_id, ctx);
        component.set_uart_parent(self.uart_id.clone());

        if let Some(minutes) = self.update_interval_min {
            ctx.cg
                .add(var.method("set_update_interval_min", vec![minutes.into()]));
            component.set_update_interval_min(minutes);
        }

        ctx.cg
            .add(var.method("set_rx_mode_only", vec![self.rx_only.into()]));
        component.set_rx_mode_only(self.rx_only);

        if let Some(channel) = &self.pm_2_5 {
            let sens = sensor::new_sensor(channel, ctx);
            ctx.cg.add(var.method("set_pm_2_5_sensor", vec![sens.expr()]));
            component.set_pm_2_5_sensor(sens);
        }

        if let Some(channel) = &self.pm_10_0 {
            let sens = sensor::new_sensor(channel, ctx);
            ctx.cg.add(var.method("set_pm_10_0_sensor", vec![sens.expr()]));
            component.set_pm_10_0_sensor(sens);
        }

        Ok(Box::new(component))
    }
}

/// Factory function to create the platform.
pub fn create_platform() -> Box<dyn Platform> {
    Box::new(Ppd42xPlatform)
}
