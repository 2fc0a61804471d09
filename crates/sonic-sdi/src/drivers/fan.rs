//! Fan driver backed by tachometer and target-speed registers.

use super::{Signal, SignalConfig, FanDriver};
use crate::bus::{BusAddress, SharedBus};
use crate::error::{SdiError, SdiResult};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanConfig {
    pub bus: u32,
    pub device: u16,
    /// Big-endian 16-bit measured speed in RPM.
    pub speed_offset: u32,
    /// Big-endian 16-bit target speed in RPM.
    pub target_offset: u32,
    #[serde(default = "default_max_speed")]
    pub max_speed: u32,
    #[serde(default)]
    pub default_speed: Option<u32>,
    #[serde(default)]
    pub fault: Option<SignalConfig>,
}

fn default_max_speed() -> u32 {
    20_000
}

pub struct RegisterFan {
    bus: SharedBus,
    config: FanConfig,
    fault: Option<Signal>,
}

impl RegisterFan {
    pub fn new(bus: SharedBus, config: FanConfig) -> Self {
        let fault = config.fault.map(|cfg| Signal::new(bus.clone(), cfg));
        Self { bus, config, fault }
    }

    fn address(&self) -> BusAddress {
        BusAddress::new(self.config.bus, self.config.device)
    }
}

impl FanDriver for RegisterFan {
    fn speed(&self) -> SdiResult<u32> {
        let rpm = self.bus.read_u16_be(self.address(), self.config.speed_offset)?;
        Ok(u32::from(rpm))
    }

    fn set_speed(&self, rpm: u32) -> SdiResult<()> {
        let limit = self.config.max_speed.min(u32::from(u16::MAX));
        if rpm > limit {
            return Err(SdiError::invalid_parameter(format!(
                "fan speed {} rpm exceeds maximum {} rpm",
                rpm, limit
            )));
        }
        debug!("Setting fan at {} to {} rpm", self.address(), rpm);
        self.bus
            .write_u16_be(self.address(), self.config.target_offset, rpm as u16)?;
        Ok(())
    }

    /// Faulted if the fault signal is asserted or, without one, if the fan
    /// is stopped while a non-zero target is set.
    fn alert(&self) -> SdiResult<bool> {
        if let Some(fault) = &self.fault {
            return fault.is_asserted();
        }
        let target = self.bus.read_u16_be(self.address(), self.config.target_offset)?;
        Ok(target > 0 && self.speed()? == 0)
    }

    fn apply_defaults(&self) -> SdiResult<()> {
        match self.config.default_speed {
            Some(rpm) => self.set_speed(rpm),
            None => Ok(()),
        }
    }
}
