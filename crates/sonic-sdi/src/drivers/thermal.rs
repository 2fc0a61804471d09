//! Temperature sensor driver.

use super::ThermalDriver;
use crate::bus::{BusAddress, SharedBus};
use crate::error::{SdiError, SdiResult};
use parking_lot::RwLock;
use sdi_types::ThresholdLevel;
use serde::{Deserialize, Serialize};

/// Sensor thresholds in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalThresholds {
    #[serde(default = "default_low")]
    pub low: i32,
    #[serde(default = "default_high")]
    pub high: i32,
    #[serde(default = "default_critical")]
    pub critical: i32,
}

fn default_low() -> i32 {
    0
}

fn default_high() -> i32 {
    80
}

fn default_critical() -> i32 {
    95
}

impl Default for ThermalThresholds {
    fn default() -> Self {
        Self {
            low: default_low(),
            high: default_high(),
            critical: default_critical(),
        }
    }
}

impl ThermalThresholds {
    pub fn get(&self, level: ThresholdLevel) -> i32 {
        match level {
            ThresholdLevel::Low => self.low,
            ThresholdLevel::High => self.high,
            ThresholdLevel::Critical => self.critical,
        }
    }

    fn with(mut self, level: ThresholdLevel, value: i32) -> Self {
        match level {
            ThresholdLevel::Low => self.low = value,
            ThresholdLevel::High => self.high = value,
            ThresholdLevel::Critical => self.critical = value,
        }
        self
    }

    fn is_ordered(&self) -> bool {
        self.low <= self.high && self.high <= self.critical
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalConfig {
    pub bus: u32,
    pub device: u16,
    /// Signed 8-bit whole-degree reading register.
    pub offset: u32,
    #[serde(default)]
    pub thresholds: ThermalThresholds,
}

/// Sensor with a signed whole-degree reading register; thresholds are kept
/// in software.
pub struct RegisterThermal {
    bus: SharedBus,
    config: ThermalConfig,
    thresholds: RwLock<ThermalThresholds>,
}

impl RegisterThermal {
    pub fn new(bus: SharedBus, config: ThermalConfig) -> Self {
        let thresholds = RwLock::new(config.thresholds);
        Self {
            bus,
            config,
            thresholds,
        }
    }

    fn address(&self) -> BusAddress {
        BusAddress::new(self.config.bus, self.config.device)
    }
}

impl ThermalDriver for RegisterThermal {
    fn temperature(&self) -> SdiResult<i32> {
        let raw = self.bus.read_u8(self.address(), self.config.offset)?;
        Ok(i32::from(raw as i8))
    }

    fn threshold(&self, level: ThresholdLevel) -> SdiResult<i32> {
        Ok(self.thresholds.read().get(level))
    }

    fn set_threshold(&self, level: ThresholdLevel, value: i32) -> SdiResult<()> {
        let mut thresholds = self.thresholds.write();
        let updated = thresholds.with(level, value);
        if !updated.is_ordered() {
            return Err(SdiError::invalid_parameter(format!(
                "{} threshold {} breaks low <= high <= critical ({:?})",
                level, value, *thresholds
            )));
        }
        *thresholds = updated;
        Ok(())
    }

    fn alert(&self) -> SdiResult<bool> {
        let temperature = self.temperature()?;
        Ok(temperature >= self.thresholds.read().high)
    }

    fn apply_defaults(&self) -> SdiResult<()> {
        *self.thresholds.write() = self.config.thresholds;
        Ok(())
    }
}
