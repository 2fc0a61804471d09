//! Temperature sensor API.

use crate::drivers::{ResourceBackend, ThermalDriver};
use crate::error::{SdiError, SdiResult};
use crate::registry::Registry;
use crate::types::ResourceHdl;
use log::debug;
use sdi_types::{ResourceType, ThresholdLevel};

pub struct ThermalApi<'a> {
    registry: &'a Registry,
}

impl<'a> ThermalApi<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    fn driver(&self, hdl: ResourceHdl) -> SdiResult<&'a dyn ThermalDriver> {
        match &self.registry.typed_resource(hdl, ResourceType::Temperature)?.backend {
            ResourceBackend::Temperature(d) => Ok(d.as_ref()),
            _ => Err(SdiError::invalid_handle(hdl.to_string())),
        }
    }

    /// Current temperature in degrees Celsius.
    pub fn temperature_get(&self, hdl: ResourceHdl) -> SdiResult<i32> {
        self.driver(hdl)?.temperature()
    }

    pub fn threshold_get(&self, hdl: ResourceHdl, level: ThresholdLevel) -> SdiResult<i32> {
        self.driver(hdl)?.threshold(level)
    }

    /// Sets one threshold.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the new value would break
    /// `low <= high <= critical`.
    pub fn threshold_set(&self, hdl: ResourceHdl, level: ThresholdLevel, value: i32) -> SdiResult<()> {
        debug!("Setting {} threshold of {} to {}", level, hdl, value);
        self.driver(hdl)?.set_threshold(level, value)
    }

    /// True when the reading is at or above the high threshold.
    pub fn status_get(&self, hdl: ResourceHdl) -> SdiResult<bool> {
        self.driver(hdl)?.alert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusAddress, BusTransport, MemoryBus};
    use crate::control::SignalEntityDriver;
    use crate::drivers::{RegisterThermal, StaticPld, ThermalConfig, ThermalThresholds};
    use pretty_assertions::assert_eq;
    use sdi_types::EntityType;
    use std::sync::Arc;

    const SENSOR: BusAddress = BusAddress::new(2, 0x4c);

    fn setup() -> (Arc<MemoryBus>, Registry, ResourceHdl, ResourceHdl) {
        let bus = Arc::new(MemoryBus::new());
        bus.add_device(SENSOR, 4);
        let mut builder = Registry::builder().unwrap();
        let board = builder.add_entity(EntityType::SystemBoard, "board", SignalEntityDriver::unmanaged());
        let sensor = builder
            .add_resource(
                board,
                "CPU",
                ResourceBackend::Temperature(Box::new(RegisterThermal::new(
                    bus.clone(),
                    ThermalConfig {
                        bus: 2,
                        device: 0x4c,
                        offset: 1,
                        thresholds: ThermalThresholds {
                            low: 5,
                            high: 70,
                            critical: 90,
                        },
                    },
                ))),
            )
            .unwrap();
        let pld = builder
            .add_resource(board, "CPLD", ResourceBackend::UpgradablePld(Box::new(StaticPld::new(3))))
            .unwrap();
        (bus, builder.build(), sensor, pld)
    }

    #[test]
    fn test_temperature_and_alert() {
        let (bus, registry, sensor, _) = setup();
        let api = registry.thermal_api();
        bus.write_u8(SENSOR, 1, 45).unwrap();
        assert_eq!(api.temperature_get(sensor).unwrap(), 45);
        assert!(!api.status_get(sensor).unwrap());
        bus.write_u8(SENSOR, 1, 70).unwrap();
        assert!(api.status_get(sensor).unwrap());
        bus.write_u8(SENSOR, 1, 0xf6).unwrap();
        assert_eq!(api.temperature_get(sensor).unwrap(), -10);
    }

    #[test]
    fn test_thresholds() {
        let (_bus, registry, sensor, _) = setup();
        let api = registry.thermal_api();
        assert_eq!(api.threshold_get(sensor, ThresholdLevel::High).unwrap(), 70);
        api.threshold_set(sensor, ThresholdLevel::High, 75).unwrap();
        assert_eq!(api.threshold_get(sensor, ThresholdLevel::High).unwrap(), 75);
        assert!(matches!(
            api.threshold_set(sensor, ThresholdLevel::Low, 80),
            Err(SdiError::InvalidParameter { .. })
        ));
        assert_eq!(api.threshold_get(sensor, ThresholdLevel::Low).unwrap(), 5);
    }

    #[test]
    fn test_wrong_resource_type() {
        let (_bus, registry, _, pld) = setup();
        assert!(matches!(
            registry.thermal_api().temperature_get(pld),
            Err(SdiError::InvalidHandle { .. })
        ));
    }
}
