//! Fan API.

use crate::drivers::{FanDriver, ResourceBackend};
use crate::error::{SdiError, SdiResult};
use crate::registry::Registry;
use crate::types::ResourceHdl;
use log::debug;
use sdi_types::ResourceType;

pub struct FanApi<'a> {
    registry: &'a Registry,
}

impl<'a> FanApi<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    fn driver(&self, hdl: ResourceHdl) -> SdiResult<&'a dyn FanDriver> {
        match &self.registry.typed_resource(hdl, ResourceType::Fan)?.backend {
            ResourceBackend::Fan(d) => Ok(d.as_ref()),
            _ => Err(SdiError::invalid_handle(hdl.to_string())),
        }
    }

    /// Measured speed in RPM.
    pub fn speed_get(&self, hdl: ResourceHdl) -> SdiResult<u32> {
        self.driver(hdl)?.speed()
    }

    /// Sets the target speed.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` above the fan's maximum speed.
    pub fn speed_set(&self, hdl: ResourceHdl, rpm: u32) -> SdiResult<()> {
        debug!("Fan {} target {} rpm", hdl, rpm);
        self.driver(hdl)?.set_speed(rpm)
    }

    /// True when the fan is faulted.
    pub fn status_get(&self, hdl: ResourceHdl) -> SdiResult<bool> {
        self.driver(hdl)?.alert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusAddress, BusTransport, MemoryBus};
    use crate::control::SignalEntityDriver;
    use crate::drivers::{FanConfig, RegisterFan, SignalConfig};
    use pretty_assertions::assert_eq;
    use sdi_types::EntityType;
    use std::sync::Arc;

    const CTRL: BusAddress = BusAddress::new(1, 0x2c);

    fn setup() -> (Arc<MemoryBus>, Registry, ResourceHdl) {
        let bus = Arc::new(MemoryBus::new());
        bus.add_device(CTRL, 8);
        let mut builder = Registry::builder().unwrap();
        let tray = builder.add_entity(EntityType::FanTray, "tray", SignalEntityDriver::unmanaged());
        let fan = builder
            .add_resource(
                tray,
                "FAN1",
                ResourceBackend::Fan(Box::new(RegisterFan::new(
                    bus.clone(),
                    FanConfig {
                        bus: 1,
                        device: 0x2c,
                        speed_offset: 0,
                        target_offset: 2,
                        max_speed: 18_000,
                        default_speed: None,
                        fault: Some(SignalConfig {
                            bus: 1,
                            device: 0x2c,
                            offset: 4,
                            mask: 0x01,
                            active_low: false,
                        }),
                    },
                ))),
            )
            .unwrap();
        (bus, builder.build(), fan)
    }

    #[test]
    fn test_speed() {
        let (bus, registry, fan) = setup();
        let api = registry.fan_api();
        api.speed_set(fan, 12_000).unwrap();
        assert_eq!(bus.read_u16_be(CTRL, 2).unwrap(), 12_000);
        bus.write_u16_be(CTRL, 0, 11_950).unwrap();
        assert_eq!(api.speed_get(fan).unwrap(), 11_950);
        assert!(matches!(
            api.speed_set(fan, 18_001),
            Err(SdiError::InvalidParameter { .. })
        ));
        assert_eq!(bus.read_u16_be(CTRL, 2).unwrap(), 12_000);
    }

    #[test]
    fn test_fault_signal() {
        let (bus, registry, fan) = setup();
        let api = registry.fan_api();
        assert!(!api.status_get(fan).unwrap());
        bus.write_u8(CTRL, 4, 0x01).unwrap();
        assert!(api.status_get(fan).unwrap());
    }
}
