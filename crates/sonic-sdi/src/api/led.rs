//! LED and digit-display LED APIs.

use crate::drivers::{DigitDisplayDriver, LedDriver, ResourceBackend};
use crate::error::{SdiError, SdiResult};
use crate::registry::Registry;
use crate::types::ResourceHdl;
use sdi_types::ResourceType;

pub struct LedApi<'a> {
    registry: &'a Registry,
}

impl<'a> LedApi<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    fn driver(&self, hdl: ResourceHdl) -> SdiResult<&'a dyn LedDriver> {
        match &self.registry.typed_resource(hdl, ResourceType::Led)?.backend {
            ResourceBackend::Led(d) => Ok(d.as_ref()),
            _ => Err(SdiError::invalid_handle(hdl.to_string())),
        }
    }

    pub fn on(&self, hdl: ResourceHdl) -> SdiResult<()> {
        self.driver(hdl)?.set(true)
    }

    pub fn off(&self, hdl: ResourceHdl) -> SdiResult<()> {
        self.driver(hdl)?.set(false)
    }

    /// True when lit.
    pub fn state_get(&self, hdl: ResourceHdl) -> SdiResult<bool> {
        self.driver(hdl)?.is_on()
    }
}

pub struct DigitDisplayApi<'a> {
    registry: &'a Registry,
}

impl<'a> DigitDisplayApi<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    fn driver(&self, hdl: ResourceHdl) -> SdiResult<&'a dyn DigitDisplayDriver> {
        match &self.registry.typed_resource(hdl, ResourceType::DigitDisplayLed)?.backend {
            ResourceBackend::DigitDisplayLed(d) => Ok(d.as_ref()),
            _ => Err(SdiError::invalid_handle(hdl.to_string())),
        }
    }

    /// Shows `text`, right-aligned.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the text is wider than the display or holds
    /// characters other than digits, space, `.` and `-`. Nothing is written
    /// in that case.
    pub fn set(&self, hdl: ResourceHdl, text: &str) -> SdiResult<()> {
        self.driver(hdl)?.set_text(text)
    }

    pub fn text_get(&self, hdl: ResourceHdl) -> SdiResult<String> {
        self.driver(hdl)?.text()
    }

    pub fn on(&self, hdl: ResourceHdl) -> SdiResult<()> {
        self.driver(hdl)?.set_enabled(true)
    }

    pub fn off(&self, hdl: ResourceHdl) -> SdiResult<()> {
        self.driver(hdl)?.set_enabled(false)
    }

    pub fn state_get(&self, hdl: ResourceHdl) -> SdiResult<bool> {
        self.driver(hdl)?.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusAddress, BusTransport, MemoryBus};
    use crate::control::SignalEntityDriver;
    use crate::drivers::{DigitDisplayConfig, LedConfig, RegisterDigitDisplay, SignalConfig, SignalLed};
    use pretty_assertions::assert_eq;
    use sdi_types::EntityType;
    use std::sync::Arc;

    const CPLD: BusAddress = BusAddress::new(0, 0x31);

    fn bit(offset: u32, mask: u8) -> SignalConfig {
        SignalConfig {
            bus: 0,
            device: 0x31,
            offset,
            mask,
            active_low: false,
        }
    }

    fn setup() -> (Arc<MemoryBus>, Registry, ResourceHdl, ResourceHdl) {
        let bus = Arc::new(MemoryBus::new());
        bus.add_device(CPLD, 16);
        let mut builder = Registry::builder().unwrap();
        let board = builder.add_entity(EntityType::SystemBoard, "board", SignalEntityDriver::unmanaged());
        let led = builder
            .add_resource(
                board,
                "STATUS",
                ResourceBackend::Led(Box::new(SignalLed::new(
                    bus.clone(),
                    LedConfig {
                        signal: bit(0, 0x02),
                        default_on: None,
                    },
                ))),
            )
            .unwrap();
        let display = builder
            .add_resource(
                board,
                "STACK",
                ResourceBackend::DigitDisplayLed(Box::new(RegisterDigitDisplay::new(
                    bus.clone(),
                    DigitDisplayConfig {
                        bus: 0,
                        device: 0x31,
                        offset: 8,
                        width: 2,
                        enable: bit(1, 0x01),
                        default_text: None,
                    },
                ))),
            )
            .unwrap();
        (bus, builder.build(), led, display)
    }

    #[test]
    fn test_led_on_off() {
        let (bus, registry, led, _) = setup();
        let api = registry.led_api();
        api.on(led).unwrap();
        assert!(api.state_get(led).unwrap());
        assert_eq!(bus.read_u8(CPLD, 0).unwrap(), 0x02);
        api.off(led).unwrap();
        assert!(!api.state_get(led).unwrap());
    }

    #[test]
    fn test_digit_display() {
        let (_bus, registry, led, display) = setup();
        let api = registry.digit_display_api();
        api.set(display, "7").unwrap();
        assert_eq!(api.text_get(display).unwrap(), "7");
        assert!(matches!(
            api.set(display, "123"),
            Err(SdiError::InvalidParameter { .. })
        ));
        assert!(matches!(
            api.set(display, "A"),
            Err(SdiError::InvalidParameter { .. })
        ));
        assert_eq!(api.text_get(display).unwrap(), "7");
        api.on(display).unwrap();
        assert!(api.state_get(display).unwrap());
        api.off(display).unwrap();
        assert!(!api.state_get(display).unwrap());

        assert!(matches!(api.on(led), Err(SdiError::InvalidHandle { .. })));
        assert!(matches!(
            registry.led_api().on(display),
            Err(SdiError::InvalidHandle { .. })
        ));
    }
}
