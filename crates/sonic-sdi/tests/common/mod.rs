//! Fixture for the integration tests: the sdictl sample platform on an
//! in-memory bus.

#![allow(dead_code)]

use sdi_types::{EntityType, ResourceType};
use sonic_sdi::{BusAddress, EntityHdl, MemoryBus, PlatformConfig, Registry, ResourceHdl, SharedBus};
use std::sync::Arc;

pub const SAMPLE_PLATFORM: &str = include_str!("../../../sdictl/configs/sample-platform.yaml");

pub const CPLD: BusAddress = BusAddress::new(0, 0x31);
pub const SFP_EEPROM: BusAddress = BusAddress::new(10, 0x50);
pub const QSFP_EEPROM: BusAddress = BusAddress::new(11, 0x50);

/// CPLD registers of the sample platform.
pub mod cpld {
    pub const PRESENCE: u32 = 0x01;
    pub const FAULT: u32 = 0x02;
    pub const PSU_POWER: u32 = 0x03;
    pub const LEDS: u32 = 0x05;
    pub const DISPLAY_ENABLE: u32 = 0x06;
    pub const DISPLAY: u32 = 0x08;
    pub const MEDIA_PRESENCE: u32 = 0x10;
    pub const QSFP_CONTROL: u32 = 0x11;
    pub const PORT_LEDS: u32 = 0x20;
}

pub struct Platform {
    pub bus: Arc<MemoryBus>,
    pub registry: Registry,
}

pub fn sample_platform() -> Platform {
    let config = PlatformConfig::from_yaml_str(SAMPLE_PLATFORM).expect("sample platform parses");
    let bus = Arc::new(config.simulation_bus().expect("simulation bus"));
    let shared: SharedBus = bus.clone();
    let registry = Registry::from_platform(&config, shared).expect("registry builds");
    Platform { bus, registry }
}

impl Platform {
    pub fn entity(&self, entity_type: EntityType) -> EntityHdl {
        self.registry
            .entity_lookup(entity_type, 0)
            .expect("entity exists")
    }

    pub fn resource(
        &self,
        entity_type: EntityType,
        resource_type: ResourceType,
        alias: &str,
    ) -> ResourceHdl {
        self.registry
            .resource_lookup(self.entity(entity_type), resource_type, Some(alias))
            .expect("resource exists")
    }

    pub fn media(&self, alias: &str) -> ResourceHdl {
        self.resource(EntityType::SystemBoard, ResourceType::Media, alias)
    }
}
