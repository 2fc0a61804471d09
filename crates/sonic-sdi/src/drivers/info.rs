//! Entity information and upgradable PLD drivers.

use super::{EntityInfoDriver, PldDriver};
use crate::bus::{BusAddress, SharedBus};
use crate::error::SdiResult;
use sdi_types::{AirFlow, PowerType};
use serde::{Deserialize, Serialize};

/// Manufacturing data of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityInfo {
    pub prod_name: String,
    pub ppid: String,
    pub hw_revision: String,
    pub platform_name: String,
    pub vendor_name: String,
    pub service_tag: String,
    pub part_number: String,
    /// Number of MAC addresses allocated from `base_mac`.
    pub mac_size: u32,
    pub base_mac: [u8; 6],
    /// Fans in a fan tray or PSU.
    pub num_fans: u32,
    /// Maximum fan speed in RPM.
    pub max_speed: u32,
    pub air_flow: AirFlow,
    /// PSU power rating in watts.
    pub power_rating: u32,
    pub power_type: PowerType,
}

/// Entity information taken from the platform description.
pub struct StaticEntityInfo {
    info: EntityInfo,
}

impl StaticEntityInfo {
    pub fn new(info: EntityInfo) -> Self {
        Self { info }
    }
}

impl EntityInfoDriver for StaticEntityInfo {
    fn read(&self) -> SdiResult<EntityInfo> {
        Ok(self.info.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PldConfig {
    pub bus: u32,
    pub device: u16,
    pub version_offset: u32,
}

/// PLD exposing its version in a register.
pub struct RegisterPld {
    bus: SharedBus,
    config: PldConfig,
}

impl RegisterPld {
    pub fn new(bus: SharedBus, config: PldConfig) -> Self {
        Self { bus, config }
    }
}

impl PldDriver for RegisterPld {
    fn version(&self) -> SdiResult<u32> {
        let address = BusAddress::new(self.config.bus, self.config.device);
        Ok(u32::from(self.bus.read_u8(address, self.config.version_offset)?))
    }
}

/// PLD whose version is fixed in the platform description.
pub struct StaticPld {
    version: u32,
}

impl StaticPld {
    pub fn new(version: u32) -> Self {
        Self { version }
    }
}

impl PldDriver for StaticPld {
    fn version(&self) -> SdiResult<u32> {
        Ok(self.version)
    }
}
