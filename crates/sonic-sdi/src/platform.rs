//! Platform description.
//!
//! A platform file lists the chassis entities, their control signals and
//! their resources, each mapped to a bus location. It is YAML or JSON; the
//! format is chosen by file extension. An optional `simulation` section
//! declares [`MemoryBus`] devices so a platform can be exercised without
//! hardware.
//!
//! ```yaml
//! name: example-1u
//! entities:
//!   - type: psu_tray
//!     name: PSU 1
//!     presence: { bus: 0, device: 0x31, offset: 0, mask: 0x01 }
//!     resources:
//!       - type: fan
//!         alias: PSU1 FAN
//!         bus: 1
//!         device: 0x2c
//!         speed_offset: 0
//!         target_offset: 2
//! ```

use crate::bus::{MemoryBus, SharedBus, SimDevice};
use crate::control::SignalEntityDriver;
use crate::drivers::{
    DigitDisplayConfig, EntityInfo, FanConfig, LedConfig, PldConfig, RegisterDigitDisplay,
    RegisterFan, RegisterPld, RegisterThermal, ResourceBackend, Signal, SignalConfig,
    SignalLed, StaticEntityInfo, StaticPld, ThermalConfig,
};
use crate::error::{SdiError, SdiResult};
use crate::media::{MediaConfig, MediaDevice};
use crate::registry::Registry;
use log::{debug, info};
use sdi_types::{EntityType, ResourceType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete platform description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
    /// Devices backing the in-memory bus.
    #[serde(default)]
    pub simulation: Vec<SimDevice>,
}

/// One entity and its control signals. Absent signals follow the rules of
/// [`SignalEntityDriver`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<SignalConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<SignalConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_good: Option<SignalConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_control: Option<SignalConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warm_reset: Option<SignalConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold_reset: Option<SignalConfig>,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub alias: String,
    #[serde(flatten)]
    pub driver: DriverConfig,
}

/// Driver parameters, tagged by resource type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriverConfig {
    Temperature(ThermalConfig),
    Fan(FanConfig),
    Led(LedConfig),
    DigitDisplayLed(DigitDisplayConfig),
    EntityInfo(EntityInfo),
    UpgradablePld(PldSource),
    Media(MediaConfig),
}

/// PLD version read from a register or fixed in the description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PldSource {
    Register(PldConfig),
    Static { version: u32 },
}

impl DriverConfig {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            DriverConfig::Temperature(_) => ResourceType::Temperature,
            DriverConfig::Fan(_) => ResourceType::Fan,
            DriverConfig::Led(_) => ResourceType::Led,
            DriverConfig::DigitDisplayLed(_) => ResourceType::DigitDisplayLed,
            DriverConfig::EntityInfo(_) => ResourceType::EntityInfo,
            DriverConfig::UpgradablePld(_) => ResourceType::UpgradablePld,
            DriverConfig::Media(_) => ResourceType::Media,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            DriverConfig::Temperature(c) => {
                let t = c.thresholds;
                if t.low > t.high || t.high > t.critical {
                    return Err(format!(
                        "thresholds must satisfy low <= high <= critical ({:?})",
                        t
                    ));
                }
            }
            DriverConfig::Fan(c) => {
                if c.max_speed == 0 {
                    return Err("max_speed must be > 0".to_string());
                }
                if c.default_speed.is_some_and(|s| s > c.max_speed) {
                    return Err("default_speed exceeds max_speed".to_string());
                }
            }
            DriverConfig::DigitDisplayLed(c) => {
                if c.width == 0 {
                    return Err("width must be > 0".to_string());
                }
                if c.default_text.as_ref().is_some_and(|t| t.len() > c.width) {
                    return Err("default_text is wider than the display".to_string());
                }
            }
            DriverConfig::Media(c) => {
                if let Some(led) = &c.led {
                    if led.patterns.iter().any(|p| p.value == led.off_value) {
                        return Err("LED pattern value collides with off_value".to_string());
                    }
                }
            }
            DriverConfig::Led(_) | DriverConfig::EntityInfo(_) | DriverConfig::UpgradablePld(_) => {}
        }
        Ok(())
    }

    fn backend(&self, bus: &SharedBus) -> ResourceBackend {
        match self {
            DriverConfig::Temperature(c) => {
                ResourceBackend::Temperature(Box::new(RegisterThermal::new(bus.clone(), c.clone())))
            }
            DriverConfig::Fan(c) => {
                ResourceBackend::Fan(Box::new(RegisterFan::new(bus.clone(), c.clone())))
            }
            DriverConfig::Led(c) => {
                ResourceBackend::Led(Box::new(SignalLed::new(bus.clone(), c.clone())))
            }
            DriverConfig::DigitDisplayLed(c) => ResourceBackend::DigitDisplayLed(Box::new(
                RegisterDigitDisplay::new(bus.clone(), c.clone()),
            )),
            DriverConfig::EntityInfo(info) => {
                ResourceBackend::EntityInfo(Box::new(StaticEntityInfo::new(info.clone())))
            }
            DriverConfig::UpgradablePld(PldSource::Register(c)) => {
                ResourceBackend::UpgradablePld(Box::new(RegisterPld::new(bus.clone(), c.clone())))
            }
            DriverConfig::UpgradablePld(PldSource::Static { version }) => {
                ResourceBackend::UpgradablePld(Box::new(StaticPld::new(*version)))
            }
            DriverConfig::Media(c) => {
                ResourceBackend::Media(Box::new(MediaDevice::new(bus.clone(), c.clone())))
            }
        }
    }
}

impl EntityConfig {
    fn driver(&self, bus: &SharedBus) -> SignalEntityDriver {
        let signal = |c: &Option<SignalConfig>| c.as_ref().map(|c| Signal::new(bus.clone(), *c));
        SignalEntityDriver {
            presence: signal(&self.presence),
            fault: signal(&self.fault),
            power_good: signal(&self.power_good),
            power_control: signal(&self.power_control),
            warm_reset: signal(&self.warm_reset),
            cold_reset: signal(&self.cold_reset),
        }
    }
}

impl PlatformConfig {
    pub fn from_yaml_str(text: &str) -> SdiResult<Self> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| SdiError::config(format!("Failed to parse YAML platform: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> SdiResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| SdiError::config(format!("Failed to parse JSON platform: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a platform file; `.json` files are JSON, anything else YAML.
    pub fn load(path: impl AsRef<Path>) -> SdiResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            SdiError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!("Loading platform description {}", path.display());
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn to_yaml_string(&self) -> SdiResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| SdiError::config(format!("Failed to serialize platform: {}", e)))
    }

    /// Checks driver parameters and resource identities.
    pub fn validate(&self) -> SdiResult<()> {
        for entity in &self.entities {
            if entity.name.is_empty() {
                return Err(SdiError::config(format!("{} entity without a name", entity.entity_type)));
            }
            for resource in &entity.resources {
                resource.driver.validate().map_err(|e| {
                    SdiError::config(format!(
                        "{} resource {:?} on {}: {}",
                        resource.driver.resource_type(),
                        resource.alias,
                        entity.name,
                        e
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// In-memory bus holding the devices of the `simulation` section.
    pub fn simulation_bus(&self) -> SdiResult<MemoryBus> {
        MemoryBus::from_sim_devices(&self.simulation).map_err(SdiError::config)
    }
}

impl Registry {
    /// Builds a registry from a platform description, binding every driver
    /// to `bus`. Entity instances follow file order within each type.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` for a duplicate `(type, alias)` on one entity, and
    /// `Config` for invalid driver parameters.
    pub fn from_platform(config: &PlatformConfig, bus: SharedBus) -> SdiResult<Registry> {
        config.validate()?;
        let mut builder = Registry::builder()?;
        for entity in &config.entities {
            let hdl = builder.add_entity(entity.entity_type, entity.name.as_str(), Box::new(entity.driver(&bus)));
            for resource in &entity.resources {
                builder.add_resource(hdl, resource.alias.as_str(), resource.driver.backend(&bus))?;
            }
        }
        let registry = builder.build();
        info!(
            "Platform {:?} loaded: {} entities",
            config.name,
            config.entities.len()
        );
        Ok(registry)
    }
}
