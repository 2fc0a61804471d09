//! Resource drivers.
//!
//! Each resource type has a small driver trait; the registry stores one
//! [`ResourceBackend`] per resource. The register-backed implementations in
//! this module are configured from the platform description. Media modules
//! use the richer [`MediaDevice`](crate::media::MediaDevice).

mod fan;
mod info;
mod led;
mod signal;
mod thermal;

pub use fan::{FanConfig, RegisterFan};
pub use info::{EntityInfo, PldConfig, RegisterPld, StaticEntityInfo, StaticPld};
pub use led::{DigitDisplayConfig, LedConfig, RegisterDigitDisplay, SignalLed};
pub use signal::{Signal, SignalConfig};
pub use thermal::{RegisterThermal, ThermalConfig, ThermalThresholds};

use crate::error::SdiResult;
use crate::media::MediaDevice;
use sdi_types::{ResourceType, ThresholdLevel};

pub trait ThermalDriver: Send + Sync {
    /// Current temperature in degrees Celsius.
    fn temperature(&self) -> SdiResult<i32>;
    fn threshold(&self, level: ThresholdLevel) -> SdiResult<i32>;
    fn set_threshold(&self, level: ThresholdLevel, value: i32) -> SdiResult<()>;
    /// True when the sensor is at or above its high threshold.
    fn alert(&self) -> SdiResult<bool>;
    fn apply_defaults(&self) -> SdiResult<()> {
        Ok(())
    }
}

pub trait FanDriver: Send + Sync {
    /// Measured speed in RPM.
    fn speed(&self) -> SdiResult<u32>;
    fn set_speed(&self, rpm: u32) -> SdiResult<()>;
    /// True when the fan is faulted.
    fn alert(&self) -> SdiResult<bool>;
    fn apply_defaults(&self) -> SdiResult<()> {
        Ok(())
    }
}

pub trait LedDriver: Send + Sync {
    fn set(&self, on: bool) -> SdiResult<()>;
    fn is_on(&self) -> SdiResult<bool>;
    fn apply_defaults(&self) -> SdiResult<()> {
        Ok(())
    }
}

pub trait DigitDisplayDriver: Send + Sync {
    fn set_text(&self, text: &str) -> SdiResult<()>;
    fn text(&self) -> SdiResult<String>;
    fn set_enabled(&self, on: bool) -> SdiResult<()>;
    fn is_enabled(&self) -> SdiResult<bool>;
    fn apply_defaults(&self) -> SdiResult<()> {
        Ok(())
    }
}

pub trait EntityInfoDriver: Send + Sync {
    fn read(&self) -> SdiResult<EntityInfo>;
}

pub trait PldDriver: Send + Sync {
    fn version(&self) -> SdiResult<u32>;
}

/// Driver behind a resource; the variant fixes the resource type.
pub enum ResourceBackend {
    Temperature(Box<dyn ThermalDriver>),
    Fan(Box<dyn FanDriver>),
    Led(Box<dyn LedDriver>),
    DigitDisplayLed(Box<dyn DigitDisplayDriver>),
    EntityInfo(Box<dyn EntityInfoDriver>),
    UpgradablePld(Box<dyn PldDriver>),
    Media(Box<MediaDevice>),
}

impl ResourceBackend {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceBackend::Temperature(_) => ResourceType::Temperature,
            ResourceBackend::Fan(_) => ResourceType::Fan,
            ResourceBackend::Led(_) => ResourceType::Led,
            ResourceBackend::DigitDisplayLed(_) => ResourceType::DigitDisplayLed,
            ResourceBackend::EntityInfo(_) => ResourceType::EntityInfo,
            ResourceBackend::UpgradablePld(_) => ResourceType::UpgradablePld,
            ResourceBackend::Media(_) => ResourceType::Media,
        }
    }

    /// Applies the platform defaults of the resource. Idempotent.
    pub fn apply_defaults(&self) -> SdiResult<()> {
        match self {
            ResourceBackend::Temperature(d) => d.apply_defaults(),
            ResourceBackend::Fan(d) => d.apply_defaults(),
            ResourceBackend::Led(d) => d.apply_defaults(),
            ResourceBackend::DigitDisplayLed(d) => d.apply_defaults(),
            ResourceBackend::EntityInfo(_) | ResourceBackend::UpgradablePld(_) => Ok(()),
            ResourceBackend::Media(d) => d.apply_defaults(),
        }
    }
}
