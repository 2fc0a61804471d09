//! Pluggable media (SFP/QSFP) diagnostics.
//!
//! Decoding is split from access: [`compliance`], [`diag`], [`params`] and
//! [`vendor`] are pure functions over EEPROM bytes, while [`MediaDevice`]
//! reads the bytes through the bus transport and enforces identification,
//! capability and channel checks.

pub mod compliance;
mod control;
mod device;
pub mod diag;
pub mod layout;
pub mod params;
mod health;
mod phy;
pub mod vendor;

pub use compliance::{QsfpCompliance, SfpCompliance, TransceiverDescriptor};
pub use control::ModuleControl;
pub use device::{LedPattern, MediaConfig, MediaDefaults, MediaDevice, MediaLedConfig, PhyConfig};
pub use diag::{
    AlarmLevel, Band, ChannelMonitor, ChannelMonitorStatus, ChannelStatus, ModuleMonitor,
    ModuleStatus, Monitor, RxPowerType, ThresholdSet, ThresholdType,
};
pub use params::{ChecksumStatus, FeatureSupport, MediaParameter};
pub use vendor::{ProductInfo, VendorInfoType};

#[cfg(test)]
pub(crate) use device::test_support;
