//! System Device Interface (SDI) for a modular switch chassis.
//!
//! This crate gives platform software one uniform, type-safe view of the
//! chassis hardware: removable entities (system board, fan trays, PSUs) and
//! the resources they own (thermal sensors, fans, LEDs, digit displays,
//! inventory data, PLDs and pluggable SFP/QSFP media).
//!
//! # Architecture
//!
//! - [`bus`]: the register transport seam and the in-memory backend
//! - [`types`]: type-safe entity and resource handles
//! - [`error`]: error types
//! - [`registry`] and [`directory`]: the populate-once object registry and
//!   its lookups
//! - [`control`]: entity presence, fault, power and reset
//! - [`drivers`]: simple resource drivers
//! - [`media`]: the media diagnostics engine (EEPROM decode, monitors,
//!   thresholds, status flags, control)
//! - [`api`]: handle-based operation sets over a [`Registry`]
//! - [`platform`]: the platform description that populates a registry
//!
//! # Example
//!
//! ```ignore
//! use sonic_sdi::{PlatformConfig, Registry, SdiResult};
//! use sdi_types::{EntityType, ResourceType};
//! use std::sync::Arc;
//!
//! fn psu_fan_speed(config: &PlatformConfig) -> SdiResult<u32> {
//!     let bus = Arc::new(config.simulation_bus()?);
//!     let registry = Registry::from_platform(config, bus)?;
//!     let psu = registry.entity_lookup(EntityType::PsuTray, 0)?;
//!     let fan = registry.resource_lookup(psu, ResourceType::Fan, None)?;
//!     registry.fan_api().speed_get(fan)
//! }
//! ```

pub mod api;
pub mod bus;
pub mod control;
pub mod directory;
pub mod drivers;
pub mod error;
pub mod media;
pub mod platform;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use api::{
    DigitDisplayApi, EntityApi, EntityInfoApi, FanApi, LedApi, MediaApi, PldApi, ThermalApi,
};
pub use bus::{BusAddress, BusError, BusTransport, MemoryBus, SharedBus, SimDevice};
pub use control::{EntityDriver, EntityState, SignalEntityDriver};
pub use drivers::{EntityInfo, ResourceBackend};
pub use error::{SdiError, SdiErrorKind, SdiResult};
pub use media::MediaDevice;
pub use platform::PlatformConfig;
pub use registry::{Entity, Registry, RegistryBuilder, Resource, SdiObject};
pub use types::{AnyHandle, EntityHdl, ObjectType, RawHandle, Resolved, ResourceHdl};
