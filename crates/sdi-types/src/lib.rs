//! Common value types for the SONiC System Device Interface (SDI).
//!
//! This crate holds the plain enumerations shared between the SDI library,
//! platform configuration files and operator tooling:
//!
//! - [`EntityType`], [`ResetType`]: removable chassis components and how they reset
//! - [`ResourceType`], [`ThresholdLevel`]: per-entity sensors and controls
//! - [`FormFactor`], [`MediaSpeed`], [`MediaMode`], [`MediaType`]: pluggable media
//! - [`AirFlow`], [`PowerType`]: entity information fields

mod entity;
mod media;
mod resource;

pub use entity::{EntityType, ResetType};
pub use media::{FormFactor, MediaMode, MediaSpeed, MediaType};
pub use resource::{AirFlow, PowerType, ResourceType, ThresholdLevel};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid entity type: {0}")]
    InvalidEntityType(String),

    #[error("invalid reset type: {0}")]
    InvalidResetType(String),

    #[error("invalid resource type: {0}")]
    InvalidResourceType(String),

    #[error("invalid threshold level: {0}")]
    InvalidThresholdLevel(String),

    #[error("invalid media form factor: {0}")]
    InvalidFormFactor(String),

    #[error("invalid media speed: {0}")]
    InvalidMediaSpeed(String),

    #[error("invalid media mode: {0}")]
    InvalidMediaMode(String),
}
