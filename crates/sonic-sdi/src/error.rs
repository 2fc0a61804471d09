//! SDI error types.
//!
//! Every fallible SDI operation returns [`SdiResult`]. Transport failures are
//! surfaced unchanged from the bus layer; nothing in this crate retries.

use crate::bus::{BusAddress, BusError};
use sdi_types::ResourceType;
use thiserror::Error;

/// Copyable discriminant of [`SdiError`], for callers that only branch on
/// the class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdiErrorKind {
    NotFound,
    InvalidHandle,
    InvalidChannel,
    AmbiguousAlias,
    BufferTooSmall,
    UnknownMediaType,
    DeviceUnresponsive,
    Bus,
    Unsupported,
    InvalidParameter,
    AlreadyExists,
    Config,
    Exhausted,
}

/// Error type for SDI operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SdiError {
    /// Lookup miss. Not exceptional; callers probe with lookups.
    #[error("Item not found: {item}")]
    NotFound { item: String },

    /// Handle is null, foreign, or of the wrong object kind for the call.
    #[error("Invalid handle: {handle}")]
    InvalidHandle { handle: String },

    /// Channel index outside the module's lanes.
    #[error("Invalid channel {channel}: module has {lane_count} lane(s)")]
    InvalidChannel { channel: u32, lane_count: u32 },

    /// Empty alias with more than one resource of the requested type.
    #[error("Ambiguous lookup: {count} {resource_type} resources on {entity}")]
    AmbiguousAlias {
        entity: String,
        resource_type: ResourceType,
        count: usize,
    },

    /// Caller buffer cannot hold the output plus its terminator.
    #[error("Buffer too small: {required} bytes required, {provided} provided")]
    BufferTooSmall { required: usize, provided: usize },

    /// Identifier byte does not name a supported module family.
    #[error("Unknown media type: identifier 0x{identifier:02x}")]
    UnknownMediaType { identifier: u8 },

    /// Transport reported a timeout.
    #[error("Device unresponsive: {device}")]
    DeviceUnresponsive { device: BusAddress },

    /// Transport reported a transfer failure.
    #[error("Bus error on {device}: {message}")]
    Bus { device: BusAddress, message: String },

    /// Capability absent on this hardware or module.
    #[error("Operation not supported: {feature}")]
    Unsupported { feature: String },

    /// Argument outside its legal domain.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Duplicate identity while populating the registry.
    #[error("Item already exists: {item}")]
    AlreadyExists { item: String },

    /// Platform description could not be loaded or is inconsistent.
    #[error("Platform configuration error: {message}")]
    Config { message: String },

    /// A finite identifier space has no values left.
    #[error("Exhausted: {resource}")]
    Exhausted { resource: String },
}

impl SdiError {
    /// Creates a not found error with an item description.
    pub fn not_found(item: impl Into<String>) -> Self {
        SdiError::NotFound { item: item.into() }
    }

    /// Creates an invalid handle error.
    pub fn invalid_handle(handle: impl Into<String>) -> Self {
        SdiError::InvalidHandle {
            handle: handle.into(),
        }
    }

    /// Creates an unsupported error with a feature description.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        SdiError::Unsupported {
            feature: feature.into(),
        }
    }

    /// Creates an invalid parameter error with a message.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        SdiError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(item: impl Into<String>) -> Self {
        SdiError::AlreadyExists { item: item.into() }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SdiError::Config {
            message: message.into(),
        }
    }

    /// Returns the class of this error.
    pub fn kind(&self) -> SdiErrorKind {
        match self {
            SdiError::NotFound { .. } => SdiErrorKind::NotFound,
            SdiError::InvalidHandle { .. } => SdiErrorKind::InvalidHandle,
            SdiError::InvalidChannel { .. } => SdiErrorKind::InvalidChannel,
            SdiError::AmbiguousAlias { .. } => SdiErrorKind::AmbiguousAlias,
            SdiError::BufferTooSmall { .. } => SdiErrorKind::BufferTooSmall,
            SdiError::UnknownMediaType { .. } => SdiErrorKind::UnknownMediaType,
            SdiError::DeviceUnresponsive { .. } => SdiErrorKind::DeviceUnresponsive,
            SdiError::Bus { .. } => SdiErrorKind::Bus,
            SdiError::Unsupported { .. } => SdiErrorKind::Unsupported,
            SdiError::InvalidParameter { .. } => SdiErrorKind::InvalidParameter,
            SdiError::AlreadyExists { .. } => SdiErrorKind::AlreadyExists,
            SdiError::Config { .. } => SdiErrorKind::Config,
            SdiError::Exhausted { .. } => SdiErrorKind::Exhausted,
        }
    }

    /// Returns true for transport faults, which may clear on a later call.
    ///
    /// Capability gaps and argument errors are permanent for the same input.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SdiError::DeviceUnresponsive { .. } | SdiError::Bus { .. }
        )
    }

    /// Returns true if this is a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdiError::NotFound { .. })
    }
}

impl From<BusError> for SdiError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::Timeout { device } => SdiError::DeviceUnresponsive { device },
            BusError::Transfer { device, message } => SdiError::Bus { device, message },
        }
    }
}

/// Result type for SDI operations.
pub type SdiResult<T> = Result<T, SdiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn device() -> BusAddress {
        BusAddress::new(3, 0x50)
    }

    #[test]
    fn test_bus_timeout_maps_to_unresponsive() {
        let err: SdiError = BusError::Timeout { device: device() }.into();
        assert_eq!(err, SdiError::DeviceUnresponsive { device: device() });
        assert_eq!(err.kind(), SdiErrorKind::DeviceUnresponsive);
        assert!(err.is_transient());
    }

    #[test]
    fn test_bus_transfer_maps_to_bus() {
        let err: SdiError = BusError::Transfer {
            device: device(),
            message: "nak".to_string(),
        }
        .into();
        assert_eq!(err.kind(), SdiErrorKind::Bus);
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "Bus error on i2c-3@0x50: nak");
    }

    #[test]
    fn test_permanent_errors() {
        assert!(!SdiError::unsupported("lp mode").is_transient());
        assert!(!SdiError::invalid_parameter("speed").is_transient());
        assert!(SdiError::not_found("fan").is_not_found());
        assert!(!SdiError::config("bad").is_not_found());
    }

    #[test]
    fn test_error_messages() {
        let err = SdiError::InvalidChannel {
            channel: 4,
            lane_count: 4,
        };
        assert_eq!(err.to_string(), "Invalid channel 4: module has 4 lane(s)");

        let err = SdiError::UnknownMediaType { identifier: 0x18 };
        assert_eq!(err.to_string(), "Unknown media type: identifier 0x18");

        let err = SdiError::BufferTooSmall {
            required: 17,
            provided: 8,
        };
        assert_eq!(err.kind(), SdiErrorKind::BufferTooSmall);
    }
}
