//! Bus transport seam.
//!
//! Every register and EEPROM access in this crate goes through
//! [`BusTransport`]. Real I2C/SMBus drivers live outside the crate; the
//! [`MemoryBus`] backend is used by tests and by `sdictl` in simulation.
//! Implementations serialize access to a physical bus themselves.

mod memory;

pub use memory::{MemoryBus, SimDevice};

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Location of a device: bus number plus 7-bit device address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BusAddress {
    pub bus: u32,
    pub device: u16,
}

impl BusAddress {
    pub const fn new(bus: u32, device: u16) -> Self {
        Self { bus, device }
    }

    /// Same bus, different device address.
    pub const fn with_device(&self, device: u16) -> Self {
        Self {
            bus: self.bus,
            device,
        }
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i2c-{}@0x{:02x}", self.bus, self.device)
    }
}

/// Failure reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// No response within the transport's deadline (includes an absent device).
    #[error("transaction timed out on {device}")]
    Timeout { device: BusAddress },

    /// The device answered but the transfer failed.
    #[error("transfer failed on {device}: {message}")]
    Transfer { device: BusAddress, message: String },
}

/// Byte-addressed register transport.
pub trait BusTransport: Send + Sync {
    /// Reads `buf.len()` bytes starting at `offset`.
    fn read(&self, device: BusAddress, offset: u32, buf: &mut [u8]) -> Result<(), BusError>;

    /// Writes `data` starting at `offset`.
    fn write(&self, device: BusAddress, offset: u32, data: &[u8]) -> Result<(), BusError>;

    fn read_u8(&self, device: BusAddress, offset: u32) -> Result<u8, BusError> {
        let mut buf = [0u8; 1];
        self.read(device, offset, &mut buf)?;
        Ok(buf[0])
    }

    fn write_u8(&self, device: BusAddress, offset: u32, value: u8) -> Result<(), BusError> {
        self.write(device, offset, &[value])
    }

    /// Reads a big-endian 16-bit register pair.
    fn read_u16_be(&self, device: BusAddress, offset: u32) -> Result<u16, BusError> {
        let mut buf = [0u8; 2];
        self.read(device, offset, &mut buf)?;
        Ok(BigEndian::read_u16(&buf))
    }

    fn write_u16_be(&self, device: BusAddress, offset: u32, value: u16) -> Result<(), BusError> {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, value);
        self.write(device, offset, &buf)
    }

    /// Read-modify-write of the bits selected by `mask`.
    fn update_bits(
        &self,
        device: BusAddress,
        offset: u32,
        mask: u8,
        value: u8,
    ) -> Result<(), BusError> {
        let current = self.read_u8(device, offset)?;
        let updated = (current & !mask) | (value & mask);
        if updated != current {
            self.write_u8(device, offset, updated)?;
        }
        Ok(())
    }
}

/// Transport shared between all drivers of a registry.
pub type SharedBus = Arc<dyn BusTransport>;
