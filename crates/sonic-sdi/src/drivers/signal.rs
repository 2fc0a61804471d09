//! Single-bit control/status signals in CPLD registers.

use crate::bus::{BusAddress, SharedBus};
use crate::error::SdiResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location and polarity of a register bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub bus: u32,
    pub device: u16,
    pub offset: u32,
    pub mask: u8,
    #[serde(default)]
    pub active_low: bool,
}

impl SignalConfig {
    pub fn address(&self) -> BusAddress {
        BusAddress::new(self.bus, self.device)
    }
}

/// A register bit bound to a transport.
#[derive(Clone)]
pub struct Signal {
    bus: SharedBus,
    config: SignalConfig,
}

impl Signal {
    pub fn new(bus: SharedBus, config: SignalConfig) -> Self {
        Self { bus, config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Returns true if the signal is at its active level.
    pub fn is_asserted(&self) -> SdiResult<bool> {
        let value = self.bus.read_u8(self.config.address(), self.config.offset)?;
        let high = value & self.config.mask != 0;
        Ok(high != self.config.active_low)
    }

    /// Drives the signal to its active (`true`) or inactive level.
    pub fn set(&self, asserted: bool) -> SdiResult<()> {
        let high = asserted != self.config.active_low;
        let value = if high { self.config.mask } else { 0 };
        self.bus
            .update_bits(self.config.address(), self.config.offset, self.config.mask, value)?;
        Ok(())
    }

    /// Asserts then releases the signal.
    pub fn pulse(&self) -> SdiResult<()> {
        self.set(true)?;
        self.set(false)
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal").field("config", &self.config).finish()
    }
}
