//! Entity-level control: presence, fault, PSU power and reset.

use crate::drivers::Signal;
use crate::error::{SdiError, SdiResult};
use sdi_types::ResetType;
use std::fmt;

/// Observed condition of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    Absent,
    PresentHealthy,
    PresentFaulted,
}

impl EntityState {
    pub fn from_readings(present: bool, faulted: bool) -> Self {
        match (present, faulted) {
            (false, _) => EntityState::Absent,
            (true, false) => EntityState::PresentHealthy,
            (true, true) => EntityState::PresentFaulted,
        }
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityState::Absent => write!(f, "absent"),
            EntityState::PresentHealthy => write!(f, "present"),
            EntityState::PresentFaulted => write!(f, "faulted"),
        }
    }
}

/// Hardware access for one entity.
pub trait EntityDriver: Send + Sync {
    fn presence(&self) -> SdiResult<bool>;
    fn fault(&self) -> SdiResult<bool>;
    /// PSU output power good.
    fn output_power_good(&self) -> SdiResult<bool>;
    fn set_power(&self, enable: bool) -> SdiResult<()>;
    /// Starts a reset; completion is observed through presence and fault.
    fn reset(&self, reset_type: ResetType) -> SdiResult<()>;
}

/// Entity driver built from optional CPLD signals.
///
/// A missing presence signal means the entity is not removable and is
/// always present; a missing fault signal means it never reports faults.
/// Missing power or reset signals make those operations unsupported.
#[derive(Debug, Default)]
pub struct SignalEntityDriver {
    pub presence: Option<Signal>,
    pub fault: Option<Signal>,
    pub power_good: Option<Signal>,
    pub power_control: Option<Signal>,
    pub warm_reset: Option<Signal>,
    pub cold_reset: Option<Signal>,
}

impl SignalEntityDriver {
    /// Driver for an entity with no managed signals.
    pub fn unmanaged() -> Box<dyn EntityDriver> {
        Box::new(Self::default())
    }
}

impl EntityDriver for SignalEntityDriver {
    fn presence(&self) -> SdiResult<bool> {
        self.presence.as_ref().map_or(Ok(true), Signal::is_asserted)
    }

    fn fault(&self) -> SdiResult<bool> {
        self.fault.as_ref().map_or(Ok(false), Signal::is_asserted)
    }

    fn output_power_good(&self) -> SdiResult<bool> {
        self.power_good
            .as_ref()
            .ok_or_else(|| SdiError::unsupported("output power status"))?
            .is_asserted()
    }

    fn set_power(&self, enable: bool) -> SdiResult<()> {
        self.power_control
            .as_ref()
            .ok_or_else(|| SdiError::unsupported("power control"))?
            .set(enable)
    }

    fn reset(&self, reset_type: ResetType) -> SdiResult<()> {
        let signal = match reset_type {
            ResetType::Warm => self.warm_reset.as_ref(),
            ResetType::Cold => self.cold_reset.as_ref(),
        };
        signal
            .ok_or_else(|| SdiError::unsupported(format!("{} reset", reset_type)))?
            .pulse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusAddress, BusTransport, MemoryBus};
    use crate::drivers::SignalConfig;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const CPLD: BusAddress = BusAddress::new(0, 0x31);

    fn signal(bus: &Arc<MemoryBus>, mask: u8) -> Signal {
        Signal::new(
            bus.clone(),
            SignalConfig {
                bus: 0,
                device: 0x31,
                offset: 0,
                mask,
                active_low: false,
            },
        )
    }

    #[test]
    fn test_state_from_readings() {
        assert_eq!(EntityState::from_readings(false, true), EntityState::Absent);
        assert_eq!(
            EntityState::from_readings(true, false),
            EntityState::PresentHealthy
        );
        assert_eq!(
            EntityState::from_readings(true, true),
            EntityState::PresentFaulted
        );
    }

    #[test]
    fn test_unmanaged_entity() {
        let driver = SignalEntityDriver::unmanaged();
        assert!(driver.presence().unwrap());
        assert!(!driver.fault().unwrap());
        assert!(matches!(
            driver.output_power_good(),
            Err(SdiError::Unsupported { .. })
        ));
        assert!(matches!(
            driver.reset(ResetType::Cold),
            Err(SdiError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_signal_readings() {
        let bus = Arc::new(MemoryBus::new());
        bus.add_device(CPLD, 4);
        let driver = SignalEntityDriver {
            presence: Some(signal(&bus, 0x01)),
            fault: Some(signal(&bus, 0x02)),
            power_control: Some(signal(&bus, 0x10)),
            ..Default::default()
        };
        assert!(!driver.presence().unwrap());
        bus.write_u8(CPLD, 0, 0x03).unwrap();
        assert!(driver.presence().unwrap());
        assert!(driver.fault().unwrap());

        driver.set_power(true).unwrap();
        assert_eq!(bus.read_u8(CPLD, 0).unwrap(), 0x13);
    }
}
