//! Module control: transmitters, low-power mode, reset and port LEDs.

use super::device::{MediaDevice, MediaLedConfig};
use super::layout::{qsfp, sfp};
use crate::bus::BusAddress;
use crate::error::{SdiError, SdiResult};
use log::{debug, info};
use sdi_types::{FormFactor, MediaSpeed};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Module-wide control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleControl {
    LpMode,
    Reset,
}

impl fmt::Display for ModuleControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleControl::LpMode => write!(f, "low-power mode"),
            ModuleControl::Reset => write!(f, "reset"),
        }
    }
}

impl MediaDevice {
    fn require_tx_control(&self) -> SdiResult<()> {
        let supported = match self.form_factor() {
            FormFactor::Sfp => {
                self.read_field_u8(sfp::ENHANCED_OPTIONS)? & sfp::ENH_SOFT_TX_DISABLE != 0
            }
            FormFactor::Qsfp => self.read_field_u8(qsfp::OPTIONS_LAST)? & qsfp::OPT_TX_DISABLE != 0,
        };
        if supported {
            Ok(())
        } else {
            Err(SdiError::unsupported("tx disable"))
        }
    }

    /// Enables or disables the transmitter of a channel.
    pub fn tx_control(&self, channel: u32, enable: bool) -> SdiResult<()> {
        self.check_channel(channel)?;
        self.require_tx_control()?;
        debug!("Setting tx {} on {} channel {}", enable, self.eeprom, channel);
        match self.form_factor() {
            FormFactor::Sfp => {
                let value = if enable { 0 } else { sfp::SC_SOFT_TX_DISABLE };
                self.update_field(sfp::STATUS_CONTROL, sfp::SC_SOFT_TX_DISABLE, value)
            }
            FormFactor::Qsfp => {
                let bit = 1u8 << channel;
                self.update_field(qsfp::TX_DISABLE, bit, if enable { 0 } else { bit })
            }
        }
    }

    /// True when the channel transmitter is enabled.
    pub fn tx_control_status(&self, channel: u32) -> SdiResult<bool> {
        self.check_channel(channel)?;
        self.require_tx_control()?;
        Ok(match self.form_factor() {
            FormFactor::Sfp => {
                self.read_field_u8(sfp::STATUS_CONTROL)? & sfp::SC_SOFT_TX_DISABLE == 0
            }
            FormFactor::Qsfp => self.read_field_u8(qsfp::TX_DISABLE)? & (1 << channel) == 0,
        })
    }

    /// Asserts (`true`) or releases a module control.
    ///
    /// Low-power mode uses the slot's LPMODE signal when wired, else the
    /// QSFP software override in byte 93. Reset needs the slot's reset signal.
    pub fn module_control(&self, control: ModuleControl, enable: bool) -> SdiResult<()> {
        info!("Setting {} {} on {}", control, enable, self.eeprom);
        match control {
            ModuleControl::LpMode => {
                if let Some(signal) = &self.lp_mode {
                    return signal.set(enable);
                }
                if self.form_factor() != FormFactor::Qsfp {
                    return Err(SdiError::unsupported("low-power mode"));
                }
                let mask = qsfp::PC_POWER_OVERRIDE | qsfp::PC_POWER_SET_LOW;
                let value = if enable { mask } else { qsfp::PC_POWER_OVERRIDE };
                self.update_field(qsfp::POWER_CONTROL, mask, value)
            }
            ModuleControl::Reset => self
                .reset
                .as_ref()
                .ok_or_else(|| SdiError::unsupported("module reset"))?
                .set(enable),
        }
    }

    /// Current state of a module control.
    pub fn module_control_status(&self, control: ModuleControl) -> SdiResult<bool> {
        match control {
            ModuleControl::LpMode => {
                if let Some(signal) = &self.lp_mode {
                    return signal.is_asserted();
                }
                if self.form_factor() != FormFactor::Qsfp {
                    return Err(SdiError::unsupported("low-power mode"));
                }
                let byte = self.read_field_u8(qsfp::POWER_CONTROL)?;
                Ok(byte & qsfp::PC_POWER_OVERRIDE != 0 && byte & qsfp::PC_POWER_SET_LOW != 0)
            }
            ModuleControl::Reset => self
                .reset
                .as_ref()
                .ok_or_else(|| SdiError::unsupported("module reset"))?
                .is_asserted(),
        }
    }

    fn led_register(&self, channel: u32) -> SdiResult<(BusAddress, u32, &MediaLedConfig)> {
        self.check_channel(channel)?;
        let led = self
            .config
            .led
            .as_ref()
            .ok_or_else(|| SdiError::unsupported("port LED"))?;
        Ok((BusAddress::new(led.bus, led.device), led.offset + channel, led))
    }

    /// Shows `speed` on the channel LED; `None` turns it off.
    pub fn led_set(&self, channel: u32, speed: Option<MediaSpeed>) -> SdiResult<()> {
        let (address, offset, led) = self.led_register(channel)?;
        let value = match speed {
            None => led.off_value,
            Some(speed) => led
                .patterns
                .iter()
                .find(|p| p.speed == speed)
                .map(|p| p.value)
                .ok_or_else(|| SdiError::unsupported(format!("LED pattern for {}", speed)))?,
        };
        self.bus.write_u8(address, offset, value)?;
        Ok(())
    }

    /// Speed shown on the channel LED, `None` when off or showing an
    /// unmapped pattern.
    pub fn led_status(&self, channel: u32) -> SdiResult<Option<MediaSpeed>> {
        let (address, offset, led) = self.led_register(channel)?;
        let value = self.bus.read_u8(address, offset)?;
        Ok(led
            .patterns
            .iter()
            .find(|p| p.value == value && value != led.off_value)
            .map(|p| p.speed))
    }

    /// Applies the slot defaults to the seated module. Absent slots and
    /// modules without TX control are left alone.
    pub fn apply_defaults(&self) -> SdiResult<()> {
        if !self.presence()? {
            debug!("No module at {}, skipping defaults", self.eeprom);
            return Ok(());
        }
        let defaults = self.config.defaults;
        if let Some(low_power) = defaults.low_power {
            match self.module_control(ModuleControl::LpMode, low_power) {
                Err(SdiError::Unsupported { .. }) => {}
                other => other?,
            }
        }
        match self.require_tx_control() {
            Ok(()) => {
                for channel in 0..self.lane_count() {
                    self.tx_control(channel, defaults.tx_enable)?;
                }
                Ok(())
            }
            Err(SdiError::Unsupported { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
