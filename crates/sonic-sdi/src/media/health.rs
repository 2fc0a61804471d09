//! Monitors, thresholds and alarm/warning status of a media slot.

use super::device::MediaDevice;
use super::diag::{
    ChannelMonitor, ChannelMonitorStatus, ChannelStatus, ExternalCalibration, ModuleMonitor,
    ModuleStatus, Monitor, ThresholdSet, ThresholdType,
};
use super::layout::{qsfp, sfp};
use crate::error::{SdiError, SdiResult};
use sdi_types::FormFactor;

impl MediaDevice {
    fn require_sfp_diagnostics(&self) -> SdiResult<u8> {
        let diag = self.read_field_u8(sfp::DIAG_MON_TYPE)?;
        if diag & sfp::DIAG_DDM_IMPLEMENTED == 0 {
            return Err(SdiError::unsupported("digital diagnostics"));
        }
        Ok(diag)
    }

    fn require_sfp_alarm_flags(&self) -> SdiResult<()> {
        self.require_sfp_diagnostics()?;
        if self.read_field_u8(sfp::ENHANCED_OPTIONS)? & sfp::ENH_ALARM_FLAGS == 0 {
            return Err(SdiError::unsupported("alarm and warning flags"));
        }
        Ok(())
    }

    /// External calibration constants, if the module needs them.
    fn calibration(&self) -> SdiResult<Option<ExternalCalibration>> {
        if self.form_factor() != FormFactor::Sfp {
            return Ok(None);
        }
        let diag = self.require_sfp_diagnostics()?;
        if diag & sfp::DIAG_EXTERNAL_CAL == 0 {
            return Ok(None);
        }
        let mut raw = [0u8; sfp::EXT_CALIBRATION_LEN];
        self.read_field(sfp::EXT_CALIBRATION, &mut raw)?;
        Ok(Some(ExternalCalibration::decode(&raw)))
    }

    /// Register-domain value reported by the raw API.
    fn register_value(&self, monitor: Monitor, raw: u16) -> SdiResult<i32> {
        Ok(match self.calibration()? {
            Some(cal) => cal.apply(monitor, raw),
            None => monitor.raw_value(raw),
        })
    }

    fn scale(&self, monitor: Monitor, raw: u16) -> SdiResult<f64> {
        Ok(monitor.to_units(f64::from(self.register_value(monitor, raw)?)))
    }

    /// Register of a live monitor value, after capability checks.
    fn monitor_offset(&self, monitor: Monitor, channel: u32) -> SdiResult<u32> {
        match self.form_factor() {
            FormFactor::Sfp => {
                self.require_sfp_diagnostics()?;
                Ok(match monitor {
                    Monitor::Temperature => sfp::TEMPERATURE,
                    Monitor::Voltage => sfp::VCC,
                    Monitor::TxBias => sfp::TX_BIAS,
                    Monitor::TxPower => sfp::TX_POWER,
                    Monitor::RxPower => sfp::RX_POWER,
                })
            }
            FormFactor::Qsfp => {
                if monitor == Monitor::TxPower
                    && self.read_field_u8(qsfp::DIAG_MON_TYPE)? & qsfp::DIAG_TX_PWR_SUPPORTED == 0
                {
                    return Err(SdiError::unsupported("tx power monitoring"));
                }
                Ok(match monitor {
                    Monitor::Temperature => qsfp::TEMPERATURE,
                    Monitor::Voltage => qsfp::VCC,
                    Monitor::RxPower => qsfp::RX_POWER + 2 * channel,
                    Monitor::TxBias => qsfp::TX_BIAS + 2 * channel,
                    Monitor::TxPower => qsfp::TX_POWER + 2 * channel,
                })
            }
        }
    }

    /// Register block of a monitor's four thresholds.
    fn threshold_offset(&self, monitor: Monitor) -> SdiResult<u32> {
        match self.form_factor() {
            FormFactor::Sfp => {
                self.require_sfp_diagnostics()?;
                let group = match monitor {
                    Monitor::Temperature => 0,
                    Monitor::Voltage => 1,
                    Monitor::TxBias => 2,
                    Monitor::TxPower => 3,
                    Monitor::RxPower => 4,
                };
                Ok(sfp::THRESHOLDS + group * 8)
            }
            FormFactor::Qsfp => {
                if self.read_field_u8(qsfp::STATUS)? & qsfp::STATUS_FLAT_MEM != 0 {
                    return Err(SdiError::unsupported("thresholds on flat memory modules"));
                }
                Ok(match monitor {
                    Monitor::Temperature => qsfp::THRESH_TEMPERATURE,
                    Monitor::Voltage => qsfp::THRESH_VCC,
                    Monitor::RxPower => qsfp::THRESH_RX_POWER,
                    Monitor::TxBias => qsfp::THRESH_TX_BIAS,
                    Monitor::TxPower => qsfp::THRESH_TX_POWER,
                })
            }
        }
    }

    fn monitor_register(&self, monitor: Monitor, channel: u32) -> SdiResult<u16> {
        let offset = self.monitor_offset(monitor, channel)?;
        self.read_field_u16(offset)
    }

    fn threshold_register(&self, threshold: ThresholdType) -> SdiResult<u16> {
        let base = self.threshold_offset(threshold.monitor)?;
        self.read_field_u16(base + 2 * threshold.level.index() as u32)
    }

    fn threshold_block(&self, monitor: Monitor) -> SdiResult<ThresholdSet<u16>> {
        let mut raw = [0u8; 8];
        self.read_field(self.threshold_offset(monitor)?, &mut raw)?;
        Ok(ThresholdSet::decode(&raw))
    }

    pub fn module_monitor(&self, monitor: ModuleMonitor) -> SdiResult<f64> {
        let monitor = Monitor::from(monitor);
        let raw = self.monitor_register(monitor, 0)?;
        self.scale(monitor, raw)
    }

    pub fn channel_monitor(&self, channel: u32, monitor: ChannelMonitor) -> SdiResult<f64> {
        self.check_channel(channel)?;
        let monitor = Monitor::from(monitor);
        let raw = self.monitor_register(monitor, channel)?;
        self.scale(monitor, raw)
    }

    /// Unscaled module monitor register, externally calibrated if needed.
    pub fn module_monitor_raw(&self, monitor: ModuleMonitor) -> SdiResult<i32> {
        let monitor = Monitor::from(monitor);
        let raw = self.monitor_register(monitor, 0)?;
        self.register_value(monitor, raw)
    }

    /// Unscaled channel monitor register, externally calibrated if needed.
    pub fn channel_monitor_raw(&self, channel: u32, monitor: ChannelMonitor) -> SdiResult<i32> {
        self.check_channel(channel)?;
        let monitor = Monitor::from(monitor);
        let raw = self.monitor_register(monitor, channel)?;
        self.register_value(monitor, raw)
    }

    pub fn threshold(&self, threshold: ThresholdType) -> SdiResult<f64> {
        let raw = self.threshold_register(threshold)?;
        self.scale(threshold.monitor, raw)
    }

    /// Unscaled threshold register, externally calibrated if needed.
    pub fn threshold_raw(&self, threshold: ThresholdType) -> SdiResult<i32> {
        let raw = self.threshold_register(threshold)?;
        self.register_value(threshold.monitor, raw)
    }

    /// All four thresholds of a monitor in physical units.
    pub fn thresholds(&self, monitor: Monitor) -> SdiResult<ThresholdSet<f64>> {
        Ok(self
            .thresholds_raw(monitor)?
            .map(|v| monitor.to_units(f64::from(v))))
    }

    pub fn thresholds_raw(&self, monitor: Monitor) -> SdiResult<ThresholdSet<i32>> {
        let raw = self.threshold_block(monitor)?;
        Ok(match self.calibration()? {
            Some(cal) => raw.map(|v| cal.apply(monitor, v)),
            None => raw.map(|v| monitor.raw_value(v)),
        })
    }

    /// Asserted module alarm/warning flags, restricted to `mask`.
    pub fn module_monitor_status(&self, mask: ModuleStatus) -> SdiResult<ModuleStatus> {
        let asserted = match self.form_factor() {
            FormFactor::Sfp => {
                self.require_sfp_alarm_flags()?;
                ModuleStatus::from_sfp(
                    self.read_field_u8(sfp::ALARM_FLAGS)?,
                    self.read_field_u8(sfp::WARNING_FLAGS)?,
                )
            }
            FormFactor::Qsfp => ModuleStatus::from_qsfp(
                self.read_field_u8(qsfp::TEMP_FLAGS)?,
                self.read_field_u8(qsfp::VCC_FLAGS)?,
            ),
        };
        Ok(asserted & mask)
    }

    /// Asserted channel alarm/warning flags, restricted to `mask`.
    pub fn channel_monitor_status(
        &self,
        channel: u32,
        mask: ChannelMonitorStatus,
    ) -> SdiResult<ChannelMonitorStatus> {
        self.check_channel(channel)?;
        let asserted = match self.form_factor() {
            FormFactor::Sfp => {
                self.require_sfp_alarm_flags()?;
                let mut alarms = [0u8; 2];
                let mut warnings = [0u8; 2];
                self.read_field(sfp::ALARM_FLAGS, &mut alarms)?;
                self.read_field(sfp::WARNING_FLAGS, &mut warnings)?;
                ChannelMonitorStatus::from_sfp(alarms, warnings)
            }
            FormFactor::Qsfp => {
                let mut flags = [0u8; 6];
                self.read_field(qsfp::RX_POWER_FLAGS, &mut flags)?;
                ChannelMonitorStatus::from_qsfp(&flags, channel)
            }
        };
        Ok(asserted & mask)
    }

    /// Asserted channel link status, restricted to `mask`.
    pub fn channel_status(&self, channel: u32, mask: ChannelStatus) -> SdiResult<ChannelStatus> {
        self.check_channel(channel)?;
        let asserted = match self.form_factor() {
            FormFactor::Sfp => {
                self.require_sfp_diagnostics()?;
                ChannelStatus::from_sfp(self.read_field_u8(sfp::STATUS_CONTROL)?)
            }
            FormFactor::Qsfp => ChannelStatus::from_qsfp(
                self.read_field_u8(qsfp::LOS)?,
                self.read_field_u8(qsfp::TX_FAULT)?,
                self.read_field_u8(qsfp::TX_DISABLE)?,
                channel,
            ),
        };
        Ok(asserted & mask)
    }
}
