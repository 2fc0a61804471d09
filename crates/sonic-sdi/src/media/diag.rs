//! Digital diagnostics: monitor kinds, thresholds, unit scaling and
//! alarm/warning flag decoding.
//!
//! Monitor and threshold registers are 16-bit big-endian. The scaled API
//! and the raw API read the same register value (after external calibration,
//! if any); scaling is strictly monotonic over it so both classify a reading
//! into the same [`Band`].

use bitflags::bitflags;
use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Module-wide monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleMonitor {
    Temperature,
    Voltage,
}

/// Per-channel monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMonitor {
    RxPower,
    TxBias,
    TxPower,
}

impl ChannelMonitor {
    /// Former name of [`ChannelMonitor::TxBias`].
    #[deprecated(note = "use ChannelMonitor::TxBias")]
    pub const TX_POWER_BIAS: ChannelMonitor = ChannelMonitor::TxBias;
}

/// Any monitored quantity; the order is the threshold slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Monitor {
    Temperature,
    Voltage,
    RxPower,
    TxBias,
    TxPower,
}

impl From<ModuleMonitor> for Monitor {
    fn from(m: ModuleMonitor) -> Self {
        match m {
            ModuleMonitor::Temperature => Monitor::Temperature,
            ModuleMonitor::Voltage => Monitor::Voltage,
        }
    }
}

impl From<ChannelMonitor> for Monitor {
    fn from(m: ChannelMonitor) -> Self {
        match m {
            ChannelMonitor::RxPower => Monitor::RxPower,
            ChannelMonitor::TxBias => Monitor::TxBias,
            ChannelMonitor::TxPower => Monitor::TxPower,
        }
    }
}

impl Monitor {
    pub const ALL: [Monitor; 5] = [
        Monitor::Temperature,
        Monitor::Voltage,
        Monitor::RxPower,
        Monitor::TxBias,
        Monitor::TxPower,
    ];

    pub fn unit(&self) -> &'static str {
        match self {
            Monitor::Temperature => "C",
            Monitor::Voltage => "V",
            Monitor::RxPower | Monitor::TxPower => "dBm",
            Monitor::TxBias => "mA",
        }
    }

    /// Register value as returned by the raw API: temperature is signed,
    /// everything else unsigned.
    pub fn raw_value(&self, raw: u16) -> i32 {
        match self {
            Monitor::Temperature => i32::from(raw as i16),
            _ => i32::from(raw),
        }
    }

    /// Range of a register-domain value: temperature is a signed 16-bit
    /// register, everything else unsigned.
    pub fn register_range(&self) -> (i32, i32) {
        match self {
            Monitor::Temperature => (i32::from(i16::MIN), i32::from(i16::MAX)),
            _ => (0, i32::from(u16::MAX)),
        }
    }

    /// Register value in physical units.
    pub fn scale(&self, raw: u16) -> f64 {
        self.to_units(f64::from(self.raw_value(raw)))
    }

    /// Converts a (possibly calibrated) register-domain value to units:
    /// 1/256 C, 100 uV, 2 uA, 0.1 uW shown as dBm.
    pub fn to_units(&self, value: f64) -> f64 {
        match self {
            Monitor::Temperature => value / 256.0,
            Monitor::Voltage => value / 10_000.0,
            Monitor::TxBias => value / 500.0,
            Monitor::RxPower | Monitor::TxPower => milliwatts_to_dbm(value / 10_000.0),
        }
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Monitor::Temperature => "temperature",
            Monitor::Voltage => "voltage",
            Monitor::RxPower => "rx power",
            Monitor::TxBias => "tx bias",
            Monitor::TxPower => "tx power",
        };
        f.write_str(name)
    }
}

/// Zero or negative power reads as negative infinity.
pub fn milliwatts_to_dbm(mw: f64) -> f64 {
    if mw <= 0.0 {
        f64::NEG_INFINITY
    } else {
        10.0 * mw.log10()
    }
}

/// Threshold level; the order is the register order within a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmLevel {
    HighAlarm,
    LowAlarm,
    HighWarning,
    LowWarning,
}

impl AlarmLevel {
    pub const ALL: [AlarmLevel; 4] = [
        AlarmLevel::HighAlarm,
        AlarmLevel::LowAlarm,
        AlarmLevel::HighWarning,
        AlarmLevel::LowWarning,
    ];

    pub fn index(&self) -> usize {
        match self {
            AlarmLevel::HighAlarm => 0,
            AlarmLevel::LowAlarm => 1,
            AlarmLevel::HighWarning => 2,
            AlarmLevel::LowWarning => 3,
        }
    }
}

/// One of the twenty threshold slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThresholdType {
    pub monitor: Monitor,
    pub level: AlarmLevel,
}

impl ThresholdType {
    pub const fn new(monitor: Monitor, level: AlarmLevel) -> Self {
        Self { monitor, level }
    }

    /// Slot number, monitor-major.
    pub fn index(&self) -> usize {
        self.monitor as usize * 4 + self.level.index()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        let monitor = *Monitor::ALL.get(index / 4)?;
        let level = AlarmLevel::ALL[index % 4];
        Some(Self { monitor, level })
    }

    pub fn all() -> impl Iterator<Item = ThresholdType> {
        (0..20).filter_map(Self::from_index)
    }
}

impl fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            AlarmLevel::HighAlarm => "high alarm",
            AlarmLevel::LowAlarm => "low alarm",
            AlarmLevel::HighWarning => "high warning",
            AlarmLevel::LowWarning => "low warning",
        };
        write!(f, "{} {}", self.monitor, level)
    }
}

/// Where a reading falls relative to its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    LowAlarm,
    LowWarning,
    Normal,
    HighWarning,
    HighAlarm,
}

/// The four thresholds of one monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet<T> {
    pub high_alarm: T,
    pub low_alarm: T,
    pub high_warning: T,
    pub low_warning: T,
}

impl<T: PartialOrd + Copy> ThresholdSet<T> {
    pub fn get(&self, level: AlarmLevel) -> T {
        match level {
            AlarmLevel::HighAlarm => self.high_alarm,
            AlarmLevel::LowAlarm => self.low_alarm,
            AlarmLevel::HighWarning => self.high_warning,
            AlarmLevel::LowWarning => self.low_warning,
        }
    }

    pub fn classify(&self, value: T) -> Band {
        if value > self.high_alarm {
            Band::HighAlarm
        } else if value > self.high_warning {
            Band::HighWarning
        } else if value < self.low_alarm {
            Band::LowAlarm
        } else if value < self.low_warning {
            Band::LowWarning
        } else {
            Band::Normal
        }
    }

    pub fn map<U>(&self, f: impl Fn(T) -> U) -> ThresholdSet<U> {
        ThresholdSet {
            high_alarm: f(self.high_alarm),
            low_alarm: f(self.low_alarm),
            high_warning: f(self.high_warning),
            low_warning: f(self.low_warning),
        }
    }
}

impl ThresholdSet<u16> {
    /// From the 8-byte block HA, LA, HW, LW.
    pub fn decode(raw: &[u8; 8]) -> Self {
        Self {
            high_alarm: BigEndian::read_u16(&raw[0..2]),
            low_alarm: BigEndian::read_u16(&raw[2..4]),
            high_warning: BigEndian::read_u16(&raw[4..6]),
            low_warning: BigEndian::read_u16(&raw[6..8]),
        }
    }
}

/// SFP slope/offset pair; the slope is unsigned fixed point 8.8.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearCalibration {
    pub slope: f64,
    pub offset: i16,
}

impl LinearCalibration {
    fn decode(raw: &[u8]) -> Self {
        Self {
            slope: f64::from(BigEndian::read_u16(&raw[0..2])) / 256.0,
            offset: BigEndian::read_i16(&raw[2..4]),
        }
    }

    fn apply(&self, value: f64) -> f64 {
        self.slope * value + f64::from(self.offset)
    }
}

/// SFP external calibration constants (A2h bytes 56-91).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalCalibration {
    /// Rx_PWR(4) down to Rx_PWR(0).
    pub rx_power: [f32; 5],
    pub tx_bias: LinearCalibration,
    pub tx_power: LinearCalibration,
    pub temperature: LinearCalibration,
    pub voltage: LinearCalibration,
}

impl ExternalCalibration {
    pub fn decode(raw: &[u8; 36]) -> Self {
        let mut rx_power = [0f32; 5];
        for (i, coeff) in rx_power.iter_mut().enumerate() {
            *coeff = BigEndian::read_f32(&raw[i * 4..i * 4 + 4]);
        }
        Self {
            rx_power,
            tx_bias: LinearCalibration::decode(&raw[20..24]),
            tx_power: LinearCalibration::decode(&raw[24..28]),
            temperature: LinearCalibration::decode(&raw[28..32]),
            voltage: LinearCalibration::decode(&raw[32..36]),
        }
    }

    /// Calibrated register-domain value, rounded and clamped to the range
    /// of the monitor's register. The raw API reports this value and the
    /// scaled API converts it, so both classify a reading alike.
    pub fn apply(&self, monitor: Monitor, raw: u16) -> i32 {
        let value = f64::from(monitor.raw_value(raw));
        let calibrated = match monitor {
            Monitor::Temperature => self.temperature.apply(value),
            Monitor::Voltage => self.voltage.apply(value),
            Monitor::TxBias => self.tx_bias.apply(value),
            Monitor::TxPower => self.tx_power.apply(value),
            Monitor::RxPower => self
                .rx_power
                .iter()
                .fold(0.0, |acc, c| acc * value + f64::from(*c)),
        };
        if calibrated.is_nan() {
            return 0;
        }
        let (min, max) = monitor.register_range();
        calibrated.round().clamp(f64::from(min), f64::from(max)) as i32
    }

    /// Calibrated value in physical units.
    pub fn scale(&self, monitor: Monitor, raw: u16) -> f64 {
        monitor.to_units(f64::from(self.apply(monitor, raw)))
    }
}

/// How a module reports received power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RxPowerType {
    Oma,
    Average,
}

bitflags! {
    /// Module-wide alarm and warning flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ModuleStatus: u32 {
        const TEMP_HIGH_ALARM = 0x01;
        const TEMP_LOW_ALARM = 0x02;
        const TEMP_HIGH_WARNING = 0x04;
        const TEMP_LOW_WARNING = 0x08;
        const VOLT_HIGH_ALARM = 0x10;
        const VOLT_LOW_ALARM = 0x20;
        const VOLT_HIGH_WARNING = 0x40;
        const VOLT_LOW_WARNING = 0x80;
    }
}

bitflags! {
    /// Per-channel alarm and warning flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ChannelMonitorStatus: u32 {
        const RX_PWR_HIGH_ALARM = 0x001;
        const RX_PWR_LOW_ALARM = 0x002;
        const RX_PWR_HIGH_WARNING = 0x004;
        const RX_PWR_LOW_WARNING = 0x008;
        const TX_BIAS_HIGH_ALARM = 0x010;
        const TX_BIAS_LOW_ALARM = 0x020;
        const TX_BIAS_HIGH_WARNING = 0x040;
        const TX_BIAS_LOW_WARNING = 0x080;
        const TX_PWR_HIGH_ALARM = 0x100;
        const TX_PWR_LOW_ALARM = 0x200;
        const TX_PWR_HIGH_WARNING = 0x400;
        const TX_PWR_LOW_WARNING = 0x800;
    }
}

bitflags! {
    /// Per-channel link status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ChannelStatus: u32 {
        const TX_DISABLE = 0x01;
        const TX_FAULT = 0x02;
        const TX_LOSS = 0x04;
        const RX_LOSS = 0x08;
    }
}

/// Builds a group of four flags from HA, LA, HW, LW indicator bits.
fn level_flags<F: bitflags::Flags>(indicators: [bool; 4], flags: [F; 4]) -> F {
    let mut out = F::empty();
    for (set, flag) in indicators.into_iter().zip(flags) {
        if set {
            out.insert(flag);
        }
    }
    out
}

fn bit(byte: u8, n: u8) -> bool {
    byte & (1 << n) != 0
}

/// QSFP nibble, bits 3..0 = HA, LA, HW, LW.
fn nibble_levels(nibble: u8) -> [bool; 4] {
    [bit(nibble, 3), bit(nibble, 2), bit(nibble, 1), bit(nibble, 0)]
}

impl ModuleStatus {
    /// From SFP A2h bytes 112 (alarms) and 116 (warnings).
    pub fn from_sfp(alarms: u8, warnings: u8) -> Self {
        let temp = level_flags(
            [bit(alarms, 7), bit(alarms, 6), bit(warnings, 7), bit(warnings, 6)],
            [
                Self::TEMP_HIGH_ALARM,
                Self::TEMP_LOW_ALARM,
                Self::TEMP_HIGH_WARNING,
                Self::TEMP_LOW_WARNING,
            ],
        );
        let volt = level_flags(
            [bit(alarms, 5), bit(alarms, 4), bit(warnings, 5), bit(warnings, 4)],
            [
                Self::VOLT_HIGH_ALARM,
                Self::VOLT_LOW_ALARM,
                Self::VOLT_HIGH_WARNING,
                Self::VOLT_LOW_WARNING,
            ],
        );
        temp | volt
    }

    /// From QSFP bytes 6 (temperature) and 7 (supply voltage); flags are in
    /// the high nibble.
    pub fn from_qsfp(temp_flags: u8, vcc_flags: u8) -> Self {
        let temp = level_flags(
            nibble_levels(temp_flags >> 4),
            [
                Self::TEMP_HIGH_ALARM,
                Self::TEMP_LOW_ALARM,
                Self::TEMP_HIGH_WARNING,
                Self::TEMP_LOW_WARNING,
            ],
        );
        let volt = level_flags(
            nibble_levels(vcc_flags >> 4),
            [
                Self::VOLT_HIGH_ALARM,
                Self::VOLT_LOW_ALARM,
                Self::VOLT_HIGH_WARNING,
                Self::VOLT_LOW_WARNING,
            ],
        );
        temp | volt
    }
}

const RX_PWR_FLAGS: [ChannelMonitorStatus; 4] = [
    ChannelMonitorStatus::RX_PWR_HIGH_ALARM,
    ChannelMonitorStatus::RX_PWR_LOW_ALARM,
    ChannelMonitorStatus::RX_PWR_HIGH_WARNING,
    ChannelMonitorStatus::RX_PWR_LOW_WARNING,
];
const TX_BIAS_FLAGS: [ChannelMonitorStatus; 4] = [
    ChannelMonitorStatus::TX_BIAS_HIGH_ALARM,
    ChannelMonitorStatus::TX_BIAS_LOW_ALARM,
    ChannelMonitorStatus::TX_BIAS_HIGH_WARNING,
    ChannelMonitorStatus::TX_BIAS_LOW_WARNING,
];
const TX_PWR_FLAGS: [ChannelMonitorStatus; 4] = [
    ChannelMonitorStatus::TX_PWR_HIGH_ALARM,
    ChannelMonitorStatus::TX_PWR_LOW_ALARM,
    ChannelMonitorStatus::TX_PWR_HIGH_WARNING,
    ChannelMonitorStatus::TX_PWR_LOW_WARNING,
];

impl ChannelMonitorStatus {
    /// From SFP A2h alarm bytes 112-113 and warning bytes 116-117.
    pub fn from_sfp(alarms: [u8; 2], warnings: [u8; 2]) -> Self {
        let [a0, a1] = alarms;
        let [w0, w1] = warnings;
        level_flags([bit(a1, 7), bit(a1, 6), bit(w1, 7), bit(w1, 6)], RX_PWR_FLAGS)
            | level_flags([bit(a0, 3), bit(a0, 2), bit(w0, 3), bit(w0, 2)], TX_BIAS_FLAGS)
            | level_flags([bit(a0, 1), bit(a0, 0), bit(w0, 1), bit(w0, 0)], TX_PWR_FLAGS)
    }

    /// From QSFP bytes 9-14 (rx power, tx bias, tx power; two channels per
    /// byte, even channel in the high nibble).
    pub fn from_qsfp(flags: &[u8; 6], channel: u32) -> Self {
        let byte = (channel / 2) as usize;
        let nibble = |b: u8| if channel % 2 == 0 { b >> 4 } else { b & 0x0f };
        level_flags(nibble_levels(nibble(flags[byte])), RX_PWR_FLAGS)
            | level_flags(nibble_levels(nibble(flags[2 + byte])), TX_BIAS_FLAGS)
            | level_flags(nibble_levels(nibble(flags[4 + byte])), TX_PWR_FLAGS)
    }
}

impl ChannelStatus {
    /// From SFP A2h status/control byte 110. SFP has no TX loss indicator.
    pub fn from_sfp(status_control: u8) -> Self {
        let mut status = Self::empty();
        status.set(Self::TX_DISABLE, bit(status_control, 7) || bit(status_control, 6));
        status.set(Self::TX_FAULT, bit(status_control, 2));
        status.set(Self::RX_LOSS, bit(status_control, 1));
        status
    }

    /// From QSFP LOS byte 3, TX fault byte 4 and TX disable byte 86.
    pub fn from_qsfp(los: u8, tx_fault: u8, tx_disable: u8, channel: u32) -> Self {
        let ch = channel as u8;
        let mut status = Self::empty();
        status.set(Self::RX_LOSS, bit(los, ch));
        status.set(Self::TX_LOSS, bit(los, 4 + ch));
        status.set(Self::TX_FAULT, bit(tx_fault, ch));
        status.set(Self::TX_DISABLE, bit(tx_disable, ch));
        status
    }
}
