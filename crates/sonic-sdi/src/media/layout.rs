//! EEPROM memory maps.
//!
//! Offsets are linear, following the optoe driver convention: SFP A0h is
//! 0..256 and A2h is 256..512; QSFP lower page plus upper page 0 is
//! 0..256 and upper page N starts at `128 * (N + 1)`.

use sdi_types::FormFactor;

/// A fixed-width field in the EEPROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub offset: u32,
    pub len: usize,
}

impl FieldSpan {
    pub const fn new(offset: u32, len: usize) -> Self {
        Self { offset, len }
    }
}

/// Identifier byte values (SFF-8024).
pub mod identifier {
    pub const SFP: u8 = 0x03;
    pub const QSFP: u8 = 0x0c;
    pub const QSFP_PLUS: u8 = 0x0d;
    pub const QSFP28: u8 = 0x11;
}

/// Module family announced by an identifier byte.
pub fn family_of(id: u8) -> Option<FormFactor> {
    match id {
        identifier::SFP => Some(FormFactor::Sfp),
        identifier::QSFP | identifier::QSFP_PLUS | identifier::QSFP28 => Some(FormFactor::Qsfp),
        _ => None,
    }
}

/// SFF-8472 (SFP/SFP+) map.
pub mod sfp {
    use super::FieldSpan;

    pub const IDENTIFIER: u32 = 0;
    pub const EXT_IDENTIFIER: u32 = 1;
    pub const CONNECTOR: u32 = 2;
    pub const COMPLIANCE: u32 = 3;
    pub const ENCODING: u32 = 11;
    pub const BR_NOMINAL: u32 = 12;
    pub const LENGTH_SMF_KM: u32 = 14;
    pub const LENGTH_SMF_100M: u32 = 15;
    pub const LENGTH_OM2_10M: u32 = 16;
    pub const LENGTH_OM1_10M: u32 = 17;
    pub const LENGTH_CABLE_M: u32 = 18;
    pub const LENGTH_OM3_10M: u32 = 19;
    pub const VENDOR_NAME: FieldSpan = FieldSpan::new(20, 16);
    pub const VENDOR_OUI: FieldSpan = FieldSpan::new(37, 3);
    pub const VENDOR_PN: FieldSpan = FieldSpan::new(40, 16);
    pub const VENDOR_REV: FieldSpan = FieldSpan::new(56, 4);
    pub const WAVELENGTH: u32 = 60;
    pub const CC_BASE: u32 = 63;
    pub const OPTIONS: u32 = 64;
    pub const BR_MAX: u32 = 66;
    pub const BR_MIN: u32 = 67;
    pub const VENDOR_SN: FieldSpan = FieldSpan::new(68, 16);
    pub const DATE_CODE: FieldSpan = FieldSpan::new(84, 8);
    pub const DIAG_MON_TYPE: u32 = 92;
    pub const ENHANCED_OPTIONS: u32 = 93;
    pub const CC_EXT: u32 = 95;
    pub const VENDOR_SPECIFIC: u32 = 96;

    /// OPTIONS low byte: RATE_SELECT implemented.
    pub const OPT_RATE_SELECT: u8 = 1 << 5;
    /// DIAG_MON_TYPE bits.
    pub const DIAG_DDM_IMPLEMENTED: u8 = 1 << 6;
    pub const DIAG_INTERNAL_CAL: u8 = 1 << 5;
    pub const DIAG_EXTERNAL_CAL: u8 = 1 << 4;
    pub const DIAG_RX_PWR_AVERAGE: u8 = 1 << 3;
    /// ENHANCED_OPTIONS bits.
    pub const ENH_ALARM_FLAGS: u8 = 1 << 7;
    pub const ENH_SOFT_TX_DISABLE: u8 = 1 << 6;

    /// Start of the A2h diagnostics page.
    pub const A2: u32 = 256;
    pub const THRESHOLDS: u32 = A2;
    pub const EXT_CALIBRATION: u32 = A2 + 56;
    pub const EXT_CALIBRATION_LEN: usize = 36;
    pub const TEMPERATURE: u32 = A2 + 96;
    pub const VCC: u32 = A2 + 98;
    pub const TX_BIAS: u32 = A2 + 100;
    pub const TX_POWER: u32 = A2 + 102;
    pub const RX_POWER: u32 = A2 + 104;
    pub const STATUS_CONTROL: u32 = A2 + 110;
    pub const ALARM_FLAGS: u32 = A2 + 112;
    pub const WARNING_FLAGS: u32 = A2 + 116;

    /// STATUS_CONTROL bits.
    pub const SC_TX_DISABLE_STATE: u8 = 1 << 7;
    pub const SC_SOFT_TX_DISABLE: u8 = 1 << 6;
    pub const SC_TX_FAULT: u8 = 1 << 2;
    pub const SC_RX_LOS: u8 = 1 << 1;
}

/// SFF-8436/SFF-8636 (QSFP/QSFP+/QSFP28) map.
pub mod qsfp {
    use super::FieldSpan;

    pub const IDENTIFIER: u32 = 0;
    pub const STATUS: u32 = 2;
    pub const LOS: u32 = 3;
    pub const TX_FAULT: u32 = 4;
    pub const TEMP_FLAGS: u32 = 6;
    pub const VCC_FLAGS: u32 = 7;
    pub const RX_POWER_FLAGS: u32 = 9;
    pub const TX_BIAS_FLAGS: u32 = 11;
    pub const TX_POWER_FLAGS: u32 = 13;
    pub const TEMPERATURE: u32 = 22;
    pub const VCC: u32 = 26;
    pub const RX_POWER: u32 = 34;
    pub const TX_BIAS: u32 = 42;
    pub const TX_POWER: u32 = 50;
    pub const TX_DISABLE: u32 = 86;
    pub const POWER_CONTROL: u32 = 93;

    pub const ID_UPPER: u32 = 128;
    pub const EXT_IDENTIFIER: u32 = 129;
    pub const CONNECTOR: u32 = 130;
    pub const COMPLIANCE: u32 = 131;
    pub const ENCODING: u32 = 139;
    pub const BR_NOMINAL: u32 = 140;
    pub const LENGTH_SMF_KM: u32 = 142;
    pub const LENGTH_OM3_2M: u32 = 143;
    pub const LENGTH_OM2_M: u32 = 144;
    pub const LENGTH_OM1_M: u32 = 145;
    pub const LENGTH_CABLE_M: u32 = 146;
    pub const DEVICE_TECH: u32 = 147;
    pub const VENDOR_NAME: FieldSpan = FieldSpan::new(148, 16);
    pub const VENDOR_OUI: FieldSpan = FieldSpan::new(165, 3);
    pub const VENDOR_PN: FieldSpan = FieldSpan::new(168, 16);
    pub const VENDOR_REV: FieldSpan = FieldSpan::new(184, 2);
    pub const WAVELENGTH: u32 = 186;
    pub const WAVELENGTH_TOLERANCE: u32 = 188;
    pub const MAX_CASE_TEMP: u32 = 190;
    pub const CC_BASE: u32 = 191;
    pub const OPTIONS: u32 = 192;
    pub const VENDOR_SN: FieldSpan = FieldSpan::new(196, 16);
    pub const DATE_CODE: FieldSpan = FieldSpan::new(212, 8);
    pub const DIAG_MON_TYPE: u32 = 220;
    pub const ENHANCED_OPTIONS: u32 = 221;
    pub const CC_EXT: u32 = 223;
    pub const VENDOR_SPECIFIC: u32 = 224;

    /// STATUS bits.
    pub const STATUS_FLAT_MEM: u8 = 1 << 2;
    /// Last OPTIONS byte (195) bits.
    pub const OPTIONS_LAST: u32 = OPTIONS + 3;
    pub const OPT_RATE_SELECT: u8 = 1 << 5;
    pub const OPT_TX_DISABLE: u8 = 1 << 4;
    /// DIAG_MON_TYPE bits.
    pub const DIAG_RX_PWR_AVERAGE: u8 = 1 << 3;
    pub const DIAG_TX_PWR_SUPPORTED: u8 = 1 << 2;
    /// POWER_CONTROL bits.
    pub const PC_POWER_OVERRIDE: u8 = 1 << 0;
    pub const PC_POWER_SET_LOW: u8 = 1 << 1;

    /// Upper page 3 (thresholds).
    pub const PAGE3: u32 = 512;
    pub const THRESH_TEMPERATURE: u32 = PAGE3;
    pub const THRESH_VCC: u32 = PAGE3 + 16;
    pub const THRESH_RX_POWER: u32 = PAGE3 + 48;
    pub const THRESH_TX_BIAS: u32 = PAGE3 + 56;
    pub const THRESH_TX_POWER: u32 = PAGE3 + 64;
}

/// Sum of `bytes` modulo 256, as stored in CC_BASE / CC_EXT.
pub fn check_code(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}
