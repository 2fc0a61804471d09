//! Module parameters, optional features, check codes and speed derivation.

use super::compliance::TransceiverDescriptor;
use super::layout::{check_code, identifier, qsfp, sfp};
use byteorder::{BigEndian, ByteOrder};
use sdi_types::{FormFactor, MediaSpeed};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric module parameter.
///
/// Link lengths are reported in metres (SMF in km for `LengthSmfKm`),
/// wavelength and tolerance in nm, bit rates in units of 100 Mb/s and bit
/// rate margins in percent. The rest are the raw register values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaParameter {
    Wavelength,
    WavelengthTolerance,
    MaxCaseTemp,
    CcBase,
    CcExt,
    Connector,
    EncodingType,
    NominalBitrate,
    Identifier,
    ExtIdentifier,
    LengthSmfKm,
    LengthOm1,
    LengthOm2,
    LengthOm3,
    LengthCableAssembly,
    LengthSmf,
    Options,
    EnhancedOptions,
    DiagMonitoringType,
    DeviceTech,
    MaxBitrate,
    MinBitrate,
}

/// How a parameter register maps to its reported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaling {
    Raw,
    Times(u32),
    Per(u32),
}

/// Register backing a parameter on one module family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLocation {
    pub offset: u32,
    pub width: usize,
    pub scaling: Scaling,
}

impl ParamLocation {
    const fn byte(offset: u32) -> Self {
        Self {
            offset,
            width: 1,
            scaling: Scaling::Raw,
        }
    }

    const fn scaled(offset: u32, width: usize, scaling: Scaling) -> Self {
        Self {
            offset,
            width,
            scaling,
        }
    }

    /// Converts the big-endian register bytes to the reported value.
    pub fn decode(&self, raw: &[u8]) -> u32 {
        let value = match raw.len() {
            1 => u32::from(raw[0]),
            2 => u32::from(BigEndian::read_u16(raw)),
            _ => BigEndian::read_u32(raw),
        };
        match self.scaling {
            Scaling::Raw => value,
            Scaling::Times(factor) => value * factor,
            Scaling::Per(divisor) => value / divisor,
        }
    }
}

impl MediaParameter {
    pub const ALL: [MediaParameter; 22] = [
        MediaParameter::Wavelength,
        MediaParameter::WavelengthTolerance,
        MediaParameter::MaxCaseTemp,
        MediaParameter::CcBase,
        MediaParameter::CcExt,
        MediaParameter::Connector,
        MediaParameter::EncodingType,
        MediaParameter::NominalBitrate,
        MediaParameter::Identifier,
        MediaParameter::ExtIdentifier,
        MediaParameter::LengthSmfKm,
        MediaParameter::LengthOm1,
        MediaParameter::LengthOm2,
        MediaParameter::LengthOm3,
        MediaParameter::LengthCableAssembly,
        MediaParameter::LengthSmf,
        MediaParameter::Options,
        MediaParameter::EnhancedOptions,
        MediaParameter::DiagMonitoringType,
        MediaParameter::DeviceTech,
        MediaParameter::MaxBitrate,
        MediaParameter::MinBitrate,
    ];

    /// Register of this parameter, or `None` when the module family does
    /// not define it.
    pub fn location(&self, form_factor: FormFactor) -> Option<ParamLocation> {
        use MediaParameter::*;
        use ParamLocation as L;
        match form_factor {
            FormFactor::Sfp => match self {
                Wavelength => Some(L::scaled(sfp::WAVELENGTH, 2, Scaling::Raw)),
                WavelengthTolerance | MaxCaseTemp | DeviceTech => None,
                CcBase => Some(L::byte(sfp::CC_BASE)),
                CcExt => Some(L::byte(sfp::CC_EXT)),
                Connector => Some(L::byte(sfp::CONNECTOR)),
                EncodingType => Some(L::byte(sfp::ENCODING)),
                NominalBitrate => Some(L::byte(sfp::BR_NOMINAL)),
                Identifier => Some(L::byte(sfp::IDENTIFIER)),
                ExtIdentifier => Some(L::byte(sfp::EXT_IDENTIFIER)),
                LengthSmfKm => Some(L::byte(sfp::LENGTH_SMF_KM)),
                LengthOm1 => Some(L::scaled(sfp::LENGTH_OM1_10M, 1, Scaling::Times(10))),
                LengthOm2 => Some(L::scaled(sfp::LENGTH_OM2_10M, 1, Scaling::Times(10))),
                LengthOm3 => Some(L::scaled(sfp::LENGTH_OM3_10M, 1, Scaling::Times(10))),
                LengthCableAssembly => Some(L::byte(sfp::LENGTH_CABLE_M)),
                LengthSmf => Some(L::scaled(sfp::LENGTH_SMF_100M, 1, Scaling::Times(100))),
                Options => Some(L::scaled(sfp::OPTIONS, 2, Scaling::Raw)),
                EnhancedOptions => Some(L::byte(sfp::ENHANCED_OPTIONS)),
                DiagMonitoringType => Some(L::byte(sfp::DIAG_MON_TYPE)),
                MaxBitrate => Some(L::byte(sfp::BR_MAX)),
                MinBitrate => Some(L::byte(sfp::BR_MIN)),
            },
            FormFactor::Qsfp => match self {
                Wavelength => Some(L::scaled(qsfp::WAVELENGTH, 2, Scaling::Per(20))),
                WavelengthTolerance => {
                    Some(L::scaled(qsfp::WAVELENGTH_TOLERANCE, 2, Scaling::Per(200)))
                }
                MaxCaseTemp => Some(L::byte(qsfp::MAX_CASE_TEMP)),
                CcBase => Some(L::byte(qsfp::CC_BASE)),
                CcExt => Some(L::byte(qsfp::CC_EXT)),
                Connector => Some(L::byte(qsfp::CONNECTOR)),
                EncodingType => Some(L::byte(qsfp::ENCODING)),
                NominalBitrate => Some(L::byte(qsfp::BR_NOMINAL)),
                Identifier => Some(L::byte(qsfp::IDENTIFIER)),
                ExtIdentifier => Some(L::byte(qsfp::EXT_IDENTIFIER)),
                LengthSmfKm => Some(L::byte(qsfp::LENGTH_SMF_KM)),
                LengthOm1 => Some(L::byte(qsfp::LENGTH_OM1_M)),
                LengthOm2 => Some(L::byte(qsfp::LENGTH_OM2_M)),
                LengthOm3 => Some(L::scaled(qsfp::LENGTH_OM3_2M, 1, Scaling::Times(2))),
                LengthCableAssembly => Some(L::byte(qsfp::LENGTH_CABLE_M)),
                Options => Some(L::scaled(qsfp::OPTIONS, 4, Scaling::Raw)),
                EnhancedOptions => Some(L::byte(qsfp::ENHANCED_OPTIONS)),
                DiagMonitoringType => Some(L::byte(qsfp::DIAG_MON_TYPE)),
                DeviceTech => Some(L::byte(qsfp::DEVICE_TECH)),
                LengthSmf | MaxBitrate | MinBitrate => None,
            },
        }
    }
}

impl fmt::Display for MediaParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // snake_case, same as the serde form
        let debug = format!("{:?}", self);
        let mut out = String::with_capacity(debug.len() + 4);
        for (i, c) in debug.chars().enumerate() {
            if c.is_ascii_uppercase() {
                if i > 0 {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        }
        f.write_str(&out)
    }
}

/// Optional features advertised by a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum FeatureSupport {
    Sfp {
        rate_select: bool,
        alarm: bool,
        diag_monitoring: bool,
    },
    Qsfp {
        rate_select: bool,
        tx_control: bool,
        paging: bool,
    },
}

impl FeatureSupport {
    /// From SFP options byte 65, diagnostic monitoring type and enhanced options.
    pub fn sfp(options_low: u8, diag_mon_type: u8, enhanced_options: u8) -> Self {
        FeatureSupport::Sfp {
            rate_select: options_low & sfp::OPT_RATE_SELECT != 0,
            alarm: enhanced_options & sfp::ENH_ALARM_FLAGS != 0,
            diag_monitoring: diag_mon_type & sfp::DIAG_DDM_IMPLEMENTED != 0,
        }
    }

    /// From QSFP status byte 2 and options byte 195.
    pub fn qsfp(status: u8, options_last: u8) -> Self {
        FeatureSupport::Qsfp {
            rate_select: options_last & qsfp::OPT_RATE_SELECT != 0,
            tx_control: options_last & qsfp::OPT_TX_DISABLE != 0,
            paging: status & qsfp::STATUS_FLAT_MEM == 0,
        }
    }
}

/// Validity of the two EEPROM check codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumStatus {
    pub base_valid: bool,
    pub ext_valid: bool,
}

impl ChecksumStatus {
    /// Verifies CC_BASE and CC_EXT over the first 256 EEPROM bytes.
    pub fn verify(form_factor: FormFactor, page: &[u8; 256]) -> Self {
        let (base_start, cc_base, cc_ext) = match form_factor {
            FormFactor::Sfp => (0usize, sfp::CC_BASE as usize, sfp::CC_EXT as usize),
            FormFactor::Qsfp => (
                qsfp::ID_UPPER as usize,
                qsfp::CC_BASE as usize,
                qsfp::CC_EXT as usize,
            ),
        };
        Self {
            base_valid: check_code(&page[base_start..cc_base]) == page[cc_base],
            ext_valid: check_code(&page[cc_base + 1..cc_ext]) == page[cc_ext],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.base_valid && self.ext_valid
    }
}

/// Highest data rate the module supports.
///
/// `bitrate_nominal` is in units of 100 Mb/s.
pub fn max_speed(
    identifier_byte: u8,
    descriptor: &TransceiverDescriptor,
    bitrate_nominal: u8,
) -> MediaSpeed {
    use super::compliance::{Qsfp40gEthernet, Sfp1gEthernet};

    match descriptor {
        TransceiverDescriptor::Qsfp(c) => {
            let forty = Qsfp40gEthernet::ACTIVE_CABLE_40G
                | Qsfp40gEthernet::LR4_40G
                | Qsfp40gEthernet::SR4_40G
                | Qsfp40gEthernet::CR4_40G;
            if identifier_byte == identifier::QSFP28 {
                MediaSpeed::Speed100G
            } else if c.eth_40g.intersects(forty) {
                MediaSpeed::Speed40G
            } else if !c.eth_1g.is_empty() {
                MediaSpeed::Speed1G
            } else {
                MediaSpeed::Speed40G
            }
        }
        TransceiverDescriptor::Sfp(c) => {
            let fast_ethernet = Sfp1gEthernet::BASE100_LX | Sfp1gEthernet::BASE100_FX;
            if bitrate_nominal >= 250 {
                MediaSpeed::Speed25G
            } else if !c.eth_10g.is_empty() || bitrate_nominal >= 100 {
                MediaSpeed::Speed10G
            } else if c.eth_1g.intersects(!fast_ethernet) || bitrate_nominal >= 10 {
                MediaSpeed::Speed1G
            } else {
                MediaSpeed::Speed100M
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parameter_table_covers_both_families() {
        let sfp_only = [
            MediaParameter::LengthSmf,
            MediaParameter::MaxBitrate,
            MediaParameter::MinBitrate,
        ];
        let qsfp_only = [
            MediaParameter::WavelengthTolerance,
            MediaParameter::MaxCaseTemp,
            MediaParameter::DeviceTech,
        ];
        for param in MediaParameter::ALL {
            assert_eq!(
                param.location(FormFactor::Sfp).is_some(),
                !qsfp_only.contains(&param),
                "{}",
                param
            );
            assert_eq!(
                param.location(FormFactor::Qsfp).is_some(),
                !sfp_only.contains(&param),
                "{}",
                param
            );
        }
    }

    #[test]
    fn test_parameter_scaling() {
        let om3 = MediaParameter::LengthOm3.location(FormFactor::Sfp).unwrap();
        assert_eq!(om3.decode(&[30]), 300);
        let om3 = MediaParameter::LengthOm3.location(FormFactor::Qsfp).unwrap();
        assert_eq!(om3.decode(&[50]), 100);
        // 1310 nm in 0.05 nm units
        let wl = MediaParameter::Wavelength.location(FormFactor::Qsfp).unwrap();
        assert_eq!(wl.decode(&[0x66, 0x58]), 1310);
        let options = MediaParameter::Options.location(FormFactor::Qsfp).unwrap();
        assert_eq!(options.decode(&[0, 0, 0x01, 0x10]), 0x110);
        assert_eq!(MediaParameter::LengthCableAssembly.to_string(), "length_cable_assembly");
    }

    #[test]
    fn test_feature_support() {
        assert_eq!(
            FeatureSupport::sfp(0x20, 0x00, 0x80),
            FeatureSupport::Sfp {
                rate_select: true,
                alarm: true,
                diag_monitoring: false
            }
        );
        assert_eq!(
            FeatureSupport::qsfp(0x04, 0x10),
            FeatureSupport::Qsfp {
                rate_select: false,
                tx_control: true,
                paging: false
            }
        );
    }

    #[test]
    fn test_checksum_verify() {
        let mut page = [0u8; 256];
        page[0] = 0x03;
        page[20..24].copy_from_slice(b"ACME");
        page[63] = check_code(&page[..63]);
        page[64] = 0x12;
        page[95] = check_code(&page[64..95]);
        let status = ChecksumStatus::verify(FormFactor::Sfp, &page);
        assert!(status.is_valid());

        page[21] ^= 0xff;
        let status = ChecksumStatus::verify(FormFactor::Sfp, &page);
        assert!(!status.base_valid);
        assert!(status.ext_valid);
    }

    #[test]
    fn test_max_speed() {
        let sr4 = TransceiverDescriptor::decode(FormFactor::Qsfp, &[0x04, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(max_speed(identifier::QSFP_PLUS, &sr4, 103), MediaSpeed::Speed40G);
        assert_eq!(max_speed(identifier::QSFP28, &sr4, 255), MediaSpeed::Speed100G);

        let base_t = TransceiverDescriptor::decode(FormFactor::Qsfp, &[0, 0, 0, 0x08, 0, 0, 0, 0]);
        assert_eq!(max_speed(identifier::QSFP_PLUS, &base_t, 13), MediaSpeed::Speed1G);

        let sr = TransceiverDescriptor::decode(FormFactor::Sfp, &[0x10, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(max_speed(identifier::SFP, &sr, 103), MediaSpeed::Speed10G);
        let none = TransceiverDescriptor::decode(FormFactor::Sfp, &[0; 8]);
        assert_eq!(max_speed(identifier::SFP, &none, 255), MediaSpeed::Speed25G);
        let fx = TransceiverDescriptor::decode(FormFactor::Sfp, &[0, 0, 0, 0x20, 0, 0, 0, 0]);
        assert_eq!(max_speed(identifier::SFP, &fx, 1), MediaSpeed::Speed100M);
    }
}
