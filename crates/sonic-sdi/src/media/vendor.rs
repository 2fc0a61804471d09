//! Vendor identification fields and the vendor product block.

use super::layout::{qsfp, sfp, FieldSpan};
use crate::error::{SdiError, SdiResult};
use byteorder::{BigEndian, ByteOrder};
use sdi_types::FormFactor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor identification field of a module EEPROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorInfoType {
    Name,
    Oui,
    SerialNumber,
    Date,
    PartNumber,
    Revision,
}

impl VendorInfoType {
    pub const ALL: [VendorInfoType; 6] = [
        VendorInfoType::Name,
        VendorInfoType::Oui,
        VendorInfoType::SerialNumber,
        VendorInfoType::Date,
        VendorInfoType::PartNumber,
        VendorInfoType::Revision,
    ];

    /// Location of the field in the module EEPROM.
    pub fn span(&self, form_factor: FormFactor) -> FieldSpan {
        match (form_factor, self) {
            (FormFactor::Sfp, VendorInfoType::Name) => sfp::VENDOR_NAME,
            (FormFactor::Sfp, VendorInfoType::Oui) => sfp::VENDOR_OUI,
            (FormFactor::Sfp, VendorInfoType::SerialNumber) => sfp::VENDOR_SN,
            (FormFactor::Sfp, VendorInfoType::Date) => sfp::DATE_CODE,
            (FormFactor::Sfp, VendorInfoType::PartNumber) => sfp::VENDOR_PN,
            (FormFactor::Sfp, VendorInfoType::Revision) => sfp::VENDOR_REV,
            (FormFactor::Qsfp, VendorInfoType::Name) => qsfp::VENDOR_NAME,
            (FormFactor::Qsfp, VendorInfoType::Oui) => qsfp::VENDOR_OUI,
            (FormFactor::Qsfp, VendorInfoType::SerialNumber) => qsfp::VENDOR_SN,
            (FormFactor::Qsfp, VendorInfoType::Date) => qsfp::DATE_CODE,
            (FormFactor::Qsfp, VendorInfoType::PartNumber) => qsfp::VENDOR_PN,
            (FormFactor::Qsfp, VendorInfoType::Revision) => qsfp::VENDOR_REV,
        }
    }

    /// Widest text this field can render to, excluding the terminator.
    ///
    /// The OUI is stored as three binary bytes and rendered `xx:xx:xx`.
    pub fn text_width(&self, form_factor: FormFactor) -> usize {
        match self {
            VendorInfoType::Oui => 8,
            _ => self.span(form_factor).len,
        }
    }

    /// Renders the raw field bytes as text.
    ///
    /// ASCII fields lose their space or NUL padding; bytes outside printable
    /// ASCII are shown as `?`.
    pub fn render(&self, raw: &[u8]) -> String {
        match self {
            VendorInfoType::Oui => raw
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(":"),
            _ => {
                let end = raw
                    .iter()
                    .rposition(|b| *b != b' ' && *b != 0)
                    .map_or(0, |i| i + 1);
                raw[..end]
                    .iter()
                    .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
                    .collect()
            }
        }
    }
}

impl fmt::Display for VendorInfoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VendorInfoType::Name => "vendor name",
            VendorInfoType::Oui => "vendor OUI",
            VendorInfoType::SerialNumber => "serial number",
            VendorInfoType::Date => "date code",
            VendorInfoType::PartNumber => "part number",
            VendorInfoType::Revision => "revision",
        };
        f.write_str(name)
    }
}

/// Copies `text` plus a NUL terminator into `buf`.
///
/// The capacity check is against the full field width, not the trimmed
/// length, so a call either succeeds for every module or fails for all of
/// them. Nothing is written on failure. Returns the number of text bytes.
pub fn write_nul_terminated(text: &str, width: usize, buf: &mut [u8]) -> SdiResult<usize> {
    let required = width + 1;
    if buf.len() < required {
        return Err(SdiError::BufferTooSmall {
            required,
            provided: buf.len(),
        });
    }
    let bytes = text.as_bytes();
    let len = bytes.len().min(width);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf[len] = 0;
    Ok(len)
}

/// Size of the vendor product identification block.
pub const PRODUCT_INFO_LEN: usize = 7;

/// Vendor product identification block at the start of the vendor-specific
/// area (SFP byte 96, QSFP byte 224).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    /// Qualification key, low byte first.
    pub magic_key: [u8; 2],
    pub revision: u8,
    /// Identifies wavelength and reach.
    pub product_id: u16,
    pub reserved: [u8; 2],
}

impl ProductInfo {
    pub fn decode(raw: &[u8; PRODUCT_INFO_LEN]) -> Self {
        Self {
            magic_key: [raw[0], raw[1]],
            revision: raw[2],
            product_id: BigEndian::read_u16(&raw[3..5]),
            reserved: [raw[5], raw[6]],
        }
    }

    pub fn offset(form_factor: FormFactor) -> u32 {
        match form_factor {
            FormFactor::Sfp => sfp::VENDOR_SPECIFIC,
            FormFactor::Qsfp => qsfp::VENDOR_SPECIFIC,
        }
    }

    /// True when the block carries the platform's qualification key.
    pub fn matches_key(&self, key: [u8; 2]) -> bool {
        self.magic_key == key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_trims_padding() {
        assert_eq!(VendorInfoType::Name.render(b"FINISAR CORP.   "), "FINISAR CORP.");
        assert_eq!(VendorInfoType::Revision.render(b"A\0\0\0"), "A");
        assert_eq!(VendorInfoType::SerialNumber.render(b"                "), "");
        assert_eq!(VendorInfoType::PartNumber.render(b"X\x01Y "), "X?Y");
    }

    #[test]
    fn test_render_oui() {
        assert_eq!(VendorInfoType::Oui.render(&[0x00, 0x90, 0x65]), "00:90:65");
        assert_eq!(VendorInfoType::Oui.text_width(FormFactor::Sfp), 8);
    }

    #[test]
    fn test_field_widths_per_family() {
        assert_eq!(VendorInfoType::Name.text_width(FormFactor::Sfp), 16);
        assert_eq!(VendorInfoType::Revision.text_width(FormFactor::Sfp), 4);
        assert_eq!(VendorInfoType::Revision.text_width(FormFactor::Qsfp), 2);
        assert_eq!(VendorInfoType::Date.span(FormFactor::Qsfp).offset, 212);
    }

    #[test]
    fn test_write_requires_field_width_plus_one() {
        let mut small = [0xaau8; 10];
        let err = write_nul_terminated("ACME", 16, &mut small).unwrap_err();
        assert_eq!(
            err,
            SdiError::BufferTooSmall {
                required: 17,
                provided: 10
            }
        );
        assert_eq!(small, [0xaa; 10]);

        let mut buf = [0xaau8; 17];
        assert_eq!(write_nul_terminated("ACME", 16, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..5], b"ACME\0");
    }

    #[test]
    fn test_product_info_decode() {
        let info = ProductInfo::decode(&[0x0f, 0x10, 0x02, 0x00, 0x41, 0x00, 0x00]);
        assert_eq!(info.revision, 2);
        assert_eq!(info.product_id, 0x0041);
        assert!(info.matches_key([0x0f, 0x10]));
        assert!(!info.matches_key([0x10, 0x0f]));
        assert_eq!(ProductInfo::offset(FormFactor::Qsfp), 224);
    }
}
