//! Media slot driver: identification, decode and raw access.

use super::compliance::TransceiverDescriptor;
use super::diag::RxPowerType;
use super::layout::{family_of, qsfp, sfp};
use super::params::{max_speed, ChecksumStatus, FeatureSupport, MediaParameter};
use super::vendor::{write_nul_terminated, ProductInfo, VendorInfoType, PRODUCT_INFO_LEN};
use crate::bus::{BusAddress, SharedBus};
use crate::drivers::{Signal, SignalConfig};
use crate::error::{SdiError, SdiResult};
use log::{debug, warn};
use parking_lot::Mutex;
use sdi_types::{FormFactor, MediaSpeed, MediaType};
use serde::{Deserialize, Serialize};

fn default_eeprom_device() -> u16 {
    0x50
}

fn default_true() -> bool {
    true
}

/// Register value shown by a port LED for one link speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedPattern {
    pub speed: MediaSpeed,
    pub value: u8,
}

/// Port LED registers, one per channel starting at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLedConfig {
    pub bus: u32,
    pub device: u16,
    pub offset: u32,
    #[serde(default)]
    pub off_value: u8,
    pub patterns: Vec<LedPattern>,
}

/// Copper PHYs behind a media slot, one per channel at `base_device + channel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhyConfig {
    pub bus: u32,
    pub base_device: u16,
    #[serde(default)]
    pub media_type: MediaType,
}

/// State applied by entity init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDefaults {
    /// Enable the transmitters of every channel.
    #[serde(default = "default_true")]
    pub tx_enable: bool,
    /// Low-power mode to apply, if any.
    #[serde(default)]
    pub low_power: Option<bool>,
}

impl Default for MediaDefaults {
    fn default() -> Self {
        Self {
            tx_enable: true,
            low_power: None,
        }
    }
}

/// Platform description of a media slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConfig {
    pub form_factor: FormFactor,
    pub bus: u32,
    #[serde(default = "default_eeprom_device")]
    pub eeprom_device: u16,
    #[serde(default)]
    pub presence: Option<SignalConfig>,
    #[serde(default)]
    pub reset: Option<SignalConfig>,
    #[serde(default)]
    pub lp_mode: Option<SignalConfig>,
    #[serde(default)]
    pub led: Option<MediaLedConfig>,
    #[serde(default)]
    pub phy: Option<PhyConfig>,
    /// Vendor product block key of qualified modules.
    #[serde(default)]
    pub qualification_key: Option<[u8; 2]>,
    #[serde(default)]
    pub defaults: MediaDefaults,
}

impl MediaConfig {
    pub fn new(form_factor: FormFactor, bus: u32) -> Self {
        Self {
            form_factor,
            bus,
            eeprom_device: default_eeprom_device(),
            presence: None,
            reset: None,
            lp_mode: None,
            led: None,
            phy: None,
            qualification_key: None,
            defaults: MediaDefaults::default(),
        }
    }
}

/// Identification state of the seated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeState {
    Unprobed,
    Identified(u8),
    /// Identifier did not match the slot family; typed reads are refused
    /// until the next refresh.
    Unknown(u8),
}

/// A pluggable media slot.
pub struct MediaDevice {
    pub(super) bus: SharedBus,
    pub(super) config: MediaConfig,
    pub(super) eeprom: BusAddress,
    presence: Option<Signal>,
    pub(super) reset: Option<Signal>,
    pub(super) lp_mode: Option<Signal>,
    state: Mutex<ProbeState>,
}

impl MediaDevice {
    pub fn new(bus: SharedBus, config: MediaConfig) -> Self {
        let eeprom = BusAddress::new(config.bus, config.eeprom_device);
        let signal = |c: &Option<SignalConfig>| c.as_ref().map(|c| Signal::new(bus.clone(), *c));
        Self {
            presence: signal(&config.presence),
            reset: signal(&config.reset),
            lp_mode: signal(&config.lp_mode),
            bus,
            config,
            eeprom,
            state: Mutex::new(ProbeState::Unprobed),
        }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn form_factor(&self) -> FormFactor {
        self.config.form_factor
    }

    pub fn lane_count(&self) -> u32 {
        self.config.form_factor.lane_count()
    }

    pub fn eeprom_size(&self) -> usize {
        self.config.form_factor.eeprom_size()
    }

    pub(crate) fn check_channel(&self, channel: u32) -> SdiResult<()> {
        let lane_count = self.lane_count();
        if channel >= lane_count {
            return Err(SdiError::InvalidChannel {
                channel,
                lane_count,
            });
        }
        Ok(())
    }

    /// Module presence.
    ///
    /// Without a presence signal the EEPROM is probed; an unresponsive
    /// device reads as absent. A module found absent is re-identified on
    /// its next typed read.
    pub fn presence(&self) -> SdiResult<bool> {
        let present = match &self.presence {
            Some(signal) => signal.is_asserted()?,
            None => match self.bus.read_u8(self.eeprom, 0) {
                Ok(_) => true,
                Err(e) => match SdiError::from(e) {
                    SdiError::DeviceUnresponsive { .. } => false,
                    other => return Err(other),
                },
            },
        };
        if !present {
            *self.state.lock() = ProbeState::Unprobed;
        }
        Ok(present)
    }

    /// Drops the cached identification and identifies the module again.
    pub fn refresh(&self) -> SdiResult<u8> {
        *self.state.lock() = ProbeState::Unprobed;
        self.identify()
    }

    /// Identifier byte of the seated module, read once and cached.
    pub fn identify(&self) -> SdiResult<u8> {
        let mut state = self.state.lock();
        match *state {
            ProbeState::Identified(id) => return Ok(id),
            ProbeState::Unknown(identifier) => {
                return Err(SdiError::UnknownMediaType { identifier })
            }
            ProbeState::Unprobed => {}
        }
        let id = self.bus.read_u8(self.eeprom, sfp::IDENTIFIER)?;
        if family_of(id) == Some(self.config.form_factor) {
            debug!("Identified {} module 0x{:02x} at {}", self.config.form_factor, id, self.eeprom);
            *state = ProbeState::Identified(id);
            Ok(id)
        } else {
            warn!(
                "Module at {} has identifier 0x{:02x}, not a {} module",
                self.eeprom, id, self.config.form_factor
            );
            *state = ProbeState::Unknown(id);
            Err(SdiError::UnknownMediaType { identifier: id })
        }
    }

    /// Typed EEPROM read; requires an identified module.
    pub(super) fn read_field(&self, offset: u32, buf: &mut [u8]) -> SdiResult<()> {
        self.identify()?;
        self.bus.read(self.eeprom, offset, buf)?;
        Ok(())
    }

    pub(super) fn read_field_u8(&self, offset: u32) -> SdiResult<u8> {
        let mut buf = [0u8; 1];
        self.read_field(offset, &mut buf)?;
        Ok(buf[0])
    }

    pub(super) fn read_field_u16(&self, offset: u32) -> SdiResult<u16> {
        let mut buf = [0u8; 2];
        self.read_field(offset, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub(super) fn update_field(&self, offset: u32, mask: u8, value: u8) -> SdiResult<()> {
        self.identify()?;
        self.bus.update_bits(self.eeprom, offset, mask, value)?;
        Ok(())
    }

    pub fn transceiver_code(&self) -> SdiResult<TransceiverDescriptor> {
        let offset = match self.config.form_factor {
            FormFactor::Sfp => sfp::COMPLIANCE,
            FormFactor::Qsfp => qsfp::COMPLIANCE,
        };
        let mut codes = [0u8; 8];
        self.read_field(offset, &mut codes)?;
        Ok(TransceiverDescriptor::decode(self.config.form_factor, &codes))
    }

    /// Vendor field as trimmed text.
    pub fn vendor_info(&self, kind: VendorInfoType) -> SdiResult<String> {
        let span = kind.span(self.config.form_factor);
        let mut raw = vec![0u8; span.len];
        self.read_field(span.offset, &mut raw)?;
        Ok(kind.render(&raw))
    }

    /// Writes the vendor field plus a NUL terminator into `buf`.
    ///
    /// `buf` must hold the full field width plus one byte; otherwise
    /// `BufferTooSmall` is returned before any bus access.
    pub fn vendor_info_get(&self, kind: VendorInfoType, buf: &mut [u8]) -> SdiResult<usize> {
        let width = kind.text_width(self.config.form_factor);
        if buf.len() <= width {
            return Err(SdiError::BufferTooSmall {
                required: width + 1,
                provided: buf.len(),
            });
        }
        let text = self.vendor_info(kind)?;
        write_nul_terminated(&text, width, buf)
    }

    pub fn parameter(&self, param: MediaParameter) -> SdiResult<u32> {
        let location = param.location(self.config.form_factor).ok_or_else(|| {
            SdiError::unsupported(format!("{} on {} modules", param, self.config.form_factor))
        })?;
        let mut raw = [0u8; 4];
        let raw = &mut raw[..location.width];
        self.read_field(location.offset, raw)?;
        Ok(location.decode(raw))
    }

    pub fn feature_support(&self) -> SdiResult<FeatureSupport> {
        Ok(match self.config.form_factor {
            FormFactor::Sfp => FeatureSupport::sfp(
                self.read_field_u8(sfp::OPTIONS + 1)?,
                self.read_field_u8(sfp::DIAG_MON_TYPE)?,
                self.read_field_u8(sfp::ENHANCED_OPTIONS)?,
            ),
            FormFactor::Qsfp => FeatureSupport::qsfp(
                self.read_field_u8(qsfp::STATUS)?,
                self.read_field_u8(qsfp::OPTIONS_LAST)?,
            ),
        })
    }

    /// Highest supported data rate.
    pub fn speed(&self) -> SdiResult<MediaSpeed> {
        let id = self.identify()?;
        let descriptor = self.transceiver_code()?;
        let nominal = self.parameter(MediaParameter::NominalBitrate)? as u8;
        Ok(max_speed(id, &descriptor, nominal))
    }

    pub fn product_info(&self) -> SdiResult<ProductInfo> {
        let mut raw = [0u8; PRODUCT_INFO_LEN];
        self.read_field(ProductInfo::offset(self.config.form_factor), &mut raw)?;
        Ok(ProductInfo::decode(&raw))
    }

    /// True when the module carries the platform's qualification key.
    pub fn is_qualified(&self) -> SdiResult<bool> {
        let key = self
            .config
            .qualification_key
            .ok_or_else(|| SdiError::unsupported("module qualification"))?;
        Ok(self.product_info()?.matches_key(key))
    }

    pub fn rx_power_type(&self) -> SdiResult<RxPowerType> {
        let (offset, mask) = match self.config.form_factor {
            FormFactor::Sfp => (sfp::DIAG_MON_TYPE, sfp::DIAG_RX_PWR_AVERAGE),
            FormFactor::Qsfp => (qsfp::DIAG_MON_TYPE, qsfp::DIAG_RX_PWR_AVERAGE),
        };
        Ok(if self.read_field_u8(offset)? & mask != 0 {
            RxPowerType::Average
        } else {
            RxPowerType::Oma
        })
    }

    pub fn checksum_verify(&self) -> SdiResult<ChecksumStatus> {
        let mut page = [0u8; 256];
        self.read_field(0, &mut page)?;
        Ok(ChecksumStatus::verify(self.config.form_factor, &page))
    }

    fn check_window(&self, offset: u32, len: usize) -> SdiResult<()> {
        let size = self.eeprom_size();
        let end = (offset as usize).checked_add(len);
        match end {
            Some(end) if end <= size => Ok(()),
            _ => Err(SdiError::invalid_parameter(format!(
                "{} bytes at offset {} exceed the {} byte EEPROM",
                len, offset, size
            ))),
        }
    }

    /// Raw EEPROM read; works on modules that fail identification.
    pub fn read(&self, offset: u32, buf: &mut [u8]) -> SdiResult<()> {
        self.check_window(offset, buf.len())?;
        self.bus.read(self.eeprom, offset, buf)?;
        Ok(())
    }

    /// Raw EEPROM write.
    pub fn write(&self, offset: u32, data: &[u8]) -> SdiResult<()> {
        self.check_window(offset, data.len())?;
        debug!("Raw write of {} bytes at {}+{}", data.len(), self.eeprom, offset);
        self.bus.write(self.eeprom, offset, data)?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::media::compliance::{Qsfp40gEthernet, Sfp10gEthernet};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identify_and_decode_sfp() {
        let (_bus, dev) = device(FormFactor::Sfp, &sfp_image());
        assert_eq!(dev.identify().unwrap(), 0x03);
        match dev.transceiver_code().unwrap() {
            TransceiverDescriptor::Sfp(c) => assert_eq!(c.eth_10g, Sfp10gEthernet::SR),
            other => panic!("unexpected descriptor {:?}", other),
        }
        assert_eq!(dev.vendor_info(VendorInfoType::Name).unwrap(), "ACME OPTICS");
        assert_eq!(dev.vendor_info(VendorInfoType::Oui).unwrap(), "00:17:6a");
        assert_eq!(dev.vendor_info(VendorInfoType::Revision).unwrap(), "B");
        assert_eq!(dev.parameter(MediaParameter::Wavelength).unwrap(), 850);
        assert_eq!(dev.speed().unwrap(), MediaSpeed::Speed10G);
    }

    #[test]
    fn test_identify_and_decode_qsfp() {
        let (_bus, dev) = device(FormFactor::Qsfp, &qsfp_image());
        match dev.transceiver_code().unwrap() {
            TransceiverDescriptor::Qsfp(c) => assert_eq!(c.eth_40g, Qsfp40gEthernet::SR4_40G),
            other => panic!("unexpected descriptor {:?}", other),
        }
        assert_eq!(dev.vendor_info(VendorInfoType::SerialNumber).unwrap(), "QSN0042");
        assert_eq!(dev.parameter(MediaParameter::Wavelength).unwrap(), 850);
        assert_eq!(dev.speed().unwrap(), MediaSpeed::Speed40G);
        assert_eq!(
            dev.feature_support().unwrap(),
            FeatureSupport::Qsfp {
                rate_select: false,
                tx_control: true,
                paging: true
            }
        );
        assert!(matches!(
            dev.parameter(MediaParameter::MaxBitrate),
            Err(SdiError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_unknown_identifier_is_sticky_until_refresh() {
        let mut image = sfp_image();
        image[0] = 0x18;
        let (bus, dev) = device(FormFactor::Sfp, &image);
        assert_eq!(
            dev.transceiver_code().unwrap_err(),
            SdiError::UnknownMediaType { identifier: 0x18 }
        );

        // Fixing the EEPROM is not enough: the failure is cached.
        bus.load(BusAddress::new(BUS, 0x50), 0, &[0x03]);
        assert!(matches!(
            dev.vendor_info(VendorInfoType::Name),
            Err(SdiError::UnknownMediaType { .. })
        ));

        assert_eq!(dev.refresh().unwrap(), 0x03);
        assert_eq!(dev.vendor_info(VendorInfoType::Name).unwrap(), "ACME OPTICS");
    }

    #[test]
    fn test_raw_access_ignores_identification() {
        let mut image = qsfp_image();
        image[0] = 0x00;
        let (_bus, dev) = device(FormFactor::Qsfp, &image);
        let mut buf = [0u8; 4];
        dev.read(168, &mut buf).unwrap();
        assert_eq!(&buf, b"QSFP");
        dev.write(636, &[1, 2, 3, 4]).unwrap();
        assert!(matches!(
            dev.read(637, &mut buf),
            Err(SdiError::InvalidParameter { .. })
        ));
        assert!(matches!(
            dev.write(u32::MAX, &[0]),
            Err(SdiError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_vendor_info_buffer_too_small() {
        let (_bus, dev) = device(FormFactor::Sfp, &sfp_image());
        let mut buf = [0x55u8; 10];
        assert_eq!(
            dev.vendor_info_get(VendorInfoType::Name, &mut buf).unwrap_err(),
            SdiError::BufferTooSmall {
                required: 17,
                provided: 10
            }
        );
        assert_eq!(buf, [0x55; 10]);

        let mut buf = [0x55u8; 17];
        let len = dev.vendor_info_get(VendorInfoType::Name, &mut buf).unwrap();
        assert_eq!(&buf[..=len], b"ACME OPTICS\0");
    }

    #[test]
    fn test_presence_without_signal() {
        let (bus, dev) = device(FormFactor::Sfp, &sfp_image());
        assert!(dev.presence().unwrap());
        dev.identify().unwrap();
        bus.set_unresponsive(BusAddress::new(BUS, 0x50), true);
        assert!(!dev.presence().unwrap());
        assert!(matches!(
            dev.identify(),
            Err(SdiError::DeviceUnresponsive { .. })
        ));
    }

    #[test]
    fn test_qualification() {
        let (_bus, dev) = device(FormFactor::Sfp, &sfp_image());
        assert!(matches!(dev.is_qualified(), Err(SdiError::Unsupported { .. })));
        assert_eq!(dev.product_info().unwrap().product_id, 0x0021);

        let mut config = dev.config().clone();
        config.qualification_key = Some([0x0f, 0x10]);
        let qualified = MediaDevice::new(dev.bus.clone(), config);
        assert!(qualified.is_qualified().unwrap());
    }

    #[test]
    fn test_checksum_and_rx_power_type() {
        let mut image = sfp_image();
        image[63] = crate::media::layout::check_code(&image[..63]);
        image[95] = crate::media::layout::check_code(&image[64..95]);
        let (_bus, dev) = device(FormFactor::Sfp, &image);
        assert!(dev.checksum_verify().unwrap().is_valid());
        assert_eq!(dev.rx_power_type().unwrap(), RxPowerType::Oma);
    }
}
