//! Copper PHY access for 1000BASE-T modules.
//!
//! Each channel has a clause-22 PHY on the module's bus at
//! `base_device + channel`; register `n` is a big-endian 16-bit value at
//! offset `n`.

use super::device::{MediaDevice, PhyConfig};
use crate::bus::BusAddress;
use crate::error::{SdiError, SdiResult};
use log::debug;
use sdi_types::{FormFactor, MediaMode, MediaSpeed, MediaType};

const BMCR: u32 = 0;
const ANAR: u32 = 4;
const GBCR: u32 = 9;
const EXT_STATUS_MODE: u32 = 27;

const BMCR_RESET: u16 = 1 << 15;
const BMCR_SPEED_100: u16 = 1 << 13;
const BMCR_AN_ENABLE: u16 = 1 << 12;
const BMCR_AN_RESTART: u16 = 1 << 9;
const BMCR_FULL_DUPLEX: u16 = 1 << 8;
const BMCR_SPEED_1000: u16 = 1 << 6;

const ANAR_10_HALF: u16 = 1 << 5;
const ANAR_10_FULL: u16 = 1 << 6;
const ANAR_100_HALF: u16 = 1 << 7;
const ANAR_100_FULL: u16 = 1 << 8;
const GBCR_1000_HALF: u16 = 1 << 8;
const GBCR_1000_FULL: u16 = 1 << 9;

const MODE_MASK: u16 = 0x000f;
const MODE_SGMII: u16 = 0b0100;
const MODE_GMII: u16 = 0b1111;

impl MediaDevice {
    /// PHY of `channel`, after checking that the module is a copper module
    /// of the requested type.
    fn phy(&self, channel: u32, media_type: MediaType) -> SdiResult<BusAddress> {
        self.check_channel(channel)?;
        let phy: PhyConfig = self
            .config
            .phy
            .ok_or_else(|| SdiError::unsupported("PHY access"))?;
        if phy.media_type != media_type {
            return Err(SdiError::unsupported(format!(
                "PHY access for {:?} on a {:?} slot",
                media_type, phy.media_type
            )));
        }
        if self.form_factor() == FormFactor::Sfp && !self.transceiver_code()?.is_1000base_t() {
            return Err(SdiError::unsupported("PHY access on a non-copper module"));
        }
        let device = u16::try_from(channel)
            .ok()
            .and_then(|c| phy.base_device.checked_add(c))
            .ok_or_else(|| SdiError::invalid_parameter("PHY address out of range"))?;
        Ok(BusAddress::new(phy.bus, device))
    }

    fn phy_read(&self, phy: BusAddress, reg: u32) -> SdiResult<u16> {
        Ok(self.bus.read_u16_be(phy, reg)?)
    }

    fn phy_write(&self, phy: BusAddress, reg: u32, value: u16) -> SdiResult<()> {
        debug!("PHY {} reg {} <- 0x{:04x}", phy, reg, value);
        Ok(self.bus.write_u16_be(phy, reg, value)?)
    }

    pub fn phy_autoneg_set(&self, channel: u32, media_type: MediaType, enable: bool) -> SdiResult<()> {
        let phy = self.phy(channel, media_type)?;
        let bmcr = self.phy_read(phy, BMCR)?;
        let bmcr = if enable {
            bmcr | BMCR_AN_ENABLE | BMCR_AN_RESTART
        } else {
            bmcr & !(BMCR_AN_ENABLE | BMCR_AN_RESTART)
        };
        self.phy_write(phy, BMCR, bmcr)
    }

    pub fn phy_autoneg_get(&self, channel: u32, media_type: MediaType) -> SdiResult<bool> {
        let phy = self.phy(channel, media_type)?;
        Ok(self.phy_read(phy, BMCR)? & BMCR_AN_ENABLE != 0)
    }

    /// Selects the MAC interface and soft-resets the PHY.
    pub fn phy_mode_set(&self, channel: u32, media_type: MediaType, mode: MediaMode) -> SdiResult<()> {
        let phy = self.phy(channel, media_type)?;
        let bits = match mode {
            MediaMode::Sgmii => MODE_SGMII,
            MediaMode::Gmii | MediaMode::Mii => MODE_GMII,
        };
        let reg = self.phy_read(phy, EXT_STATUS_MODE)?;
        self.phy_write(phy, EXT_STATUS_MODE, (reg & !MODE_MASK) | bits)?;
        let bmcr = self.phy_read(phy, BMCR)?;
        self.phy_write(phy, BMCR, bmcr | BMCR_RESET)
    }

    /// Advertises exactly `speeds` (full duplex). With autonegotiation off
    /// the fastest speed is forced.
    pub fn phy_speed_set(
        &self,
        channel: u32,
        media_type: MediaType,
        speeds: &[MediaSpeed],
    ) -> SdiResult<()> {
        if speeds.is_empty() {
            return Err(SdiError::invalid_parameter("no PHY speed given"));
        }
        if let Some(bad) = speeds.iter().find(|s| !s.is_phy_speed()) {
            return Err(SdiError::invalid_parameter(format!(
                "{} is not a copper PHY speed",
                bad
            )));
        }
        let phy = self.phy(channel, media_type)?;

        let mut anar = self.phy_read(phy, ANAR)?;
        anar &= !(ANAR_10_HALF | ANAR_10_FULL | ANAR_100_HALF | ANAR_100_FULL);
        let mut gbcr = self.phy_read(phy, GBCR)?;
        gbcr &= !(GBCR_1000_HALF | GBCR_1000_FULL);
        for speed in speeds {
            match speed {
                MediaSpeed::Speed10M => anar |= ANAR_10_FULL,
                MediaSpeed::Speed100M => anar |= ANAR_100_FULL,
                _ => gbcr |= GBCR_1000_FULL,
            }
        }
        self.phy_write(phy, ANAR, anar)?;
        self.phy_write(phy, GBCR, gbcr)?;

        let bmcr = self.phy_read(phy, BMCR)?;
        let bmcr = if bmcr & BMCR_AN_ENABLE != 0 {
            bmcr | BMCR_AN_RESTART
        } else {
            let fastest = speeds.iter().max().copied().unwrap_or(MediaSpeed::Speed10M);
            let speed_bits = match fastest {
                MediaSpeed::Speed10M => 0,
                MediaSpeed::Speed100M => BMCR_SPEED_100,
                _ => BMCR_SPEED_1000,
            };
            (bmcr & !(BMCR_SPEED_100 | BMCR_SPEED_1000)) | speed_bits | BMCR_FULL_DUPLEX
        };
        self.phy_write(phy, BMCR, bmcr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusTransport, MemoryBus};
    use crate::media::device::test_support::*;
    use crate::media::device::MediaConfig;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const PHY_BASE: u16 = 0x56;

    fn copper_qsfp() -> (Arc<MemoryBus>, MediaDevice) {
        let mut image = qsfp_image();
        image[134] = 0x08; // 1000BASE-T
        let bus = Arc::new(MemoryBus::new());
        bus.add_device(BusAddress::new(BUS, 0x50), 640);
        bus.load(BusAddress::new(BUS, 0x50), 0, &image);
        for ch in 0..4 {
            bus.add_device(BusAddress::new(BUS, PHY_BASE + ch), 64);
        }
        let mut config = MediaConfig::new(FormFactor::Qsfp, BUS);
        config.phy = Some(PhyConfig {
            bus: BUS,
            base_device: PHY_BASE,
            media_type: MediaType::Qsfp4x1000BaseT,
        });
        let dev = MediaDevice::new(bus.clone(), config);
        (bus, dev)
    }

    #[test]
    fn test_autoneg() {
        let (bus, dev) = copper_qsfp();
        let t = MediaType::Qsfp4x1000BaseT;
        assert!(!dev.phy_autoneg_get(1, t).unwrap());
        dev.phy_autoneg_set(1, t, true).unwrap();
        assert!(dev.phy_autoneg_get(1, t).unwrap());
        assert!(!dev.phy_autoneg_get(0, t).unwrap());
        let phy1 = BusAddress::new(BUS, PHY_BASE + 1);
        assert_eq!(
            bus.read_u16_be(phy1, BMCR).unwrap(),
            BMCR_AN_ENABLE | BMCR_AN_RESTART
        );
        dev.phy_autoneg_set(1, t, false).unwrap();
        assert_eq!(bus.read_u16_be(phy1, BMCR).unwrap(), 0);
    }

    #[test]
    fn test_mode_and_speed() {
        let (bus, dev) = copper_qsfp();
        let t = MediaType::Qsfp4x1000BaseT;
        let phy = BusAddress::new(BUS, PHY_BASE + 2);
        bus.write_u16_be(phy, EXT_STATUS_MODE, 0x8a0f).unwrap();
        dev.phy_mode_set(2, t, MediaMode::Sgmii).unwrap();
        assert_eq!(bus.read_u16_be(phy, EXT_STATUS_MODE).unwrap(), 0x8a04);
        assert_eq!(bus.read_u16_be(phy, BMCR).unwrap() & BMCR_RESET, BMCR_RESET);

        bus.write_u16_be(phy, BMCR, 0).unwrap();
        dev.phy_speed_set(2, t, &[MediaSpeed::Speed100M, MediaSpeed::Speed10M])
            .unwrap();
        assert_eq!(bus.read_u16_be(phy, ANAR).unwrap(), ANAR_10_FULL | ANAR_100_FULL);
        assert_eq!(bus.read_u16_be(phy, GBCR).unwrap(), 0);
        assert_eq!(
            bus.read_u16_be(phy, BMCR).unwrap(),
            BMCR_SPEED_100 | BMCR_FULL_DUPLEX
        );

        assert!(matches!(
            dev.phy_speed_set(2, t, &[MediaSpeed::Speed10G]),
            Err(SdiError::InvalidParameter { .. })
        ));
        assert!(matches!(
            dev.phy_speed_set(2, t, &[]),
            Err(SdiError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_phy_requires_copper_slot() {
        let (_bus, dev) = copper_qsfp();
        assert!(matches!(
            dev.phy_autoneg_get(0, MediaType::Default),
            Err(SdiError::Unsupported { .. })
        ));
        assert!(matches!(
            dev.phy_autoneg_get(4, MediaType::Qsfp4x1000BaseT),
            Err(SdiError::InvalidChannel { .. })
        ));

        let (_bus, optical) = device(FormFactor::Sfp, &sfp_image());
        assert!(matches!(
            optical.phy_autoneg_set(0, MediaType::Default, true),
            Err(SdiError::Unsupported { .. })
        ));
    }
}
