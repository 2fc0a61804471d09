//! Pluggable media enumerations.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Module family of a front-panel media slot.
///
/// Fixed by the platform description; a slot never changes family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFactor {
    /// SFP/SFP+/SFP28 (SFF-8472 memory map).
    Sfp,
    /// QSFP/QSFP+/QSFP28 (SFF-8436/SFF-8636 memory map).
    Qsfp,
}

impl FormFactor {
    /// Number of optical lanes (channels) of the module.
    pub const fn lane_count(&self) -> u32 {
        match self {
            FormFactor::Sfp => 1,
            FormFactor::Qsfp => 4,
        }
    }

    /// Size of the linearly addressed EEPROM window.
    ///
    /// SFP exposes A0h followed by A2h; QSFP exposes the lower page, upper
    /// page 0 and upper pages 1 to 3.
    pub const fn eeprom_size(&self) -> usize {
        match self {
            FormFactor::Sfp => 512,
            FormFactor::Qsfp => 640,
        }
    }
}

impl fmt::Display for FormFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormFactor::Sfp => write!(f, "sfp"),
            FormFactor::Qsfp => write!(f, "qsfp"),
        }
    }
}

impl FromStr for FormFactor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sfp" | "sfp+" | "sfp28" => Ok(FormFactor::Sfp),
            "qsfp" | "qsfp+" | "qsfp28" => Ok(FormFactor::Qsfp),
            _ => Err(ParseError::InvalidFormFactor(s.to_string())),
        }
    }
}

/// Media link speed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MediaSpeed {
    #[serde(rename = "10M")]
    Speed10M,
    #[serde(rename = "100M")]
    Speed100M,
    #[serde(rename = "1G")]
    Speed1G,
    #[serde(rename = "10G")]
    Speed10G,
    #[serde(rename = "25G")]
    Speed25G,
    #[serde(rename = "40G")]
    Speed40G,
    #[serde(rename = "100G")]
    Speed100G,
}

impl MediaSpeed {
    /// All speeds, slowest first.
    pub const ALL: [MediaSpeed; 7] = [
        MediaSpeed::Speed10M,
        MediaSpeed::Speed100M,
        MediaSpeed::Speed1G,
        MediaSpeed::Speed10G,
        MediaSpeed::Speed25G,
        MediaSpeed::Speed40G,
        MediaSpeed::Speed100G,
    ];

    /// Returns the speed in Mbps.
    pub const fn as_mbps(&self) -> u32 {
        match self {
            MediaSpeed::Speed10M => 10,
            MediaSpeed::Speed100M => 100,
            MediaSpeed::Speed1G => 1_000,
            MediaSpeed::Speed10G => 10_000,
            MediaSpeed::Speed25G => 25_000,
            MediaSpeed::Speed40G => 40_000,
            MediaSpeed::Speed100G => 100_000,
        }
    }

    /// Returns true if a copper PHY can be configured at this speed.
    pub const fn is_phy_speed(&self) -> bool {
        matches!(
            self,
            MediaSpeed::Speed10M | MediaSpeed::Speed100M | MediaSpeed::Speed1G
        )
    }

    const fn label(&self) -> &'static str {
        match self {
            MediaSpeed::Speed10M => "10M",
            MediaSpeed::Speed100M => "100M",
            MediaSpeed::Speed1G => "1G",
            MediaSpeed::Speed10G => "10G",
            MediaSpeed::Speed25G => "25G",
            MediaSpeed::Speed40G => "40G",
            MediaSpeed::Speed100G => "100G",
        }
    }
}

impl fmt::Display for MediaSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MediaSpeed {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        MediaSpeed::ALL
            .into_iter()
            .find(|speed| speed.label() == upper)
            .ok_or_else(|| ParseError::InvalidMediaSpeed(s.to_string()))
    }
}

/// MAC-to-PHY interface mode of a copper module PHY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaMode {
    Mii,
    Gmii,
    Sgmii,
}

impl fmt::Display for MediaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaMode::Mii => write!(f, "mii"),
            MediaMode::Gmii => write!(f, "gmii"),
            MediaMode::Sgmii => write!(f, "sgmii"),
        }
    }
}

impl FromStr for MediaMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mii" => Ok(MediaMode::Mii),
            "gmii" => Ok(MediaMode::Gmii),
            "sgmii" => Ok(MediaMode::Sgmii),
            _ => Err(ParseError::InvalidMediaMode(s.to_string())),
        }
    }
}

/// Kind of module seated in a front-panel port, as seen by PHY operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// QSFP carrying four independent 1000BASE-T PHYs.
    Qsfp4x1000BaseT,
    /// Any other module.
    #[default]
    Default,
}
