//! Resource classifications and small resource value types.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of sensor or control owned by an entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Temperature sensor.
    Temperature,
    /// Fan.
    Fan,
    /// Single on/off LED.
    Led,
    /// Seven-segment style digit display.
    DigitDisplayLed,
    /// EEPROM-backed entity information block.
    EntityInfo,
    /// Field-upgradable programmable logic device.
    UpgradablePld,
    /// Pluggable optical/copper module (SFP/QSFP).
    Media,
}

impl ResourceType {
    /// All resource types.
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Temperature,
        ResourceType::Fan,
        ResourceType::Led,
        ResourceType::DigitDisplayLed,
        ResourceType::EntityInfo,
        ResourceType::UpgradablePld,
        ResourceType::Media,
    ];

    /// Returns the canonical lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Temperature => "temperature",
            ResourceType::Fan => "fan",
            ResourceType::Led => "led",
            ResourceType::DigitDisplayLed => "digit_display_led",
            ResourceType::EntityInfo => "entity_info",
            ResourceType::UpgradablePld => "upgradable_pld",
            ResourceType::Media => "media",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace('-', "_");
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .or(match normalized.as_str() {
                "thermal" | "temp" => Some(ResourceType::Temperature),
                "pld" => Some(ResourceType::UpgradablePld),
                _ => None,
            })
            .ok_or_else(|| ParseError::InvalidResourceType(s.to_string()))
    }
}

/// Thermal sensor threshold level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdLevel {
    /// Low temperature threshold.
    Low,
    /// High temperature threshold.
    High,
    /// Critical temperature threshold.
    Critical,
}

impl fmt::Display for ThresholdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThresholdLevel::Low => "low",
            ThresholdLevel::High => "high",
            ThresholdLevel::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ThresholdLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(ThresholdLevel::Low),
            "high" => Ok(ThresholdLevel::High),
            "critical" | "crit" => Ok(ThresholdLevel::Critical),
            _ => Err(ParseError::InvalidThresholdLevel(s.to_string())),
        }
    }
}

/// Fan tray / PSU air flow direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AirFlow {
    /// Front-to-back.
    #[default]
    Normal,
    /// Back-to-front.
    Reverse,
}

/// PSU input power type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerType {
    #[default]
    Ac,
    Dc,
}
