//! Chassis entity classifications.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of physically removable chassis component.
///
/// The declaration order is the enumeration order used by the entity
/// directory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Main system board.
    SystemBoard,
    /// Fan tray.
    FanTray,
    /// Power supply tray.
    PsuTray,
}

impl EntityType {
    /// All entity types in directory order.
    pub const ALL: [EntityType; 3] = [
        EntityType::SystemBoard,
        EntityType::FanTray,
        EntityType::PsuTray,
    ];

    /// Returns true if entities of this type report output power and accept
    /// power control.
    pub const fn is_power_capable(&self) -> bool {
        matches!(self, EntityType::PsuTray)
    }

    /// Returns the canonical lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityType::SystemBoard => "system_board",
            EntityType::FanTray => "fan_tray",
            EntityType::PsuTray => "psu_tray",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "system_board" | "board" => Ok(EntityType::SystemBoard),
            "fan_tray" | "fan" => Ok(EntityType::FanTray),
            "psu_tray" | "psu" => Ok(EntityType::PsuTray),
            _ => Err(ParseError::InvalidEntityType(s.to_string())),
        }
    }
}

/// Entity reset flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetType {
    /// Resets the control plane only; traffic keeps flowing.
    Warm,
    /// Resets control and data plane; traffic is disrupted.
    Cold,
}

impl ResetType {
    /// Returns true if this reset disrupts the data plane.
    pub const fn affects_data_plane(&self) -> bool {
        matches!(self, ResetType::Cold)
    }
}

impl fmt::Display for ResetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetType::Warm => write!(f, "warm"),
            ResetType::Cold => write!(f, "cold"),
        }
    }
}

impl FromStr for ResetType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warm" => Ok(ResetType::Warm),
            "cold" => Ok(ResetType::Cold),
            _ => Err(ParseError::InvalidResetType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entity_type_order() {
        let mut types = vec![
            EntityType::PsuTray,
            EntityType::SystemBoard,
            EntityType::FanTray,
        ];
        types.sort();
        assert_eq!(types, EntityType::ALL.to_vec());
    }

    #[test]
    fn test_entity_type_parse() {
        assert_eq!("fan_tray".parse::<EntityType>().unwrap(), EntityType::FanTray);
        assert_eq!("PSU-TRAY".parse::<EntityType>().unwrap(), EntityType::PsuTray);
        assert_eq!("board".parse::<EntityType>().unwrap(), EntityType::SystemBoard);
        assert!("linecard".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_entity_type_display_roundtrip() {
        for t in EntityType::ALL {
            assert_eq!(t.to_string().parse::<EntityType>().unwrap(), t);
        }
    }

    #[test]
    fn test_power_capable() {
        assert!(EntityType::PsuTray.is_power_capable());
        assert!(!EntityType::FanTray.is_power_capable());
        assert!(!EntityType::SystemBoard.is_power_capable());
    }

    #[test]
    fn test_reset_type() {
        assert_eq!("Cold".parse::<ResetType>().unwrap(), ResetType::Cold);
        assert!(ResetType::Cold.affects_data_plane());
        assert!(!ResetType::Warm.affects_data_plane());
        assert_eq!(
            "hard".parse::<ResetType>(),
            Err(ParseError::InvalidResetType("hard".to_string()))
        );
    }

    #[test]
    fn test_entity_type_serde() {
        let json = serde_json::to_string(&EntityType::PsuTray).unwrap();
        assert_eq!(json, "\"psu_tray\"");
        let parsed: EntityType = serde_json::from_str("\"system_board\"").unwrap();
        assert_eq!(parsed, EntityType::SystemBoard);
    }
}
