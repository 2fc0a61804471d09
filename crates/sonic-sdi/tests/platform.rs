//! Platform description files.

mod common;

use common::SAMPLE_PLATFORM;
use pretty_assertions::assert_eq;
use sdi_types::{EntityType, ResourceType};
use sonic_sdi::platform::DriverConfig;
use sonic_sdi::{PlatformConfig, Registry, SdiErrorKind, SharedBus};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn registry(config: &PlatformConfig) -> Registry {
    let bus: SharedBus = Arc::new(config.simulation_bus().unwrap());
    Registry::from_platform(config, bus).unwrap()
}

#[test]
fn test_sample_platform_loads() {
    let config = PlatformConfig::from_yaml_str(SAMPLE_PLATFORM).unwrap();
    assert_eq!(config.name, "sample-switch");
    assert_eq!(config.entities.len(), 3);

    let media: Vec<&str> = config.entities[0]
        .resources
        .iter()
        .filter(|r| matches!(r.driver, DriverConfig::Media(_)))
        .map(|r| r.alias.as_str())
        .collect();
    assert_eq!(media, vec!["Ethernet0", "Ethernet4"]);

    let registry = registry(&config);
    let psu = registry.entity_lookup(EntityType::PsuTray, 0).unwrap();
    assert_eq!(registry.resources(psu).unwrap().count(), 3);
}

#[test]
fn test_load_by_extension() {
    let dir = TempDir::new().unwrap();
    let config = PlatformConfig::from_yaml_str(SAMPLE_PLATFORM).unwrap();

    let yaml_path = dir.path().join("sdi.yaml");
    fs::write(&yaml_path, config.to_yaml_string().unwrap()).unwrap();
    let json_path = dir.path().join("sdi.json");
    fs::write(&json_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let from_yaml = PlatformConfig::load(&yaml_path).unwrap();
    let from_json = PlatformConfig::load(&json_path).unwrap();
    assert_eq!(
        serde_json::to_value(&from_yaml).unwrap(),
        serde_json::to_value(&config).unwrap()
    );
    assert_eq!(
        serde_json::to_value(&from_json).unwrap(),
        serde_json::to_value(&config).unwrap()
    );

    // Both build the same directory.
    let a = registry(&from_yaml);
    let b = registry(&from_json);
    for entity_type in EntityType::ALL {
        let ea = a.entity_lookup(entity_type, 0).unwrap();
        let eb = b.entity_lookup(entity_type, 0).unwrap();
        assert_eq!(a.entity_name(ea).unwrap(), b.entity_name(eb).unwrap());
        assert_eq!(
            a.resource_count(ea, ResourceType::Fan).unwrap(),
            b.resource_count(eb, ResourceType::Fan).unwrap()
        );
    }
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = PlatformConfig::load(dir.path().join("absent.yaml")).unwrap_err();
    assert_eq!(missing.kind(), SdiErrorKind::Config);

    // YAML content in a .json file is parsed as JSON.
    let misnamed = dir.path().join("sdi.json");
    fs::write(&misnamed, SAMPLE_PLATFORM).unwrap();
    assert_eq!(
        PlatformConfig::load(&misnamed).unwrap_err().kind(),
        SdiErrorKind::Config
    );

    let overrun = dir.path().join("overrun.yaml");
    fs::write(
        &overrun,
        "simulation:\n  - bus: 0\n    device: 0x31\n    size: 1\n    preload:\n      - offset: 0\n        hex: \"01 02\"\n",
    )
    .unwrap();
    let config = PlatformConfig::load(&overrun).unwrap();
    assert_eq!(config.simulation_bus().unwrap_err().kind(), SdiErrorKind::Config);
}
