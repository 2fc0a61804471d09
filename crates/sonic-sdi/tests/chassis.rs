//! Entity control and the simple resource drivers on the sample platform.

mod common;

use common::{cpld, sample_platform, CPLD};
use pretty_assertions::assert_eq;
use sdi_types::{EntityType, PowerType, ResetType, ResourceType, ThresholdLevel};
use sonic_sdi::{BusAddress, BusTransport, EntityState, SdiError};

const FAN_CTRL: BusAddress = BusAddress::new(1, 0x2c);

#[test]
fn test_entity_states_follow_cpld() {
    let p = sample_platform();
    let api = p.registry.entity_api();
    let board = p.entity(EntityType::SystemBoard);
    let tray = p.entity(EntityType::FanTray);
    let psu = p.entity(EntityType::PsuTray);

    for hdl in [board, tray, psu] {
        assert_eq!(api.state_get(hdl).unwrap(), EntityState::PresentHealthy);
    }

    // PSU fault, fan tray pulled.
    p.bus.write_u8(CPLD, cpld::FAULT, 0x02).unwrap();
    p.bus.write_u8(CPLD, cpld::PRESENCE, 0x02).unwrap();
    assert_eq!(api.state_get(psu).unwrap(), EntityState::PresentFaulted);
    assert_eq!(api.state_get(tray).unwrap(), EntityState::Absent);
    // The board has no presence signal.
    assert!(api.presence_get(board).unwrap());
}

#[test]
fn test_psu_power_control() {
    let p = sample_platform();
    let api = p.registry.entity_api();
    let psu = p.entity(EntityType::PsuTray);

    assert!(api.psu_output_power_status_get(psu).unwrap());
    api.power_status_control(psu, false).unwrap();
    assert_eq!(p.bus.read_u8(CPLD, cpld::PSU_POWER).unwrap() & 0x02, 0);

    let board = p.entity(EntityType::SystemBoard);
    assert!(matches!(
        api.power_status_control(board, false),
        Err(SdiError::Unsupported { .. })
    ));
}

#[test]
fn test_init_all_applies_defaults() {
    let p = sample_platform();
    let fan = p.resource(EntityType::FanTray, ResourceType::Fan, "Fan 1");
    let display = p.resource(EntityType::SystemBoard, ResourceType::DigitDisplayLed, "Unit");
    let status = p.resource(EntityType::SystemBoard, ResourceType::Led, "Status");
    let cpu = p.resource(EntityType::SystemBoard, ResourceType::Temperature, "CPU");

    p.registry.fan_api().speed_set(fan, 4_000).unwrap();
    p.registry
        .thermal_api()
        .threshold_set(cpu, ThresholdLevel::High, 60)
        .unwrap();

    p.registry.entity_api().init_all().unwrap();

    assert_eq!(p.bus.read_u16_be(FAN_CTRL, 2).unwrap(), 9_000);
    assert_eq!(
        p.registry
            .thermal_api()
            .threshold_get(cpu, ThresholdLevel::High)
            .unwrap(),
        85
    );
    assert!(p.registry.led_api().state_get(status).unwrap());
    assert_eq!(p.bus.read_u8(CPLD, cpld::LEDS).unwrap(), 0x01);
    assert_eq!(p.registry.digit_display_api().text_get(display).unwrap(), "1");
    assert!(p.registry.digit_display_api().state_get(display).unwrap());

    let mut chars = [0u8; 4];
    p.bus.read(CPLD, cpld::DISPLAY, &mut chars).unwrap();
    assert_eq!(&chars, b"   1");

    // Running it again changes nothing.
    let before = p.bus.contents(CPLD).unwrap();
    p.registry.entity_api().init_all().unwrap();
    assert_eq!(p.bus.contents(CPLD).unwrap(), before);
}

#[test]
fn test_reset() {
    let p = sample_platform();
    let api = p.registry.entity_api();
    let tray = p.entity(EntityType::FanTray);
    let fan = p.resource(EntityType::FanTray, ResourceType::Fan, "Fan 1");

    p.registry.fan_api().speed_set(fan, 4_000).unwrap();
    api.reset(tray, ResetType::Cold).unwrap();
    assert_eq!(p.bus.read_u16_be(FAN_CTRL, 2).unwrap(), 9_000);
    // The pulse leaves the reset bit released.
    assert_eq!(p.bus.read_u8(CPLD, 0x04).unwrap(), 0);

    assert!(matches!(
        api.reset(tray, ResetType::Warm),
        Err(SdiError::Unsupported { .. })
    ));
    let psu = p.entity(EntityType::PsuTray);
    assert!(matches!(
        api.reset(psu, ResetType::Cold),
        Err(SdiError::Unsupported { .. })
    ));
}

#[test]
fn test_warm_reset_restores_defaults() {
    let p = sample_platform();
    let leds = p.registry.led_api();
    let display = p.registry.digit_display_api();
    let status = p.resource(EntityType::SystemBoard, ResourceType::Led, "Status");
    let locator = p.resource(EntityType::SystemBoard, ResourceType::Led, "Locator");
    let unit = p.resource(EntityType::SystemBoard, ResourceType::DigitDisplayLed, "Unit");

    leds.off(status).unwrap();
    leds.on(locator).unwrap();
    display.set(unit, "42").unwrap();

    p.registry
        .entity_api()
        .reset(p.entity(EntityType::SystemBoard), ResetType::Warm)
        .unwrap();

    assert!(leds.state_get(status).unwrap());
    assert!(!leds.state_get(locator).unwrap());
    assert_eq!(display.text_get(unit).unwrap(), "1");
    assert_eq!(p.bus.read_u8(CPLD, cpld::LEDS).unwrap(), 0x01);
    // Both reset bits are released after the pulse.
    assert_eq!(p.bus.read_u8(CPLD, 0x04).unwrap() & 0x03, 0);
}

#[test]
fn test_thermal_sensors() {
    let p = sample_platform();
    let api = p.registry.thermal_api();
    let inlet = p.resource(EntityType::SystemBoard, ResourceType::Temperature, "Inlet");
    let cpu = p.resource(EntityType::SystemBoard, ResourceType::Temperature, "CPU");
    let psu = p.resource(EntityType::PsuTray, ResourceType::Temperature, "PSU");

    assert_eq!(api.temperature_get(inlet).unwrap(), 38);
    assert_eq!(api.temperature_get(cpu).unwrap(), 52);
    assert_eq!(api.temperature_get(psu).unwrap(), 42);
    assert_eq!(api.threshold_get(psu, ThresholdLevel::Critical).unwrap(), 95);

    assert!(!api.status_get(cpu).unwrap());
    api.threshold_set(cpu, ThresholdLevel::High, 50).unwrap();
    assert!(api.status_get(cpu).unwrap());

    assert!(matches!(
        api.threshold_set(cpu, ThresholdLevel::High, 200),
        Err(SdiError::InvalidParameter { .. })
    ));
    assert_eq!(api.threshold_get(cpu, ThresholdLevel::High).unwrap(), 50);
}

#[test]
fn test_fans() {
    let p = sample_platform();
    let api = p.registry.fan_api();
    let fan = p.resource(EntityType::FanTray, ResourceType::Fan, "Fan 1");
    let psu_fan = p.resource(EntityType::PsuTray, ResourceType::Fan, "PSU fan");

    assert_eq!(api.speed_get(fan).unwrap(), 9_000);
    assert_eq!(api.speed_get(psu_fan).unwrap(), 7_000);
    assert!(!api.status_get(fan).unwrap());

    assert!(matches!(
        api.speed_set(fan, 18_001),
        Err(SdiError::InvalidParameter { .. })
    ));

    // Target set but rotor stopped.
    p.bus.write_u16_be(FAN_CTRL, 0, 0).unwrap();
    assert!(api.status_get(fan).unwrap());
}

#[test]
fn test_leds_and_display() {
    let p = sample_platform();
    let leds = p.registry.led_api();
    let display = p.registry.digit_display_api();
    let locator = p.resource(EntityType::SystemBoard, ResourceType::Led, "Locator");
    let unit = p.resource(EntityType::SystemBoard, ResourceType::DigitDisplayLed, "Unit");

    leds.on(locator).unwrap();
    assert_eq!(p.bus.read_u8(CPLD, cpld::LEDS).unwrap(), 0x02);
    leds.off(locator).unwrap();
    assert!(!leds.state_get(locator).unwrap());

    display.set(unit, "12").unwrap();
    display.on(unit).unwrap();
    assert_eq!(display.text_get(unit).unwrap(), "12");
    assert_eq!(p.bus.read_u8(CPLD, cpld::DISPLAY_ENABLE).unwrap(), 0x01);
    assert!(matches!(
        display.set(unit, "12345"),
        Err(SdiError::InvalidParameter { .. })
    ));
    display.off(unit).unwrap();
    assert!(!display.state_get(unit).unwrap());
}

#[test]
fn test_inventory_and_plds() {
    let p = sample_platform();
    let info = p.registry.entity_info_api();
    let plds = p.registry.pld_api();

    let board = info
        .read(p.resource(EntityType::SystemBoard, ResourceType::EntityInfo, "Board EEPROM"))
        .unwrap();
    assert_eq!(board.prod_name, "SAMPLE-48X");
    assert_eq!(board.mac_size, 128);
    assert_eq!(board.base_mac, [0x00, 0x11, 0x22, 0x33, 0x44, 0x00]);

    let psu = info
        .read(p.resource(EntityType::PsuTray, ResourceType::EntityInfo, "PSU EEPROM"))
        .unwrap();
    assert_eq!(psu.power_rating, 460);
    assert_eq!(psu.power_type, PowerType::Ac);
    assert_eq!(psu.num_fans, 1);

    let cpld = p.resource(EntityType::SystemBoard, ResourceType::UpgradablePld, "CPLD");
    let fpga = p.resource(EntityType::SystemBoard, ResourceType::UpgradablePld, "FPGA");
    assert_eq!(plds.version_get(cpld).unwrap(), 5);
    assert_eq!(plds.version_get(fpga).unwrap(), 7);
}
