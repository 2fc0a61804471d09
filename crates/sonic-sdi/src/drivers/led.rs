//! On/off LEDs and digit-display LEDs.

use super::{DigitDisplayDriver, LedDriver, Signal, SignalConfig};
use crate::bus::{BusAddress, SharedBus};
use crate::error::{SdiError, SdiResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedConfig {
    pub signal: SignalConfig,
    #[serde(default)]
    pub default_on: Option<bool>,
}

/// LED driven by a single register bit.
pub struct SignalLed {
    signal: Signal,
    default_on: Option<bool>,
}

impl SignalLed {
    pub fn new(bus: SharedBus, config: LedConfig) -> Self {
        Self {
            signal: Signal::new(bus, config.signal),
            default_on: config.default_on,
        }
    }
}

impl LedDriver for SignalLed {
    fn set(&self, on: bool) -> SdiResult<()> {
        self.signal.set(on)
    }

    fn is_on(&self) -> SdiResult<bool> {
        self.signal.is_asserted()
    }

    fn apply_defaults(&self) -> SdiResult<()> {
        match self.default_on {
            Some(on) => self.set(on),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitDisplayConfig {
    pub bus: u32,
    pub device: u16,
    /// First character register; one ASCII byte per position.
    pub offset: u32,
    pub width: usize,
    pub enable: SignalConfig,
    #[serde(default)]
    pub default_text: Option<String>,
}

/// Character display with one register per position.
pub struct RegisterDigitDisplay {
    bus: SharedBus,
    config: DigitDisplayConfig,
    enable: Signal,
}

impl RegisterDigitDisplay {
    pub fn new(bus: SharedBus, config: DigitDisplayConfig) -> Self {
        let enable = Signal::new(bus.clone(), config.enable);
        Self {
            bus,
            config,
            enable,
        }
    }

    fn address(&self) -> BusAddress {
        BusAddress::new(self.config.bus, self.config.device)
    }
}

fn is_displayable(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '.' | '-')
}

impl DigitDisplayDriver for RegisterDigitDisplay {
    /// Writes `text` right-aligned, padding with blanks.
    fn set_text(&self, text: &str) -> SdiResult<()> {
        if text.len() > self.config.width {
            return Err(SdiError::invalid_parameter(format!(
                "{:?} does not fit a {} digit display",
                text, self.config.width
            )));
        }
        if let Some(bad) = text.chars().find(|c| !is_displayable(*c)) {
            return Err(SdiError::invalid_parameter(format!(
                "{:?} cannot be shown on a digit display",
                bad
            )));
        }
        let padded = format!("{:>width$}", text, width = self.config.width);
        self.bus
            .write(self.address(), self.config.offset, padded.as_bytes())?;
        Ok(())
    }

    fn text(&self) -> SdiResult<String> {
        let mut buf = vec![0u8; self.config.width];
        self.bus.read(self.address(), self.config.offset, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf)
            .trim_matches(|c: char| c == ' ' || c == '\0')
            .to_string())
    }

    fn set_enabled(&self, on: bool) -> SdiResult<()> {
        self.enable.set(on)
    }

    fn is_enabled(&self) -> SdiResult<bool> {
        self.enable.is_asserted()
    }

    fn apply_defaults(&self) -> SdiResult<()> {
        match &self.config.default_text {
            Some(text) => {
                self.set_text(text)?;
                self.set_enabled(true)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusTransport, MemoryBus};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const CPLD: BusAddress = BusAddress::new(0, 0x31);

    fn bus() -> Arc<MemoryBus> {
        let bus = Arc::new(MemoryBus::new());
        bus.add_device(CPLD, 32);
        bus
    }

    fn enable_signal() -> SignalConfig {
        SignalConfig {
            bus: 0,
            device: 0x31,
            offset: 0x10,
            mask: 0x80,
            active_low: false,
        }
    }

    #[test]
    fn test_led_on_off() {
        let bus = bus();
        let led = SignalLed::new(
            bus.clone(),
            LedConfig {
                signal: SignalConfig {
                    bus: 0,
                    device: 0x31,
                    offset: 4,
                    mask: 0x02,
                    active_low: true,
                },
                default_on: Some(false),
            },
        );
        led.set(true).unwrap();
        assert!(led.is_on().unwrap());
        assert_eq!(bus.read_u8(CPLD, 4).unwrap(), 0x00);
        led.apply_defaults().unwrap();
        assert!(!led.is_on().unwrap());
    }

    #[test]
    fn test_display_right_aligned() {
        let bus = bus();
        let display = RegisterDigitDisplay::new(
            bus.clone(),
            DigitDisplayConfig {
                bus: 0,
                device: 0x31,
                offset: 0,
                width: 4,
                enable: enable_signal(),
                default_text: None,
            },
        );
        display.set_text("12").unwrap();
        assert_eq!(bus.contents(CPLD).unwrap()[0..4], *b"  12");
        assert_eq!(display.text().unwrap(), "12");
    }

    #[test]
    fn test_display_rejects_bad_text() {
        let display = RegisterDigitDisplay::new(
            bus(),
            DigitDisplayConfig {
                bus: 0,
                device: 0x31,
                offset: 0,
                width: 2,
                enable: enable_signal(),
                default_text: None,
            },
        );
        assert!(display.set_text("123").is_err());
        assert!(display.set_text("A").is_err());
        assert!(display.set_text("-1").is_ok());
    }

    #[test]
    fn test_display_defaults() {
        let display = RegisterDigitDisplay::new(
            bus(),
            DigitDisplayConfig {
                bus: 0,
                device: 0x31,
                offset: 0,
                width: 2,
                enable: enable_signal(),
                default_text: Some("1".to_string()),
            },
        );
        display.apply_defaults().unwrap();
        assert!(display.is_enabled().unwrap());
        assert_eq!(display.text().unwrap(), "1");
    }
}
