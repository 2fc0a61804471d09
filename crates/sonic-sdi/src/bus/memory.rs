//! In-memory bus backend with fault injection.

use super::{BusAddress, BusError, BusTransport};
use log::trace;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Simulated device declared in a platform file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimDevice {
    pub bus: u32,
    pub device: u16,
    /// Register window size in bytes.
    #[serde(default = "default_sim_size")]
    pub size: usize,
    /// Initial contents as `(offset, hex bytes)` pairs, e.g. `"03 04 07"`.
    #[serde(default)]
    pub preload: Vec<SimPreload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimPreload {
    pub offset: usize,
    pub hex: String,
}

fn default_sim_size() -> usize {
    256
}

#[derive(Debug)]
struct Device {
    data: Vec<u8>,
    unresponsive: bool,
}

/// Bus backend keeping every device's register window in memory.
///
/// Absent or unresponsive devices time out, matching an I2C NAK on the
/// address phase. Accesses past the end of a window fail as transfer errors.
#[derive(Debug, Default)]
pub struct MemoryBus {
    devices: RwLock<HashMap<BusAddress, Device>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bus holding the given simulated devices.
    pub fn from_sim_devices(devices: &[SimDevice]) -> Result<Self, String> {
        let bus = Self::new();
        for sim in devices {
            let addr = BusAddress::new(sim.bus, sim.device);
            bus.add_device(addr, sim.size);
            for preload in &sim.preload {
                let bytes = parse_hex_bytes(&preload.hex)
                    .map_err(|e| format!("{}: preload at {}: {}", addr, preload.offset, e))?;
                if preload.offset + bytes.len() > sim.size {
                    return Err(format!(
                        "{}: preload at {} overruns {} byte window",
                        addr, preload.offset, sim.size
                    ));
                }
                bus.load(addr, preload.offset, &bytes);
            }
        }
        Ok(bus)
    }

    /// Adds (or replaces) a zero-filled device.
    pub fn add_device(&self, addr: BusAddress, size: usize) {
        self.devices.write().insert(
            addr,
            Device {
                data: vec![0; size],
                unresponsive: false,
            },
        );
    }

    /// Removes a device, as when a module is unplugged.
    pub fn remove_device(&self, addr: BusAddress) -> bool {
        self.devices.write().remove(&addr).is_some()
    }

    /// Copies `bytes` into the device window, growing it if needed.
    pub fn load(&self, addr: BusAddress, offset: usize, bytes: &[u8]) {
        let mut devices = self.devices.write();
        let device = devices.entry(addr).or_insert_with(|| Device {
            data: Vec::new(),
            unresponsive: false,
        });
        let end = offset + bytes.len();
        if device.data.len() < end {
            device.data.resize(end, 0);
        }
        device.data[offset..end].copy_from_slice(bytes);
    }

    /// Makes a device stop answering (or answer again).
    pub fn set_unresponsive(&self, addr: BusAddress, unresponsive: bool) {
        if let Some(device) = self.devices.write().get_mut(&addr) {
            device.unresponsive = unresponsive;
        }
    }

    /// Snapshot of a device window.
    pub fn contents(&self, addr: BusAddress) -> Option<Vec<u8>> {
        self.devices.read().get(&addr).map(|d| d.data.clone())
    }

    fn window(
        data_len: usize,
        device: BusAddress,
        offset: u32,
        len: usize,
    ) -> Result<std::ops::Range<usize>, BusError> {
        let start = offset as usize;
        let end = start.checked_add(len).filter(|end| *end <= data_len);
        end.map(|end| start..end).ok_or_else(|| BusError::Transfer {
            device,
            message: format!(
                "access {}+{} outside {} byte window",
                offset, len, data_len
            ),
        })
    }
}

impl BusTransport for MemoryBus {
    fn read(&self, device: BusAddress, offset: u32, buf: &mut [u8]) -> Result<(), BusError> {
        let devices = self.devices.read();
        let dev = devices
            .get(&device)
            .filter(|d| !d.unresponsive)
            .ok_or(BusError::Timeout { device })?;
        let range = Self::window(dev.data.len(), device, offset, buf.len())?;
        buf.copy_from_slice(&dev.data[range]);
        trace!("read {} bytes from {} at 0x{:x}", buf.len(), device, offset);
        Ok(())
    }

    fn write(&self, device: BusAddress, offset: u32, data: &[u8]) -> Result<(), BusError> {
        let mut devices = self.devices.write();
        let dev = devices
            .get_mut(&device)
            .filter(|d| !d.unresponsive)
            .ok_or(BusError::Timeout { device })?;
        let range = Self::window(dev.data.len(), device, offset, data.len())?;
        dev.data[range].copy_from_slice(data);
        trace!("wrote {} bytes to {} at 0x{:x}", data.len(), device, offset);
        Ok(())
    }
}

/// Parses whitespace-separated hex byte pairs (`"03 04 0a"` or `"03040a"`).
pub(crate) fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, String> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in {:?}", text));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| format!("invalid hex {:?}: {}", &digits[i..i + 2], e))
        })
        .collect()
}
