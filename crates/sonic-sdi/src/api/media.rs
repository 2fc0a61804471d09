//! Media (SFP/QSFP) API.
//!
//! Thin handle dispatch over [`MediaDevice`]. Channel arguments are checked
//! against the module's lane count before any bus access.

use crate::drivers::ResourceBackend;
use crate::error::{SdiError, SdiResult};
use crate::media::{
    ChannelMonitor, ChannelMonitorStatus, ChannelStatus, ChecksumStatus, FeatureSupport,
    MediaDevice, MediaParameter, ModuleControl, ModuleMonitor, ModuleStatus, Monitor,
    ProductInfo, RxPowerType, ThresholdSet, ThresholdType, TransceiverDescriptor, VendorInfoType,
};
use crate::registry::Registry;
use crate::types::ResourceHdl;
use sdi_types::{MediaMode, MediaSpeed, MediaType, ResourceType};

pub struct MediaApi<'a> {
    registry: &'a Registry,
}

impl<'a> MediaApi<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Resolves a media handle to its slot driver.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for a foreign handle or a non-media resource.
    pub fn device(&self, hdl: ResourceHdl) -> SdiResult<&'a MediaDevice> {
        match &self.registry.typed_resource(hdl, ResourceType::Media)?.backend {
            ResourceBackend::Media(d) => Ok(d.as_ref()),
            _ => Err(SdiError::invalid_handle(hdl.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Identification and inventory
    // ------------------------------------------------------------------

    pub fn presence_get(&self, hdl: ResourceHdl) -> SdiResult<bool> {
        self.device(hdl)?.presence()
    }

    /// Forgets the cached identification and probes the module again.
    /// Returns the identifier byte.
    pub fn refresh(&self, hdl: ResourceHdl) -> SdiResult<u8> {
        self.device(hdl)?.refresh()
    }

    pub fn transceiver_code_get(&self, hdl: ResourceHdl) -> SdiResult<TransceiverDescriptor> {
        self.device(hdl)?.transceiver_code()
    }

    /// Copies a vendor field into `buf` followed by a NUL byte and returns
    /// the text length.
    ///
    /// # Errors
    ///
    /// `BufferTooSmall` when `buf` cannot hold the field width plus the
    /// terminator. `buf` is untouched on any error.
    pub fn vendor_info_get(
        &self,
        hdl: ResourceHdl,
        kind: VendorInfoType,
        buf: &mut [u8],
    ) -> SdiResult<usize> {
        self.device(hdl)?.vendor_info_get(kind, buf)
    }

    pub fn vendor_info(&self, hdl: ResourceHdl, kind: VendorInfoType) -> SdiResult<String> {
        self.device(hdl)?.vendor_info(kind)
    }

    pub fn parameter_get(&self, hdl: ResourceHdl, param: MediaParameter) -> SdiResult<u32> {
        self.device(hdl)?.parameter(param)
    }

    pub fn feature_support_get(&self, hdl: ResourceHdl) -> SdiResult<FeatureSupport> {
        self.device(hdl)?.feature_support()
    }

    /// Fastest speed the module supports.
    pub fn speed_get(&self, hdl: ResourceHdl) -> SdiResult<MediaSpeed> {
        self.device(hdl)?.speed()
    }

    pub fn product_info_get(&self, hdl: ResourceHdl) -> SdiResult<ProductInfo> {
        self.device(hdl)?.product_info()
    }

    pub fn is_qualified(&self, hdl: ResourceHdl) -> SdiResult<bool> {
        self.device(hdl)?.is_qualified()
    }

    pub fn rx_power_type_get(&self, hdl: ResourceHdl) -> SdiResult<RxPowerType> {
        self.device(hdl)?.rx_power_type()
    }

    pub fn checksum_verify(&self, hdl: ResourceHdl) -> SdiResult<ChecksumStatus> {
        self.device(hdl)?.checksum_verify()
    }

    // ------------------------------------------------------------------
    // Monitors and thresholds
    // ------------------------------------------------------------------

    pub fn module_monitor_get(&self, hdl: ResourceHdl, monitor: ModuleMonitor) -> SdiResult<f64> {
        self.device(hdl)?.module_monitor(monitor)
    }

    pub fn channel_monitor_get(
        &self,
        hdl: ResourceHdl,
        channel: u32,
        monitor: ChannelMonitor,
    ) -> SdiResult<f64> {
        self.device(hdl)?.channel_monitor(channel, monitor)
    }

    pub fn threshold_get(&self, hdl: ResourceHdl, threshold: ThresholdType) -> SdiResult<f64> {
        self.device(hdl)?.threshold(threshold)
    }

    /// All four thresholds of a monitor, in display units.
    pub fn thresholds(&self, hdl: ResourceHdl, monitor: Monitor) -> SdiResult<ThresholdSet<f64>> {
        self.device(hdl)?.thresholds(monitor)
    }

    /// Unscaled threshold register.
    #[deprecated(note = "use threshold_get")]
    pub fn module_monitor_threshold_get(
        &self,
        hdl: ResourceHdl,
        threshold: ThresholdType,
    ) -> SdiResult<i32> {
        self.device(hdl)?.threshold_raw(threshold)
    }

    /// Unscaled threshold register. Thresholds are shared by all channels;
    /// the channel is validated only.
    #[deprecated(note = "use threshold_get")]
    pub fn channel_monitor_threshold_get(
        &self,
        hdl: ResourceHdl,
        channel: u32,
        threshold: ThresholdType,
    ) -> SdiResult<i32> {
        let device = self.device(hdl)?;
        device.check_channel(channel)?;
        device.threshold_raw(threshold)
    }

    /// Unscaled monitor register.
    #[deprecated(note = "use module_monitor_get")]
    pub fn module_monitor_raw_get(&self, hdl: ResourceHdl, monitor: ModuleMonitor) -> SdiResult<i32> {
        self.device(hdl)?.module_monitor_raw(monitor)
    }

    /// Unscaled monitor register.
    #[deprecated(note = "use channel_monitor_get")]
    pub fn channel_monitor_raw_get(
        &self,
        hdl: ResourceHdl,
        channel: u32,
        monitor: ChannelMonitor,
    ) -> SdiResult<i32> {
        self.device(hdl)?.channel_monitor_raw(channel, monitor)
    }

    // ------------------------------------------------------------------
    // Status flags
    // ------------------------------------------------------------------

    /// Asserted module alarm and warning flags, restricted to `mask`.
    pub fn module_monitor_status_get(
        &self,
        hdl: ResourceHdl,
        mask: ModuleStatus,
    ) -> SdiResult<ModuleStatus> {
        self.device(hdl)?.module_monitor_status(mask)
    }

    pub fn channel_monitor_status_get(
        &self,
        hdl: ResourceHdl,
        channel: u32,
        mask: ChannelMonitorStatus,
    ) -> SdiResult<ChannelMonitorStatus> {
        self.device(hdl)?.channel_monitor_status(channel, mask)
    }

    pub fn channel_status_get(
        &self,
        hdl: ResourceHdl,
        channel: u32,
        mask: ChannelStatus,
    ) -> SdiResult<ChannelStatus> {
        self.device(hdl)?.channel_status(channel, mask)
    }

    // ------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------

    pub fn tx_control(&self, hdl: ResourceHdl, channel: u32, enable: bool) -> SdiResult<()> {
        self.device(hdl)?.tx_control(channel, enable)
    }

    /// True when the channel transmitter is enabled.
    pub fn tx_control_status_get(&self, hdl: ResourceHdl, channel: u32) -> SdiResult<bool> {
        self.device(hdl)?.tx_control_status(channel)
    }

    pub fn module_control(
        &self,
        hdl: ResourceHdl,
        control: ModuleControl,
        enable: bool,
    ) -> SdiResult<()> {
        self.device(hdl)?.module_control(control, enable)
    }

    pub fn module_control_status_get(
        &self,
        hdl: ResourceHdl,
        control: ModuleControl,
    ) -> SdiResult<bool> {
        self.device(hdl)?.module_control_status(control)
    }

    /// Shows `speed` on the channel LED; `None` turns it off.
    pub fn led_set(&self, hdl: ResourceHdl, channel: u32, speed: Option<MediaSpeed>) -> SdiResult<()> {
        self.device(hdl)?.led_set(channel, speed)
    }

    pub fn led_status_get(&self, hdl: ResourceHdl, channel: u32) -> SdiResult<Option<MediaSpeed>> {
        self.device(hdl)?.led_status(channel)
    }

    // ------------------------------------------------------------------
    // Raw access
    // ------------------------------------------------------------------

    /// Reads EEPROM bytes at a linear offset.
    pub fn read(&self, hdl: ResourceHdl, offset: u32, buf: &mut [u8]) -> SdiResult<()> {
        self.device(hdl)?.read(offset, buf)
    }

    pub fn write(&self, hdl: ResourceHdl, offset: u32, data: &[u8]) -> SdiResult<()> {
        self.device(hdl)?.write(offset, data)
    }

    // ------------------------------------------------------------------
    // Copper PHY
    // ------------------------------------------------------------------

    pub fn phy_autoneg_set(
        &self,
        hdl: ResourceHdl,
        channel: u32,
        media_type: MediaType,
        enable: bool,
    ) -> SdiResult<()> {
        self.device(hdl)?.phy_autoneg_set(channel, media_type, enable)
    }

    pub fn phy_autoneg_get(
        &self,
        hdl: ResourceHdl,
        channel: u32,
        media_type: MediaType,
    ) -> SdiResult<bool> {
        self.device(hdl)?.phy_autoneg_get(channel, media_type)
    }

    pub fn phy_mode_set(
        &self,
        hdl: ResourceHdl,
        channel: u32,
        media_type: MediaType,
        mode: MediaMode,
    ) -> SdiResult<()> {
        self.device(hdl)?.phy_mode_set(channel, media_type, mode)
    }

    pub fn phy_speed_set(
        &self,
        hdl: ResourceHdl,
        channel: u32,
        media_type: MediaType,
        speeds: &[MediaSpeed],
    ) -> SdiResult<()> {
        self.device(hdl)?.phy_speed_set(channel, media_type, speeds)
    }
}
