//! Handle-based operation sets.
//!
//! Each API borrows the [`Registry`] and resolves handles on every call, so
//! a handle of the wrong kind or from another registry fails with
//! `InvalidHandle` instead of reaching a driver.
//!
//! - [`EntityApi`]: presence, fault, power, reset and init
//! - [`ThermalApi`], [`FanApi`], [`LedApi`], [`DigitDisplayApi`]: simple resources
//! - [`EntityInfoApi`], [`PldApi`]: inventory data
//! - [`MediaApi`]: pluggable module diagnostics and control

pub mod entity;
pub mod fan;
pub mod info;
pub mod led;
pub mod media;
pub mod thermal;

pub use entity::EntityApi;
pub use fan::FanApi;
pub use info::{EntityInfoApi, PldApi};
pub use led::{DigitDisplayApi, LedApi};
pub use media::MediaApi;
pub use thermal::ThermalApi;

use crate::registry::Registry;

impl Registry {
    pub fn entity_api(&self) -> EntityApi<'_> {
        EntityApi::new(self)
    }

    pub fn thermal_api(&self) -> ThermalApi<'_> {
        ThermalApi::new(self)
    }

    pub fn fan_api(&self) -> FanApi<'_> {
        FanApi::new(self)
    }

    pub fn led_api(&self) -> LedApi<'_> {
        LedApi::new(self)
    }

    pub fn digit_display_api(&self) -> DigitDisplayApi<'_> {
        DigitDisplayApi::new(self)
    }

    pub fn entity_info_api(&self) -> EntityInfoApi<'_> {
        EntityInfoApi::new(self)
    }

    pub fn pld_api(&self) -> PldApi<'_> {
        PldApi::new(self)
    }

    pub fn media_api(&self) -> MediaApi<'_> {
        MediaApi::new(self)
    }
}
