//! Entity control.

use crate::control::EntityState;
use crate::error::{SdiError, SdiResult};
use crate::registry::{Entity, Registry, SdiObject};
use crate::types::EntityHdl;
use log::{info, warn};
use sdi_types::ResetType;

/// Presence, fault, power, reset and init of entities.
pub struct EntityApi<'a> {
    registry: &'a Registry,
}

impl<'a> EntityApi<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    fn power_capable(&self, entity: EntityHdl) -> SdiResult<&'a Entity> {
        let record = self.registry.entity(entity)?;
        if !record.entity_type().is_power_capable() {
            return Err(SdiError::unsupported(format!(
                "power control on {} {}",
                record.entity_type(),
                record.name()
            )));
        }
        Ok(record)
    }

    pub fn presence_get(&self, entity: EntityHdl) -> SdiResult<bool> {
        self.registry.entity(entity)?.driver.presence()
    }

    pub fn fault_status_get(&self, entity: EntityHdl) -> SdiResult<bool> {
        self.registry.entity(entity)?.driver.fault()
    }

    /// Polls presence, then fault for a present entity.
    pub fn state_get(&self, entity: EntityHdl) -> SdiResult<EntityState> {
        let record = self.registry.entity(entity)?;
        if !record.driver.presence()? {
            return Ok(EntityState::Absent);
        }
        Ok(EntityState::from_readings(true, record.driver.fault()?))
    }

    /// PSU output power good.
    pub fn psu_output_power_status_get(&self, entity: EntityHdl) -> SdiResult<bool> {
        self.power_capable(entity)?.driver.output_power_good()
    }

    /// Requests power on or off. The effect is observed through later
    /// presence, fault and power status reads.
    pub fn power_status_control(&self, entity: EntityHdl, enable: bool) -> SdiResult<()> {
        let record = self.power_capable(entity)?;
        info!("Power {} requested for {}", if enable { "on" } else { "off" }, record.name());
        record.driver.set_power(enable)
    }

    /// Issues a reset, then returns every resource of the entity to its
    /// platform defaults. Warm and cold differ only in the signal pulsed.
    pub fn reset(&self, entity: EntityHdl, reset_type: ResetType) -> SdiResult<()> {
        let record = self.registry.entity(entity)?;
        info!("{} reset of {}", reset_type, record.name());
        record.driver.reset(reset_type)?;
        self.init(entity)
    }

    /// Applies the platform defaults of every resource of the entity.
    ///
    /// All resources are attempted; the first failure is returned.
    pub fn init(&self, entity: EntityHdl) -> SdiResult<()> {
        let record = self.registry.entity(entity)?;
        let mut first_error = None;
        for hdl in &record.resources {
            let resource = self.registry.resource(*hdl)?;
            if let Err(e) = resource.backend.apply_defaults() {
                warn!(
                    "Failed to apply defaults to {} {}: {}",
                    resource.resource_type(),
                    resource.alias(),
                    e
                );
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Initializes every entity in directory order.
    pub fn init_all(&self) -> SdiResult<()> {
        let mut first_error = None;
        for entity in self.registry.entities() {
            if let Err(e) = self.init(entity) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
