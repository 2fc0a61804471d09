//! Entity information and PLD version APIs.

use crate::drivers::{EntityInfo, EntityInfoDriver, ResourceBackend};
use crate::error::{SdiError, SdiResult};
use crate::registry::Registry;
use crate::types::ResourceHdl;
use sdi_types::ResourceType;

pub struct EntityInfoApi<'a> {
    registry: &'a Registry,
}

impl<'a> EntityInfoApi<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    fn driver(&self, hdl: ResourceHdl) -> SdiResult<&'a dyn EntityInfoDriver> {
        match &self.registry.typed_resource(hdl, ResourceType::EntityInfo)?.backend {
            ResourceBackend::EntityInfo(d) => Ok(d.as_ref()),
            _ => Err(SdiError::invalid_handle(hdl.to_string())),
        }
    }

    pub fn read(&self, hdl: ResourceHdl) -> SdiResult<EntityInfo> {
        self.driver(hdl)?.read()
    }
}

pub struct PldApi<'a> {
    registry: &'a Registry,
}

impl<'a> PldApi<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn version_get(&self, hdl: ResourceHdl) -> SdiResult<u32> {
        match &self.registry.typed_resource(hdl, ResourceType::UpgradablePld)?.backend {
            ResourceBackend::UpgradablePld(d) => d.version(),
            _ => Err(SdiError::invalid_handle(hdl.to_string())),
        }
    }
}
