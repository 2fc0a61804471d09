//! Handle registry.
//!
//! A [`Registry`] owns every entity and resource of one chassis. It is
//! populated once through [`RegistryBuilder`] and is immutable afterwards;
//! driver state behind it uses interior locking, so a registry can be shared
//! across threads with `Arc`.

use crate::control::EntityDriver;
use crate::drivers::ResourceBackend;
use crate::error::{SdiError, SdiResult};
use crate::types::{AnyHandle, EntityHdl, ObjectType, RawHandle, Resolved, ResourceHdl, MAX_OBJECTS};
use log::{debug, info};
use sdi_types::{EntityType, ResourceType};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_REGISTRY_ID: AtomicU32 = AtomicU32::new(1);

/// Takes the next registry id. Ids are never reused, so a handle from a
/// dropped registry cannot validate against a later one.
fn allocate_registry_id(next: &AtomicU32) -> SdiResult<u32> {
    next.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
        .map_err(|_| SdiError::Exhausted {
            resource: "registry ids".to_string(),
        })
}

/// Common view over entities and resources.
pub trait SdiObject {
    fn handle(&self) -> AnyHandle;
    fn name(&self) -> &str;
    fn object_type(&self) -> ObjectType;
    fn owner(&self) -> EntityHdl;
}

/// A physically removable chassis component.
pub struct Entity {
    pub(crate) hdl: EntityHdl,
    pub(crate) entity_type: EntityType,
    pub(crate) instance: u32,
    pub(crate) name: String,
    pub(crate) driver: Box<dyn EntityDriver>,
    /// Owned resources in population order.
    pub(crate) resources: Vec<ResourceHdl>,
}

impl Entity {
    pub fn hdl(&self) -> EntityHdl {
        self.hdl
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Zero-based ordinal within the entity type.
    pub fn instance(&self) -> u32 {
        self.instance
    }
}

impl SdiObject for Entity {
    fn handle(&self) -> AnyHandle {
        AnyHandle::Entity(self.hdl)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Entity(self.entity_type)
    }

    fn owner(&self) -> EntityHdl {
        self.hdl
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("hdl", &self.hdl)
            .field("entity_type", &self.entity_type)
            .field("instance", &self.instance)
            .field("name", &self.name)
            .field("resources", &self.resources.len())
            .finish()
    }
}

/// A sensor or control owned by an entity.
pub struct Resource {
    pub(crate) hdl: ResourceHdl,
    pub(crate) resource_type: ResourceType,
    pub(crate) alias: String,
    pub(crate) owner: EntityHdl,
    pub(crate) backend: ResourceBackend,
}

impl Resource {
    pub fn hdl(&self) -> ResourceHdl {
        self.hdl
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

impl SdiObject for Resource {
    fn handle(&self) -> AnyHandle {
        AnyHandle::Resource(self.hdl)
    }

    fn name(&self) -> &str {
        &self.alias
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Resource(self.resource_type)
    }

    fn owner(&self) -> EntityHdl {
        self.owner
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("hdl", &self.hdl)
            .field("resource_type", &self.resource_type)
            .field("alias", &self.alias)
            .field("owner", &self.owner)
            .finish()
    }
}

/// Populate-once builder for a [`Registry`].
pub struct RegistryBuilder {
    id: u32,
    entities: Vec<Entity>,
    resources: Vec<Resource>,
    instances: HashMap<EntityType, u32>,
}

impl RegistryBuilder {
    /// Starts a registry with a fresh id.
    ///
    /// # Errors
    ///
    /// `Exhausted` once every registry id has been handed out.
    pub fn new() -> SdiResult<Self> {
        Ok(Self {
            id: allocate_registry_id(&NEXT_REGISTRY_ID)?,
            entities: Vec::new(),
            resources: Vec::new(),
            instances: HashMap::new(),
        })
    }

    /// Adds an entity; its instance is the next free ordinal of its type.
    pub fn add_entity(
        &mut self,
        entity_type: EntityType,
        name: impl Into<String>,
        driver: Box<dyn EntityDriver>,
    ) -> EntityHdl {
        let instance = self.instances.entry(entity_type).or_insert(0);
        let hdl = EntityHdl::new(self.id, self.entities.len());
        let name = name.into();
        debug!("Adding entity {} {}#{} as {:?}", name, entity_type, instance, hdl);
        self.entities.push(Entity {
            hdl,
            entity_type,
            instance: *instance,
            name,
            driver,
            resources: Vec::new(),
        });
        *instance += 1;
        hdl
    }

    /// Adds a resource to `entity`.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` if `entity` was not issued by this builder,
    /// `AlreadyExists` if the entity already has a resource with the same
    /// type and alias.
    pub fn add_resource(
        &mut self,
        entity: EntityHdl,
        alias: impl Into<String>,
        backend: ResourceBackend,
    ) -> SdiResult<ResourceHdl> {
        if entity.registry_id() != self.id || entity.index() >= self.entities.len() {
            return Err(SdiError::invalid_handle(entity.to_string()));
        }
        if self.resources.len() >= MAX_OBJECTS {
            return Err(SdiError::Exhausted {
                resource: "resource slots".to_string(),
            });
        }
        let alias = alias.into();
        let resource_type = backend.resource_type();
        let owner = &mut self.entities[entity.index()];
        let duplicate = owner.resources.iter().any(|h| {
            let r = &self.resources[h.index()];
            r.resource_type == resource_type && r.alias == alias
        });
        if duplicate {
            return Err(SdiError::already_exists(format!(
                "{} resource {:?} on {}",
                resource_type, alias, owner.name
            )));
        }

        let hdl = ResourceHdl::new(self.id, self.resources.len());
        owner.resources.push(hdl);
        self.resources.push(Resource {
            hdl,
            resource_type,
            alias,
            owner: entity,
            backend,
        });
        Ok(hdl)
    }

    /// Freezes the registry.
    pub fn build(self) -> Registry {
        let mut entity_order: Vec<EntityHdl> = self.entities.iter().map(|e| e.hdl).collect();
        entity_order.sort_by_key(|h| {
            let e = &self.entities[h.index()];
            (e.entity_type, e.instance)
        });
        info!(
            "SDI registry {} built: {} entities, {} resources",
            self.id,
            self.entities.len(),
            self.resources.len()
        );
        Registry {
            id: self.id,
            entities: self.entities,
            resources: self.resources,
            entity_order,
        }
    }
}

/// Immutable directory of all SDI objects of a chassis.
pub struct Registry {
    id: u32,
    entities: Vec<Entity>,
    resources: Vec<Resource>,
    /// Entities sorted by (type, instance).
    pub(crate) entity_order: Vec<EntityHdl>,
}

impl Registry {
    pub fn builder() -> SdiResult<RegistryBuilder> {
        RegistryBuilder::new()
    }

    /// Returns the entity record for a handle.
    pub fn entity(&self, hdl: EntityHdl) -> SdiResult<&Entity> {
        if hdl.registry_id() != self.id {
            return Err(SdiError::invalid_handle(hdl.to_string()));
        }
        self.entities
            .get(hdl.index())
            .ok_or_else(|| SdiError::invalid_handle(hdl.to_string()))
    }

    /// Returns the resource record for a handle.
    pub fn resource(&self, hdl: ResourceHdl) -> SdiResult<&Resource> {
        if hdl.registry_id() != self.id {
            return Err(SdiError::invalid_handle(hdl.to_string()));
        }
        self.resources
            .get(hdl.index())
            .ok_or_else(|| SdiError::invalid_handle(hdl.to_string()))
    }

    /// Returns the object behind any handle.
    pub fn object(&self, hdl: impl Into<AnyHandle>) -> SdiResult<&dyn SdiObject> {
        match hdl.into() {
            AnyHandle::Entity(h) => self.entity(h).map(|e| e as &dyn SdiObject),
            AnyHandle::Resource(h) => self.resource(h).map(|r| r as &dyn SdiObject),
        }
    }

    /// Resolves a handle to its runtime type and owning entity.
    pub fn resolve(&self, hdl: impl Into<AnyHandle>) -> SdiResult<Resolved> {
        let object = self.object(hdl)?;
        Ok(Resolved {
            object_type: object.object_type(),
            owner: object.owner(),
        })
    }

    /// Resolves a raw handle value, e.g. one received over an FFI boundary.
    pub fn resolve_raw(&self, raw: RawHandle) -> SdiResult<Resolved> {
        let hdl = AnyHandle::from_raw(raw)
            .ok_or_else(|| SdiError::invalid_handle(format!("0x{:016x}", raw)))?;
        self.resolve(hdl)
    }

    pub fn is_valid(&self, hdl: impl Into<AnyHandle>) -> bool {
        self.object(hdl).is_ok()
    }

    pub(crate) fn all_entities(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn all_resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Resolves a resource handle and checks its type.
    pub(crate) fn typed_resource(
        &self,
        hdl: ResourceHdl,
        expected: ResourceType,
    ) -> SdiResult<&Resource> {
        let resource = self.resource(hdl)?;
        if resource.resource_type != expected {
            return Err(SdiError::invalid_handle(format!(
                "{} is a {} resource, expected {}",
                hdl, resource.resource_type, expected
            )));
        }
        Ok(resource)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("id", &self.id)
            .field("entities", &self.entities)
            .field("resources", &self.resources)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::SignalEntityDriver;
    use crate::drivers::StaticPld;
    use crate::error::SdiErrorKind;
    use pretty_assertions::assert_eq;

    fn pld(version: u32) -> ResourceBackend {
        ResourceBackend::UpgradablePld(Box::new(StaticPld::new(version)))
    }

    #[test]
    fn test_instances_per_type() {
        let mut b = Registry::builder().unwrap();
        let fan0 = b.add_entity(EntityType::FanTray, "Fan Tray 1", SignalEntityDriver::unmanaged());
        let psu0 = b.add_entity(EntityType::PsuTray, "PSU 1", SignalEntityDriver::unmanaged());
        let fan1 = b.add_entity(EntityType::FanTray, "Fan Tray 2", SignalEntityDriver::unmanaged());
        let reg = b.build();

        assert_eq!(reg.entity(fan0).unwrap().instance(), 0);
        assert_eq!(reg.entity(fan1).unwrap().instance(), 1);
        assert_eq!(reg.entity(psu0).unwrap().instance(), 0);
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut b = Registry::builder().unwrap();
        let board = b.add_entity(EntityType::SystemBoard, "board", SignalEntityDriver::unmanaged());
        b.add_resource(board, "cpld", pld(1)).unwrap();
        let err = b.add_resource(board, "cpld", pld(2)).unwrap_err();
        assert!(matches!(err, SdiError::AlreadyExists { .. }));
    }

    #[test]
    fn test_resolve() {
        let mut b = Registry::builder().unwrap();
        let board = b.add_entity(EntityType::SystemBoard, "board", SignalEntityDriver::unmanaged());
        let cpld = b.add_resource(board, "cpld", pld(1)).unwrap();
        let reg = b.build();

        let resolved = reg.resolve(cpld).unwrap();
        assert_eq!(
            resolved.object_type,
            ObjectType::Resource(ResourceType::UpgradablePld)
        );
        assert_eq!(resolved.owner, board);

        let resolved = reg.resolve(board).unwrap();
        assert_eq!(resolved.owner, board);
        assert_eq!(reg.resolve_raw(cpld.as_raw()).unwrap().owner, board);
        assert_eq!(reg.object(cpld).unwrap().name(), "cpld");
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut b1 = Registry::builder().unwrap();
        let board1 = b1.add_entity(EntityType::SystemBoard, "b1", SignalEntityDriver::unmanaged());
        let _reg1 = b1.build();

        let mut b2 = Registry::builder().unwrap();
        b2.add_entity(EntityType::SystemBoard, "b2", SignalEntityDriver::unmanaged());
        let reg2 = b2.build();

        assert!(!reg2.is_valid(board1));
        assert!(matches!(
            reg2.resolve(board1),
            Err(SdiError::InvalidHandle { .. })
        ));
    }

    #[test]
    fn test_registry_ids_do_not_wrap() {
        let next = AtomicU32::new(u32::MAX - 1);
        assert_eq!(allocate_registry_id(&next).unwrap(), u32::MAX - 1);
        let err = allocate_registry_id(&next).unwrap_err();
        assert_eq!(err.kind(), SdiErrorKind::Exhausted);
        // The counter stays parked at the end.
        assert!(allocate_registry_id(&next).is_err());
        assert_eq!(next.load(Ordering::Relaxed), u32::MAX);
    }

    #[test]
    fn test_builders_get_distinct_ids() {
        let first = Registry::builder().unwrap().build();
        let second = Registry::builder().unwrap().build();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_null_and_garbage_raw_handles() {
        let reg = Registry::builder().unwrap().build();
        assert!(matches!(
            reg.resolve_raw(0),
            Err(SdiError::InvalidHandle { .. })
        ));
        assert!(matches!(
            reg.resolve_raw(0xdead_beef),
            Err(SdiError::InvalidHandle { .. })
        ));
    }

    #[test]
    fn test_wrong_resource_type() {
        let mut b = Registry::builder().unwrap();
        let board = b.add_entity(EntityType::SystemBoard, "board", SignalEntityDriver::unmanaged());
        let cpld = b.add_resource(board, "cpld", pld(1)).unwrap();
        let reg = b.build();
        assert!(matches!(
            reg.typed_resource(cpld, ResourceType::Media),
            Err(SdiError::InvalidHandle { .. })
        ));
    }
}
