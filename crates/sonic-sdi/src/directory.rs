//! Entity and resource directories.
//!
//! Lookups by `(type, instance)` and `(type, alias)`, counts, and ordered
//! enumeration. Enumeration returns plain iterators; they are `Clone`, so a
//! walk can be restarted from any saved position. Entities enumerate in
//! ascending `(type, instance)` order, resources in population order.

use crate::error::{SdiError, SdiResult};
use crate::registry::{Registry, SdiObject};
use crate::types::{EntityHdl, ResourceHdl};
use log::trace;
use sdi_types::{EntityType, ResourceType};

impl Registry {
    // ------------------------------------------------------------------
    // Entity directory
    // ------------------------------------------------------------------

    /// Number of entities of a type (may be zero).
    pub fn entity_count(&self, entity_type: EntityType) -> usize {
        self.all_entities()
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .count()
    }

    /// Looks up an entity by type and zero-based instance.
    pub fn entity_lookup(&self, entity_type: EntityType, instance: u32) -> SdiResult<EntityHdl> {
        self.all_entities()
            .iter()
            .find(|e| e.entity_type == entity_type && e.instance == instance)
            .map(|e| e.hdl)
            .ok_or_else(|| {
                trace!("No entity {}#{}", entity_type, instance);
                SdiError::not_found(format!("entity {}#{}", entity_type, instance))
            })
    }

    /// All entities in ascending `(type, instance)` order.
    pub fn entities(&self) -> impl Iterator<Item = EntityHdl> + Clone + '_ {
        self.entity_order.iter().copied()
    }

    pub fn entity_type(&self, entity: EntityHdl) -> SdiResult<EntityType> {
        Ok(self.entity(entity)?.entity_type)
    }

    pub fn entity_name(&self, entity: EntityHdl) -> SdiResult<&str> {
        Ok(self.entity(entity)?.name())
    }

    // ------------------------------------------------------------------
    // Resource directory
    // ------------------------------------------------------------------

    /// Number of resources of a type on an entity.
    pub fn resource_count(&self, entity: EntityHdl, resource_type: ResourceType) -> SdiResult<usize> {
        Ok(self.resources_of_type(entity, resource_type)?.count())
    }

    /// Looks up a resource on an entity.
    ///
    /// A non-empty alias must match exactly (case-sensitive). With no alias
    /// the entity must have exactly one resource of the type.
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing matches, `AmbiguousAlias` when no alias was
    /// given and several resources of the type exist.
    pub fn resource_lookup(
        &self,
        entity: EntityHdl,
        resource_type: ResourceType,
        alias: Option<&str>,
    ) -> SdiResult<ResourceHdl> {
        let owner = self.entity(entity)?;
        let mut candidates = self.resources_of_type(entity, resource_type)?;

        match alias.filter(|a| !a.is_empty()) {
            Some(alias) => candidates
                .find(|h| self.resource(*h).map(|r| r.alias == alias).unwrap_or(false))
                .ok_or_else(|| {
                    SdiError::not_found(format!(
                        "{} resource {:?} on {}",
                        resource_type, alias, owner.name
                    ))
                }),
            None => {
                let first = candidates.next().ok_or_else(|| {
                    SdiError::not_found(format!("{} resource on {}", resource_type, owner.name))
                })?;
                let rest = candidates.count();
                if rest > 0 {
                    return Err(SdiError::AmbiguousAlias {
                        entity: owner.name.clone(),
                        resource_type,
                        count: rest + 1,
                    });
                }
                Ok(first)
            }
        }
    }

    /// All resources of an entity in population order.
    pub fn resources(
        &self,
        entity: EntityHdl,
    ) -> SdiResult<impl Iterator<Item = ResourceHdl> + Clone + '_> {
        Ok(self.entity(entity)?.resources.iter().copied())
    }

    /// Resources of one type on an entity, in population order.
    pub fn resources_of_type(
        &self,
        entity: EntityHdl,
        resource_type: ResourceType,
    ) -> SdiResult<impl Iterator<Item = ResourceHdl> + Clone + '_> {
        let resources = self.all_resources();
        Ok(self
            .entity(entity)?
            .resources
            .iter()
            .copied()
            .filter(move |h| resources[h.index()].resource_type == resource_type))
    }

    /// First resource of a type, for cursor-style walks.
    pub fn first_resource(
        &self,
        entity: EntityHdl,
        resource_type: ResourceType,
    ) -> SdiResult<ResourceHdl> {
        self.resources_of_type(entity, resource_type)?
            .next()
            .ok_or_else(|| SdiError::not_found(format!("{} resource", resource_type)))
    }

    /// Resource of `resource_type` following `current` on the same entity.
    ///
    /// `NotFound` marks the end of the walk.
    pub fn next_resource(
        &self,
        current: ResourceHdl,
        resource_type: ResourceType,
    ) -> SdiResult<ResourceHdl> {
        let owner = self.resource(current)?.owner;
        let mut walk = self.resources(owner)?.skip_while(|h| *h != current);
        walk.next();
        walk.find(|h| self.all_resources()[h.index()].resource_type == resource_type)
            .ok_or_else(|| SdiError::not_found(format!("{} resource after {}", resource_type, current)))
    }

    pub fn resource_type(&self, resource: ResourceHdl) -> SdiResult<ResourceType> {
        Ok(self.resource(resource)?.resource_type)
    }

    pub fn resource_alias(&self, resource: ResourceHdl) -> SdiResult<&str> {
        Ok(self.resource(resource)?.alias())
    }

    /// Entity owning a resource.
    pub fn resource_entity(&self, resource: ResourceHdl) -> SdiResult<EntityHdl> {
        Ok(self.resource(resource)?.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::SignalEntityDriver;
    use crate::drivers::{ResourceBackend, StaticPld};
    use pretty_assertions::assert_eq;

    fn pld() -> ResourceBackend {
        ResourceBackend::UpgradablePld(Box::new(StaticPld::new(1)))
    }

    fn sample() -> (Registry, EntityHdl) {
        let mut b = Registry::builder().unwrap();
        b.add_entity(EntityType::PsuTray, "PSU 1", SignalEntityDriver::unmanaged());
        let board = b.add_entity(EntityType::SystemBoard, "board", SignalEntityDriver::unmanaged());
        b.add_entity(EntityType::FanTray, "Fan Tray 1", SignalEntityDriver::unmanaged());
        b.add_entity(EntityType::FanTray, "Fan Tray 2", SignalEntityDriver::unmanaged());
        b.add_resource(board, "cpld-a", pld()).unwrap();
        b.add_resource(board, "cpld-b", pld()).unwrap();
        (b.build(), board)
    }

    #[test]
    fn test_entity_count_and_lookup() {
        let (reg, board) = sample();
        assert_eq!(reg.entity_count(EntityType::FanTray), 2);
        assert_eq!(reg.entity_count(EntityType::SystemBoard), 1);
        assert_eq!(reg.entity_lookup(EntityType::SystemBoard, 0).unwrap(), board);
        assert!(reg.entity_lookup(EntityType::FanTray, 2).unwrap_err().is_not_found());
    }

    #[test]
    fn test_entity_iteration_order() {
        let (reg, _) = sample();
        let order: Vec<(EntityType, u32)> = reg
            .entities()
            .map(|h| {
                let e = reg.entity(h).unwrap();
                (e.entity_type(), e.instance())
            })
            .collect();
        assert_eq!(
            order,
            vec![
                (EntityType::SystemBoard, 0),
                (EntityType::FanTray, 0),
                (EntityType::FanTray, 1),
                (EntityType::PsuTray, 0),
            ]
        );
    }

    #[test]
    fn test_iteration_restartable() {
        let (reg, _) = sample();
        let mut it = reg.entities();
        it.next();
        let saved = it.clone();
        let a: Vec<_> = it.collect();
        let b: Vec<_> = saved.collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_resource_lookup_by_alias() {
        let (reg, board) = sample();
        let b = reg
            .resource_lookup(board, ResourceType::UpgradablePld, Some("cpld-b"))
            .unwrap();
        assert_eq!(reg.resource_alias(b).unwrap(), "cpld-b");
        assert!(reg
            .resource_lookup(board, ResourceType::UpgradablePld, Some("CPLD-B"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_resource_lookup_empty_alias() {
        let (reg, board) = sample();
        let err = reg
            .resource_lookup(board, ResourceType::UpgradablePld, None)
            .unwrap_err();
        assert!(matches!(err, SdiError::AmbiguousAlias { count: 2, .. }));
        let err = reg
            .resource_lookup(board, ResourceType::UpgradablePld, Some(""))
            .unwrap_err();
        assert!(matches!(err, SdiError::AmbiguousAlias { .. }));
        assert!(reg
            .resource_lookup(board, ResourceType::Fan, None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_first_next_matches_iteration() {
        let (reg, board) = sample();
        let mut walked = Vec::new();
        let mut cursor = reg.first_resource(board, ResourceType::UpgradablePld);
        while let Ok(h) = cursor {
            walked.push(h);
            cursor = reg.next_resource(h, ResourceType::UpgradablePld);
        }
        let listed: Vec<_> = reg
            .resources_of_type(board, ResourceType::UpgradablePld)
            .unwrap()
            .collect();
        assert_eq!(walked, listed);
        assert_eq!(reg.resource_count(board, ResourceType::UpgradablePld).unwrap(), 2);
        assert_eq!(reg.resource_count(board, ResourceType::Media).unwrap(), 0);
    }

    #[test]
    fn test_entity_accessors() {
        let (reg, board) = sample();
        assert_eq!(reg.entity_name(board).unwrap(), "board");
        assert_eq!(reg.entity_type(board).unwrap(), EntityType::SystemBoard);
        let cpld = reg.first_resource(board, ResourceType::UpgradablePld).unwrap();
        assert_eq!(reg.resource_entity(cpld).unwrap(), board);
        assert_eq!(reg.resource_type(cpld).unwrap(), ResourceType::UpgradablePld);
    }
}
