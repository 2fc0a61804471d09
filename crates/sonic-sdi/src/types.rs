//! Type-safe SDI handles.
//!
//! Entities and resources are addressed by opaque handles. The object kind
//! is a phantom type parameter, so an entity handle cannot be passed where a
//! resource handle is expected. Handles are issued only by a
//! [`Registry`](crate::Registry) and carry its identity, so a handle from
//! one registry is rejected by another.

use sdi_types::{EntityType, ResourceType};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Raw handle value as exchanged with non-Rust callers.
pub type RawHandle = u64;

const TAG_SHIFT: u32 = 56;
const REGISTRY_SHIFT: u32 = 24;
const INDEX_MASK: u64 = (1 << REGISTRY_SHIFT) - 1;
const REGISTRY_MASK: u64 = 0xffff_ffff;

/// Largest slot count a registry can address per object kind.
pub(crate) const MAX_OBJECTS: usize = INDEX_MASK as usize;

/// Marker trait for SDI object kinds.
pub trait HandleKind: Send + Sync + 'static {
    /// Tag stored in the top byte of the raw handle.
    const TAG: u8;

    /// Returns the object kind name for debugging.
    fn type_name() -> &'static str;
}

/// A type-safe handle to an SDI object.
///
/// Layout of the raw value is private to this module: kind tag, issuing
/// registry and a one-based slot index. The raw value is never zero.
#[derive(Clone, Copy)]
pub struct Handle<T: HandleKind> {
    raw: RawHandle,
    _marker: PhantomData<T>,
}

impl<T: HandleKind> Handle<T> {
    pub(crate) fn new(registry: u32, index: usize) -> Self {
        let raw = (u64::from(T::TAG) << TAG_SHIFT)
            | ((u64::from(registry) & REGISTRY_MASK) << REGISTRY_SHIFT)
            | ((index as u64 + 1) & INDEX_MASK);
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// Reinterprets a raw value as a handle of this kind.
    ///
    /// Returns `None` for zero or for a value tagged with another kind.
    /// A `Some` result is not necessarily valid in any registry.
    pub fn from_raw(raw: RawHandle) -> Option<Self> {
        if raw & INDEX_MASK == 0 || (raw >> TAG_SHIFT) as u8 != T::TAG {
            None
        } else {
            Some(Self {
                raw,
                _marker: PhantomData,
            })
        }
    }

    /// Returns the raw handle value.
    pub const fn as_raw(&self) -> RawHandle {
        self.raw
    }

    pub(crate) fn registry_id(&self) -> u32 {
        ((self.raw >> REGISTRY_SHIFT) & REGISTRY_MASK) as u32
    }

    pub(crate) fn index(&self) -> usize {
        ((self.raw & INDEX_MASK) - 1) as usize
    }
}

impl<T: HandleKind> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:016x})", T::type_name(), self.raw)
    }
}

impl<T: HandleKind> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.raw)
    }
}

impl<T: HandleKind> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: HandleKind> Eq for Handle<T> {}

impl<T: HandleKind> Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

macro_rules! define_handle_kind {
    ($name:ident, $type_name:literal, $tag:literal, $alias:ident) => {
        #[doc = concat!("Marker type for ", $type_name, " handles.")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl HandleKind for $name {
            const TAG: u8 = $tag;

            fn type_name() -> &'static str {
                $type_name
            }
        }

        #[doc = concat!("Handle to an SDI ", $type_name, ".")]
        pub type $alias = Handle<$name>;
    };
}

define_handle_kind!(EntityKind, "Entity", 0x01, EntityHdl);
define_handle_kind!(ResourceKind, "Resource", 0x02, ResourceHdl);

/// A handle of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyHandle {
    Entity(EntityHdl),
    Resource(ResourceHdl),
}

impl AnyHandle {
    /// Decodes a raw value by its kind tag.
    pub fn from_raw(raw: RawHandle) -> Option<Self> {
        EntityHdl::from_raw(raw)
            .map(AnyHandle::Entity)
            .or_else(|| ResourceHdl::from_raw(raw).map(AnyHandle::Resource))
    }

    pub const fn as_raw(&self) -> RawHandle {
        match self {
            AnyHandle::Entity(h) => h.as_raw(),
            AnyHandle::Resource(h) => h.as_raw(),
        }
    }
}

impl From<EntityHdl> for AnyHandle {
    fn from(h: EntityHdl) -> Self {
        AnyHandle::Entity(h)
    }
}

impl From<ResourceHdl> for AnyHandle {
    fn from(h: ResourceHdl) -> Self {
        AnyHandle::Resource(h)
    }
}

impl fmt::Display for AnyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyHandle::Entity(h) => fmt::Display::fmt(h, f),
            AnyHandle::Resource(h) => fmt::Display::fmt(h, f),
        }
    }
}

/// Runtime type of the object behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Entity(EntityType),
    Resource(ResourceType),
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Entity(t) => write!(f, "entity/{}", t),
            ObjectType::Resource(t) => write!(f, "resource/{}", t),
        }
    }
}

/// Result of resolving a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub object_type: ObjectType,
    /// The owning entity; an entity owns itself.
    pub owner: EntityHdl,
}
