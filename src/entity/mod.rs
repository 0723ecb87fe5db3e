//! Typed wrappers over host entity handles

pub mod factory;
pub mod kind;

pub use factory::wrap;
pub use kind::{classify, Kind, KindFilter};

use crate::core::types::{PersistentId, SessionId};
use crate::source::ExternalHandle;

/// Wrapper lifecycle.
///
/// `Unregistered` until the registry accepts the wrapper, `Live` while
/// tracked, `Dead` once removed. `Dead` is terminal: if the same
/// persistent id reappears, a fresh wrapper is built for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Unregistered,
    Live,
    Dead,
}

/// The mirror's representation of one host object.
///
/// Owned exclusively by the registry that tracks it; every other subsystem
/// borrows. A wrapper is a view over the host object, not its owner - the
/// host controls the object's lifetime, and a borrow must not be cached
/// across a sweep without re-resolving by persistent id.
#[derive(Debug, Clone)]
pub struct Entity {
    handle: ExternalHandle,
    kind: Kind,
    state: EntityState,
}

impl Entity {
    pub(crate) fn new(handle: ExternalHandle, kind: Kind) -> Self {
        Self {
            handle,
            kind,
            state: EntityState::Unregistered,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.handle.session_id()
    }

    pub fn persistent_id(&self) -> PersistentId {
        self.handle.persistent_id()
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn handle(&self) -> &ExternalHandle {
        &self.handle
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == EntityState::Live
    }

    /// Capability-checked narrowing: `Some(self)` when this entity
    /// satisfies the filter
    pub fn narrow(&self, filter: &KindFilter) -> Option<&Entity> {
        if self.kind.matches(filter) {
            Some(self)
        } else {
            None
        }
    }

    pub(crate) fn mark_live(&mut self) {
        self.state = EntityState::Live;
    }

    pub(crate) fn mark_dead(&mut self) {
        self.state = EntityState::Dead;
    }
}
