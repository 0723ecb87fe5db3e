//! Seam to the authoritative host simulation
//!
//! The mirror owns none of the objects it tracks. Everything it knows
//! arrives either as a notification call on the `world` types or through
//! the narrow [`SimHost`] trait below, which a real host integration
//! implements over its own world state.

pub mod memory;

pub use memory::InMemoryHost;

use serde::{Deserialize, Serialize};

use crate::core::types::{PersistentId, SessionId, WorldId};

/// Observable capabilities of one host object, as reported at wrap time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleProfile {
    /// A connected player's avatar
    pub is_player: bool,
    /// Has an AI brain (mobs; also true for players)
    pub is_living: bool,
    /// Set when the host object is the backing store for its own wrapper
    /// (scripted objects); carries the wrapper's registration tag
    pub scripted_kind: Option<String>,
}

/// Snapshot view of one object owned by the host simulation.
///
/// The mirror never creates or destroys host objects; it observes these
/// views, indexes them, and hands out typed wrappers built from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalHandle {
    session_id: SessionId,
    persistent_id: PersistentId,
    profile: HandleProfile,
}

impl ExternalHandle {
    pub fn new(session_id: SessionId, persistent_id: PersistentId, profile: HandleProfile) -> Self {
        Self {
            session_id,
            persistent_id,
            profile,
        }
    }

    /// A connected player's avatar
    pub fn player(session_id: SessionId, persistent_id: PersistentId) -> Self {
        Self::new(
            session_id,
            persistent_id,
            HandleProfile {
                is_player: true,
                is_living: true,
                scripted_kind: None,
            },
        )
    }

    /// A mob with an AI brain
    pub fn living(session_id: SessionId, persistent_id: PersistentId) -> Self {
        Self::new(
            session_id,
            persistent_id,
            HandleProfile {
                is_living: true,
                ..HandleProfile::default()
            },
        )
    }

    /// Anything the host reports without further capabilities
    pub fn generic(session_id: SessionId, persistent_id: PersistentId) -> Self {
        Self::new(session_id, persistent_id, HandleProfile::default())
    }

    /// A scripted object that defines its own wrapper kind
    pub fn scripted(session_id: SessionId, persistent_id: PersistentId, tag: &str) -> Self {
        Self::new(
            session_id,
            persistent_id,
            HandleProfile {
                scripted_kind: Some(tag.to_string()),
                ..HandleProfile::default()
            },
        )
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn persistent_id(&self) -> PersistentId {
        self.persistent_id
    }

    pub fn profile(&self) -> &HandleProfile {
        &self.profile
    }
}

/// Narrow interface to the authoritative simulation.
///
/// `live_handles` and `connected_players` are authoritative snapshots; the
/// add/remove notifications the host also emits can be dropped under load,
/// which is exactly the drift the sweep repairs against these snapshots.
pub trait SimHost {
    /// Snapshot of every loaded object in the given world
    fn live_handles(&self, world: WorldId) -> Vec<ExternalHandle>;

    /// Currently connected player avatars, across all worlds
    fn connected_players(&self) -> Vec<ExternalHandle>;

    /// Ask the host to create an object. The mirror index is updated when
    /// the corresponding add notification (or sweep repair) arrives, not
    /// here.
    fn spawn(&mut self, world: WorldId, handle: &ExternalHandle) -> bool;

    /// Ask the host to remove an object
    fn despawn(&mut self, world: WorldId, session: SessionId);

    /// Drop a stale entry from the host's loaded-object list without the
    /// despawn side effects. Only used for player-shaped ghosts whose
    /// owner already disconnected.
    fn evict_stale_handle(&mut self, world: WorldId, session: SessionId);
}
