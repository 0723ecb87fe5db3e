//! Core identity types used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session-scoped entity identifier assigned by the host simulation.
///
/// Unique among currently-loaded entities in one world. The host may hand
/// the same id to a new entity after the previous holder unloads, so this
/// is never a cross-session reference; use [`PersistentId`] for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u32);

/// Stable entity identifier, unchanged across reloads and reconnects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersistentId(pub Uuid);

impl PersistentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PersistentId {
    fn default() -> Self {
        Self::new()
    }
}

/// World identifier (host dimension id; negative values are legal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(pub i32);

/// Which execution context owns a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The context that runs the simulation itself
    Authoritative,
    /// A context mirroring a remote simulation (one per viewer)
    Mirrored,
}

/// Simulation tick counter
pub type Tick = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_equality() {
        let a = SessionId(7);
        let b = SessionId(7);
        let c = SessionId(8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_session_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<SessionId, &str> = HashMap::new();
        map.insert(SessionId(1), "minecart");
        assert_eq!(map.get(&SessionId(1)), Some(&"minecart"));
    }

    #[test]
    fn test_persistent_ids_are_unique() {
        let a = PersistentId::new();
        let b = PersistentId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_world_id_allows_negative_dimensions() {
        let nether = WorldId(-1);
        let overworld = WorldId(0);
        assert_ne!(nether, overworld);
    }
}
