//! In-memory reference host for tests and headless drivers

use ahash::AHashMap;

use super::{ExternalHandle, SimHost};
use crate::core::types::{PersistentId, SessionId, WorldId};

/// Host double backed by plain maps.
///
/// Behaves like a real host from the mirror's point of view: it owns the
/// loaded lists and hands out snapshot views. It never calls back into the
/// mirror; delivering (or losing) notifications is the driver's business,
/// which is what makes drift scenarios straightforward to stage.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    loaded: AHashMap<WorldId, Vec<ExternalHandle>>,
    connected: Vec<ExternalHandle>,
    next_session: u32,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh session id from the host-side counter
    pub fn allocate_session(&mut self) -> SessionId {
        let id = self.next_session;
        self.next_session += 1;
        SessionId(id)
    }

    /// Put a handle straight into a world's loaded list, bypassing
    /// `spawn` (chunk load, world gen)
    pub fn insert_loaded(&mut self, world: WorldId, handle: ExternalHandle) {
        self.loaded.entry(world).or_default().push(handle);
    }

    /// Connect a player: the avatar joins both the connected list and the
    /// world's loaded list
    pub fn connect_player(&mut self, world: WorldId, handle: ExternalHandle) {
        self.connected.push(handle.clone());
        self.insert_loaded(world, handle);
    }

    /// Disconnect a player from the connected list only, leaving the
    /// loaded entry behind - the shape a host takes when it loses the
    /// cleanup, and the ghost the sweep is expected to evict
    pub fn disconnect_player(&mut self, persistent: PersistentId) {
        self.connected.retain(|h| h.persistent_id() != persistent);
    }

    pub fn is_loaded(&self, world: WorldId, session: SessionId) -> bool {
        self.loaded
            .get(&world)
            .map(|list| list.iter().any(|h| h.session_id() == session))
            .unwrap_or(false)
    }

    pub fn loaded_count(&self, world: WorldId) -> usize {
        self.loaded.get(&world).map(Vec::len).unwrap_or(0)
    }
}

impl SimHost for InMemoryHost {
    fn live_handles(&self, world: WorldId) -> Vec<ExternalHandle> {
        self.loaded.get(&world).cloned().unwrap_or_default()
    }

    fn connected_players(&self) -> Vec<ExternalHandle> {
        self.connected.clone()
    }

    fn spawn(&mut self, world: WorldId, handle: &ExternalHandle) -> bool {
        let list = self.loaded.entry(world).or_default();
        if list.iter().any(|h| h.session_id() == handle.session_id()) {
            return false;
        }
        list.push(handle.clone());
        true
    }

    fn despawn(&mut self, world: WorldId, session: SessionId) {
        if let Some(list) = self.loaded.get_mut(&world) {
            list.retain(|h| h.session_id() != session);
        }
    }

    fn evict_stale_handle(&mut self, world: WorldId, session: SessionId) {
        if let Some(list) = self.loaded.get_mut(&world) {
            list.retain(|h| h.session_id() != session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_rejects_duplicate_session() {
        let mut host = InMemoryHost::new();
        let world = WorldId(0);
        let session = host.allocate_session();
        let handle = ExternalHandle::generic(session, PersistentId::new());

        assert!(host.spawn(world, &handle));
        assert!(!host.spawn(world, &handle));
        assert_eq!(host.loaded_count(world), 1);
    }

    #[test]
    fn test_disconnect_leaves_loaded_entry() {
        let mut host = InMemoryHost::new();
        let world = WorldId(0);
        let persistent = PersistentId::new();
        let avatar = ExternalHandle::player(host.allocate_session(), persistent);

        host.connect_player(world, avatar.clone());
        host.disconnect_player(persistent);

        assert!(host.connected_players().is_empty());
        assert!(host.is_loaded(world, avatar.session_id()));
    }
}
