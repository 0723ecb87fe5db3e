//! World wrappers and the per-process directory of loaded worlds

pub mod reconcile;
pub mod registry;

pub use reconcile::{plan_repairs, RepairAction};
pub use registry::EntityRegistry;

use std::collections::VecDeque;
use std::time::Duration;

use ahash::AHashMap;

use crate::core::config::MirrorConfig;
use crate::core::types::{PersistentId, SessionId, Side, Tick, WorldId};
use crate::entity::{Entity, KindFilter};
use crate::source::{ExternalHandle, SimHost};

/// Nominal host tick rate; the TPS estimate is clamped to it
const NOMINAL_TPS: f64 = 20.0;

/// Mirror of one loaded simulation instance.
///
/// Created when the host announces a world load, dropped on unload;
/// dropping it invalidates every wrapper belonging to the world at once.
/// All mutation runs on the world's own execution context, strictly
/// sequentially; the `&mut` receivers are the whole locking story.
pub struct World {
    id: WorldId,
    side: Side,
    registry: EntityRegistry,
    ticks: Tick,
    reconcile_interval: u64,
    tick_times: VecDeque<Duration>,
    tps_sample_window: usize,
}

impl World {
    pub(crate) fn new(id: WorldId, side: Side, config: &MirrorConfig) -> Self {
        Self {
            id,
            side,
            registry: EntityRegistry::new(),
            ticks: 0,
            reconcile_interval: config.reconcile_interval,
            tick_times: VecDeque::with_capacity(config.tps_sample_window),
            tps_sample_window: config.tps_sample_window,
        }
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Ticks seen since this world loaded
    pub fn ticks(&self) -> Tick {
        self.ticks
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    /* Host notifications */

    /// A handle went live. May be missed under load; the drift sweep
    /// covers for it.
    pub fn entity_added(&mut self, handle: &ExternalHandle) {
        self.registry.add(handle);
    }

    /// A handle went out of scope. May be missed under load.
    pub fn entity_removed(&mut self, session: SessionId) {
        self.registry.remove(session);
    }

    /// Advance one simulation step; runs the drift sweep on cadence
    pub fn handle_tick(&mut self, host: &mut dyn SimHost) {
        self.ticks += 1;
        if self.ticks % self.reconcile_interval == 0 {
            self.reconcile(host);
        }
    }

    /// Diff-and-repair pass against the host's authoritative lists.
    ///
    /// Every repair indicates a notification the host dropped, which is
    /// worth surfacing even though the mirror recovers, so each one is
    /// logged at warning level with the affected identity.
    pub fn reconcile(&mut self, host: &mut dyn SimHost) {
        let live = host.live_handles(self.id);
        let connected = host.connected_players();
        for action in reconcile::plan_repairs(&self.registry, &live, &connected) {
            match action {
                RepairAction::RegisterMissing(handle) => {
                    tracing::warn!(
                        "Adding entity that was never announced: {:?} (session {:?})",
                        handle.persistent_id(),
                        handle.session_id()
                    );
                    self.registry.add(&handle);
                }
                RepairAction::EvictGhostPlayer(handle) => {
                    tracing::warn!(
                        "Evicting disconnected player {:?} from the host's loaded list",
                        handle.persistent_id()
                    );
                    host.evict_stale_handle(self.id, handle.session_id());
                }
                RepairAction::DropStale(session) => {
                    if let Some(entity) = self.registry.remove(session) {
                        tracing::warn!(
                            "Dropping entity whose removal was never announced: {:?} (session {:?})",
                            entity.persistent_id(),
                            session
                        );
                    }
                }
            }
        }
    }

    /* Entity access */

    /// Find a tracked entity by session id, checked against an expected
    /// kind
    pub fn entity(&self, session: SessionId, filter: &KindFilter) -> Option<&Entity> {
        self.registry.get_typed(session, filter)
    }

    /// Find a tracked entity by persistent id, checked against an
    /// expected kind
    pub fn entity_by_persistent(
        &self,
        persistent: PersistentId,
        filter: &KindFilter,
    ) -> Option<&Entity> {
        self.registry.get_by_persistent_typed(persistent, filter)
    }

    /// Find the wrapper for a raw host handle
    pub fn entity_for_handle(&self, handle: &ExternalHandle) -> Option<&Entity> {
        self.registry.get_by_persistent(handle.persistent_id())
    }

    /// Every tracked entity matching the kind filter
    pub fn entities(&self, filter: &KindFilter) -> Vec<&Entity> {
        self.registry.query(filter, |_| true)
    }

    /// Tracked entities matching the kind filter and the predicate
    pub fn entities_where<F>(&self, filter: &KindFilter, predicate: F) -> Vec<&Entity>
    where
        F: FnMut(&Entity) -> bool,
    {
        self.registry.query(filter, predicate)
    }

    /* Host delegation */

    /// Ask the host to create an entity. The registry picks it up when
    /// the add notification (or the next sweep) arrives, not here.
    pub fn spawn_entity(&self, host: &mut dyn SimHost, handle: &ExternalHandle) -> bool {
        host.spawn(self.id, handle)
    }

    /// Ask the host to remove an entity. The registry entry goes away
    /// with the remove notification (or the next sweep).
    pub fn remove_entity(&self, host: &mut dyn SimHost, session: SessionId) {
        host.despawn(self.id, session);
    }

    /* Diagnostics */

    /// Record how long the host spent on the last tick
    pub fn record_tick_duration(&mut self, elapsed: Duration) {
        if self.tick_times.len() == self.tps_sample_window {
            self.tick_times.pop_front();
        }
        self.tick_times.push_back(elapsed);
    }

    /// Ticks per second over up to `sample_size` recent samples, clamped
    /// to the nominal rate. Reports the nominal rate until samples arrive.
    pub fn tps(&self, sample_size: usize) -> f64 {
        if self.tick_times.is_empty() {
            return NOMINAL_TPS;
        }
        let samples = sample_size.clamp(1, self.tick_times.len());
        let total: Duration = self.tick_times.iter().rev().take(samples).sum();
        let avg_ms = total.as_secs_f64() * 1000.0 / samples as f64;
        if avg_ms <= 0.0 {
            return NOMINAL_TPS;
        }
        (1000.0 / avg_ms).min(NOMINAL_TPS)
    }
}

/// Callback invoked once per tick per world, after that world's sweep
pub type TickCallback = Box<dyn FnMut(&mut World)>;

/// Every loaded world for one process, keyed by id and side.
///
/// Owned by the host glue and threaded through calls; nothing here is
/// reachable through a static. The same id may be loaded on both sides at
/// once (an integrated host runs the simulation and a viewer in one
/// process), which is why the sides keep separate maps.
pub struct WorldDirectory {
    config: MirrorConfig,
    authoritative: AHashMap<WorldId, World>,
    mirrored: AHashMap<WorldId, World>,
    on_tick: Vec<TickCallback>,
}

impl WorldDirectory {
    pub fn new(config: MirrorConfig) -> Self {
        Self {
            config,
            authoritative: AHashMap::new(),
            mirrored: AHashMap::new(),
            on_tick: Vec::new(),
        }
    }

    fn side_map(&self, side: Side) -> &AHashMap<WorldId, World> {
        match side {
            Side::Authoritative => &self.authoritative,
            Side::Mirrored => &self.mirrored,
        }
    }

    /// Host notification: a world finished loading. Re-announcing an
    /// already-loaded id is a no-op (hosts do this during handoffs).
    pub fn world_loaded(&mut self, id: WorldId, side: Side) {
        let config = &self.config;
        let map = match side {
            Side::Authoritative => &mut self.authoritative,
            Side::Mirrored => &mut self.mirrored,
        };
        map.entry(id).or_insert_with(|| World::new(id, side, config));
    }

    /// Host notification: a world unloaded. Drops its registry and with
    /// it every wrapper belonging to the world.
    pub fn world_unloaded(&mut self, id: WorldId, side: Side) {
        let map = match side {
            Side::Authoritative => &mut self.authoritative,
            Side::Mirrored => &mut self.mirrored,
        };
        map.remove(&id);
    }

    /// Resolve a loaded world. Absent during load/unload races is a
    /// normal transient state, not an error.
    pub fn get(&self, id: WorldId, side: Side) -> Option<&World> {
        self.side_map(side).get(&id)
    }

    pub fn get_mut(&mut self, id: WorldId, side: Side) -> Option<&mut World> {
        let map = match side {
            Side::Authoritative => &mut self.authoritative,
            Side::Mirrored => &mut self.mirrored,
        };
        map.get_mut(&id)
    }

    /// Register a process-wide tick callback. Runs once per tick per
    /// world, after that world's reconciliation.
    pub fn on_tick(&mut self, callback: impl FnMut(&mut World) + 'static) {
        self.on_tick.push(Box::new(callback));
    }

    /// Host notification: one simulation step for the given world
    pub fn handle_tick(&mut self, id: WorldId, side: Side, host: &mut dyn SimHost) {
        let map = match side {
            Side::Authoritative => &mut self.authoritative,
            Side::Mirrored => &mut self.mirrored,
        };
        let Some(world) = map.get_mut(&id) else {
            return;
        };
        world.handle_tick(host);
        for callback in &mut self.on_tick {
            callback(world);
        }
    }
}
