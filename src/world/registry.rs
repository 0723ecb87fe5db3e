//! Per-world dual-keyed entity index

use ahash::AHashMap;

use crate::core::types::{PersistentId, SessionId};
use crate::entity::{factory, Entity, Kind, KindFilter};
use crate::source::ExternalHandle;

/// Index of every entity the mirror tracks for one world.
///
/// `by_id` owns the wrappers; the persistent-id and kind indices hold
/// session ids into it. After every completed mutation the indices
/// describe the same entity set and every entity sits in exactly the
/// bucket matching its kind.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    by_id: AHashMap<SessionId, Entity>,
    by_persistent: AHashMap<PersistentId, SessionId>,
    by_kind: AHashMap<Kind, Vec<SessionId>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a live handle. Duplicate adds are absorbed; returns whether a
    /// new wrapper was inserted.
    pub fn add(&mut self, handle: &ExternalHandle) -> bool {
        if self.by_id.contains_key(&handle.session_id()) {
            // Dupe
            return false;
        }

        let mut entity = factory::wrap(handle);
        entity.mark_live();
        self.by_persistent
            .insert(entity.persistent_id(), entity.session_id());
        self.by_kind
            .entry(entity.kind().clone())
            .or_default()
            .push(entity.session_id());
        self.by_id.insert(entity.session_id(), entity);
        true
    }

    /// Stop tracking a session id. Unknown ids are a no-op.
    ///
    /// The returned wrapper is marked dead; anything still holding a copy
    /// must treat the entity as gone.
    pub fn remove(&mut self, session: SessionId) -> Option<Entity> {
        let mut entity = self.by_id.remove(&session)?;
        // A reconnect can re-register the same persistent id under a new
        // session before the stale entry is swept; only drop the mapping
        // if it still points at the session being removed.
        if self.by_persistent.get(&entity.persistent_id()) == Some(&session) {
            self.by_persistent.remove(&entity.persistent_id());
        }
        if let Some(bucket) = self.by_kind.get_mut(entity.kind()) {
            bucket.retain(|&id| id != session);
        }
        entity.mark_dead();
        Some(entity)
    }

    pub fn get(&self, session: SessionId) -> Option<&Entity> {
        self.by_id.get(&session)
    }

    pub fn get_by_persistent(&self, persistent: PersistentId) -> Option<&Entity> {
        self.by_persistent
            .get(&persistent)
            .and_then(|session| self.by_id.get(session))
    }

    /// Lookup with a kind expectation.
    ///
    /// A mismatch is routine (stale external references outlive the
    /// entity they pointed at), so it reports absent with a warning
    /// rather than failing.
    pub fn get_typed(&self, session: SessionId, filter: &KindFilter) -> Option<&Entity> {
        let entity = self.get(session)?;
        if entity.narrow(filter).is_none() {
            tracing::warn!(
                "Looking for a {:?} entity by session id {:?}, found a {:?} instead",
                filter,
                session,
                entity.kind()
            );
            return None;
        }
        Some(entity)
    }

    /// As [`get_typed`](Self::get_typed), keyed by persistent id
    pub fn get_by_persistent_typed(
        &self,
        persistent: PersistentId,
        filter: &KindFilter,
    ) -> Option<&Entity> {
        let entity = self.get_by_persistent(persistent)?;
        if entity.narrow(filter).is_none() {
            tracing::warn!(
                "Looking for a {:?} entity by persistent id {:?}, found a {:?} instead",
                filter,
                persistent,
                entity.kind()
            );
            return None;
        }
        Some(entity)
    }

    /// Kind-filtered query: every tracked entity whose kind satisfies the
    /// filter and that passes the predicate.
    ///
    /// Eager snapshot of the registry at call time; ordering is
    /// unspecified beyond being stable within one call.
    pub fn query<F>(&self, filter: &KindFilter, mut predicate: F) -> Vec<&Entity>
    where
        F: FnMut(&Entity) -> bool,
    {
        let mut found = Vec::new();
        for (kind, bucket) in &self.by_kind {
            if !kind.matches(filter) {
                continue;
            }
            for session in bucket {
                if let Some(entity) = self.by_id.get(session).and_then(|e| e.narrow(filter)) {
                    if predicate(entity) {
                        found.push(entity);
                    }
                }
            }
        }
        found
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Session ids currently tracked (snapshot for the drift sweep)
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.by_id.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.by_id.values()
    }
}
