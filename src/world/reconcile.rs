//! Drift detection between the registry and the host's live lists
//!
//! Add/remove notifications can be lost under load. Once every
//! reconcile interval the world diffs its registry against the host's
//! authoritative snapshots and repairs whatever diverged. Planning is a
//! pure function over the snapshots so the sweep can be tested without a
//! running host.

use ahash::AHashSet;

use super::registry::EntityRegistry;
use crate::core::types::{PersistentId, SessionId};
use crate::source::ExternalHandle;

/// One repair decided by the sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairAction {
    /// Live handle the mirror never saw an add notification for
    RegisterMissing(ExternalHandle),
    /// Player handle still loaded host-side whose owner is no longer
    /// connected; evicted at the host instead of resurrected here
    EvictGhostPlayer(ExternalHandle),
    /// Tracked session id whose handle is no longer live
    DropStale(SessionId),
}

/// Diff the registry against the host's snapshots.
///
/// Linear in live + tracked: both sides are probed through hashed id
/// sets, never scanned quadratically. A single missed notification is
/// fully repaired by applying one plan.
pub fn plan_repairs(
    registry: &EntityRegistry,
    live: &[ExternalHandle],
    connected: &[ExternalHandle],
) -> Vec<RepairAction> {
    let mut plan = Vec::new();

    let connected_ids: AHashSet<PersistentId> =
        connected.iter().map(|h| h.persistent_id()).collect();

    let mut live_ids: AHashSet<SessionId> = AHashSet::with_capacity(live.len());
    for handle in live {
        live_ids.insert(handle.session_id());
        if registry.get(handle.session_id()).is_some() {
            continue;
        }
        if handle.profile().is_player && !connected_ids.contains(&handle.persistent_id()) {
            plan.push(RepairAction::EvictGhostPlayer(handle.clone()));
        } else {
            plan.push(RepairAction::RegisterMissing(handle.clone()));
        }
    }

    for session in registry.session_ids() {
        if !live_ids.contains(&session) {
            plan.push(RepairAction::DropStale(session));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PersistentId;
    use crate::source::ExternalHandle;

    fn living(session: u32) -> ExternalHandle {
        ExternalHandle::living(SessionId(session), PersistentId::new())
    }

    #[test]
    fn test_in_sync_registry_needs_no_repairs() {
        let mut registry = EntityRegistry::new();
        let a = living(1);
        registry.add(&a);

        assert!(plan_repairs(&registry, &[a], &[]).is_empty());
    }

    #[test]
    fn test_missed_add_is_registered() {
        let mut registry = EntityRegistry::new();
        let a = living(1);
        let b = living(2);
        registry.add(&a);

        let plan = plan_repairs(&registry, &[a, b.clone()], &[]);
        assert_eq!(plan, vec![RepairAction::RegisterMissing(b)]);
    }

    #[test]
    fn test_missed_remove_is_dropped() {
        let mut registry = EntityRegistry::new();
        let a = living(1);
        let c = living(3);
        registry.add(&a);
        registry.add(&c);

        let plan = plan_repairs(&registry, &[a], &[]);
        assert_eq!(plan, vec![RepairAction::DropStale(SessionId(3))]);
    }

    #[test]
    fn test_disconnected_player_is_evicted_not_registered() {
        let registry = EntityRegistry::new();
        let ghost = ExternalHandle::player(SessionId(5), PersistentId::new());

        let plan = plan_repairs(&registry, &[ghost.clone()], &[]);
        assert_eq!(plan, vec![RepairAction::EvictGhostPlayer(ghost)]);
    }

    #[test]
    fn test_connected_player_is_registered_normally() {
        let registry = EntityRegistry::new();
        let avatar = ExternalHandle::player(SessionId(5), PersistentId::new());

        let plan = plan_repairs(&registry, &[avatar.clone()], &[avatar.clone()]);
        assert_eq!(plan, vec![RepairAction::RegisterMissing(avatar)]);
    }

    #[test]
    fn test_ghost_does_not_mask_other_repairs() {
        // The whole divergence is planned in one pass, ghost included
        let mut registry = EntityRegistry::new();
        let tracked_gone = living(1);
        registry.add(&tracked_gone);
        let ghost = ExternalHandle::player(SessionId(2), PersistentId::new());
        let missing = living(3);

        let plan = plan_repairs(&registry, &[ghost.clone(), missing.clone()], &[]);
        assert!(plan.contains(&RepairAction::EvictGhostPlayer(ghost)));
        assert!(plan.contains(&RepairAction::RegisterMissing(missing)));
        assert!(plan.contains(&RepairAction::DropStale(SessionId(1))));
        assert_eq!(plan.len(), 3);
    }
}
