//! Wrapper construction

use super::kind::classify;
use super::Entity;
use crate::source::ExternalHandle;

/// Build the typed wrapper for a raw handle.
///
/// Classification happens exactly once, here; the kind is immutable for
/// the wrapper's lifetime. Scripted host objects carry their own wrapper
/// definition and keep their embedded tag, so wrapping the same handle is
/// idempotent. The at-most-one-wrapper guarantee is completed by the
/// registry's add path, which checks its session index before calling
/// this.
pub fn wrap(handle: &ExternalHandle) -> Entity {
    Entity::new(handle.clone(), classify(handle.profile()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PersistentId, SessionId};
    use crate::entity::Kind;

    #[test]
    fn test_wrap_assigns_kind_from_profile() {
        let persistent = PersistentId::new();
        let entity = wrap(&ExternalHandle::player(SessionId(1), persistent));
        assert_eq!(entity.kind(), &Kind::Player);
        assert_eq!(entity.session_id(), SessionId(1));
        assert_eq!(entity.persistent_id(), persistent);
    }

    #[test]
    fn test_wrap_honors_self_describing_handles() {
        let handle = ExternalHandle::scripted(SessionId(2), PersistentId::new(), "locomotive");
        let entity = wrap(&handle);
        assert_eq!(entity.kind(), &Kind::Custom("locomotive".to_string()));

        // Same handle wraps to the same wrapper shape every time
        let again = wrap(&handle);
        assert_eq!(again.kind(), entity.kind());
        assert_eq!(again.persistent_id(), entity.persistent_id());
    }
}
