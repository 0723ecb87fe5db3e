//! Entity classification
//!
//! The set of kinds is closed; adding one is a compile-time change to the
//! enum and the classifier, not a runtime registration.

use serde::{Deserialize, Serialize};

use crate::source::HandleProfile;

/// Classification tag assigned to an entity once at construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// A connected player's avatar
    Player,
    /// A mob with an AI brain
    Living,
    /// Anything else the host reports
    Generic,
    /// A scripted object, tagged by its registration name
    Custom(String),
}

impl Kind {
    /// Capability check used by typed lookups and queries
    pub fn matches(&self, filter: &KindFilter) -> bool {
        match filter {
            KindFilter::Any => true,
            KindFilter::Player => matches!(self, Kind::Player),
            KindFilter::Living => matches!(self, Kind::Living),
            KindFilter::Generic => matches!(self, Kind::Generic),
            KindFilter::Custom(tag) => matches!(self, Kind::Custom(t) if t == tag),
        }
    }
}

/// Query target for kind-filtered lookups.
///
/// `Any` is the base of the hierarchy and matches every kind; the rest
/// select one concrete kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindFilter {
    Any,
    Player,
    Living,
    Generic,
    Custom(String),
}

/// Decide which kind a raw handle belongs to.
///
/// Total over every profile shape: unrecognized handles land in `Generic`
/// rather than being refused. Scripted objects take priority over the
/// player/living capabilities they may also report, and players take
/// priority over living (avatars report both).
pub fn classify(profile: &HandleProfile) -> Kind {
    if let Some(tag) = &profile.scripted_kind {
        return Kind::Custom(tag.clone());
    }
    if profile.is_player {
        return Kind::Player;
    }
    if profile.is_living {
        return Kind::Living;
    }
    Kind::Generic
}
