use std::collections::HashSet;

use crate::marker::Marker;

/// Liveness source merged into rendering without owning marker data.
pub trait PresenceOverlay {
    fn is_online(&self, member_id: &str) -> bool;
    fn online_count(&self) -> usize;
}

/// Map-backed overlay for tests and offline tooling.
#[derive(Debug, Default, Clone)]
pub struct StaticPresence {
    online: HashSet<String>,
}

impl StaticPresence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_online<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            online: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn set_online(&mut self, member_id: impl Into<String>, online: bool) {
        let id = member_id.into();
        if online {
            self.online.insert(id);
        } else {
            self.online.remove(&id);
        }
    }
}

impl PresenceOverlay for StaticPresence {
    fn is_online(&self, member_id: &str) -> bool {
        self.online.contains(member_id)
    }

    fn online_count(&self) -> usize {
        self.online.len()
    }
}

/// Merge liveness into member markers in place. Event markers are untouched.
pub fn decorate_presence(markers: &mut [Marker], overlay: &dyn PresenceOverlay) {
    for marker in markers {
        if let Marker::Member(member) = marker {
            member.is_online = overlay.is_online(&member.id);
        }
    }
}
