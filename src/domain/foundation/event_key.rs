//! Composite key identifying one event within one organizer namespace.

use std::fmt;

/// The `(organizer, event)` pair scoping ticket sales on the ticketing
/// platform.
///
/// Used as the flat lookup key of the routing table, avoiding nested
/// organizer-then-event presence checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    organizer: String,
    event: String,
}

impl EventKey {
    /// Create a key from organizer and event slugs.
    pub fn new(organizer: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            organizer: organizer.into(),
            event: event.into(),
        }
    }

    pub fn organizer(&self) -> &str {
        &self.organizer
    }

    pub fn event(&self) -> &str {
        &self.event
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organizer, self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_organizer_slash_event() {
        let key = EventKey::new("fedora", "flock");
        assert_eq!(key.to_string(), "fedora/flock");
    }

    #[test]
    fn equality_covers_both_parts() {
        assert_eq!(EventKey::new("a", "b"), EventKey::new("a", "b"));
        assert_ne!(EventKey::new("a", "b"), EventKey::new("a", "c"));
        assert_ne!(EventKey::new("a", "b"), EventKey::new("c", "b"));
    }
}
