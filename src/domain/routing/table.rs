//! The in-memory routing table.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::foundation::EventKey;

use super::{FilterCondition, RoomAssociation};

/// Many-to-many mapping from `(organizer, event)` to room associations.
///
/// Stored as a single flat map keyed by [`EventKey`]; a key exists only while
/// at least one association remains beneath it, and lookups on absent keys
/// yield an empty set rather than an error.
///
/// The table itself is pure state; persistence happens through a
/// `RoutingStore`, which snapshots the whole table on every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingTable {
    entries: HashMap<EventKey, HashSet<RoomAssociation>>,
}

impl RoutingTable {
    /// An empty routing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// All associations for one event; empty for absent keys.
    pub fn rooms_by_event(&self, organizer: &str, event: &str) -> HashSet<RoomAssociation> {
        self.entries
            .get(&EventKey::new(organizer, event))
            .cloned()
            .unwrap_or_default()
    }

    /// Associations whose condition matches the given ticket item/variant.
    ///
    /// Identifiers are compared in their normalized decimal string form;
    /// callers must not mix numeric and string spellings.
    pub fn rooms_by_ticket_variant(
        &self,
        organizer: &str,
        event: &str,
        item: &str,
        variant: Option<&str>,
    ) -> Vec<RoomAssociation> {
        let mut matched: Vec<RoomAssociation> = self
            .entries
            .get(&EventKey::new(organizer, event))
            .into_iter()
            .flatten()
            .filter(|assoc| assoc.condition.matches(item, variant))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        matched
    }

    /// Insert one association. Returns whether the set changed.
    pub fn add(&mut self, organizer: &str, event: &str, association: RoomAssociation) -> bool {
        self.entries
            .entry(EventKey::new(organizer, event))
            .or_default()
            .insert(association)
    }

    /// Remove the association for `room_id` carrying exactly this condition.
    ///
    /// Associations for the same room under other conditions are untouched.
    /// No-op (returning `false`) when absent. An emptied key is dropped.
    pub fn remove(
        &mut self,
        organizer: &str,
        event: &str,
        room_id: &str,
        condition: &FilterCondition,
    ) -> bool {
        let key = EventKey::new(organizer, event);
        let Some(rooms) = self.entries.get_mut(&key) else {
            return false;
        };

        let target = RoomAssociation::with_condition(room_id, condition.clone());
        let removed = rooms.remove(&target);
        if rooms.is_empty() {
            self.entries.remove(&key);
        }
        removed
    }

    /// Whether any association anywhere references this room.
    pub fn room_is_mapped(&self, room_id: &str) -> bool {
        !self.events_for_room(room_id).is_empty()
    }

    /// `"organizer/event"` display strings for every association referencing
    /// this room, annotated with the condition when one is set.
    pub fn events_for_room(&self, room_id: &str) -> Vec<String> {
        let mut events: Vec<String> = self
            .entries
            .iter()
            .flat_map(|(key, rooms)| {
                rooms
                    .iter()
                    .filter(|assoc| assoc.room_id == room_id)
                    .map(move |assoc| {
                        if assoc.condition.is_unconditioned() {
                            key.to_string()
                        } else {
                            format!("{} ({})", key, assoc.condition)
                        }
                    })
            })
            .collect();
        events.sort();
        events
    }

    /// Remove every association for this room across all organizers/events.
    ///
    /// Returns the number of associations removed.
    pub fn purge_room(&mut self, room_id: &str) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, rooms| {
            let before = rooms.len();
            rooms.retain(|assoc| assoc.room_id != room_id);
            removed += before - rooms.len();
            !rooms.is_empty()
        });
        removed
    }

    /// Total number of associations across all events.
    pub fn association_count(&self) -> usize {
        self.entries.values().map(HashSet::len).sum()
    }

    /// Whether the table holds no associations at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// The persisted snapshot mirrors the logical shape:
// organizer -> event -> [ { room_id, condition } ]. Reload order is
// irrelevant, but serialization sorts keys and associations so snapshots are
// byte-stable across rewrites.
impl Serialize for RoutingTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut snapshot: BTreeMap<&str, BTreeMap<&str, Vec<&RoomAssociation>>> = BTreeMap::new();
        for (key, rooms) in &self.entries {
            let mut associations: Vec<&RoomAssociation> = rooms.iter().collect();
            associations.sort_by(|a, b| {
                (&a.room_id, &a.condition.item, &a.condition.variant)
                    .cmp(&(&b.room_id, &b.condition.item, &b.condition.variant))
            });
            snapshot
                .entry(key.organizer())
                .or_default()
                .insert(key.event(), associations);
        }
        snapshot.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoutingTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot: BTreeMap<String, BTreeMap<String, Vec<RoomAssociation>>> =
            BTreeMap::deserialize(deserializer)?;

        let mut table = RoutingTable::new();
        for (organizer, events) in snapshot {
            for (event, associations) in events {
                for association in associations {
                    table.add(&organizer, &event, association);
                }
            }
        }
        Ok(table)
    }
}
