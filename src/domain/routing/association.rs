//! One routing-table entry linking an event to a room.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::FilterCondition;

/// Associates a room with an event, optionally filtered by ticket condition.
///
/// Value type: two associations are equal iff room and condition both match,
/// so the same room may appear under one event with several distinct
/// conditions, but never twice with an identical one (set semantics).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomAssociation {
    /// Room identifier (`!id:server`) or alias (`#name:server`).
    pub room_id: String,

    /// Ticket filter; the default matches every ticket.
    #[serde(default)]
    pub condition: FilterCondition,
}

impl RoomAssociation {
    /// An unconditioned association.
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            condition: FilterCondition::any(),
        }
    }

    /// An association restricted to a ticket condition.
    pub fn with_condition(room_id: impl Into<String>, condition: FilterCondition) -> Self {
        Self {
            room_id: room_id.into(),
            condition,
        }
    }

    /// Whether the room identifier is an alias needing resolution before use.
    pub fn is_alias(&self) -> bool {
        self.room_id.starts_with('#')
    }
}

impl fmt::Display for RoomAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.condition.is_unconditioned() {
            write!(f, "{}", self.room_id)
        } else {
            write!(f, "{} ({})", self.room_id, self.condition)
        }
    }
}
