//! Event-to-room routing.
//!
//! A routing table maps `(organizer, event)` pairs to sets of room
//! associations, each optionally filtered by ticket item/variant. Pipelines
//! consult it to decide which rooms an attendee gets invited into.

mod association;
mod condition;
mod table;

pub use association::RoomAssociation;
pub use condition::FilterCondition;
pub use table::RoutingTable;
