//! Event Usher - Ticketing-to-Chat-Room Bridge
//!
//! This crate bridges a Pretix-style ticketing platform to a chat-room
//! membership service: paid-order webhooks are validated, the full order is
//! fetched, attendee identities are extracted, and attendees are invited into
//! the rooms routed for the order's item/variant.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
