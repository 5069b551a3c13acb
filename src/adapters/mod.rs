//! Adapter implementations of the port traits.
//!
//! - `live`: real clock, disk, ids and notification delivery.
//! - `memory`: in-process stand-ins used by tests and embedders.

pub mod live;
pub mod memory;
