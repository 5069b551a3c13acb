//! In-memory adapters.
//!
//! These stand in for the hosted stores and the notification service in
//! tests, and record every call so routing can be asserted on.

pub mod clock;
pub mod notify;
pub mod tasks;

pub use clock::FixedClock;
pub use notify::RecordingNotifier;
pub use tasks::{MemoryTaskStore, StoreCall};
