//! In-process fan-out of committed product changes to live subscribers.
//!
//! Nothing here is persisted. Every event gets a bus-wide sequence number, so
//! a subscriber that lost events to backpressure can see the gap.

mod bus;
mod event;

pub use bus::*;
pub use event::*;
