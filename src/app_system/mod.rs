//! System orchestration, startup, and shutdown logic.

pub mod config;
pub mod inventory_system;
pub mod logging;
pub mod snapshot;

pub use config::*;
pub use inventory_system::*;
pub use logging::*;
pub use snapshot::*;
