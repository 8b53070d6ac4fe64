//! Orchestration services that sit between the gateway and the actors.

pub mod inventory;

pub use inventory::*;
