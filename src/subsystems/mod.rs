//! Subsystem modules for the assistant.

pub mod agents;
pub mod comms;
pub mod memory;
pub mod tools;
pub mod ui;
