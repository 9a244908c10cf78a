//! Core domain types
//!
//! Descriptor structures shared between the CLI (which builds and registers
//! them) and the external orchestrator (which schedules and executes them).
//! Everything here is plain data, safe to read from any number of concurrent
//! workers once built.

pub mod pipeline;
pub mod step;
