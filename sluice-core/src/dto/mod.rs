//! Data Transfer Objects for orchestrator communication
//!
//! Wire types exchanged with the external orchestrator when a descriptor is
//! registered or run status is read back. Run state is orchestrator-owned;
//! these are read-only views of it.

pub mod pipeline;
pub mod run;
