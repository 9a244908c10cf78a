//! Sluice Core
//!
//! Core types for the Sluice pipeline descriptor toolkit.
//!
//! This crate contains:
//! - Domain types: the immutable descriptor entities (Pipeline, Step, etc.)
//! - Builder: explicit descriptor construction and the only validation in the system
//! - DTOs: data transfer objects for talking to an external orchestrator
//!
//! A descriptor is pure data. It performs no I/O when built and tracks no
//! execution state; scheduling, retries, and run history belong entirely to
//! the orchestrator that consumes it.

pub mod builder;
pub mod domain;
pub mod dto;
pub mod error;
pub mod retail;
