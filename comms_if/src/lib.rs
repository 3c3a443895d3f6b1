//! # Communications interface crate.
//!
//! Provides the interfaces shared between the car executable, its command sources, and its
//! equipment drivers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommands decoded from external requests (manual drive vectors and button events)
pub mod tc;

/// Demand and sensor definitions for equipment (motors and encoders)
pub mod eqpt;
