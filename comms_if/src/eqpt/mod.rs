//! # Equipment Interface
//!
//! This module defines the structures exchanged with the drivetrain equipment.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;

pub use drive::*;
