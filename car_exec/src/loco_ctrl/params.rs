//! Parameters structure for LocoCtrl

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct LocoCtrlParams {
    /// Duty produced by a unit linear demand.
    pub full_speed_duty: f64,

    /// Duty added to one wheel and removed from the other by a unit angular demand.
    pub turn_duty: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for LocoCtrlParams {
    fn default() -> Self {
        Self {
            full_speed_duty: 50_000.0,
            turn_duty: 20_000.0,
        }
    }
}
