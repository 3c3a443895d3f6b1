//! # Gamepad button events

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Button events in the order their flags appear in a request path.
pub const BUTTON_ORDER: [ButtonEvent; 5] = [
    ButtonEvent::SaveWaypoint,
    ButtonEvent::LoadWaypoints,
    ButtonEvent::StartRoute,
    ButtonEvent::ResetPose,
    ButtonEvent::ClearWaypoints,
];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A named action triggered by a gamepad button.
///
/// The ordering of the variants is the order in which events raised in the same request are
/// handled.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ButtonEvent {
    /// Append the current position to the waypoint queue (button 1).
    SaveWaypoint,

    /// Append the stored waypoints to the waypoint queue (button 2).
    LoadWaypoints,

    /// Start driving the waypoint queue (button 3).
    StartRoute,

    /// Reset the odometry pose to the origin (home button).
    ResetPose,

    /// Erase the stored waypoints (PS3 button).
    ClearWaypoints,
}
