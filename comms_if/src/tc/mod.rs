//! # Telecommand module
//!
//! This module decodes the requests sent by the joystick and gamepad publishers into typed
//! telecommands. Two encodings are accepted:
//!
//! - A request path `speed/steer/b1/b2/b3/b4/p3`, optionally with a leading `/` and optionally
//!   still wrapped in its request line (`GET /0.5/0.0/0/0/0/0/0 HTTP/1.0`).
//! - A JSON object `{"linear": 0.5, "angular": 0.0, "buttons": ["start_route"]}`.
//!
//! Anything malformed or out of range is rejected here, so the rest of the software only ever
//! sees valid commands.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod buttons;
pub mod loco_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// Internal
pub use buttons::{ButtonEvent, BUTTON_ORDER};
pub use loco_ctrl::MotionCommand;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of `/` separated fields in a request path.
const NUM_PATH_FIELDS: usize = 2 + BUTTON_ORDER.len();

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A telecommand, i.e. one decoded request from the joystick or gamepad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tc {
    /// The manual drive vector of the request.
    pub cmd: MotionCommand,

    /// Buttons pressed in this request.
    pub buttons: BTreeSet<ButtonEvent>,
}

/// Raw JSON form of a telecommand, before validation.
#[derive(Deserialize)]
struct JsonTc {
    linear: f64,
    angular: f64,
    #[serde(default)]
    buttons: Vec<ButtonEvent>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Response to send back to the request source once a TC has been handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TcResponse {
    Ok,
    Invalid(String),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Expected 7 fields in the request path, found {0}")]
    WrongFieldCount(usize),

    #[error("The {0} field ({1:?}) is not a number")]
    InvalidNumber(&'static str, String),

    #[error("The {0} field must be finite and within [-1, 1], found {1}")]
    OutOfRange(&'static str, f64),

    #[error("The request line has no request path")]
    MissingPath,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Create a new TC, validating the drive vector.
    pub fn new(
        cmd: MotionCommand,
        buttons: BTreeSet<ButtonEvent>,
    ) -> Result<Self, TcParseError> {
        check_range("speed", cmd.linear)?;
        check_range("steer", cmd.angular)?;

        Ok(Self { cmd, buttons })
    }

    /// Parse a TC from any of the accepted encodings.
    pub fn parse(request: &str) -> Result<Self, TcParseError> {
        let request = request.trim();

        if request.starts_with('{') {
            Self::from_json(request)
        } else if request.contains(char::is_whitespace) {
            Self::from_request_line(request)
        } else {
            Self::from_request_path(request)
        }
    }

    /// Parse a TC from a request line such as `GET /0.5/0.0/0/0/0/0/0 HTTP/1.0`.
    ///
    /// The second whitespace separated token is the request path.
    pub fn from_request_line(line: &str) -> Result<Self, TcParseError> {
        let path = line
            .split_whitespace()
            .nth(1)
            .ok_or(TcParseError::MissingPath)?;

        Self::from_request_path(path)
    }

    /// Parse a TC from a request path `speed/steer/b1/b2/b3/b4/p3`.
    ///
    /// Button fields are integers, any non-zero value means the button was pressed.
    pub fn from_request_path(path: &str) -> Result<Self, TcParseError> {
        let path = path.trim();
        let path = path.strip_prefix('/').unwrap_or(path);

        let fields: Vec<&str> = path.split('/').collect();
        if fields.len() != NUM_PATH_FIELDS {
            return Err(TcParseError::WrongFieldCount(fields.len()));
        }

        let linear = parse_f64("speed", fields[0])?;
        let angular = parse_f64("steer", fields[1])?;

        let mut buttons = BTreeSet::new();
        for (event, field) in BUTTON_ORDER.iter().zip(&fields[2..]) {
            let pressed: i64 = field
                .trim()
                .parse()
                .map_err(|_| TcParseError::InvalidNumber(button_name(*event), field.to_string()))?;

            if pressed != 0 {
                buttons.insert(*event);
            }
        }

        Self::new(MotionCommand::new(linear, angular), buttons)
    }

    /// Parse a TC from a JSON object.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        let raw: JsonTc = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        Self::new(
            MotionCommand::new(raw.linear, raw.angular),
            raw.buttons.into_iter().collect(),
        )
    }

    /// Returns true if the given button was pressed in this TC.
    pub fn pressed(&self, event: ButtonEvent) -> bool {
        self.buttons.contains(&event)
    }
}

impl fmt::Display for TcResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TcResponse::Ok => write!(f, "OK"),
            TcResponse::Invalid(reason) => write!(f, "{}", reason),
        }
    }
}

impl From<&TcParseError> for TcResponse {
    fn from(e: &TcParseError) -> Self {
        TcResponse::Invalid(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_f64(name: &'static str, field: &str) -> Result<f64, TcParseError> {
    field
        .trim()
        .parse()
        .map_err(|_| TcParseError::InvalidNumber(name, field.to_string()))
}

fn check_range(name: &'static str, value: f64) -> Result<(), TcParseError> {
    if value.is_finite() && (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TcParseError::OutOfRange(name, value))
    }
}

fn button_name(event: ButtonEvent) -> &'static str {
    match event {
        ButtonEvent::SaveWaypoint => "b1",
        ButtonEvent::LoadWaypoints => "b2",
        ButtonEvent::StartRoute => "b3",
        ButtonEvent::ResetPose => "b4",
        ButtonEvent::ClearWaypoints => "p3",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_request_path() {
        let tc = Tc::from_request_path("/0.5/-0.25/0/0/1/0/0").unwrap();
        assert_eq!(tc.cmd, MotionCommand::new(0.5, -0.25));
        assert_eq!(tc.buttons.len(), 1);
        assert!(tc.pressed(ButtonEvent::StartRoute));

        // Leading slash is optional, any non-zero button value counts as pressed
        let tc = Tc::from_request_path("0/0/2/0/0/-1/1").unwrap();
        assert!(tc.cmd.is_zero());
        let events: Vec<ButtonEvent> = tc.buttons.iter().copied().collect();
        assert_eq!(
            events,
            vec![
                ButtonEvent::SaveWaypoint,
                ButtonEvent::ResetPose,
                ButtonEvent::ClearWaypoints
            ]
        );
    }

    #[test]
    fn test_request_line() {
        let tc = Tc::parse("GET /1.0/0.0/0/0/0/0/0 HTTP/1.0\r\n").unwrap();
        assert_eq!(tc.cmd, MotionCommand::new(1.0, 0.0));
        assert!(tc.buttons.is_empty());

        assert!(matches!(Tc::parse("GET"), Err(TcParseError::WrongFieldCount(1))));
        assert!(matches!(
            Tc::from_request_line("   "),
            Err(TcParseError::MissingPath)
        ));
    }

    #[test]
    fn test_malformed_requests() {
        assert!(matches!(
            Tc::parse("favicon.ico"),
            Err(TcParseError::WrongFieldCount(1))
        ));
        assert!(matches!(
            Tc::parse("0.5/0/0/0/0/0"),
            Err(TcParseError::WrongFieldCount(6))
        ));
        assert!(matches!(
            Tc::parse("fast/0/0/0/0/0/0"),
            Err(TcParseError::InvalidNumber("speed", _))
        ));
        assert!(matches!(
            Tc::parse("0/0/0/0/yes/0/0"),
            Err(TcParseError::InvalidNumber("b3", _))
        ));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            Tc::parse("1.5/0/0/0/0/0/0"),
            Err(TcParseError::OutOfRange("speed", _))
        ));
        assert!(matches!(
            Tc::parse("0/-1.01/0/0/0/0/0"),
            Err(TcParseError::OutOfRange("steer", _))
        ));
        assert!(matches!(
            Tc::parse("NaN/0/0/0/0/0/0"),
            Err(TcParseError::OutOfRange("speed", _))
        ));
        assert!(Tc::parse("-1/1/0/0/0/0/0").is_ok());
    }

    #[test]
    fn test_json() {
        let tc = Tc::parse(r#"{"linear": 0.2, "angular": 0.1, "buttons": ["save_waypoint"]}"#)
            .unwrap();
        assert_eq!(tc.cmd, MotionCommand::new(0.2, 0.1));
        assert!(tc.pressed(ButtonEvent::SaveWaypoint));

        let tc = Tc::parse(r#"{"linear": 0.0, "angular": 0.0}"#).unwrap();
        assert!(tc.buttons.is_empty());

        assert!(matches!(
            Tc::parse(r#"{"linear": 2.0, "angular": 0.0}"#),
            Err(TcParseError::OutOfRange("speed", _))
        ));
        assert!(matches!(
            Tc::parse(r#"{"linear": 0.0}"#),
            Err(TcParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_response() {
        assert_eq!(TcResponse::Ok.to_string(), "OK");

        let err = Tc::parse("1/2/3").unwrap_err();
        let response = TcResponse::from(&err);
        assert_eq!(
            response,
            TcResponse::Invalid("Expected 7 fields in the request path, found 3".into())
        );
    }
}
