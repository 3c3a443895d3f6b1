//! # Script interpreter module
//!
//! This module provides an interpreter for car scripts, allowing recorded joystick and gamepad
//! requests to be replayed against the session clock.
//!
//! A script is a list of `<time_s>: <request>;` entries, one per line, where the request is in
//! any encoding accepted by [`Tc::parse`]:
//!
//! ```text
//! 0.0: 0.5/0.0/0/0/0/0/0;
//! 1.5: 0/0/0/0/1/0/0;
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_tcs` to
/// acquire a list of telecommands that need executing.
pub struct ScriptInterpreter {
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),
}

pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path.to_path_buf()));
        }

        let script = fs::read_to_string(path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_script(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("script regex is valid");

        for cap in re.captures_iter(script) {
            let time_str = &cap[1];
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|_| ScriptError::InvalidTimestamp(time_str.to_string()))?;

            let tc = Tc::parse(&cap[3]).map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            tc_queue.push_back(Command { exec_time_s, tc });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter { cmds: tc_queue })
    }

    /// Return the TCs which are due at the current session time.
    pub fn get_pending_tcs(&mut self) -> PendingTcs {
        self.get_pending_tcs_at(get_elapsed_seconds())
    }

    /// Return the TCs which are due at the given time, or `None` if no TCs need executing now.
    pub fn get_pending_tcs_at(&mut self, current_time_s: f64) -> PendingTcs {
        // If the queue is empty the script is over
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript;
        }

        let mut tc_vec: Vec<Tc> = vec![];

        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s > current_time_s {
                break;
            }
            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        } else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Get the number of TCs remaining in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::ButtonEvent;

    const SCRIPT: &str = "\
        0.0: 0.5/0.0/0/0/0/0/0;\n\
        0.0: 0.5/0.1/0/0/0/0/0;\n\
        1.5: 0/0/0/0/1/0/0;\n\
        2.25: {\"linear\": 0.0, \"angular\": 0.0, \"buttons\": [\"reset_pose\"]};\n";

    #[test]
    fn test_script_replay() {
        let mut si = ScriptInterpreter::from_script(SCRIPT).unwrap();
        assert_eq!(si.get_num_tcs(), 4);
        assert_eq!(si.get_duration(), 2.25);

        match si.get_pending_tcs_at(0.1) {
            PendingTcs::Some(tcs) => {
                assert_eq!(tcs.len(), 2);
                assert_eq!(tcs[1].cmd.angular, 0.1);
            }
            _ => panic!("Expected two pending TCs"),
        }

        assert!(matches!(si.get_pending_tcs_at(1.0), PendingTcs::None));

        match si.get_pending_tcs_at(1.6) {
            PendingTcs::Some(tcs) => assert!(tcs[0].pressed(ButtonEvent::StartRoute)),
            _ => panic!("Expected the start route TC"),
        }

        match si.get_pending_tcs_at(3.0) {
            PendingTcs::Some(tcs) => assert!(tcs[0].pressed(ButtonEvent::ResetPose)),
            _ => panic!("Expected the reset pose TC"),
        }

        assert!(matches!(si.get_pending_tcs_at(4.0), PendingTcs::EndOfScript));
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::from_script("# nothing here\n"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_script("0.5: 3/0/0/0/0/0/0;\n"),
            Err(ScriptError::InvalidTc(t, _)) if t == 0.5
        ));
        assert!(matches!(
            ScriptInterpreter::new("/definitely/not/a/script.txt"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
