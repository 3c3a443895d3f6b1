//! # Telecommand sources
//!
//! Requests reach the car either from a timed script or as lines on a stream (normally stdin).
//! Line streams are read on a background thread so the control loop never blocks on input.
//! Either way at most one request is handed out per poll, and so per cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    collections::VecDeque,
    io::{self, BufRead, BufReader},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

use log::{debug, warn};

use comms_if::tc::{Tc, TcResponse};
use util::script_interpreter::{PendingTcs, ScriptInterpreter};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Requests read line by line from a stream.
pub struct LineSource {
    rx: Receiver<String>,
}

/// Requests released by a script as their execution time passes.
pub struct ScriptSource {
    si: ScriptInterpreter,

    /// Requests already due but not yet handed out.
    due: VecDeque<Tc>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Where telecommands are coming from.
pub enum TcSource {
    Script(ScriptSource),
    Lines(LineSource),
}

/// Result of polling a source.
#[derive(Debug)]
pub enum TcPoll {
    /// Nothing new this cycle.
    None,

    /// The request to handle this cycle.
    Some(Tc),

    /// The source is exhausted and will not produce any more requests.
    EndOfInput,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TcSource {
    /// Get the request to handle this cycle, if any.
    pub fn poll(&mut self) -> TcPoll {
        match self {
            TcSource::Script(ss) => ss.poll(),
            TcSource::Lines(ls) => ls.poll(),
        }
    }
}

impl ScriptSource {
    pub fn new(si: ScriptInterpreter) -> Self {
        Self {
            si,
            due: VecDeque::new(),
        }
    }

    /// Take the oldest due request.
    ///
    /// Requests sharing an execution time come out on successive polls, in script order. The
    /// script only ends once every one of them has been handed out.
    pub fn poll(&mut self) -> TcPoll {
        let ended = match self.si.get_pending_tcs() {
            PendingTcs::None => false,
            PendingTcs::Some(tcs) => {
                self.due.extend(tcs);
                false
            }
            PendingTcs::EndOfScript => true,
        };

        match self.due.pop_front() {
            Some(tc) => {
                if !self.due.is_empty() {
                    debug!("{} scripted requests held for later cycles", self.due.len());
                }
                TcPoll::Some(tc)
            }
            None if ended => TcPoll::EndOfInput,
            None => TcPoll::None,
        }
    }
}

impl LineSource {
    /// Read requests from stdin.
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(io::stdin()))
    }

    /// Read requests from any buffered reader, on a background thread.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(l) => {
                        // Receiver gone, the loop has exited
                        if tx.send(l).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Could not read request: {}", e);
                        break;
                    }
                }
            }
        });

        Self { rx }
    }

    /// Take at most one request from the stream.
    ///
    /// Invalid requests are logged with their response and dropped.
    pub fn poll(&mut self) -> TcPoll {
        let line = match self.rx.try_recv() {
            Ok(l) => l,
            Err(TryRecvError::Empty) => return TcPoll::None,
            Err(TryRecvError::Disconnected) => return TcPoll::EndOfInput,
        };

        if line.trim().is_empty() {
            return TcPoll::None;
        }

        match Tc::parse(&line) {
            Ok(tc) => {
                debug!("{:?}: {}", line, TcResponse::Ok);
                TcPoll::Some(tc)
            }
            Err(e) => {
                warn!("Invalid request {:?}: {}", line, TcResponse::from(&e));
                TcPoll::None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::ButtonEvent;
    use std::{io::Cursor, time::Duration};

    #[test]
    fn test_line_source() {
        let input = "0.5/0/0/0/0/0/0\nfavicon.ico\n\nGET /0/0/0/0/1/0/0 HTTP/1.0\n";
        let mut source = TcSource::Lines(LineSource::from_reader(Cursor::new(input)));

        let mut tcs = Vec::new();
        let mut ended = false;
        for _ in 0..1000 {
            match source.poll() {
                TcPoll::None => thread::sleep(Duration::from_millis(1)),
                TcPoll::Some(t) => tcs.push(t),
                TcPoll::EndOfInput => {
                    ended = true;
                    break;
                }
            }
        }

        assert!(ended);
        assert_eq!(tcs.len(), 2);
        assert_eq!(tcs[0].cmd.linear, 0.5);
        assert!(tcs[1].pressed(ButtonEvent::StartRoute));
    }

    #[test]
    fn test_script_source() {
        let si = ScriptInterpreter::from_script("0.0: 0/0/1/0/0/0/0;\n").unwrap();
        let mut source = TcSource::Script(ScriptSource::new(si));

        match source.poll() {
            TcPoll::Some(tc) => assert!(tc.pressed(ButtonEvent::SaveWaypoint)),
            p => panic!("Expected the scripted TC, got {:?}", p),
        }
        assert!(matches!(source.poll(), TcPoll::EndOfInput));
    }

    #[test]
    fn test_script_source_one_tc_per_poll() {
        let script = "0.0: 0.5/0/0/0/0/0/0;\n0.0: 0/0/1/0/0/0/0;\n";
        let si = ScriptInterpreter::from_script(script).unwrap();
        let mut source = TcSource::Script(ScriptSource::new(si));

        // The drive command gets a cycle of its own before the save
        match source.poll() {
            TcPoll::Some(tc) => {
                assert_eq!(tc.cmd.linear, 0.5);
                assert!(tc.buttons.is_empty());
            }
            p => panic!("Expected the drive TC, got {:?}", p),
        }
        match source.poll() {
            TcPoll::Some(tc) => {
                assert_eq!(tc.cmd.linear, 0.0);
                assert!(tc.pressed(ButtonEvent::SaveWaypoint));
            }
            p => panic!("Expected the save TC, got {:?}", p),
        }
        assert!(matches!(source.poll(), TcPoll::EndOfInput));
    }
}
