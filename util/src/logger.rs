//! Logging to the terminal and the session log file
//!
//! Every line starts with the seconds elapsed since the session began and a three letter level
//! tag. Debug and trace lines also name the module that emitted them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;

use colored::{ColoredString, Colorize};
use fern::FormatCallback;
use log::{info, Level, Record};
use thiserror::Error;

use crate::session::{self, Session};

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Info records must always be logged, `{0}` would hide them")]
    LevelTooQuiet(LevelFilter),

    #[error("Could not open the log file: {0}")]
    LogFile(std::io::Error),

    #[error("Could not install the logger: {0}")]
    Dispatch(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the global logger, writing to stdout and to `session.log_file_path`.
///
/// `min_level` may be `Info` or anything more verbose. Only one logger can be installed per
/// process, so a second call fails with [`LoggerInitError::Dispatch`].
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    check_min_level(min_level)?;

    let log_file = fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFile)?;

    fern::Dispatch::new()
        .format(format_record)
        .level(min_level)
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::Dispatch)?;

    info!("Logger ready at {:?}", min_level);
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Writing to {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_min_level(min_level: LevelFilter) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        Err(LoggerInitError::LevelTooQuiet(min_level))
    } else {
        Ok(())
    }
}

fn format_record(out: FormatCallback, message: &fmt::Arguments, record: &Record) {
    let time_s = session::get_elapsed_seconds();
    let tag = level_tag(record.level());

    if record.level() <= Level::Info {
        out.finish(format_args!("[{:10.6} {}] {}", time_s, tag, message))
    } else {
        out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            time_s,
            tag,
            record.target(),
            message
        ))
    }
}

fn level_tag(level: Level) -> ColoredString {
    let tag = match level {
        Level::Error => "ERR",
        Level::Warn => "WRN",
        Level::Info => "INF",
        Level::Debug => "DBG",
        Level::Trace => "TRC",
    };

    match level {
        Level::Error => tag.red().bold(),
        Level::Warn => tag.yellow(),
        Level::Info => tag.normal(),
        Level::Debug => tag.dimmed(),
        Level::Trace => tag.dimmed().italic(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_min_level() {
        assert!(check_min_level(LevelFilter::Info).is_ok());
        assert!(check_min_level(LevelFilter::Trace).is_ok());
        assert!(matches!(
            check_min_level(LevelFilter::Warn),
            Err(LoggerInitError::LevelTooQuiet(LevelFilter::Warn))
        ));
        assert!(check_min_level(LevelFilter::Off).is_err());
    }

    #[test]
    fn test_level_tags() {
        let tags: Vec<String> = [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace]
            .iter()
            .map(|l| level_tag(*l).to_string())
            .collect();

        for (tag, expected) in tags.iter().zip(["ERR", "WRN", "INF", "DBG", "TRC"].iter()) {
            assert!(tag.contains(expected));
        }
    }
}
