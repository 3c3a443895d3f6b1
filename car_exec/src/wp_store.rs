//! # Waypoint store
//!
//! Persistence for saved waypoints, so a route recorded in one run can be driven in another. The
//! file store keeps one `x, y` pair per line, in meters, in the order the points were saved.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::nav::Waypoint;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Ordered persistent storage of waypoints.
pub trait WaypointStore {
    /// Append a waypoint to the end of the store.
    fn append(&mut self, waypoint: Waypoint) -> Result<(), WaypointStoreError>;

    /// Load every stored waypoint, oldest first.
    fn load_all(&self) -> Result<Vec<Waypoint>, WaypointStoreError>;

    /// Erase every stored waypoint.
    fn clear(&mut self) -> Result<(), WaypointStoreError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Waypoint store backed by a plain text file.
#[derive(Debug, Clone)]
pub struct FileWaypointStore {
    path: PathBuf,
}

/// Waypoint store held in memory, lost at exit.
#[derive(Debug, Clone, Default)]
pub struct MemWaypointStore {
    waypoints: Vec<Waypoint>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum WaypointStoreError {
    #[error("Could not access the waypoint file {0:?}: {1}")]
    Io(PathBuf, io::Error),

    #[error("Line {0} of the waypoint file is not an `x, y` pair: {1:?}")]
    InvalidLine(usize, String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FileWaypointStore {
    /// Create a store at the given path. Neither the file nor its directory need to exist yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, e: io::Error) -> WaypointStoreError {
        WaypointStoreError::Io(self.path.clone(), e)
    }
}

impl WaypointStore for FileWaypointStore {
    fn append(&mut self, waypoint: Waypoint) -> Result<(), WaypointStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;

        writeln!(file, "{:.6}, {:.6}", waypoint.x_m, waypoint.y_m).map_err(|e| self.io_err(e))
    }

    fn load_all(&self) -> Result<Vec<Waypoint>, WaypointStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            // Nothing has been saved yet
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                parse_line(line)
                    .ok_or_else(|| WaypointStoreError::InvalidLine(i + 1, line.to_string()))
            })
            .collect()
    }

    fn clear(&mut self) -> Result<(), WaypointStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

impl MemWaypointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaypointStore for MemWaypointStore {
    fn append(&mut self, waypoint: Waypoint) -> Result<(), WaypointStoreError> {
        self.waypoints.push(waypoint);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Waypoint>, WaypointStoreError> {
        Ok(self.waypoints.clone())
    }

    fn clear(&mut self) -> Result<(), WaypointStoreError> {
        self.waypoints.clear();
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse_line(line: &str) -> Option<Waypoint> {
    let mut fields = line.split(',');

    let x_m: f64 = fields.next()?.trim().parse().ok()?;
    let y_m: f64 = fields.next()?.trim().parse().ok()?;

    if fields.next().is_some() || !x_m.is_finite() || !y_m.is_finite() {
        return None;
    }

    Some(Waypoint::new(x_m, y_m))
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("pico_car_wp_store_{}", std::process::id()))
            .join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_file_store() {
        let mut store = FileWaypointStore::new(temp_path("round.txt"));
        assert!(store.load_all().unwrap().is_empty());

        store.append(Waypoint::new(1.0, -0.5)).unwrap();
        store.append(Waypoint::new(0.25, 3.125)).unwrap();
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "1.000000, -0.500000\n0.250000, 3.125000\n"
        );
        assert_eq!(
            store.load_all().unwrap(),
            vec![Waypoint::new(1.0, -0.5), Waypoint::new(0.25, 3.125)]
        );

        store.clear().unwrap();
        assert!(store.load_all().unwrap().is_empty());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_bad_line() {
        let path = temp_path("bad.txt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "1.0, 2.0\n\n3.0 4.0\n").unwrap();

        let store = FileWaypointStore::new(&path);
        assert!(matches!(
            store.load_all(),
            Err(WaypointStoreError::InvalidLine(3, _))
        ));
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line(" 1.5 ,-2"), Some(Waypoint::new(1.5, -2.0)));
        assert_eq!(parse_line("1, 2, 3"), None);
        assert_eq!(parse_line("1"), None);
        assert_eq!(parse_line("inf, 0"), None);
    }

    #[test]
    fn test_mem_store() {
        let mut store = MemWaypointStore::new();
        store.append(Waypoint::new(1.0, 1.0)).unwrap();
        store.append(Waypoint::new(2.0, 2.0)).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);
        store.clear().unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }
}
