//! File-based data source.
//!
//! Polls a JSON file holding an `energy_data` export.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use meter_types::EnergySnapshot;

use super::{DataSource, StoreEvent};

/// A data source that reads energy snapshots from a JSON file.
///
/// The source tracks the file's modification time and only returns
/// a new snapshot when the file has been updated. A failure is reported
/// once; the same error is not repeated on every poll.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_modified: Option<SystemTime>,
    last_error: Option<String>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_modified: None,
            last_error: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&self) -> Result<EnergySnapshot, String> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| format!("Read error: {}", e))?;
        EnergySnapshot::from_json_str(&content).map_err(|e| format!("Parse error: {}", e))
    }

    fn fail(&mut self, error: String) -> Option<StoreEvent> {
        if self.last_error.as_deref() == Some(error.as_str()) {
            return None;
        }
        self.last_error = Some(error.clone());
        Some(StoreEvent::Failed(error))
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<StoreEvent> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,
            // File disappeared after a good read; keep the last snapshot
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };

        if !file_changed {
            return None;
        }

        match self.read_file() {
            Ok(snapshot) => {
                self.last_modified = current_modified;
                self.last_error = None;
                Some(StoreEvent::Changed(snapshot))
            }
            Err(error) => {
                // Remember the mtime of a broken file so it is not reparsed
                // until it changes again
                if current_modified.is_some() {
                    self.last_modified = current_modified;
                }
                self.fail(error)
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn refresh(&mut self) {
        self.last_modified = None;
        self.last_error = None;
    }
}
