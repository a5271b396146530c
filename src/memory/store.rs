//! Garden store — one pretty-printed JSON file per garden.
//!
//! Files live under a configured gardens directory as `<name>.json`.
//! Read failures during lookup are deliberately folded into "does not
//! exist": a corrupt or unreadable file is indistinguishable from true
//! absence to callers. Save is last-writer-wins; there is no file locking
//! across processes.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;
use super::GardenMemory;

pub struct GardenStore {
    dir: PathBuf,
}

impl GardenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reject names that could escape the gardens directory.
    /// Kept strict: path separators, parent refs, and hidden-file prefixes.
    fn valid_name(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Load a garden's memory record, or `None` if it does not exist.
    ///
    /// Any read or parse failure is logged and reported as absence.
    pub fn load(&self, name: &str) -> Result<Option<GardenMemory>, AppError> {
        if !Self::valid_name(name) {
            debug!(%name, "rejected invalid garden name");
            return Ok(None);
        }
        let path = self.path_for(name);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "garden read failed, treating as absent");
                return Ok(None);
            }
        };
        match serde_json::from_str::<GardenMemory>(&data) {
            Ok(memory) => Ok(Some(memory)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "garden parse failed, treating as absent");
                Ok(None)
            }
        }
    }

    /// Persist a garden's memory record, creating the directory if needed.
    pub fn save(&self, name: &str, memory: &GardenMemory) -> Result<(), AppError> {
        if !Self::valid_name(name) {
            return Err(AppError::Storage(format!("invalid garden name: '{name}'")));
        }
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                AppError::Storage(format!("cannot create {}: {e}", self.dir.display()))
            })?;
        }
        let path = self.path_for(name);
        let data = serde_json::to_string_pretty(memory)
            .map_err(|e| AppError::Storage(format!("serialise garden '{name}': {e}")))?;
        fs::write(&path, data)
            .map_err(|e| AppError::Storage(format!("cannot write {}: {e}", path.display())))
    }

    /// Names of all stored gardens, sorted. A missing directory is an empty list.
    pub fn list(&self) -> Result<Vec<String>, AppError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                if path.extension().and_then(|x| x.to_str()) == Some("json") {
                    stem_name(&path)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

fn stem_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}
