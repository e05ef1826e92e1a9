use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use board_core::{admit_collection, Project};
use board_logging::{board_debug, board_info, board_warn};
use serde_json::Value;

use crate::persist::AtomicFileWriter;

/// Name of the single cache slot inside the cache directory.
pub const SNAPSHOT_FILENAME: &str = "projects.json";

/// Last known-good project collection, kept outside process memory. Only
/// consulted when the remote store cannot be reached.
pub trait FallbackCache: Send + Sync {
    /// Best-effort overwrite; failures are logged and swallowed.
    fn save(&self, snapshot: &[Project]);

    /// The last saved snapshot, or empty when there is none usable.
    fn load(&self) -> Vec<Project>;
}

/// JSON snapshot in `{dir}/projects.json`, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILENAME)
    }
}

impl FallbackCache for FileCache {
    fn save(&self, snapshot: &[Project]) {
        let content = match serde_json::to_string_pretty(snapshot) {
            Ok(text) => text,
            Err(err) => {
                board_warn!("Failed to serialize project snapshot: {}", err);
                return;
            }
        };

        let writer = AtomicFileWriter::new(self.dir.clone());
        match writer.write(SNAPSHOT_FILENAME, &content) {
            Ok(path) => board_debug!("Saved {} projects to {:?}", snapshot.len(), path),
            Err(err) => board_warn!("Failed to write project snapshot to {:?}: {}", self.dir, err),
        }
    }

    fn load(&self) -> Vec<Project> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                board_warn!("Failed to read project snapshot from {:?}: {}", path, err);
                return Vec::new();
            }
        };

        let values: Vec<Value> = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(err) => {
                board_warn!("Failed to parse project snapshot from {:?}: {}", path, err);
                return Vec::new();
            }
        };

        let (projects, rejected) = admit_collection(values);
        for err in &rejected {
            board_warn!("Dropping cached project record: {}", err);
        }
        board_info!("Loaded {} cached projects from {:?}", projects.len(), path);
        projects
    }
}
