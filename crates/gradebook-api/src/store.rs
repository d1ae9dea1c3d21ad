//! Record store.
//!
//! The store is a whole-collection key-value store: every read loads the
//! full id → record mapping and every write replaces it. [`JsonFileStore`]
//! keeps the mapping in a single pretty-printed JSON file; [`MemoryStore`]
//! keeps it in memory for tests.

use std::fmt::Debug;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{GradebookError, Result};
use crate::record::{StudentRecord, Students};

/// Persistence for student records keyed by student id.
///
/// Implementors provide whole-store [`load`](Self::load) and
/// [`save`](Self::save); the per-record operations are built on top of them,
/// so each `set` is a full read-modify-write of the store.
pub trait RecordStore: Debug + Send {
    /// Loads every record. Unreadable data is treated as an empty store.
    fn load(&self) -> Students;

    /// Replaces every record.
    fn save(&mut self, students: &Students) -> Result<()>;

    /// Returns the record for `id`, if any.
    fn get(&self, id: &str) -> Option<StudentRecord> {
        self.load().remove(id)
    }

    /// Inserts or replaces the record for `id`.
    fn set(&mut self, id: &str, record: StudentRecord) -> Result<()> {
        let mut students = self.load();
        students.insert(id.to_string(), record);
        self.save(&students)
    }

    /// Returns every record.
    fn list_all(&self) -> Students {
        self.load()
    }

    /// Returns `true` if a record exists for `id`.
    fn exists(&self, id: &str) -> bool {
        self.load().contains_key(id)
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// A store backed by one JSON document of shape `{ "<id>": record }`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the file at `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `contents` next to the target and renames it into place.
    fn write_atomic(&self, contents: &[u8]) -> std::io::Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("students.json");
        let tmp = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));
        let written =
            write_synced(&tmp, contents).and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        if let Ok(dir) = std::fs::File::open(parent) {
            let _ = dir.sync_all();
        }
        Ok(())
    }
}

/// Creates `path` with `contents` and flushes it to disk.
fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> Students {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Data file missing, starting empty");
                return Students::new();
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Cannot read data file, treating as empty"
                );
                return Students::new();
            }
        };

        if raw.trim().is_empty() {
            return Students::new();
        }

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Corrupt data file, treating as empty");
            Students::new()
        })
    }

    fn save(&mut self, students: &Students) -> Result<()> {
        let json = serde_json::to_string_pretty(students)?;
        self.write_atomic(json.as_bytes())
            .map_err(|e| GradebookError::store_write(&self.path, e.to_string()))?;
        debug!(path = %self.path.display(), records = students.len(), "Data file written");
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// A store that keeps records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    students: Students,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `students`.
    #[must_use]
    pub const fn with_students(students: Students) -> Self {
        Self { students }
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Students {
        self.students.clone()
    }

    fn save(&mut self, students: &Students) -> Result<()> {
        self.students.clone_from(students);
        Ok(())
    }
}
