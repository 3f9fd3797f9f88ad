//! Byte-level file persistence.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use folio_shared::{FolioError, Result};

/// Reads and writes whole files.
pub trait FileStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Local filesystem store.
///
/// Writes go to a hidden sibling temp file that is renamed over the target,
/// so a crash mid-write never leaves a truncated document behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FileStore for FsStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| FolioError::io(path, e))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| FolioError::io(&dir, e))?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FolioError::validation(format!("not a file path: {}", path.display())))?;
        let temp = dir.join(format!(".{filename}.tmp"));

        std::fs::write(&temp, bytes).map_err(|e| FolioError::io(&temp, e))?;
        std::fs::rename(&temp, path).map_err(|e| FolioError::io(path, e))?;

        debug!(path = %path.display(), size = bytes.len(), "wrote file");
        Ok(())
    }
}

/// In-memory store for exercising persistence paths without touching disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    read_only: RefCell<BTreeSet<PathBuf>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    pub fn with_file(self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.borrow_mut().insert(path.into(), bytes.into());
        self
    }

    /// Make every later write to `path` fail with permission denied.
    pub fn deny_writes(&self, path: impl Into<PathBuf>) {
        self.read_only.borrow_mut().insert(path.into());
    }

    /// Current contents of `path`.
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    pub fn contents_str(&self, path: &Path) -> Option<String> {
        self.contents(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.contents(path)
            .ok_or_else(|| FolioError::io(path, ErrorKind::NotFound.into()))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if self.read_only.borrow().contains(path) {
            return Err(FolioError::io(path, ErrorKind::PermissionDenied.into()));
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

/// True when `err` is a read of a file that does not exist.
pub fn is_not_found(err: &FolioError) -> bool {
    matches!(err, FolioError::Io { source, .. } if source.kind() == ErrorKind::NotFound)
}
