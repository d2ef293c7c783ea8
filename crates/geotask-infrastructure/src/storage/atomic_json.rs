//! Atomic JSON file operations.
//!
//! Provides safe read-modify-write access to a single JSON blob shared by
//! several processes.

use geotask_core::error::GeotaskError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Errors that can occur during atomic JSON operations.
#[derive(Debug)]
pub enum AtomicJsonError {
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON serialization/deserialization error.
    JsonError(serde_json::Error),
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for AtomicJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicJsonError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicJsonError::JsonError(e) => write!(f, "JSON error: {}", e),
            AtomicJsonError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicJsonError {}

impl From<std::io::Error> for AtomicJsonError {
    fn from(e: std::io::Error) -> Self {
        AtomicJsonError::IoError(e)
    }
}

impl From<serde_json::Error> for AtomicJsonError {
    fn from(e: serde_json::Error) -> Self {
        AtomicJsonError::JsonError(e)
    }
}

impl From<AtomicJsonError> for GeotaskError {
    fn from(e: AtomicJsonError) -> Self {
        match e {
            AtomicJsonError::IoError(e) => e.into(),
            AtomicJsonError::JsonError(e) => e.into(),
            AtomicJsonError::LockError(message) => GeotaskError::data_access(message),
        }
    }
}

/// A handle to a JSON file that is always replaced atomically.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: An exclusive lock file serializes `update` calls
/// - **Durability**: Explicit fsync before rename
///
/// A file whose content does not parse is moved aside to `<name>.corrupt`
/// and then treated as missing.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist, is empty, or was corrupt
    /// - `Err`: Failed to read the file
    pub fn load(&self) -> Result<Option<T>, AtomicJsonError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&content) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                let moved_to = self.quarantine()?;
                tracing::warn!(
                    "Malformed JSON in {} ({}), moved to {} and treating as empty",
                    self.path.display(),
                    e,
                    moved_to.display()
                );
                Ok(None)
            }
        }
    }

    /// Saves data to the file atomically.
    pub fn save(&self, data: &T) -> Result<(), AtomicJsonError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json_string = serde_json::to_string_pretty(data)?;

        let tmp_path = self.sibling_path("tmp")?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Performs a transactional update with file locking.
    ///
    /// The update function receives the current data (or `default_value` if
    /// there is none) and returns a value that is handed back to the caller
    /// after the data has been written.
    pub fn update<F, R>(&self, default_value: T, f: F) -> Result<R, AtomicJsonError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        let outcome = f(&mut data);
        self.save(&data)?;

        Ok(outcome)
    }

    /// Moves the current file aside so it is no longer read.
    fn quarantine(&self) -> Result<PathBuf, AtomicJsonError> {
        let target = self.sibling_path("corrupt")?;
        fs::rename(&self.path, &target)?;
        Ok(target)
    }

    /// Hidden sibling path (`.<name>.<suffix>`) in the same directory.
    fn sibling_path(&self, suffix: &str) -> Result<PathBuf, AtomicJsonError> {
        let parent = self.path.parent().ok_or_else(|| {
            AtomicJsonError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicJsonError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        Ok(parent.join(format!(".{}.{}", file_name.to_string_lossy(), suffix)))
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicJsonError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive()
            .map_err(|e| AtomicJsonError::LockError(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Vec<u32>>::new(temp_dir.path().join("data.json"));

        file.save(&vec![1, 2, 3]).unwrap();

        assert_eq!(file.load().unwrap(), Some(vec![1, 2, 3]));
        assert!(!temp_dir.path().join(".data.json.tmp").exists());
    }

    #[test]
    fn test_load_nonexistent_and_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        let file = AtomicJsonFile::<Vec<u32>>::new(path.clone());

        assert!(file.load().unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_returns_outcome() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Vec<u32>>::new(temp_dir.path().join("nested/data.json"));

        let len = file
            .update(Vec::new(), |data| {
                data.push(10);
                data.len()
            })
            .unwrap();
        assert_eq!(len, 1);

        file.update(Vec::new(), |data| data.push(5)).unwrap();
        assert_eq!(file.load().unwrap(), Some(vec![10, 5]));
    }

    #[test]
    fn test_corrupt_file_is_quarantined() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "[1, 2,").unwrap();
        let file = AtomicJsonFile::<Vec<u32>>::new(path.clone());

        assert!(file.load().unwrap().is_none());
        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(".data.json.corrupt")).unwrap(),
            "[1, 2,"
        );

        file.update(Vec::new(), |data| data.push(7)).unwrap();
        assert_eq!(file.load().unwrap(), Some(vec![7]));
    }

    #[test]
    fn test_lock_released_on_drop() {
        use fs2::FileExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        let guard = FileLock::acquire(&path).unwrap();

        let other = File::open(path.with_extension("lock")).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(guard);
        assert!(other.try_lock_exclusive().is_ok());
        other.unlock().unwrap();
    }
}
