use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use super::PersistenceError;

/// The independent documents the app persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Boards,
    Gamification,
    Pomodoro,
    Users,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::Boards,
        StorageKey::Gamification,
        StorageKey::Pomodoro,
        StorageKey::Users,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Boards => "boards",
            StorageKey::Gamification => "gamification",
            StorageKey::Pomodoro => "pomodoro",
            StorageKey::Users => "users",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value persistence for serialized documents.
///
/// `read` returns `Ok(None)` when nothing has been stored under the key yet.
pub trait Storage {
    fn read(&self, key: StorageKey) -> Result<Option<String>, PersistenceError>;
    fn write(&self, key: StorageKey, contents: &str) -> Result<(), PersistenceError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn read(&self, key: StorageKey) -> Result<Option<String>, PersistenceError> {
        (**self).read(key)
    }

    fn write(&self, key: StorageKey, contents: &str) -> Result<(), PersistenceError> {
        (**self).write(key, contents)
    }
}

/// Deserialize the document under `key`, if there is one.
pub fn read_json<T: DeserializeOwned>(storage: &impl Storage, key: StorageKey) -> Result<Option<T>, PersistenceError> {
    let Some(text) = storage.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| PersistenceError::Parse { key, source })
}

/// Serialize `value` as pretty JSON and store it under `key`.
pub fn write_json<T: Serialize + ?Sized>(storage: &impl Storage, key: StorageKey, value: &T) -> Result<(), PersistenceError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Serialize { key, source })?;
    storage.write(key, &text)
}

// ---------------------------------------------------------------------------
// File storage
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: StorageKey) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Read { path, source }),
        }
    }

    fn write(&self, key: StorageKey, contents: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Write {
            path: self.dir.clone(),
            source,
        })?;
        atomic_write(&path, contents.as_bytes()).map_err(|source| PersistenceError::Write { path, source })
    }
}

/// Write `content` to a temp file in the same directory, then rename it over
/// `path`. Readers never see a half-written file.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// In-process storage. Writes can be switched off to simulate an
/// unreachable backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<StorageKey, String>>,
    unavailable: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, e.g. with a document saved by another version.
    pub fn with_entry(self, key: StorageKey, contents: impl Into<String>) -> Self {
        self.entries.borrow_mut().insert(key, contents.into());
        self
    }

    /// Make every subsequent write fail with [`PersistenceError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    pub fn get(&self, key: StorageKey) -> Option<String> {
        self.entries.borrow().get(&key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: StorageKey) -> Result<Option<String>, PersistenceError> {
        Ok(self.get(key))
    }

    fn write(&self, key: StorageKey, contents: &str) -> Result<(), PersistenceError> {
        if self.unavailable.get() {
            return Err(PersistenceError::Unavailable(format!("cannot write {key}")));
        }
        self.entries.borrow_mut().insert(key, contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.read(StorageKey::Boards).unwrap().is_none());
    }

    #[test]
    fn file_storage_round_trip_creates_dir() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("data"));
        storage.write(StorageKey::Pomodoro, "{\"workMinutes\":30}").unwrap();
        assert!(storage.path_for(StorageKey::Pomodoro).ends_with("pomodoro.json"));
        assert_eq!(
            storage.read(StorageKey::Pomodoro).unwrap().as_deref(),
            Some("{\"workMinutes\":30}")
        );
    }

    #[test]
    fn file_storage_overwrites_atomically() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write(StorageKey::Users, "[1]").unwrap();
        storage.write(StorageKey::Users, "[2]").unwrap();
        assert_eq!(storage.read(StorageKey::Users).unwrap().as_deref(), Some("[2]"));
        // no temp files left behind
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn memory_storage_can_refuse_writes() {
        let storage = MemoryStorage::new();
        storage.write(StorageKey::Boards, "[]").unwrap();
        storage.set_unavailable(true);
        let err = storage.write(StorageKey::Boards, "[1]").unwrap_err();
        assert!(matches!(err, PersistenceError::Unavailable(_)));
        assert_eq!(storage.get(StorageKey::Boards).as_deref(), Some("[]"));
    }

    #[test]
    fn json_helpers_report_parse_errors_with_key() {
        let storage = MemoryStorage::new().with_entry(StorageKey::Users, "not json");
        let err = read_json::<Vec<String>>(&storage, StorageKey::Users).unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { key: StorageKey::Users, .. }));
        assert!(read_json::<Vec<String>>(&storage, StorageKey::Boards).unwrap().is_none());

        write_json(&storage, StorageKey::Boards, &vec!["a"]).unwrap();
        let back: Vec<String> = read_json(&storage, StorageKey::Boards).unwrap().unwrap();
        assert_eq!(back, vec!["a"]);
    }
}
