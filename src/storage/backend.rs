//! Key-value storage backends.
//!
//! The engine only needs `get`/`set`/`remove` on string keys, the same
//! surface as browser local storage. `MemoryStorage` backs tests and
//! embedders that persist elsewhere; `FileStorage` keeps one file per key
//! in a directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::trace;

/// Durable key-value store.
pub trait Storage {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &[u8]) -> io::Result<()>;

    /// Delete a key. Deleting an absent key is not an error.
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> io::Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: FxHashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Stored value as UTF-8, for inspecting JSON records.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Keys currently stored, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key under a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so
/// a crash mid-write leaves the previous value intact.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name(key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> io::Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.tmp", file_name(key)));

        let mut file = fs::File::create(&tmp)?;
        file.write_all(value)?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;

        trace!(key, bytes = value.len(), path = %path.display(), "wrote record");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Map a key to a safe file name.
fn file_name(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.get("a").unwrap(), None);

        storage.set("a", b"one").unwrap();
        storage.set("b", b"two").unwrap();
        storage.set("a", b"three").unwrap();

        assert_eq!(storage.get("a").unwrap().as_deref(), Some(&b"three"[..]));
        assert_eq!(storage.get_str("b"), Some("two"));
        assert_eq!(storage.keys(), vec!["a", "b"]);

        storage.remove("a").unwrap();
        storage.remove("missing").unwrap();
        assert!(!storage.contains("a"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_storage_through_mut_ref() {
        fn write<S: Storage>(mut storage: S) {
            storage.set("k", b"v").unwrap();
        }

        let mut storage = MemoryStorage::new();
        write(&mut storage);
        assert!(storage.contains("k"));
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path().join("saves")).unwrap();

        assert_eq!(storage.get("card-state").unwrap(), None);

        storage.set("card-state", b"{}").unwrap();
        assert_eq!(storage.get("card-state").unwrap().as_deref(), Some(&b"{}"[..]));
        assert!(storage.path_for("card-state").exists());

        storage.set("card-state", b"[]").unwrap();
        assert_eq!(storage.get("card-state").unwrap().as_deref(), Some(&b"[]"[..]));

        storage.remove("card-state").unwrap();
        storage.remove("card-state").unwrap();
        assert_eq!(storage.get("card-state").unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::open(dir.path()).unwrap().set("player-state", b"x").unwrap();

        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(reopened.get("player-state").unwrap().as_deref(), Some(&b"x"[..]));
    }

    #[test]
    fn test_file_names_are_sanitized() {
        assert_eq!(file_name("game-session-state"), "game-session-state");
        assert_eq!(file_name("profile:a/../b"), "profile_a_.._b");
    }
}
