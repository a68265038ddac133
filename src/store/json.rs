use std::fs;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use tempfile::NamedTempFile;

use super::StoreError;

/// JSON document persisted to a single file.
///
/// Reads are forgiving: a missing, unreadable or malformed file yields
/// `T::default()`. Writes are strict: every failure is returned to the caller.
/// A write goes to a temporary sibling file which is then renamed over the
/// target, so readers only ever see a complete document.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    _state: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _state: PhantomData,
        }
    }

    pub fn load(&self) -> T {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Store {} not found, starting fresh", self.path.display());
                return T::default();
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read store {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                return T::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    "Corrupt store {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                T::default()
            }
        }
    }

    pub fn save(&self, state: &T) -> Result<(), StoreError> {
        let body = serde_json::to_vec(state).map_err(StoreError::Serialize)?;

        // same directory as the target, otherwise the rename may cross filesystems
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        tmp.write_all(&body).map_err(|e| self.write_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.write_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.write_error(e.error))?;

        Ok(())
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        #[serde(default)]
        value: u64,
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(JsonStore::<Doc>::new(&path).load(), Doc::default());
        assert!(!path.exists());
    }

    #[test]
    fn saved_state_survives_a_fresh_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        JsonStore::new(&path).save(&Doc { value: 42 }).unwrap();

        let reopened = JsonStore::<Doc>::new(&path);
        assert_eq!(reopened.load(), Doc { value: 42 });
    }

    #[test]
    fn garbage_loads_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, b"\x00\xffnot json{{").unwrap();

        assert_eq!(JsonStore::<Doc>::new(&path).load(), Doc::default());
    }

    #[test]
    fn truncated_document_loads_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, br#"{"value": 1"#).unwrap();

        assert_eq!(JsonStore::<Doc>::new(&path).load(), Doc::default());
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("doc.json"));
        store.save(&Doc { value: 1 }).unwrap();
        store.save(&Doc { value: 2 }).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("doc.json")]);
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("missing-dir").join("doc.json"));

        let err = store.save(&Doc { value: 1 }).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }
}
