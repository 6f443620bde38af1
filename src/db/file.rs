use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use super::storage::{StorageError, StoragePort, StorageResult};

/// Stores every key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the storage root, creating it when missing.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| {
            StorageError::unavailable(format!("failed to create {}", dir.display()), err)
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::unavailable(
                format!("invalid storage key `{key}`"),
                io::Error::new(ErrorKind::InvalidInput, "key must be alphanumeric"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::unavailable(
                format!("failed to read {}", path.display()),
                err,
            )),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        // Write next to the target and rename so readers never see half a snapshot.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|err| {
            StorageError::unavailable(format!("failed to write {}", tmp.display()), err)
        })?;
        fs::rename(&tmp, &path).map_err(|err| {
            StorageError::unavailable(format!("failed to replace {}", path.display()), err)
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::unavailable(
                format!("failed to remove {}", path.display()),
                err,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("data")).unwrap();
        assert_eq!(storage.get("venues").unwrap(), None);
        storage.set("venues", r#"[{"id":"v1"}]"#).unwrap();

        let reopened = FileStorage::open(dir.path().join("data")).unwrap();
        assert_eq!(
            reopened.get("venues").unwrap().as_deref(),
            Some(r#"[{"id":"v1"}]"#)
        );
        assert!(reopened.dir().join("venues.json").exists());
        assert!(!reopened.dir().join("venues.json.tmp").exists());

        reopened.remove("venues").unwrap();
        reopened.remove("venues").unwrap();
        assert_eq!(reopened.get("venues").unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.set("../escape", "[]").is_err());
        assert!(storage.get("").is_err());
    }
}
