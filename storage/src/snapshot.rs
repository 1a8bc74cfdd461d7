//! Named snapshots, written as pretty JSON for reading and bincode for loading

use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    /// Open (and create if needed) a snapshot directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
        }
        Ok(Self { data_dir })
    }

    fn paths(&self, name: &str) -> (PathBuf, PathBuf) {
        (
            self.data_dir.join(format!("{}.bin", name)),
            self.data_dir.join(format!("{}.json", name)),
        )
    }

    pub fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let (bin_path, json_path) = self.paths(name);

        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&json_path, json)?;

        let bin =
            bincode::serialize(data).map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&bin_path, bin)?;

        log::debug!("snapshot {} written to {}", name, self.data_dir.display());
        Ok(())
    }

    /// Load a snapshot, preferring bincode and falling back to JSON
    pub fn load<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let (bin_path, json_path) = self.paths(name);

        if bin_path.exists() {
            let data = fs::read(&bin_path)?;
            match bincode::deserialize(&data) {
                Ok(value) => return Ok(value),
                Err(e) => log::warn!("{} unreadable ({}), trying JSON", bin_path.display(), e),
            }
        }

        if json_path.exists() {
            let data = fs::read_to_string(&json_path)?;
            return serde_json::from_str(&data)
                .map_err(|e| StorageError::SerializationError(e.to_string()));
        }

        Err(StorageError::SnapshotNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        let (bin_path, json_path) = self.paths(name);
        bin_path.exists() || json_path.exists()
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let (bin_path, json_path) = self.paths(name);
        for path in [bin_path, json_path] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Sample {
        price: u128,
        name: String,
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("nested")).unwrap();

        let data = Sample {
            price: 10_000_000_000_000,
            name: "round".to_string(),
        };
        assert!(!store.has("sample"));
        store.save("sample", &data).unwrap();
        assert!(store.has("sample"));

        let loaded: Sample = store.load("sample").unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_falls_back_to_json() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        let data = Sample {
            price: 1,
            name: "x".to_string(),
        };
        store.save("sample", &data).unwrap();
        fs::write(dir.path().join("sample.bin"), [0xffu8]).unwrap();

        let loaded: Sample = store.load("sample").unwrap();
        assert_eq!(loaded, data);

        store.delete("sample").unwrap();
        assert!(matches!(
            store.load::<Sample>("sample"),
            Err(StorageError::SnapshotNotFound(_))
        ));
    }
}
