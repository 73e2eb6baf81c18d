use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::error::StoreError;
use crate::types::Households;

/// Where households live between operations. Callers serialise access; implementations only
/// need to make a single `save` atomic.
pub trait Store {
    fn load(&self) -> Result<Households, StoreError>;
    fn save(&self, households: &Households) -> Result<(), StoreError>;
}

/// All households in one JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Households, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no data file yet, starting empty");
            return Ok(Households::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        if raw.trim().is_empty() {
            return Ok(Households::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes a sibling temp file, syncs it and renames it over the data file, so a crash
    /// leaves either the old or the new document.
    fn save(&self, households: &Households) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(households).map_err(StoreError::Encode)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let tmp_path = self.path.with_extension("tmp");
        let written = File::create(&tmp_path)
            .and_then(|mut tmp| {
                tmp.write_all(&encoded)?;
                tmp.sync_all()
            })
            .and_then(|_| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            // report the write failure, not a failed cleanup
            let _ = fs::remove_file(&tmp_path);
            tracing::warn!(path = %tmp_path.display(), error = %e, "discarded partial write");
            return Err(self.io_err(e));
        }

        tracing::debug!(path = %self.path.display(), households = households.len(), "saved");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    households: Mutex<Households>,
}

impl MemoryStore {
    pub fn new(households: Households) -> Self {
        Self {
            households: Mutex::new(households),
        }
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Households, StoreError> {
        self.households
            .lock()
            .map(|h| h.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn save(&self, households: &Households) -> Result<(), StoreError> {
        let mut current = self.households.lock().map_err(|_| StoreError::Poisoned)?;
        *current = households.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use im::OrdMap;
    use tempfile::TempDir;

    use super::{JsonFileStore, MemoryStore, Store};
    use crate::error::StoreError;
    use crate::journal::{add_expense, create_household};
    use crate::types::{ExpenseDraft, Households};

    fn sample() -> Households {
        let (households, _) =
            create_household(&OrdMap::new(), "Roomies", &["Cara", "Alice", "Bob"]).unwrap();
        let (households, _) = add_expense(
            &households,
            "Roomies",
            &ExpenseDraft {
                payer: "Alice".into(),
                description: "pizza".into(),
                amount: "10".into(),
                participants: vec!["Alice".into(), "Bob".into(), "Cara".into()],
            },
        )
        .unwrap();
        households
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn saved_households_load_back_in_member_order() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("data.json"));
        let households = sample();

        store.save(&households).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, households);
        assert_eq!(
            loaded["Roomies"].members.names(),
            vec!["Cara".to_string(), "Alice".to_string(), "Bob".to_string()]
        );
        assert!(!dir.path().join("nested").join("data.tmp").exists());
    }

    #[test]
    fn failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "").unwrap();

        let err = JsonFileStore::new(&path).save(&sample()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!dir.path().join("data.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn corrupt_file_is_an_error_not_an_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let store = MemoryStore::default();
        assert!(store.load().unwrap().is_empty());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }
}
