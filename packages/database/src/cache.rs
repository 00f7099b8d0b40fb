//! Cache stores for normalized parking areas.
//!
//! [`JsonFileCache`] persists to a single JSON file. Unless writing is
//! enabled with [`JsonFileCache::with_writes`], [`CacheStore::write`] is a
//! no-op that always succeeds. [`MemoryCache`] keeps everything in process.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use parking_stats_parking_models::ParkingArea;

use crate::CacheError;

/// Stores the pipeline's normalized output between runs.
pub trait CacheStore: Send + Sync {
    /// Whether the store currently holds data.
    fn has(&self) -> bool;

    /// Reads the stored entities.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the stored data cannot be read or decoded.
    fn read(&self) -> Result<Vec<ParkingArea>, CacheError>;

    /// Stores `entities`, replacing anything stored before.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the entities cannot be encoded or written.
    fn write(&self, entities: &[ParkingArea]) -> Result<(), CacheError>;
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
    write_enabled: bool,
}

impl JsonFileCache {
    /// Creates a read-only cache at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_enabled: false,
        }
    }

    /// Creates a read-only cache at the default (or env-configured) path.
    #[must_use]
    pub fn open_default() -> Self {
        Self::new(crate::paths::parking_cache_path_from_env())
    }

    /// Enables or disables writing.
    #[must_use]
    pub const fn with_writes(mut self, enabled: bool) -> Self {
        self.write_enabled = enabled;
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for JsonFileCache {
    fn has(&self) -> bool {
        std::fs::metadata(&self.path).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
    }

    fn read(&self) -> Result<Vec<ParkingArea>, CacheError> {
        let content = std::fs::read_to_string(&self.path)?;
        let entities: Vec<ParkingArea> = serde_json::from_str(&content)?;
        log::info!(
            "[cache] Loaded {} parking areas from {}",
            entities.len(),
            self.path.display()
        );
        Ok(entities)
    }

    fn write(&self, entities: &[ParkingArea]) -> Result<(), CacheError> {
        if !self.write_enabled {
            log::debug!("[cache] Writes disabled, not storing {} areas", entities.len());
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            crate::paths::ensure_dir(parent)?;
        }
        let content = serde_json::to_string(entities)?;
        std::fs::write(&self.path, content)?;
        log::info!(
            "[cache] Saved {} parking areas to {}",
            entities.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// An in-process store.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entities: Mutex<Option<Vec<ParkingArea>>>,
}

impl MemoryCache {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `entities`.
    #[must_use]
    pub const fn with_entities(entities: Vec<ParkingArea>) -> Self {
        Self {
            entities: Mutex::new(Some(entities)),
        }
    }
}

impl CacheStore for MemoryCache {
    fn has(&self) -> bool {
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn read(&self) -> Result<Vec<ParkingArea>, CacheError> {
        Ok(self
            .entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default())
    }

    fn write(&self, entities: &[ParkingArea]) -> Result<(), CacheError> {
        *self
            .entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(entities.to_vec());
        Ok(())
    }
}
