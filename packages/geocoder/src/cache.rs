//! Location cache seam.
//!
//! The resolver only needs `has`/`get`/`set` over neighbourhood areas; the
//! storage medium is the implementor's choice. The durable implementation
//! lives in `wfps_map_database` (DuckDB); [`MemoryLocationCache`] backs
//! tests and the session-only degraded mode.

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;
use wfps_map_incident_models::NeighbourhoodArea;

/// Error from a location cache read or write.
///
/// Cache failures are non-fatal to resolution: the resolver logs them and
/// degrades to session-only caching.
#[derive(Debug, Error)]
#[error("Location cache error: {message}")]
pub struct CacheError {
    /// Description of the underlying storage failure.
    pub message: String,
}

/// Persistent mapping from neighbourhood name to its resolved bounding
/// area.
///
/// No eviction: the municipal neighbourhood list is small and fixed, so
/// the cache grows to a stable size and then serves purely as a read
/// cache. `set` must durably persist the mapping before returning.
pub trait LocationCache: Send + Sync {
    /// Returns the cached area for a neighbourhood name, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the underlying storage read fails.
    fn get(&self, neighbourhood: &str) -> Result<Option<NeighbourhoodArea>, CacheError>;

    /// Durably stores a resolved area.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the underlying storage write fails.
    fn set(&self, area: &NeighbourhoodArea) -> Result<(), CacheError>;

    /// Whether an area is cached for this neighbourhood name.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the underlying storage read fails.
    fn has(&self, neighbourhood: &str) -> Result<bool, CacheError> {
        Ok(self.get(neighbourhood)?.is_some())
    }
}

impl<C: LocationCache + ?Sized> LocationCache for std::sync::Arc<C> {
    fn get(&self, neighbourhood: &str) -> Result<Option<NeighbourhoodArea>, CacheError> {
        (**self).get(neighbourhood)
    }

    fn set(&self, area: &NeighbourhoodArea) -> Result<(), CacheError> {
        (**self).set(area)
    }
}

/// In-memory location cache for tests and session-only operation.
#[derive(Debug, Default)]
pub struct MemoryLocationCache {
    areas: Mutex<BTreeMap<String, NeighbourhoodArea>>,
}

impl MemoryLocationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationCache for MemoryLocationCache {
    fn get(&self, neighbourhood: &str) -> Result<Option<NeighbourhoodArea>, CacheError> {
        let areas = self.areas.lock().map_err(|_| CacheError {
            message: "cache mutex poisoned".to_string(),
        })?;
        Ok(areas.get(neighbourhood).cloned())
    }

    fn set(&self, area: &NeighbourhoodArea) -> Result<(), CacheError> {
        let mut areas = self.areas.lock().map_err(|_| CacheError {
            message: "cache mutex poisoned".to_string(),
        })?;
        areas.insert(area.neighbourhood.clone(), area.clone());
        Ok(())
    }
}
