//! Cache-aware neighbourhood resolution.
//!
//! Resolution order: session memory, then the durable cache, then the
//! external geocoder. Only a miss on all three reaches the network, and a
//! successful lookup is persisted so later sessions skip it too.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rand::Rng as _;
use thiserror::Error;
use wfps_map_incident_models::{NeighbourhoodArea, ResolvedPoint};

use crate::{GeocodeError, LocationCache, NeighbourhoodGeocoder};

/// Errors from resolving a neighbourhood name to a point.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The external geocoder returned no usable result for the name.
    ///
    /// Not cached, so a later pass may retry the name.
    #[error("No geocoding result for neighbourhood {neighbourhood:?}")]
    NoMatch {
        /// The neighbourhood name that failed to resolve.
        neighbourhood: String,
    },

    /// The external geocoding call failed.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

/// Resolves neighbourhood names to map points.
///
/// Owns its geocoder and cache handles for the lifetime of the pipeline;
/// the session map shields the durable cache from repeated reads within a
/// run and keeps resolution working when cache writes fail.
///
/// `resolve` is deliberately not idempotent: each call samples a fresh
/// point within the (stable, cached) area. Callers that need a stable
/// point per incident must keep the point they were given; the pipeline
/// fixes each feature's point once at build time.
pub struct NeighbourhoodResolver {
    geocoder: Box<dyn NeighbourhoodGeocoder>,
    cache: Box<dyn LocationCache>,
    session: Mutex<BTreeMap<String, NeighbourhoodArea>>,
}

impl NeighbourhoodResolver {
    /// Creates a resolver over the given geocoder and cache.
    #[must_use]
    pub fn new(geocoder: Box<dyn NeighbourhoodGeocoder>, cache: Box<dyn LocationCache>) -> Self {
        Self {
            geocoder,
            cache,
            session: Mutex::new(BTreeMap::new()),
        }
    }

    /// Resolves a neighbourhood name to a point within its area.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoMatch`] if the geocoder has no result for
    /// the name, or [`ResolveError::Geocode`] if the external call fails.
    pub async fn resolve(&self, neighbourhood: &str) -> Result<ResolvedPoint, ResolveError> {
        let area = self.area_for(neighbourhood).await?;
        Ok(sample_point(&area))
    }

    /// Returns the bounding area for a name, fetching and caching it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the name cannot be resolved.
    pub async fn area_for(&self, neighbourhood: &str) -> Result<NeighbourhoodArea, ResolveError> {
        if let Some(area) = self.session_get(neighbourhood) {
            return Ok(area);
        }

        match self.cache.get(neighbourhood) {
            Ok(Some(area)) => {
                self.session_set(&area);
                return Ok(area);
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Location cache read failed for {neighbourhood:?}: {e}");
            }
        }

        let area = self
            .geocoder
            .lookup(neighbourhood)
            .await?
            .ok_or_else(|| ResolveError::NoMatch {
                neighbourhood: neighbourhood.to_string(),
            })?;

        // A failed write degrades to session-only caching for this run;
        // the area still serves the current batch from memory.
        if let Err(e) = self.cache.set(&area) {
            log::warn!("Location cache write failed for {neighbourhood:?}: {e}");
        }
        self.session_set(&area);

        Ok(area)
    }

    fn session_get(&self, neighbourhood: &str) -> Option<NeighbourhoodArea> {
        self.session
            .lock()
            .ok()
            .and_then(|session| session.get(neighbourhood).cloned())
    }

    fn session_set(&self, area: &NeighbourhoodArea) {
        if let Ok(mut session) = self.session.lock() {
            session.insert(area.neighbourhood.clone(), area.clone());
        }
    }
}

/// Samples a uniformly random point within an area.
///
/// Spreads multiple incidents in the same neighbourhood across its extent
/// instead of collapsing them onto one marker. Zero-area boxes (centre
/// fallbacks) always yield their single point.
#[must_use]
pub fn sample_point(area: &NeighbourhoodArea) -> ResolvedPoint {
    let mut rng = rand::rng();
    ResolvedPoint {
        lon: rng.random_range(area.min_lon..=area.max_lon),
        lat: rng.random_range(area.min_lat..=area.max_lat),
    }
}
