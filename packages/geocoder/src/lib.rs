#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighbourhood geocoding for WFPS incidents.
//!
//! The WFPS feed reports only a neighbourhood name per incident, so
//! placing an incident on the map means resolving the name to a bounding
//! area through an external geocoder and then sampling a point inside it.
//! The external lookup is rate-limited and slow; resolved areas are cached
//! through the [`LocationCache`] seam and reused across sessions.
//!
//! Point sampling is deliberately imprecise: incidents in the same
//! neighbourhood each get an independently sampled point so their markers
//! spread across the area instead of stacking.

pub mod cache;
pub mod mapbox;
pub mod resolver;

use async_trait::async_trait;
use thiserror::Error;
use wfps_map_incident_models::NeighbourhoodArea;

pub use cache::{CacheError, LocationCache, MemoryLocationCache};
pub use resolver::{NeighbourhoodResolver, ResolveError};

/// Errors from external geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The access token environment variable is not set.
    #[error("MAPBOX_ACCESS_TOKEN is not set")]
    MissingToken,
}

/// An external capability that resolves a neighbourhood name to its
/// bounding area.
///
/// Returns `Ok(None)` when the geocoder has no usable result for the name;
/// the caller decides how to handle the miss (the pipeline skips the
/// record and retries it on a later pass).
#[async_trait]
pub trait NeighbourhoodGeocoder: Send + Sync {
    /// Looks up the bounding area for a neighbourhood name.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn lookup(&self, neighbourhood: &str)
    -> Result<Option<NeighbourhoodArea>, GeocodeError>;
}
