#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Map features derived from WFPS incident records.
//!
//! A [`Feature`] is built exactly once per processed incident and is
//! immutable afterwards. The [`store::FeatureStore`] holds the canonical
//! append-only collection; [`filter::derive`] produces fresh filtered
//! subsets; [`export`] renders either as a standard `GeoJSON`
//! `FeatureCollection` for the map surface.

pub mod builder;
pub mod export;
pub mod filter;
pub mod store;

use serde::{Deserialize, Serialize};
use wfps_map_incident_models::{IncidentIcon, ResolvedPoint};

pub use store::FeatureStore;

/// A map-renderable point derived from one incident record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Incident number of the source record.
    pub id: String,
    /// Position sampled once at build time within the neighbourhood area,
    /// never resampled.
    pub point: ResolvedPoint,
    /// Incident type label, kept verbatim for filtering.
    pub incident_type: String,
    /// Whether a motor vehicle was involved.
    pub vehicle_incident: bool,
    /// Human-readable popup text with type, neighbourhood, units, and
    /// timestamps.
    pub description: String,
    /// Map icon classification.
    pub icon: IncidentIcon,
}

/// An ordered collection of features: either the canonical "all processed
/// so far" view or a filtered subset of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Features in processing order.
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Number of features in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
