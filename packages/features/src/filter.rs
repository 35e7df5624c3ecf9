//! Filtered views over the canonical collection.
//!
//! Filtering never mutates the canonical collection: every derivation
//! returns a fresh collection, so downstream consumers hold no mutation
//! rights into canonical state. Re-derive whenever the canonical
//! collection or the criterion changes.

use wfps_map_incident_models::FilterCriterion;

use crate::FeatureCollection;

/// Derives the subset of `canonical` matching the criterion.
#[must_use]
pub fn derive(canonical: &FeatureCollection, criterion: &FilterCriterion) -> FeatureCollection {
    FeatureCollection {
        features: canonical
            .features
            .iter()
            .filter(|f| criterion.matches(&f.incident_type, f.vehicle_incident))
            .cloned()
            .collect(),
    }
}
