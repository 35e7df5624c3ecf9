//! The canonical append-only feature store.
//!
//! `append` is the pipeline's single commit point, called once per
//! completed batch so snapshot readers never observe a half-applied
//! batch. There is no removal path: the store only grows.

use crate::{Feature, FeatureCollection};

/// Append-only collection of all features built so far.
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: Vec<Feature>,
}

impl FeatureStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed batch of features.
    pub fn append(&mut self, features: Vec<Feature>) {
        self.features.extend(features);
    }

    /// Returns a read-only snapshot of the canonical collection.
    ///
    /// The snapshot is a fresh copy; mutating it cannot affect the store.
    #[must_use]
    pub fn snapshot(&self) -> FeatureCollection {
        FeatureCollection {
            features: self.features.clone(),
        }
    }

    /// Number of features in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
