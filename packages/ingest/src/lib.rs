#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incremental record-to-feature ingestion pipeline.
//!
//! Each pass takes the current full record list, diffs it against the set
//! of incident numbers already processed, and converts exactly the new
//! records into map features: resolve the neighbourhood, build the
//! feature, and commit the completed batch to the canonical store in one
//! append.
//!
//! Diffing is by identifier membership, not list position, so the
//! pipeline is insensitive to the source reordering or inserting records
//! ahead of the previously seen suffix.

use std::collections::BTreeSet;

use wfps_map_features::{FeatureCollection, FeatureStore, builder, filter};
use wfps_map_geocoder::NeighbourhoodResolver;
use wfps_map_incident_models::{FilterCriterion, IncidentRecord};

/// One record the pipeline could not convert this pass.
///
/// Failed records are not marked processed, so the next pass retries
/// them.
#[derive(Debug, Clone)]
pub struct RecordFailure {
    /// Incident number of the failed record.
    pub incident_number: String,
    /// Neighbourhood that failed to resolve.
    pub neighbourhood: String,
    /// What went wrong.
    pub message: String,
}

/// The result of one ingestion pass.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Number of features built and committed this pass.
    pub built: usize,
    /// Records skipped this pass, surfaced for reporting.
    pub failures: Vec<RecordFailure>,
}

/// Drives records through resolution and feature building.
///
/// Owns all pipeline state (resolver, canonical store, processed-id set)
/// for its lifetime; construct once per process and feed it each newly
/// fetched record list.
pub struct IngestPipeline {
    resolver: NeighbourhoodResolver,
    store: FeatureStore,
    processed: BTreeSet<String>,
}

impl IngestPipeline {
    /// Creates a pipeline with an empty store over the given resolver.
    #[must_use]
    pub fn new(resolver: NeighbourhoodResolver) -> Self {
        Self {
            resolver,
            store: FeatureStore::new(),
            processed: BTreeSet::new(),
        }
    }

    /// Ingests the current record list, converting only records whose
    /// incident number has not been processed yet.
    ///
    /// Records are processed strictly in document order, one at a time, so
    /// no two lookups for the same uncached neighbourhood race to the
    /// external service. A resolution failure skips that record and
    /// continues with the rest; the completed batch is committed to the
    /// store in a single append.
    pub async fn ingest(&mut self, records: &[IncidentRecord]) -> BatchOutcome {
        let mut built = Vec::new();
        let mut failures = Vec::new();

        for record in records {
            if self.processed.contains(&record.incident_number) {
                continue;
            }

            match self.resolver.resolve(&record.neighbourhood).await {
                Ok(point) => {
                    built.push(builder::build(record, point));
                    self.processed.insert(record.incident_number.clone());
                }
                Err(e) => {
                    log::warn!(
                        "Skipping incident {}: failed to resolve {:?}: {e}",
                        record.incident_number,
                        record.neighbourhood
                    );
                    failures.push(RecordFailure {
                        incident_number: record.incident_number.clone(),
                        neighbourhood: record.neighbourhood.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let outcome = BatchOutcome {
            built: built.len(),
            failures,
        };
        // Single commit point: snapshot readers never see a partial batch.
        self.store.append(built);
        outcome
    }

    /// Returns a snapshot of the canonical collection.
    #[must_use]
    pub fn snapshot(&self) -> FeatureCollection {
        self.store.snapshot()
    }

    /// Derives a fresh filtered view of the canonical collection.
    #[must_use]
    pub fn filtered(&self, criterion: &FilterCriterion) -> FeatureCollection {
        filter::derive(&self.store.snapshot(), criterion)
    }

    /// Number of records converted to features so far.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{TimeZone as _, Utc};
    use wfps_map_geocoder::{
        GeocodeError, MemoryLocationCache, NeighbourhoodGeocoder, NeighbourhoodResolver,
    };
    use wfps_map_incident_models::{IncidentIcon, NeighbourhoodArea};

    use super::*;

    /// Stub geocoder with a fixed name->area table and per-name call
    /// counts.
    type CallCounts = Arc<Mutex<BTreeMap<String, usize>>>;

    #[derive(Default)]
    struct StubGeocoder {
        areas: BTreeMap<String, NeighbourhoodArea>,
        calls: CallCounts,
    }

    impl StubGeocoder {
        fn with_area(mut self, area: NeighbourhoodArea) -> Self {
            self.areas.insert(area.neighbourhood.clone(), area);
            self
        }

        /// Shared handle to the per-name lookup counts, usable after the
        /// resolver takes ownership of the stub.
        fn call_counts(&self) -> CallCounts {
            self.calls.clone()
        }
    }

    fn calls_for(calls: &CallCounts, neighbourhood: &str) -> usize {
        *calls.lock().unwrap().get(neighbourhood).unwrap_or(&0)
    }

    #[async_trait]
    impl NeighbourhoodGeocoder for StubGeocoder {
        async fn lookup(
            &self,
            neighbourhood: &str,
        ) -> Result<Option<NeighbourhoodArea>, GeocodeError> {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(neighbourhood.to_string())
                .or_insert(0) += 1;
            Ok(self.areas.get(neighbourhood).cloned())
        }
    }

    fn downtown() -> NeighbourhoodArea {
        NeighbourhoodArea {
            neighbourhood: "Downtown".to_string(),
            min_lon: -97.15,
            min_lat: 49.89,
            max_lon: -97.13,
            max_lat: 49.91,
        }
    }

    fn record(id: &str, neighbourhood: &str, incident_type: &str, vehicle: bool) -> IncidentRecord {
        IncidentRecord {
            incident_number: id.to_string(),
            neighbourhood: neighbourhood.to_string(),
            incident_type: incident_type.to_string(),
            call_time: Utc.with_ymd_and_hms(2024, 1, 4, 8, 0, 0).unwrap(),
            closed_time: None,
            units: None,
            motor_vehicle_incident: vehicle,
        }
    }

    fn pipeline_with(geocoder: StubGeocoder) -> IngestPipeline {
        IngestPipeline::new(NeighbourhoodResolver::new(
            Box::new(geocoder),
            Box::new(MemoryLocationCache::new()),
        ))
    }

    #[tokio::test]
    async fn end_to_end_single_record() {
        let mut pipeline = pipeline_with(StubGeocoder::default().with_area(downtown()));

        let outcome = pipeline
            .ingest(&[record("1", "Downtown", "Medical Response", false)])
            .await;

        assert_eq!(outcome.built, 1);
        assert!(outcome.failures.is_empty());

        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.len(), 1);

        let feature = &snapshot.features[0];
        assert_eq!(feature.id, "1");
        assert_eq!(feature.icon, IncidentIcon::MedicalResponse);
        assert_eq!(feature.icon.key().as_deref(), Some("medical_response"));
        assert!(downtown().contains(&feature.point));
        assert!(feature.description.contains("Medical Response"));
        assert!(feature.description.contains("January 4, 2024, 8:00:00 AM"));
    }

    #[tokio::test]
    async fn re_ingesting_same_records_builds_nothing() {
        let mut pipeline = pipeline_with(StubGeocoder::default().with_area(downtown()));
        let records = vec![
            record("1", "Downtown", "Medical Response", false),
            record("2", "Downtown", "Fire Rescue - Alarm", false),
        ];

        let first = pipeline.ingest(&records).await;
        assert_eq!(first.built, 2);

        let second = pipeline.ingest(&records).await;
        assert_eq!(second.built, 0);
        assert_eq!(pipeline.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn store_size_is_monotonic_across_batches() {
        let mut pipeline = pipeline_with(StubGeocoder::default().with_area(downtown()));

        let mut previous = 0;
        let batches = [
            vec![record("1", "Downtown", "Medical Response", false)],
            vec![],
            vec![
                record("1", "Downtown", "Medical Response", false),
                record("2", "Downtown", "Fire Rescue - Alarm", false),
            ],
        ];

        for batch in &batches {
            pipeline.ingest(batch).await;
            let len = pipeline.snapshot().len();
            assert!(len >= previous);
            previous = len;
        }
        assert_eq!(previous, 2);
    }

    #[tokio::test]
    async fn diffing_is_by_identity_not_position() {
        let mut pipeline = pipeline_with(StubGeocoder::default().with_area(downtown()));

        pipeline
            .ingest(&[record("1", "Downtown", "Medical Response", false)])
            .await;

        // The source prepends newer records; the old record keeps its id
        // and must not be rebuilt even though its position changed.
        let reordered = vec![
            record("2", "Downtown", "Fire Rescue - Alarm", false),
            record("1", "Downtown", "Medical Response", false),
        ];
        let outcome = pipeline.ingest(&reordered).await;

        assert_eq!(outcome.built, 1);
        assert_eq!(pipeline.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn resolution_failure_skips_record_and_continues() {
        let geocoder = StubGeocoder::default().with_area(downtown());
        let mut pipeline = pipeline_with(geocoder);

        let records = vec![
            record("1", "Downtown", "Medical Response", false),
            record("2", "Atlantis", "Medical Response", false),
        ];
        let outcome = pipeline.ingest(&records).await;

        assert_eq!(outcome.built, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].incident_number, "2");
        assert_eq!(pipeline.processed_count(), 1);
    }

    #[tokio::test]
    async fn failed_record_is_retried_next_pass() {
        let geocoder = StubGeocoder::default().with_area(downtown());
        let calls = geocoder.call_counts();
        let mut pipeline = pipeline_with(geocoder);

        let records = vec![
            record("1", "Downtown", "Medical Response", false),
            record("2", "Atlantis", "Medical Response", false),
        ];
        pipeline.ingest(&records).await;
        let outcome = pipeline.ingest(&records).await;

        // Still failing, but attempted again rather than silently skipped.
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].incident_number, "2");
        assert_eq!(calls_for(&calls, "Atlantis"), 2);
    }

    #[tokio::test]
    async fn repeated_neighbourhood_geocodes_once() {
        let geocoder = StubGeocoder::default().with_area(downtown());
        let calls = geocoder.call_counts();
        let mut pipeline = pipeline_with(geocoder);

        let records = vec![
            record("1", "Downtown", "Medical Response", false),
            record("2", "Downtown", "Fire Rescue - Alarm", false),
            record("3", "Downtown", "Medical Response", true),
        ];
        pipeline.ingest(&records).await;
        pipeline
            .ingest(&[record("4", "Downtown", "Medical Response", false)])
            .await;

        assert_eq!(pipeline.snapshot().len(), 4);
        assert_eq!(calls_for(&calls, "Downtown"), 1);
    }

    #[tokio::test]
    async fn filtered_view_is_fresh_subset() {
        let mut pipeline = pipeline_with(StubGeocoder::default().with_area(downtown()));
        let records = vec![
            record("1", "Downtown", "Medical Response", false),
            record("2", "Downtown", "Fire Rescue - Alarm", false),
            record("3", "Downtown", "Medical Response", true),
        ];
        pipeline.ingest(&records).await;

        let alarms = pipeline.filtered(&FilterCriterion::IncidentType(
            "Fire Rescue - Alarm".to_string(),
        ));
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms.features[0].id, "2");

        let vehicles = pipeline.filtered(&FilterCriterion::VehicleAccident);
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles.features[0].id, "3");

        // Deriving views never shrinks the canonical collection.
        assert_eq!(pipeline.snapshot().len(), 3);
    }
}
