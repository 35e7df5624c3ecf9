#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record types, map icon taxonomy, and filter criteria.
//!
//! This crate defines the canonical incident record produced by the WFPS
//! call log source, the icon classification used when rendering incidents
//! on the map, and the filter criteria that derive filtered views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One reported emergency call, normalized from the WFPS open-data feed.
///
/// Records arrive most-recent-first and the list only grows; the
/// `incident_number` uniquely identifies a record across fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Unique incident identifier from the source (e.g., "24-012345").
    pub incident_number: String,
    /// Neighbourhood name as reported by dispatch (e.g., "Daniel McIntyre").
    pub neighbourhood: String,
    /// Incident type label. The label set is open-ended; unknown labels are
    /// still valid records.
    pub incident_type: String,
    /// When the call was received.
    pub call_time: DateTime<Utc>,
    /// When the incident was closed. `None` while the incident is open.
    pub closed_time: Option<DateTime<Utc>>,
    /// Responding units, comma-separated as reported by the source.
    pub units: Option<String>,
    /// Whether a motor vehicle was involved (source encodes "YES"/"NO").
    pub motor_vehicle_incident: bool,
}

/// A geocoded neighbourhood bounding rectangle (WGS84).
///
/// Created on first successful resolution and never mutated; persisted in
/// the location cache so later sessions skip the external lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighbourhoodArea {
    /// Neighbourhood name this area was resolved from.
    pub neighbourhood: String,
    /// Western edge.
    pub min_lon: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Eastern edge.
    pub max_lon: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl NeighbourhoodArea {
    /// Whether the point lies within this area (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: &ResolvedPoint) -> bool {
        point.lon >= self.min_lon
            && point.lon <= self.max_lon
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }
}

/// A longitude/latitude pair sampled from a [`NeighbourhoodArea`].
///
/// Not unique per neighbourhood: each incident gets an independently
/// sampled point so markers in the same neighbourhood don't stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    /// Longitude (WGS84).
    pub lon: f64,
    /// Latitude (WGS84).
    pub lat: f64,
}

/// Map icon classification for an incident.
///
/// The vehicle flag overrides type-based classification; incident types
/// outside the known label table classify as [`IncidentIcon::Unknown`] and
/// render without an icon rather than failing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidentIcon {
    /// Ambulance / medical call.
    MedicalResponse,
    /// Fire alarm activation.
    FireRescueAlarm,
    /// Outdoor fire (grass, brush, refuse).
    FireRescueOutdoor,
    /// Structure fire.
    FireRescueStructureFire,
    /// Hazardous materials response.
    FireRescueHazmat,
    /// Motor vehicle collision. Assigned from the vehicle flag, not the
    /// incident type.
    VehicleAccident,
    /// Incident type not in the icon table; rendered without an icon.
    Unknown,
}

impl IncidentIcon {
    /// Classifies an incident into its map icon.
    ///
    /// A set vehicle flag wins over the type label so collisions reported
    /// under a medical or fire type still render with the vehicle icon.
    #[must_use]
    pub fn classify(incident_type: &str, vehicle_incident: bool) -> Self {
        if vehicle_incident {
            return Self::VehicleAccident;
        }

        match incident_type {
            "Medical Response" => Self::MedicalResponse,
            "Fire Rescue - Alarm" => Self::FireRescueAlarm,
            "Fire Rescue - Outdoor" => Self::FireRescueOutdoor,
            "Fire Rescue - Structure Fire" => Self::FireRescueStructureFire,
            "Fire Rescue - Hazmat" => Self::FireRescueHazmat,
            _ => Self::Unknown,
        }
    }

    /// Returns the icon key for map rendering, or `None` for
    /// [`IncidentIcon::Unknown`] (no icon).
    #[must_use]
    pub fn key(self) -> Option<String> {
        match self {
            Self::Unknown => None,
            other => Some(other.to_string()),
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::MedicalResponse,
            Self::FireRescueAlarm,
            Self::FireRescueOutdoor,
            Self::FireRescueStructureFire,
            Self::FireRescueHazmat,
            Self::VehicleAccident,
            Self::Unknown,
        ]
    }
}

/// The incident-type label that filters on the vehicle flag instead of the
/// type field.
pub const VEHICLE_ACCIDENT_LABEL: &str = "Vehicle Accident";

/// A filter criterion for deriving a filtered feature view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCriterion {
    /// Pass-through: all features.
    All,
    /// Features flagged as motor vehicle incidents, regardless of type.
    VehicleAccident,
    /// Features whose incident type exactly equals the label.
    IncidentType(String),
}

impl FilterCriterion {
    /// Parses the filter widget's string value.
    ///
    /// An empty (or whitespace-only) value means no filter; the special
    /// [`VEHICLE_ACCIDENT_LABEL`] selects the vehicle flag; anything else
    /// is an exact incident-type match.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() {
            Self::All
        } else if label == VEHICLE_ACCIDENT_LABEL {
            Self::VehicleAccident
        } else {
            Self::IncidentType(label.to_string())
        }
    }

    /// Whether an incident with the given type and vehicle flag passes this
    /// criterion.
    #[must_use]
    pub fn matches(&self, incident_type: &str, vehicle_incident: bool) -> bool {
        match self {
            Self::All => true,
            Self::VehicleAccident => vehicle_incident,
            Self::IncidentType(label) => incident_type == label,
        }
    }
}
