//! Feature construction from an incident record and its resolved point.
//!
//! Pure and deterministic: identical record and point always produce an
//! identical feature. All I/O (geocoding, storage) happens before this
//! stage.

use chrono::{DateTime, Utc};
use wfps_map_incident_models::{IncidentIcon, IncidentRecord, ResolvedPoint};

use crate::Feature;

/// Placeholder shown when the source reported no responding units.
pub const NO_UNITS_PLACEHOLDER: &str = "No units listed";

/// Placeholder shown while the incident has no closed time yet.
pub const STILL_OPEN_PLACEHOLDER: &str = "Still open";

/// Builds the map feature for one incident record.
#[must_use]
pub fn build(record: &IncidentRecord, point: ResolvedPoint) -> Feature {
    Feature {
        id: record.incident_number.clone(),
        point,
        incident_type: record.incident_type.clone(),
        vehicle_incident: record.motor_vehicle_incident,
        description: render_description(record),
        icon: IncidentIcon::classify(&record.incident_type, record.motor_vehicle_incident),
    }
}

/// Renders the popup description block for an incident.
fn render_description(record: &IncidentRecord) -> String {
    let units = record.units.as_deref().unwrap_or(NO_UNITS_PLACEHOLDER);
    let closed = record
        .closed_time
        .map_or_else(|| STILL_OPEN_PLACEHOLDER.to_string(), format_timestamp);

    format!(
        "{incident_type} in {neighbourhood}\nUnits: {units}\nCall time: {call}\nClosed: {closed}",
        incident_type = record.incident_type,
        neighbourhood = record.neighbourhood,
        call = format_timestamp(record.call_time),
    )
}

/// Formats a timestamp as `"{Month} {Day}, {Year}, {Hour}:{Minute}:{Second}
/// {AM/PM}"` (English month names, 12-hour clock, locale-independent).
fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format("%B %-d, %Y, %-I:%M:%S %p").to_string()
}
