//! Parsing and validation of raw Socrata call log rows.
//!
//! The WFPS feed serializes every field as a string; required fields are
//! `incident_number`, `neighbourhood`, `incident_type`, and `call_time`.
//! Everything else is optional.

use chrono::{DateTime, NaiveDateTime, Utc};
use wfps_map_incident_models::IncidentRecord;

use crate::MalformedRow;

/// Parses a Socrata datetime string (ISO 8601 with optional fractional
/// seconds, no timezone suffix).
#[must_use]
pub fn parse_socrata_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

/// Parses the source's "YES"/"NO" flag encoding. Anything other than an
/// exact "YES" is treated as no.
#[must_use]
pub fn parse_yes_no(s: Option<&str>) -> bool {
    s == Some("YES")
}

/// Validates one raw call log row and converts it to an [`IncidentRecord`].
///
/// # Errors
///
/// Returns a [`MalformedRow`] describing the first missing or unparseable
/// required field.
pub fn parse_call_log_row(row: &serde_json::Value) -> Result<IncidentRecord, MalformedRow> {
    let incident_number = row["incident_number"].as_str().map(str::to_string);

    let reject = |message: &str| MalformedRow {
        incident_number: incident_number.clone(),
        message: message.to_string(),
    };

    let Some(incident_number_value) = incident_number.clone().filter(|s| !s.is_empty()) else {
        return Err(reject("missing incident_number"));
    };

    let Some(neighbourhood) = row["neighbourhood"].as_str().filter(|s| !s.is_empty()) else {
        return Err(reject("missing neighbourhood"));
    };

    let Some(incident_type) = row["incident_type"].as_str().filter(|s| !s.is_empty()) else {
        return Err(reject("missing incident_type"));
    };

    let Some(call_time) = row["call_time"].as_str().and_then(parse_socrata_date) else {
        return Err(reject("missing or unparseable call_time"));
    };

    let closed_time = row["closed_time"].as_str().and_then(parse_socrata_date);
    let units = row["units"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let motor_vehicle_incident = parse_yes_no(row["motor_vehicle_incident"].as_str());

    Ok(IncidentRecord {
        incident_number: incident_number_value,
        neighbourhood: neighbourhood.to_string(),
        incident_type: incident_type.to_string(),
        call_time,
        closed_time,
        units,
        motor_vehicle_incident,
    })
}
