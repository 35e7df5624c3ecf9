//! `GeoJSON` export for the map surface.
//!
//! Produces a standard `FeatureCollection` with `Point` geometries and the
//! `{description, incidentType, vehicleIncident, icon}` property shape the
//! renderer expects. Unknown icons are omitted from properties so the map
//! renders those markers without an icon.

use geojson::feature::Id;
use geojson::{Geometry, JsonObject, Value};
use wfps_map_incident_models::IncidentIcon;

use crate::{Feature, FeatureCollection};

/// Converts a feature collection to its `GeoJSON` representation.
#[must_use]
pub fn to_geojson(collection: &FeatureCollection) -> geojson::FeatureCollection {
    geojson::FeatureCollection {
        bbox: None,
        features: collection.features.iter().map(to_geojson_feature).collect(),
        foreign_members: None,
    }
}

fn to_geojson_feature(feature: &Feature) -> geojson::Feature {
    let mut properties = JsonObject::new();
    properties.insert("description".to_string(), feature.description.clone().into());
    properties.insert(
        "incidentType".to_string(),
        feature.incident_type.clone().into(),
    );
    properties.insert("vehicleIncident".to_string(), feature.vehicle_incident.into());
    if feature.icon != IncidentIcon::Unknown {
        properties.insert("icon".to_string(), feature.icon.to_string().into());
    }

    geojson::Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            feature.point.lon,
            feature.point.lat,
        ]))),
        id: Some(Id::String(feature.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use wfps_map_incident_models::ResolvedPoint;

    use super::*;

    fn feature(id: &str, incident_type: &str) -> Feature {
        Feature {
            id: id.to_string(),
            point: ResolvedPoint {
                lon: -97.14,
                lat: 49.90,
            },
            incident_type: incident_type.to_string(),
            vehicle_incident: false,
            description: "desc".to_string(),
            icon: IncidentIcon::classify(incident_type, false),
        }
    }

    #[test]
    fn exports_standard_feature_collection_shape() {
        let collection = FeatureCollection {
            features: vec![feature("1", "Medical Response")],
        };

        let json = serde_json::to_value(to_geojson(&collection)).unwrap();
        assert_eq!(json["type"], "FeatureCollection");

        let first = &json["features"][0];
        assert_eq!(first["type"], "Feature");
        assert_eq!(first["id"], "1");
        assert_eq!(first["geometry"]["type"], "Point");
        assert_eq!(first["geometry"]["coordinates"][0], -97.14);
        assert_eq!(first["geometry"]["coordinates"][1], 49.90);
        assert_eq!(first["properties"]["incidentType"], "Medical Response");
        assert_eq!(first["properties"]["vehicleIncident"], false);
        assert_eq!(first["properties"]["icon"], "medical_response");
        assert_eq!(first["properties"]["description"], "desc");
    }

    #[test]
    fn unknown_icon_is_omitted() {
        let collection = FeatureCollection {
            features: vec![feature("1", "Water Rescue")],
        };

        let json = serde_json::to_value(to_geojson(&collection)).unwrap();
        let properties = json["features"][0]["properties"].as_object().unwrap();
        assert!(!properties.contains_key("icon"));
    }

    #[test]
    fn empty_collection_exports_empty_features() {
        let json = serde_json::to_value(to_geojson(&FeatureCollection::default())).unwrap();
        assert_eq!(json["features"].as_array().unwrap().len(), 0);
    }
}
