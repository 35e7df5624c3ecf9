//! Mapbox forward-geocoding client.
//!
//! Resolves a neighbourhood name to a bounding box using the Mapbox
//! Geocoding v5 `mapbox.places` endpoint, biased toward the municipal
//! reference centre and restricted to neighbourhood-level results.
//!
//! See <https://docs.mapbox.com/api/search/geocoding-v5/>

use async_trait::async_trait;
use wfps_map_incident_models::NeighbourhoodArea;

use crate::{GeocodeError, NeighbourhoodGeocoder};

/// Default Mapbox Geocoding v5 endpoint.
pub const MAPBOX_PLACES_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Winnipeg's reference centre `(lon, lat)`, used as the proximity bias so
/// ambiguous neighbourhood names resolve within the city.
pub const WINNIPEG_CENTRE: (f64, f64) = (-97.138_451, 49.895_077);

/// Mapbox geocoder with a fixed proximity bias.
pub struct MapboxGeocoder {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    proximity: (f64, f64),
}

impl MapboxGeocoder {
    /// Creates a geocoder against the public Mapbox endpoint, biased to
    /// Winnipeg.
    #[must_use]
    pub fn new(client: reqwest::Client, access_token: String) -> Self {
        Self {
            client,
            base_url: MAPBOX_PLACES_URL.to_string(),
            access_token,
            proximity: WINNIPEG_CENTRE,
        }
    }

    /// Creates a geocoder reading the token from `MAPBOX_ACCESS_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::MissingToken`] if the variable is unset.
    pub fn from_env(client: reqwest::Client) -> Result<Self, GeocodeError> {
        let access_token =
            std::env::var("MAPBOX_ACCESS_TOKEN").map_err(|_| GeocodeError::MissingToken)?;
        Ok(Self::new(client, access_token))
    }

    /// Overrides the endpoint URL (for self-hosted proxies and tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn request_url(&self, neighbourhood: &str) -> Result<reqwest::Url, GeocodeError> {
        let mut url =
            reqwest::Url::parse(&self.base_url).map_err(|e| GeocodeError::Parse {
                message: format!("Invalid geocoder base URL: {e}"),
            })?;
        url.path_segments_mut()
            .map_err(|()| GeocodeError::Parse {
                message: "Geocoder base URL cannot be a base".to_string(),
            })?
            .push(&format!("{neighbourhood}.json"));
        Ok(url)
    }
}

#[async_trait]
impl NeighbourhoodGeocoder for MapboxGeocoder {
    async fn lookup(
        &self,
        neighbourhood: &str,
    ) -> Result<Option<NeighbourhoodArea>, GeocodeError> {
        let url = self.request_url(neighbourhood)?;
        let proximity = format!("{},{}", self.proximity.0, self.proximity.1);

        let resp = self
            .client
            .get(url)
            .query(&[
                ("proximity", proximity.as_str()),
                ("types", "neighborhood"),
                ("limit", "1"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(neighbourhood, &body)
    }
}

/// Parses a Mapbox geocoding response into a neighbourhood area.
///
/// Uses the first result's `bbox`. Point-only results (no `bbox`) fall
/// back to a zero-area box at the result's `center`.
fn parse_response(
    neighbourhood: &str,
    body: &serde_json::Value,
) -> Result<Option<NeighbourhoodArea>, GeocodeError> {
    let features = body["features"]
        .as_array()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Mapbox response has no features array".to_string(),
        })?;

    let Some(first) = features.first() else {
        return Ok(None);
    };

    if let Some(bbox) = parse_coords(&first["bbox"], 4) {
        return Ok(Some(NeighbourhoodArea {
            neighbourhood: neighbourhood.to_string(),
            min_lon: bbox[0],
            min_lat: bbox[1],
            max_lon: bbox[2],
            max_lat: bbox[3],
        }));
    }

    let center = parse_coords(&first["center"], 2).ok_or_else(|| GeocodeError::Parse {
        message: "Mapbox result has neither bbox nor center".to_string(),
    })?;

    Ok(Some(NeighbourhoodArea {
        neighbourhood: neighbourhood.to_string(),
        min_lon: center[0],
        min_lat: center[1],
        max_lon: center[0],
        max_lat: center[1],
    }))
}

fn parse_coords(value: &serde_json::Value, expected_len: usize) -> Option<Vec<f64>> {
    let coords: Vec<f64> = value
        .as_array()?
        .iter()
        .filter_map(serde_json::Value::as_f64)
        .collect();
    (coords.len() == expected_len).then_some(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bbox_result() {
        let body = serde_json::json!({
            "features": [{
                "bbox": [-97.15, 49.89, -97.13, 49.91],
                "center": [-97.14, 49.90]
            }]
        });
        let area = parse_response("Downtown", &body).unwrap().unwrap();
        assert_eq!(area.neighbourhood, "Downtown");
        assert!((area.min_lon - -97.15).abs() < 1e-9);
        assert!((area.max_lat - 49.91).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_center_without_bbox() {
        let body = serde_json::json!({
            "features": [{ "center": [-97.14, 49.90] }]
        });
        let area = parse_response("Downtown", &body).unwrap().unwrap();
        assert!((area.min_lon - area.max_lon).abs() < f64::EPSILON);
        assert!((area.min_lat - 49.90).abs() < 1e-9);
    }

    #[test]
    fn empty_features_is_no_match() {
        let body = serde_json::json!({ "features": [] });
        assert!(parse_response("Nowhere", &body).unwrap().is_none());
    }

    #[test]
    fn missing_features_is_parse_error() {
        let body = serde_json::json!({ "message": "Not Authorized" });
        assert!(parse_response("Downtown", &body).is_err());
    }

    #[test]
    fn request_url_encodes_spaces() {
        let geocoder = MapboxGeocoder::new(reqwest::Client::new(), "tok".to_string());
        let url = geocoder.request_url("Daniel McIntyre").unwrap();
        assert!(url.path().ends_with("/Daniel%20McIntyre.json"));
    }
}
