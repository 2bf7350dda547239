use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{GeoPoint, NearbyPoi};

use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Remote geocoding, directions and place search.
///
/// Implemented over HTTP by [`MapboxClient`]; tests substitute canned
/// implementations.
#[async_trait]
pub trait GeoService: Send + Sync {
    /// Best match for a free-text place name, `None` when nothing matches.
    async fn geocode(&self, place: &str) -> Result<Option<GeoPoint>, AppError>;

    /// Driving route geometry in `[lng, lat]` order, `None` when unroutable.
    async fn directions(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Result<Option<Vec<[f64; 2]>>, AppError>;

    /// Places of `category` close to `point`.
    async fn nearby_pois(&self, point: GeoPoint, category: &str)
        -> Result<Vec<NearbyPoi>, AppError>;
}

#[derive(Debug, Clone)]
pub struct MapboxClient {
    http: Client,
    base_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    text: String,
    #[serde(default)]
    place_name: String,
    #[serde(default)]
    center: Option<[f64; 2]>,
    #[serde(default)]
    geometry: Option<PointGeometry>,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: LineGeometry,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl MapboxClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self, AppError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn places_url(&self, query: &str) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{}.json",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    async fn search_places(
        &self,
        query: &str,
        extra: &[(&str, String)],
    ) -> Result<GeocodingResponse, AppError> {
        let response = self
            .http
            .get(self.places_url(query))
            .query(&[("access_token", self.access_token.as_str())])
            .query(extra)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GeoService for MapboxClient {
    async fn geocode(&self, place: &str) -> Result<Option<GeoPoint>, AppError> {
        let response = self.search_places(place, &[]).await?;
        let found = response
            .features
            .into_iter()
            .find_map(|feature| feature.center)
            .map(GeoPoint::from_lng_lat);

        tracing::debug!("geocoded {place:?} to {found:?}");
        Ok(found)
    }

    async fn directions(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Result<Option<Vec<[f64; 2]>>, AppError> {
        let url = format!(
            "{}/directions/v5/mapbox/driving/{},{};{},{}",
            self.base_url, from.lon, from.lat, to.lon, to.lat
        );
        let response: DirectionsResponse = self
            .http
            .get(url)
            .query(&[
                ("geometries", "geojson"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .routes
            .into_iter()
            .next()
            .map(|route| route.geometry.coordinates))
    }

    async fn nearby_pois(
        &self,
        point: GeoPoint,
        category: &str,
    ) -> Result<Vec<NearbyPoi>, AppError> {
        let extra = [
            ("proximity", format!("{},{}", point.lon, point.lat)),
            ("types", "poi".to_string()),
        ];
        let response = self.search_places(category, &extra).await?;

        Ok(response
            .features
            .into_iter()
            .filter_map(|feature| {
                let [lng, lat] = feature.geometry.map(|g| g.coordinates).or(feature.center)?;
                Some(NearbyPoi {
                    name: feature.text,
                    address: feature.place_name,
                    lat,
                    lng,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_url_encodes_query() {
        let client = MapboxClient::new("https://api.mapbox.com/", "token").unwrap();
        assert_eq!(
            client.places_url("hidden gems"),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/hidden%20gems.json"
        );
    }

    #[test]
    fn geocoding_payload_parses() {
        let body = r#"{
            "features": [{
                "text": "Birch Coffee",
                "place_name": "Birch Coffee, 21 E 27th St, New York",
                "center": [-73.9857, 40.7437],
                "geometry": {"type": "Point", "coordinates": [-73.9857, 40.7437]}
            }]
        }"#;
        let parsed: GeocodingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.features.len(), 1);
        assert_eq!(parsed.features[0].center, Some([-73.9857, 40.7437]));
    }

    #[test]
    fn empty_geocoding_payload_parses() {
        let parsed: GeocodingResponse = serde_json::from_str(r#"{"type": "FeatureCollection"}"#).unwrap();
        assert!(parsed.features.is_empty());
    }

    #[test]
    fn directions_payload_parses() {
        let body = r#"{
            "routes": [{
                "distance": 1234.5,
                "geometry": {"type": "LineString", "coordinates": [[-74.006, 40.7128], [-73.9851, 40.7589]]}
            }],
            "code": "Ok"
        }"#;
        let parsed: DirectionsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.routes[0].geometry.coordinates.len(), 2);
    }
}
