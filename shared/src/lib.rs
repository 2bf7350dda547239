use std::collections::BTreeSet;

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

/// Geographic point in degrees. Travels on the wire as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Builds a point from a GeoJSON-ordered `[lng, lat]` pair.
    pub fn from_lng_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lon: pair[0],
        }
    }

    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[0],
            lon: pair[1],
        }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.lat, point.lon]
    }
}

/// Time budget of a tour. Unrecognised labels fall back to one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TripDuration {
    ThirtyMinutes,
    #[default]
    OneHour,
    TwoHours,
    ThreeHours,
}

impl TripDuration {
    pub const fn minutes(self) -> u32 {
        match self {
            Self::ThirtyMinutes => 30,
            Self::OneHour => 60,
            Self::TwoHours => 120,
            Self::ThreeHours => 180,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ThirtyMinutes => "30 mins",
            Self::OneHour => "1 hr",
            Self::TwoHours => "2 hrs",
            Self::ThreeHours => "3 hrs",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "30 mins" => Self::ThirtyMinutes,
            "1 hr" => Self::OneHour,
            "2 hrs" => Self::TwoHours,
            "3 hrs" => Self::ThreeHours,
            _ => Self::default(),
        }
    }
}

impl From<String> for TripDuration {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<TripDuration> for String {
    fn from(duration: TripDuration) -> Self {
        duration.label().to_string()
    }
}

/// Tour form as submitted by a client. Fields that are missing, `null` or of
/// the wrong JSON type fall back to their defaults instead of rejecting the
/// whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    #[serde(default, deserialize_with = "or_default")]
    pub start: String,
    #[serde(default, deserialize_with = "or_default")]
    pub end: String,
    #[serde(default, deserialize_with = "or_default")]
    pub duration: TripDuration,
    #[serde(default, deserialize_with = "or_default")]
    pub interests: BTreeSet<String>,
    #[serde(default, alias = "transitPreferences", deserialize_with = "or_default")]
    pub transit: Vec<String>,
}

/// Deserialize `T`, or `T::default()` when the value has another shape.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Valid(T),
        Other(IgnoredAny),
    }

    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Valid(value) => value,
        Lenient::Other(_) => T::default(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Poi,
    Walking,
    Subway,
    Bike,
    Car,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryStep {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub steps: Vec<ItineraryStep>,
    pub end_time: String,
    pub navigation_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: String,
    pub end: String,
    /// Number of evenly spaced stops to pick along the route.
    #[serde(default)]
    pub stops: usize,
    /// When set, nearby places of this category are looked up around each stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Route geometry in GeoJSON `[lng, lat]` order.
    pub coordinates: Vec<[f64; 2]>,
    #[serde(default)]
    pub distance_m: f64,
    #[serde(default)]
    pub stops: Vec<GeoPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nearby: Vec<NearbyPoi>,
    #[serde(default)]
    pub gpx_base64: String,
}

/// Step as accepted by the summary endpoint; only name and description matter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryStep {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<StepKind>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<&ItineraryStep> for SummaryStep {
    fn from(step: &ItineraryStep) -> Self {
        Self {
            kind: Some(step.kind),
            name: step.name.clone(),
            description: step.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub itinerary: Vec<SummaryStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPoi {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLocation {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub id: String,
    pub title: String,
    pub url: String,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}
