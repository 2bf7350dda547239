use std::{
    fs::File,
    io::{self, Read},
    path::{Component, Path, PathBuf},
};

use serde::Deserialize;
use shared::{AudioClip, GeoPoint};

use crate::{error::AppError, geodesy::haversine_km};

pub const DEFAULT_RADIUS_KM: f64 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to read audio catalog: {0}")]
    Io(#[from] io::Error),
    #[error("invalid audio catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("audio file path escapes the audio directory: {0}")]
    UnsafePath(String),
}

/// One recording pinned to a place.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioEntry {
    pub id: String,
    pub title: String,
    /// Path relative to the audio directory.
    pub file: PathBuf,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AudioLibrary {
    entries: Vec<AudioEntry>,
    audio_dir: PathBuf,
}

impl AudioLibrary {
    pub fn new(entries: Vec<AudioEntry>, audio_dir: impl Into<PathBuf>) -> Result<Self, AudioError> {
        if let Some(entry) = entries.iter().find(|entry| !is_plain_relative(&entry.file)) {
            return Err(AudioError::UnsafePath(entry.file.display().to_string()));
        }

        Ok(Self {
            entries,
            audio_dir: audio_dir.into(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>, audio_dir: impl Into<PathBuf>) -> Result<Self, AudioError> {
        let file = File::open(path)?;
        Self::from_reader(file, audio_dir)
    }

    pub fn from_reader<R: Read>(reader: R, audio_dir: impl Into<PathBuf>) -> Result<Self, AudioError> {
        let entries: Vec<AudioEntry> = serde_json::from_reader(reader)?;
        Self::new(entries, audio_dir)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recordings within `radius_km` of `center`, closest first.
    pub fn nearby(&self, center: GeoPoint, radius_km: f64) -> Vec<AudioClip> {
        let mut clips: Vec<AudioClip> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let location = GeoPoint::new(entry.lat, entry.lng);
                let distance_km = haversine_km(center, location);
                (distance_km <= radius_km).then(|| AudioClip {
                    id: entry.id.clone(),
                    title: entry.title.clone(),
                    url: format!("/api/audio/{}/file", urlencoding::encode(&entry.id)),
                    location,
                    category: entry.category.clone(),
                    distance_km,
                })
            })
            .collect();

        clips.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        clips
    }

    pub fn file_path(&self, id: &str) -> Option<PathBuf> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| self.audio_dir.join(&entry.file))
    }
}

fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Raw `lat`/`lng`/`radius` query values, validated by [`NearbyQuery::resolve`].
#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

impl NearbyQuery {
    pub fn resolve(&self) -> Result<(GeoPoint, f64), AppError> {
        let center = parse_point(self.lat.as_deref(), self.lng.as_deref());
        let radius = match self.radius.as_deref() {
            None => Some(DEFAULT_RADIUS_KM),
            Some(raw) => parse_finite(Some(raw)).filter(|r| *r >= 0.0),
        };

        match (center, radius) {
            (Some(center), Some(radius)) => Ok((center, radius)),
            _ => Err(AppError::Validation("Invalid parameters".to_string())),
        }
    }
}

/// Point from raw query values; `None` when either is missing or not a finite number.
pub fn parse_point(lat: Option<&str>, lng: Option<&str>) -> Option<GeoPoint> {
    Some(GeoPoint::new(parse_finite(lat)?, parse_finite(lng)?))
}

fn parse_finite(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {"id": "statueOfLiberty", "title": "Lady Liberty", "file": "statue_of_liberty.mp3", "lat": 40.6892, "lng": -74.0445},
        {"id": "centralPark", "title": "Central Park birds", "file": "central_park.mp3", "lat": 40.7829, "lng": -73.9654, "category": "nature"},
        {"id": "timesSquare", "title": "Times Square buzz", "file": "times_square.mp3", "lat": 40.7580, "lng": -73.9855, "category": "urban"}
    ]"#;

    fn library() -> AudioLibrary {
        AudioLibrary::from_reader(CATALOG.as_bytes(), "audio").unwrap()
    }

    #[test]
    fn nearby_sorts_by_distance_and_filters_radius() {
        let clips = library().nearby(GeoPoint::new(40.7614, -73.9776), 3.0);
        let ids: Vec<_> = clips.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["timesSquare", "centralPark"]);
        assert!(clips[0].distance_km < clips[1].distance_km);
        assert_eq!(clips[0].url, "/api/audio/timesSquare/file");
    }

    #[test]
    fn zero_radius_finds_nothing_nearby() {
        assert!(library().nearby(GeoPoint::new(0.0, 0.0), 0.0).is_empty());
    }

    #[test]
    fn file_path_resolves_under_audio_dir() {
        let library = library();
        assert_eq!(
            library.file_path("centralPark"),
            Some(PathBuf::from("audio").join("central_park.mp3"))
        );
        assert_eq!(library.file_path("brooklynBridge"), None);
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let catalog = r#"[{"id": "x", "title": "x", "file": "../secret.mp3", "lat": 0, "lng": 0}]"#;
        let result = AudioLibrary::from_reader(catalog.as_bytes(), "audio");
        assert!(matches!(result, Err(AudioError::UnsafePath(_))));
    }

    #[test]
    fn query_requires_finite_coordinates() {
        let query = NearbyQuery {
            lat: Some("40.7".into()),
            lng: Some("NaN".into()),
            radius: None,
        };
        assert!(matches!(query.resolve(), Err(AppError::Validation(_))));

        let missing = NearbyQuery::default();
        assert!(missing.resolve().is_err());
    }

    #[test]
    fn query_defaults_radius() {
        let query = NearbyQuery {
            lat: Some("40.7".into()),
            lng: Some("-74.0".into()),
            radius: None,
        };
        let (center, radius) = query.resolve().unwrap();
        assert_eq!(center, GeoPoint::new(40.7, -74.0));
        assert_eq!(radius, DEFAULT_RADIUS_KM);
    }
}
