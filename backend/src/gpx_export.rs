use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Metadata, Track, TrackSegment, Waypoint};
use shared::{GeoPoint, NearbyPoi};

use crate::error::AppError;

const CREATOR: &str = "pincaster";
const STOP_SYMBOL: &str = "Flag, Blue";
const PLACE_SYMBOL: &str = "Restaurant";

/// Everything a planned route carries into its GPX download.
#[derive(Debug, Clone, Copy)]
pub struct RouteExport<'a> {
    pub name: &'a str,
    pub path: &'a [GeoPoint],
    pub distance_m: f64,
    pub stops: &'a [GeoPoint],
    pub nearby: &'a [NearbyPoi],
}

/// Base64 GPX 1.1 document for a route.
///
/// The road geometry becomes one track segment. Sampled stops and the
/// places found around them become waypoints, stops first, so GPS units
/// show them as markers along the track.
pub fn encode_route_as_gpx(route: &RouteExport<'_>) -> Result<String, AppError> {
    let summary = format!("{:.1} km, {} stops", route.distance_m / 1000.0, route.stops.len());

    let mut segment = TrackSegment::new();
    segment.points = route.path.iter().map(|p| waypoint(*p)).collect();

    let track = Track {
        name: Some(route.name.to_string()),
        description: Some(summary.clone()),
        segments: vec![segment],
        ..Default::default()
    };

    let stops = route.stops.iter().enumerate().map(|(i, stop)| {
        let mut marker = waypoint(*stop);
        marker.name = Some(format!("Stop {}", i + 1));
        marker.symbol = Some(STOP_SYMBOL.to_string());
        marker
    });
    let places = route.nearby.iter().map(|poi| {
        let mut marker = waypoint(GeoPoint::new(poi.lat, poi.lng));
        marker.name = Some(poi.name.clone());
        marker.description = (!poi.address.is_empty()).then(|| poi.address.clone());
        marker.symbol = Some(PLACE_SYMBOL.to_string());
        marker
    });

    let gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.to_string()),
        metadata: Some(Metadata {
            name: Some(route.name.to_string()),
            description: Some(summary),
            ..Default::default()
        }),
        waypoints: stops.chain(places).collect(),
        tracks: vec![track],
        ..Default::default()
    };

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

fn waypoint(point: GeoPoint) -> Waypoint {
    Waypoint::new(Point::new(point.lon, point.lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(encoded: &str) -> String {
        String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn track_follows_the_road_geometry() {
        let path = [
            GeoPoint::new(40.7359, -73.9911),
            GeoPoint::new(40.7484, -73.9857),
            GeoPoint::new(40.7580, -73.9855),
        ];
        let route = RouteExport {
            name: "Union Square to Times Square",
            path: &path,
            distance_m: 2_480.0,
            stops: &[],
            nearby: &[],
        };
        let xml = decode(&encode_route_as_gpx(&route).unwrap());

        assert!(xml.contains(r#"creator="pincaster""#));
        assert!(xml.contains("Union Square to Times Square"));
        assert!(xml.contains("2.5 km, 0 stops"));
        assert_eq!(xml.matches("<trkpt").count(), 3);
        assert_eq!(xml.matches("<wpt").count(), 0);
    }

    #[test]
    fn stops_precede_nearby_places_as_waypoints() {
        let path = [GeoPoint::new(40.73, -73.99), GeoPoint::new(40.75, -73.98)];
        let stops = [GeoPoint::new(40.74, -73.985)];
        let nearby = [NearbyPoi {
            name: "Joe Coffee".into(),
            address: "9 E 13th St".into(),
            lat: 40.7349,
            lng: -73.9930,
        }];
        let route = RouteExport {
            name: "coffee run",
            path: &path,
            distance_m: 2_300.0,
            stops: &stops,
            nearby: &nearby,
        };
        let xml = decode(&encode_route_as_gpx(&route).unwrap());

        assert_eq!(xml.matches("<wpt").count(), 2);
        let stop = xml.find("Stop 1").unwrap();
        let place = xml.find("Joe Coffee").unwrap();
        assert!(stop < place);
        assert!(xml.contains("9 E 13th St"));
        assert!(xml.contains(PLACE_SYMBOL));
    }

    #[test]
    fn empty_route_still_encodes() {
        let route = RouteExport {
            name: "empty",
            path: &[],
            distance_m: 0.0,
            stops: &[],
            nearby: &[],
        };
        assert!(decode(&encode_route_as_gpx(&route).unwrap()).contains("<gpx"));
    }
}
