use shared::{GeoPoint, RouteRequest, RouteResponse};

use crate::{
    error::AppError,
    geodesy::{equidistant_points, path_distance_m},
    gpx_export::{encode_route_as_gpx, RouteExport},
    mapbox::GeoService,
};

/// Most stops a single route request may ask for.
pub const MAX_STOPS: usize = 25;

/// Resolve both ends, fetch the route between them and pick stops along it.
///
/// Each remote call is awaited once, in order: geocode start, geocode end,
/// directions, then one nearby-place lookup per stop when a category was
/// given.
pub async fn plan_route(geo: &dyn GeoService, req: &RouteRequest) -> Result<RouteResponse, AppError> {
    if req.start.trim().is_empty() || req.end.trim().is_empty() {
        return Err(AppError::Validation("start and end are required".to_string()));
    }
    if req.stops > MAX_STOPS {
        return Err(AppError::Validation(format!(
            "at most {MAX_STOPS} stops can be requested"
        )));
    }

    let start = geo.geocode(&req.start).await?;
    let end = geo.geocode(&req.end).await?;
    let (Some(start), Some(end)) = (start, end) else {
        tracing::warn!("geocoding failed for {:?} -> {:?}", req.start, req.end);
        return Err(AppError::Geocode);
    };

    let coordinates = geo.directions(start, end).await?.ok_or(AppError::NoRoute)?;
    let path: Vec<GeoPoint> = coordinates.iter().copied().map(GeoPoint::from_lng_lat).collect();
    let distance_m = path_distance_m(&path);
    let stops = equidistant_points(&path, req.stops);

    tracing::info!(
        "route {:?} -> {:?}: {} points, {:.0} m, {} stops",
        req.start,
        req.end,
        path.len(),
        distance_m,
        stops.len()
    );

    let mut nearby = Vec::new();
    if let Some(category) = req.category.as_deref().filter(|c| !c.is_empty()) {
        for stop in &stops {
            nearby.extend(geo.nearby_pois(*stop, category).await?);
        }
    }

    let name = format!("{} to {}", req.start, req.end);
    let gpx_base64 = encode_route_as_gpx(&RouteExport {
        name: &name,
        path: &path,
        distance_m,
        stops: &stops,
        nearby: &nearby,
    })?;

    Ok(RouteResponse {
        coordinates,
        distance_m,
        stops,
        nearby,
        gpx_base64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use shared::NearbyPoi;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeGeo {
        unknown_place: Option<&'static str>,
        no_route: bool,
        nearby_calls: AtomicUsize,
    }

    #[async_trait]
    impl GeoService for FakeGeo {
        async fn geocode(&self, place: &str) -> Result<Option<GeoPoint>, AppError> {
            if Some(place) == self.unknown_place {
                return Ok(None);
            }
            Ok(Some(match place {
                "Union Square" => GeoPoint::new(0.0, 0.0),
                _ => GeoPoint::new(0.0, 2.0),
            }))
        }

        async fn directions(
            &self,
            from: GeoPoint,
            to: GeoPoint,
        ) -> Result<Option<Vec<[f64; 2]>>, AppError> {
            if self.no_route {
                return Ok(None);
            }
            let mid = [(from.lon + to.lon) / 2.0, (from.lat + to.lat) / 2.0];
            Ok(Some(vec![from.to_lng_lat(), mid, to.to_lng_lat()]))
        }

        async fn nearby_pois(
            &self,
            point: GeoPoint,
            category: &str,
        ) -> Result<Vec<NearbyPoi>, AppError> {
            self.nearby_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![NearbyPoi {
                name: format!("{category} near {:.1}", point.lon),
                address: "somewhere".into(),
                lat: point.lat,
                lng: point.lon,
            }])
        }
    }

    fn request(stops: usize, category: Option<&str>) -> RouteRequest {
        RouteRequest {
            start: "Union Square".into(),
            end: "Times Square".into(),
            stops,
            category: category.map(String::from),
        }
    }

    #[tokio::test]
    async fn picks_middle_stop_and_exports_gpx() {
        let geo = FakeGeo::default();
        let route = plan_route(&geo, &request(1, None)).await.unwrap();

        assert_eq!(route.coordinates.len(), 3);
        assert_eq!(route.stops, vec![GeoPoint::new(0.0, 1.0)]);
        assert!(route.distance_m > 200_000.0);
        assert!(!route.gpx_base64.is_empty());
        assert!(route.nearby.is_empty());
        assert_eq!(geo.nearby_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn looks_up_nearby_places_once_per_stop() {
        let geo = FakeGeo::default();
        let route = plan_route(&geo, &request(1, Some("coffee"))).await.unwrap();

        assert_eq!(geo.nearby_calls.load(Ordering::SeqCst), 1);
        assert_eq!(route.nearby[0].name, "coffee near 1.0");

        let gpx = STANDARD.decode(&route.gpx_base64).unwrap();
        let xml = String::from_utf8(gpx).unwrap();
        assert!(xml.contains("Union Square to Times Square"));
        assert!(xml.contains("Stop 1"));
        assert!(xml.contains("coffee near 1.0"));
    }

    #[tokio::test]
    async fn unknown_place_is_a_geocode_error() {
        let geo = FakeGeo {
            unknown_place: Some("Times Square"),
            ..Default::default()
        };
        let err = plan_route(&geo, &request(0, None)).await.unwrap_err();
        assert!(matches!(err, AppError::Geocode));
    }

    #[tokio::test]
    async fn missing_route_is_reported() {
        let geo = FakeGeo {
            no_route: true,
            ..Default::default()
        };
        let err = plan_route(&geo, &request(0, None)).await.unwrap_err();
        assert!(matches!(err, AppError::NoRoute));
    }

    #[tokio::test]
    async fn blank_endpoints_are_rejected() {
        let geo = FakeGeo::default();
        let mut req = request(0, None);
        req.end = "  ".into();
        let err = plan_route(&geo, &req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn too_many_stops_are_rejected() {
        let geo = FakeGeo::default();
        let err = plan_route(&geo, &request(MAX_STOPS + 1, None)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
