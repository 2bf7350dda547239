pub mod audio;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod geodesy;
pub mod gpx_export;
pub mod itinerary;
pub mod mapbox;
pub mod routing;
pub mod saved_handlers;
pub mod store;
pub mod summary;
pub mod transit;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;
use shared::{
    AudioClip, Itinerary, NearbyPoi, RouteRequest, RouteResponse, SummaryRequest, SummaryResponse,
    TripRequest,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::audio::{AudioLibrary, NearbyQuery};
use crate::error::AppError;
use crate::mapbox::GeoService;
use crate::store::Store;
use crate::summary::SummaryService;

#[derive(Clone)]
pub struct AppState {
    pub geo: Arc<dyn GeoService>,
    pub summarizer: Arc<dyn SummaryService>,
    pub store: Arc<dyn Store>,
    pub audio: Arc<AudioLibrary>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/itinerary", post(itinerary_handler))
        .route("/api/route", post(route_handler))
        .route("/api/summary", post(summary_handler))
        .route("/api/pois/nearby", get(nearby_pois_handler))
        .route("/api/audio", get(nearby_audio_handler))
        .route("/api/audio/:id/file", get(audio_file_handler))
        .route(
            "/api/locations",
            get(saved_handlers::list_locations).post(saved_handlers::save_location),
        )
        .route(
            "/api/state/:key",
            get(saved_handlers::get_state)
                .put(saved_handlers::put_state)
                .delete(saved_handlers::delete_state),
        )
        .route("/api/recent-searches", post(saved_handlers::push_recent_search))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn itinerary_handler(Json(req): Json<TripRequest>) -> Json<Itinerary> {
    let mut rng = StdRng::from_entropy();
    let itinerary = itinerary::plan(&req, &mut rng);
    tracing::info!(
        "itinerary for {:?}: {} steps ending {}",
        req.start,
        itinerary.steps.len(),
        itinerary.end_time
    );
    Json(itinerary)
}

async fn route_handler(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    routing::plan_route(state.geo.as_ref(), &req).await.map(Json)
}

async fn summary_handler(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary = summary::summarize(state.summarizer.as_ref(), &req.itinerary).await?;
    Ok(Json(SummaryResponse { summary }))
}

#[derive(Debug, Deserialize)]
struct PoiQuery {
    lat: Option<String>,
    lng: Option<String>,
    category: Option<String>,
}

async fn nearby_pois_handler(
    State(state): State<AppState>,
    Query(query): Query<PoiQuery>,
) -> Result<Json<Vec<NearbyPoi>>, AppError> {
    let point = audio::parse_point(query.lat.as_deref(), query.lng.as_deref())
        .ok_or_else(|| AppError::Validation("Invalid parameters".to_string()))?;
    let category = query
        .category
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("category is required".to_string()))?;

    state.geo.nearby_pois(point, &category).await.map(Json)
}

async fn nearby_audio_handler(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<AudioClip>>, AppError> {
    let (center, radius_km) = query.resolve()?;
    let clips = state.audio.nearby(center, radius_km);
    tracing::debug!("{} audio clips within {radius_km} km", clips.len());
    Ok(Json(clips))
}

async fn audio_file_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound("Audio file not found for the given POI key".to_string());
    let path = state.audio.file_path(&id).ok_or_else(not_found)?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("audio {id} listed but missing at {}", path.display());
            return Err(not_found());
        }
        Err(err) => return Err(err.into()),
    };

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes))
}
