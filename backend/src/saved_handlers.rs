// Handlers for persisted client state: pinned locations and JSON blobs
// kept under fixed names (recent searches, favorites, onboarding flag)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use shared::{GeoPoint, NewLocation, RecentSearch};

use crate::error::AppError;
use crate::store::{self, PinnedLocation, StateKey};
use crate::AppState;

/// POST /api/locations - Pin a location
pub async fn save_location(
    State(state): State<AppState>,
    Json(payload): Json<NewLocation>,
) -> Result<(StatusCode, Json<PinnedLocation>), AppError> {
    let (Some(lat), Some(lng)) = (payload.lat, payload.lng) else {
        return Err(AppError::Validation(
            "Latitude and longitude are required".to_string(),
        ));
    };
    if !lat.is_finite() || !lng.is_finite() {
        return Err(AppError::Validation(
            "Latitude and longitude must be numbers".to_string(),
        ));
    }

    let location = state.store.save_location(GeoPoint::new(lat, lng)).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// GET /api/locations - Pinned locations, newest first
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<PinnedLocation>>, AppError> {
    state.store.list_locations().await.map(Json).map_err(Into::into)
}

/// GET /api/state/:key - Stored blob, or `null` when nothing was saved
pub async fn get_state(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let key = state_key(&name)?;
    let value = state.store.get_blob(key).await?.unwrap_or(Value::Null);
    Ok(Json(value))
}

/// PUT /api/state/:key - Replace a blob
pub async fn put_state(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(value): Json<Value>,
) -> Result<StatusCode, AppError> {
    let key = state_key(&name)?;
    state.store.put_blob(key, value).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/state/:key - Forget a blob
pub async fn delete_state(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = state_key(&name)?;
    state.store.delete_blob(key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recent-searches - Remember a search, keeping the newest few
pub async fn push_recent_search(
    State(state): State<AppState>,
    Json(search): Json<RecentSearch>,
) -> Result<Json<Vec<RecentSearch>>, AppError> {
    let searches = store::push_recent_search(state.store.as_ref(), search).await?;
    Ok(Json(searches))
}

fn state_key(name: &str) -> Result<StateKey, AppError> {
    StateKey::from_name(name).ok_or_else(|| AppError::NotFound(format!("unknown state key {name}")))
}
