//! API Handlers
//!
//! HTTP request handlers for each endpoint of the demo server.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CachedMap, SharedLogger, Stats};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{GetResponse, HealthResponse, SetRequest, SetResponse};

/// Application state shared across all handlers.
///
/// The cache synchronizes internally, so it is shared through a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Cache of string values
    pub cache: Arc<CachedMap<String>>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: CachedMap<String>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts a cache (and its flusher) with parameters from the Config.
    pub fn from_config(config: &Config, log: Option<SharedLogger>) -> Result<Self> {
        let cache = CachedMap::from_config(config, log)?;
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair, expiring at `until` if given or one key
/// timeout from now otherwise.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let remove_time = match req.until {
        Some(until) => {
            state.cache.set_until(req.key.clone(), req.value, until);
            until
        }
        None => state.cache.set(req.key.clone(), req.value),
    };

    Ok(Json(SetResponse::new(req.key, remove_time)))
}

/// Handler for GET /get/:key
///
/// Retrieves a live value by key; absent and expired keys are both 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value.as_str()))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /stats
///
/// Returns the cache stats snapshot.
pub async fn stats_handler(State(state): State<AppState>) -> Json<Stats> {
    Json(state.cache.stats())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
