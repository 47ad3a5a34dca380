/// HTTP request handlers
use crate::domain::{ApodEnvelope, Health, RoverEnvelope};
use crate::errors::{ApiError, ErrorReply, ErrorResponder};
use crate::services::ProxyService;
use axum::{
    extract::{Query, State},
    http::Uri,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<ProxyService>,
    pub responder: ErrorResponder,
}

#[derive(Debug, Deserialize)]
pub struct RoverQuery {
    pub rover: Option<String>,
}

/// Health check handler
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        now: Utc::now(),
    })
}

/// Proxy today's APOD
pub async fn get_apod(State(state): State<AppState>) -> Result<Json<ApodEnvelope>, ErrorReply> {
    let image = state
        .proxy
        .apod()
        .await
        .map_err(|e| state.responder.respond(e))?;
    Ok(Json(ApodEnvelope { image }))
}

/// Proxy one rover's photos
pub async fn get_rover(
    Query(params): Query<RoverQuery>,
    State(state): State<AppState>,
) -> Result<Json<RoverEnvelope>, ErrorReply> {
    let rover = params.rover.ok_or_else(|| {
        state
            .responder
            .respond(ApiError::InvalidInput("missing `rover` query parameter".into()))
    })?;

    let data = state
        .proxy
        .rover_photos(&rover)
        .await
        .map_err(|e| state.responder.respond(e))?;
    Ok(Json(RoverEnvelope { data }))
}

/// Fallback for unmatched routes
pub async fn not_found(State(state): State<AppState>, uri: Uri) -> ErrorReply {
    debug!("No route for {}", uri);
    state
        .responder
        .respond(ApiError::NotFound("Not Found".into()))
}
