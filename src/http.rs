//! HTTP routes.

use crate::scheduler::OutageService;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Estado compartilhado pelos handlers.
pub struct AppState {
    pub service: Arc<OutageService>,
    pub maps_api_key: String,
}

pub fn router(state: Arc<AppState>, public_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/outages", get(outages))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&state.maps_api_key))
}

async fn outages(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let classification = state.service.query().await.map_err(|e| {
        error!("Falha ao buscar dados sob demanda: {}", e);
        ApiError::FetchFailed
    })?;
    Ok(Json(&*classification).into_response())
}

pub enum ApiError {
    FetchFailed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::FetchFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch data" })),
            )
                .into_response(),
        }
    }
}

fn render_index(api_key: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PSE Outage Map</title>
    <script src="https://maps.googleapis.com/maps/api/js?key={api_key}"></script>
    <style>
        body, html {{ margin: 0; padding: 0; height: 100%; }}
        #map {{ width: 100%; height: 100%; }}
    </style>
</head>
<body>
    <div id="map"></div>
    <script src="script.js"></script>
</body>
</html>
"#
    )
}
