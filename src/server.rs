use crate::config::Config;
use crate::service::{PlaylistService, ServiceError};
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const MSG_QUERY_REQUIRED: &str = "Query parameter \"q\" is required";
pub const MSG_SEARCH_FAILED: &str = "Failed to fetch tracks";
pub const MSG_URI_REQUIRED: &str = "Track URI is required";
pub const MSG_DUPLICATE: &str = "Track is already in the playlist";
pub const MSG_ADD_FAILED: &str = "Failed to add track to playlist";

type AppState = Arc<PlaylistService>;

/// Error body sent to the browser: `{ "error": "<message>" }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn bad_request(message: &'static str) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message }
    }

    fn internal(message: &'static str) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message }
    }

    // Details were logged where the error happened; only the generic
    // message leaves the process.
    fn for_search(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(_) => Self::bad_request(MSG_QUERY_REQUIRED),
            _ => Self::internal(MSG_SEARCH_FAILED),
        }
    }

    fn for_add(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(_) => Self::bad_request(MSG_URI_REQUIRED),
            ServiceError::Duplicate(_) => Self::bad_request(MSG_DUPLICATE),
            _ => Self::internal(MSG_ADD_FAILED),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddTrackRequest {
    track_uri: Option<String>,
}

async fn search(
    State(service): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let q = params.q.unwrap_or_default();
    let tracks = service.search(&q).await.map_err(ApiError::for_search)?;
    Ok(Json(tracks).into_response())
}

async fn add_to_playlist(
    State(service): State<AppState>,
    body: Result<Json<AddTrackRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let uri = match body {
        Ok(Json(req)) => req.track_uri.unwrap_or_default(),
        Err(rejection) => {
            warn!("add-to-playlist: unreadable body: {}", rejection);
            String::new()
        }
    };
    let data = service.add_track(&uri).await.map_err(ApiError::for_add)?;
    Ok(Json(json!({ "success": true, "data": data })).into_response())
}

async fn health(State(service): State<AppState>) -> Json<serde_json::Value> {
    let cache = service.cache();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cache": {
            "state": cache.state().await,
            "tracks": cache.len().await,
        }
    }))
}

/// The full HTTP surface: JSON API, health check, and the static UI as
/// fallback for every other path.
pub fn router(service: Arc<PlaylistService>, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/add-to-playlist", post(add_to_playlist))
        .route("/health", get(health))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

pub async fn serve(cfg: &Config, service: Arc<PlaylistService>) -> Result<()> {
    let app = router(service, &cfg.static_dir);
    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running http server")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
