//! HTTP API handlers for the Sentinel operator console.
//!
//! The console exposes one dashboard session. Front ends poll `GET /screen`
//! for the rendered view and drive the session with the action routes.
//!
//! - **GET /screen**: Current view (map or hospital detail) in the session language.
//! - **POST /hospitals/:id/select**: Open a hospital's detail view and fetch its forecast.
//! - **POST /back**: Return to the map view.
//! - **POST /retry**: Re-fetch after a failed forecast.
//! - **POST /language/toggle**, **PUT /language/:tag**: Switch display language.
//! - **POST /layers/:layer/toggle**: Show or hide a map layer.
//! - **POST /sound/toggle**: Mute or unmute critical-status announcements.
//! - **GET /health**: Console liveness plus prediction service reachability.

use std::future::Future;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::dashboard::{Dashboard, Screen};
use crate::error::DashboardError;
use crate::i18n::Language;
use crate::map::Layer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
}

/// Build the console router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/screen", get(get_screen))
        .route("/hospitals/:id/select", post(select_hospital))
        .route("/back", post(go_back))
        .route("/retry", post(retry_prediction))
        .route("/language/toggle", post(toggle_language))
        .route("/language/:tag", put(set_language))
        .route("/layers/:layer/toggle", post(toggle_layer))
        .route("/sound/toggle", post(toggle_sound))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::UnknownHospital(_) => StatusCode::NOT_FOUND,
            DashboardError::NotRetryable | DashboardError::MapNotShowing => StatusCode::CONFLICT,
            DashboardError::UnknownLayer(_) | DashboardError::UnknownLanguage(_) => {
                StatusCode::BAD_REQUEST
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// GET /screen - Render the current view.
///
/// # Response
///
/// ```json
/// {
///     "language": "en",
///     "rtl": false,
///     "clock": "2025-03-01T12:00:00Z",
///     "selected_hospital": null,
///     "view": { "kind": "map", "hospitals": [...], ... }
/// }
/// ```
#[instrument(skip(state))]
pub async fn get_screen(State(state): State<AppState>) -> Json<Screen> {
    Json(state.dashboard.screen().await)
}

/// POST /hospitals/:id/select - Open the detail view for a hospital.
///
/// Returns `202 Accepted` immediately; the forecast arrives asynchronously and
/// shows up on the next `GET /screen`.
#[instrument(skip(state))]
pub async fn select_hospital(
    State(state): State<AppState>,
    Path(hospital_id): Path<String>,
) -> Result<StatusCode, DashboardError> {
    match state.dashboard.select(&hospital_id).await {
        Ok(_fetch) => Ok(StatusCode::ACCEPTED),
        Err(e) => {
            warn!(hospital_id = %hospital_id, error = %e, "Select rejected");
            Err(e)
        }
    }
}

/// POST /back - Return to the map view.
#[instrument(skip(state))]
pub async fn go_back(State(state): State<AppState>) -> StatusCode {
    state.dashboard.back().await;
    StatusCode::OK
}

/// POST /retry - Re-issue the forecast request after a failure.
///
/// Returns `409 Conflict` unless the detail view is in its failed state.
#[instrument(skip(state))]
pub async fn retry_prediction(State(state): State<AppState>) -> Result<StatusCode, DashboardError> {
    state.dashboard.retry().await?;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub language: Language,
    pub rtl: bool,
}

/// POST /language/toggle - Switch between English and Arabic.
#[instrument(skip(state))]
pub async fn toggle_language(State(state): State<AppState>) -> Json<LanguageResponse> {
    let language = state.dashboard.toggle_language().await;
    info!(language = %language, "Language toggled");
    Json(LanguageResponse {
        language,
        rtl: language.is_rtl(),
    })
}

/// PUT /language/:tag - Set the display language explicitly.
#[instrument(skip(state))]
pub async fn set_language(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<LanguageResponse>, DashboardError> {
    let language: Language = tag.parse()?;
    state.dashboard.set_language(language).await;
    Ok(Json(LanguageResponse {
        language,
        rtl: language.is_rtl(),
    }))
}

/// POST /layers/:layer/toggle - Show or hide a map layer.
///
/// Layers: `hospitals`, `ambulances`, `weather`.
#[instrument(skip(state))]
pub async fn toggle_layer(
    State(state): State<AppState>,
    Path(layer): Path<String>,
) -> Result<impl IntoResponse, DashboardError> {
    let layer: Layer = layer.parse()?;
    let visible = state.dashboard.toggle_layer(layer).await?;
    Ok(Json(json!({ "layer": layer, "visible": visible })))
}

/// POST /sound/toggle - Mute or unmute announcements.
///
/// # Response
///
/// ```json
/// { "sound_enabled": false }
/// ```
#[instrument(skip(state))]
pub async fn toggle_sound(State(state): State<AppState>) -> impl IntoResponse {
    let sound_enabled = state.dashboard.toggle_sound().await;
    info!(sound_enabled, "Sound toggled");
    Json(json!({ "sound_enabled": sound_enabled }))
}

/// GET /health - Console health plus upstream reachability.
///
/// Always `200 OK` while the console runs; `upstream` is `"online"` only when
/// the prediction service answered its own health check.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let upstream = match state.dashboard.client().health().await {
        Ok(health) if health.is_online() => "online".to_string(),
        Ok(health) => health.status,
        Err(e) => {
            warn!(error = %e, "Prediction service health check failed");
            "offline".to_string()
        }
    };

    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "upstream": upstream })),
    )
}

/// Graceful shutdown trigger for `axum::serve`.
///
/// Resolves when `signal` fires. If the signal handler could not be installed
/// the error is logged and this never resolves, so the server keeps running.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Could not listen for shutdown signal, graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}
