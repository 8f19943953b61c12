//! HTTP prediction service.
//!
//! Exposes the fitted model over `POST /predict`. The model snapshot is an
//! explicit state object constructed at startup and swapped atomically when
//! the trainer replaces the artifacts on disk; request handling never goes
//! through global mutable state.
//!
//! Bad requests get structured JSON errors naming the offending fields;
//! serving never crashes the process and never modifies persisted state.

use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::data::schema::FEATURE_COUNT;
use crate::model::{LinearModel, ModelMeta, StandardScaler};
use crate::persist::{ArtifactStore, PersistError};

/// JSON field names for the prediction request, in model weight order.
pub const REQUEST_FIELDS: [&str; FEATURE_COUNT] = [
    "avg_area_income",
    "avg_area_house_age",
    "avg_area_num_rooms",
    "avg_area_num_bedrooms",
    "area_population",
];

// ============================================================================
// Model state
// ============================================================================

/// An immutable, atomically swappable view of the fitted artifacts.
#[derive(Debug)]
pub struct ModelSnapshot {
    pub model: LinearModel,
    pub meta: ModelMeta,
    pub scaler: StandardScaler,
    mtime: SystemTime,
}

/// Shared server state: the artifact store plus the current model snapshot.
#[derive(Debug)]
pub struct AppState {
    store: ArtifactStore,
    snapshot: RwLock<Option<Arc<ModelSnapshot>>>,
}

impl AppState {
    /// Create server state over an artifact store. No artifacts loaded yet;
    /// call [`AppState::reload`] (or serve a request) to populate.
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            snapshot: RwLock::new(None),
        }
    }

    /// Force a load of the current artifact pair from disk.
    ///
    /// Returns `None` when no trained model exists yet.
    pub fn reload(&self) -> Result<Option<Arc<ModelSnapshot>>, PersistError> {
        let pair = self.store.load_pair()?;
        let snapshot = pair.map(|(model, meta, scaler)| {
            let mtime = self.store.model_mtime().unwrap_or(SystemTime::UNIX_EPOCH);
            info!(n_updates = meta.n_updates, "loaded model snapshot");
            Arc::new(ModelSnapshot {
                model,
                meta,
                scaler,
                mtime,
            })
        });

        let mut guard = self.snapshot.write().expect("snapshot lock poisoned");
        *guard = snapshot.clone();
        Ok(snapshot)
    }

    /// The current snapshot, reloading if the on-disk artifacts changed.
    pub fn current(&self) -> Result<Option<Arc<ModelSnapshot>>, PersistError> {
        let mtime = self.store.model_mtime();
        {
            let guard = self.snapshot.read().expect("snapshot lock poisoned");
            match (guard.as_ref(), mtime) {
                (Some(snapshot), Some(mtime)) if snapshot.mtime == mtime => {
                    return Ok(Some(snapshot.clone()));
                }
                (None, None) => return Ok(None),
                _ => {}
            }
        }
        self.reload()
    }
}

// ============================================================================
// Error responses
// ============================================================================

/// Client-visible service errors.
#[derive(Debug)]
pub enum ApiError {
    /// The request body was not valid JSON.
    Malformed(String),
    /// Required fields are missing or non-numeric.
    BadRequest {
        missing: Vec<&'static str>,
        invalid: Vec<&'static str>,
    },
    /// No trained model artifacts exist yet.
    ModelUnavailable,
    /// Artifact loading failed.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Malformed(detail) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "request body is not valid JSON", "detail": detail }),
            ),
            ApiError::BadRequest { missing, invalid } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "invalid prediction request",
                    "missing": missing,
                    "invalid": invalid,
                }),
            ),
            ApiError::ModelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": "no trained model available" }),
            ),
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "failed to load model artifacts", "detail": detail }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Prediction response body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PredictResponse {
    pub predicted_price: f64,
}

fn parse_features(body: &Value) -> Result<[f64; FEATURE_COUNT], ApiError> {
    let mut missing = Vec::new();
    let mut invalid = Vec::new();
    let mut features = [0.0f64; FEATURE_COUNT];

    for (i, field) in REQUEST_FIELDS.iter().enumerate() {
        match body.get(field) {
            None | Some(Value::Null) => missing.push(*field),
            Some(value) => match value.as_f64() {
                Some(v) if v.is_finite() => features[i] = v,
                _ => invalid.push(*field),
            },
        }
    }

    if missing.is_empty() && invalid.is_empty() {
        Ok(features)
    } else {
        Err(ApiError::BadRequest { missing, invalid })
    }
}

async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::Malformed(rejection.body_text()))?;
    let features = parse_features(&body)?;

    let snapshot = state
        .current()
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .ok_or(ApiError::ModelUnavailable)?;

    let scaled = snapshot.scaler.transform_row(&features);
    let predicted_price = snapshot.model.predict_row(&scaled);
    Ok(Json(PredictResponse { predicted_price }))
}

async fn predict_usage() -> Json<Value> {
    Json(json!({
        "message": "Send a POST request with the required housing metrics to get the predicted price.",
        "fields": REQUEST_FIELDS,
    }))
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let snapshot = state
        .current()
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let model = snapshot.map(|s| {
        json!({
            "n_updates": s.meta.n_updates,
            "n_samples_trained": s.meta.n_samples_trained,
            "feature_names": s.meta.feature_names,
        })
    });

    Ok(Json(json!({
        "status": "ok",
        "model": model,
    })))
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict).get(predict_usage))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
