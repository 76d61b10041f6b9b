//! HTTP API for the legal assistant frontend.
//!
//! Provides REST endpoints for section analysis and FIR drafting.

use crate::config::ServerSettings;
use crate::error::{NyayError, Result};
use crate::rag::{FirData, FirDrafter, LegalAnalyzer};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info};

/// Shared application state.
pub struct AppState {
    pub analyzer: LegalAnalyzer,
    pub fir_drafter: FirDrafter,
}

/// Build the router with CORS applied.
pub fn build_router(state: Arc<AppState>, server: &ServerSettings) -> Result<Router> {
    let cors = cors_layer(&server.allowed_origins)?;

    Ok(Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/generate-fir", post(generate_fir))
        .layer(cors)
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|e| NyayError::Config(format!("Invalid CORS origin '{}': {}", o, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AnalyzeRequest {
    query: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    analysis: String,
}

#[derive(Serialize)]
struct FirResponse {
    fir_text: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Maps library errors onto HTTP status codes.
struct ApiError(NyayError);

impl From<NyayError> for ApiError {
    fn from(e: NyayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            NyayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("Request failed: {}", self.0);
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(NyayError::InvalidInput(rejection.body_text()))
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> std::result::Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = body?;
    info!("Received analysis request");

    let result = state.analyzer.analyze(&req.query).await?;

    info!("Analysis completed");
    Ok(Json(AnalyzeResponse {
        analysis: result.analysis,
    }))
}

async fn generate_fir(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> std::result::Result<Json<FirResponse>, ApiError> {
    let Json(body) = body?;
    info!("Received FIR generation request");

    let data = FirData::from_request(body)?;
    let fir_text = state.fir_drafter.draft(&data).await?;

    Ok(Json(FirResponse { fir_text }))
}
