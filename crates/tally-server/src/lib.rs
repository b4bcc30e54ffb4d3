//! Tally Web Server
//!
//! Axum-based REST API over the Tally decision engine.
//!
//! Every decision endpoint answers with a label, a confidence and an
//! explanation or evidence field, fallbacks included. Handlers only decode
//! transport input, call one engine operation and serialize the result.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use tally_core::{ConfigSource, Engine, Error as EngineError};

mod handlers;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty or "*" = any origin)
    pub allowed_origins: Vec<String>,
    /// Where the engine's rule tables were loaded from (reported by /health)
    pub rules_source: ConfigSource,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            rules_source: ConfigSource::Embedded,
        }
    }
}

impl ServerConfig {
    /// Parse a comma-separated origin list (as found in `TALLY_ALLOWED_ORIGINS`)
    pub fn parse_origins(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Shared application state
pub struct AppState {
    pub engine: Engine,
    pub config: ServerConfig,
}

/// Create the application router
pub fn create_router(engine: Engine, config: ServerConfig) -> Router {
    let cors = build_cors(&config.allowed_origins);
    let state = Arc::new(AppState { engine, config });

    let api_routes = Router::new()
        // Accounting
        .route("/accounting/ocr", post(handlers::ocr_receipt))
        .route("/accounting/classify", post(handlers::classify_expense))
        // Anomaly and budget
        .route("/anomaly/detect", post(handlers::detect_anomaly))
        .route("/anomaly/budget-forecast", post(handlers::forecast_budget))
        // Knowledge base
        .route("/chat", post(handlers::chat))
        .route(
            "/documents",
            get(handlers::list_documents).post(handlers::upload_document),
        )
        // Uniform envelope for any task
        .route("/engine/:task", post(handlers::run_task));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    cors.allow_origin(origins)
}

/// Start the server
pub async fn serve(engine: Engine, host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    info!(rules = %config.rules_source, "Rule tables loaded");
    if config.allowed_origins.is_empty() {
        info!("CORS: allowing any origin (set TALLY_ALLOWED_ORIGINS to restrict)");
    }

    let app = create_router(engine, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
    api: &'static str,
}

/// GET / - Service banner
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Tally decision engine API",
        version: env!("CARGO_PKG_VERSION"),
        api: "/api/v1",
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    rules: String,
    documents: usize,
}

/// GET /health - Liveness check
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        rules: state.config.rules_source.to_string(),
        documents: state.engine.documents().len(),
    })
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map an engine error: invalid input is the caller's fault, anything else is ours
    pub fn from_engine(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => Self::bad_request(&msg),
            other => Self::from(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
