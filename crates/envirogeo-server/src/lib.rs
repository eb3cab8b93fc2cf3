//! EnviroGeo Web Server
//!
//! Axum-based REST API for environmental analyses, NDVI summaries and the
//! document store.
//!
//! Security features:
//! - Bearer API-key authentication when keys are configured
//! - CORS policy from configuration
//! - Security headers on every response
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use envirogeo_core::{Analyzer, DocumentStore, NdviSource, ServerSettings, StoreClient};

mod handlers;

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether configured API keys are enforced
    pub require_auth: bool,
    /// Allowed CORS origins (empty = any origin)
    pub allowed_origins: Vec<String>,
    /// Accepted keys, sent as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            require_auth: true,
            allowed_origins: settings.allowed_origins.clone(),
            api_keys: settings.api_keys.clone(),
        }
    }
}

impl ServerConfig {
    /// Whether requests must present a valid key
    pub fn auth_enforced(&self) -> bool {
        self.require_auth && !self.api_keys.is_empty()
    }
}

/// Shared application state
pub struct AppState {
    pub store: StoreClient,
    pub analyzer: Analyzer,
    pub config: ServerConfig,
}

/// Authentication middleware - validates the Bearer API key
///
/// Keys are compared in constant time. With no keys configured the API is open.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.auth_enforced() {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid API key");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(
    store: StoreClient,
    analyzer: Analyzer,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    match analyzer.ndvi_source() {
        Some(source) => info!(source = source.name(), "NDVI data source configured"),
        None => info!("NDVI data source not configured (set ENVIROGEO_NDVI_URL for real data)"),
    }

    let state = Arc::new(AppState {
        store,
        analyzer,
        config: config.clone(),
    });

    let api_routes = Router::new()
        // Catalog
        .route("/parameters", get(handlers::list_parameters))
        .route("/locations", get(handlers::list_locations))
        // Analysis
        .route("/analyze", post(handlers::analyze))
        .route("/export", post(handlers::export_result))
        .route("/ndvi/national", get(handlers::national_ndvi))
        // Document store protocol
        .route("/store", post(handlers::store_action))
        // Users
        .route(
            "/users/:user_id/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route(
            "/users/:user_id/history",
            get(handlers::list_history).post(handlers::save_history),
        )
        .route(
            "/users/:user_id/history/:id",
            axum::routing::delete(handlers::delete_history),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let cors = cors_layer(&config.allowed_origins);

    // CSP: map tiles and imagery may come from remote hosts
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data: https:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        // Health stays reachable without a key
        .route("/api/health", get(handlers::health))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve the frontend bundle if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() {
        base.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        base.allow_origin(origins)
    }
}

/// Start the server
pub async fn serve(
    store: StoreClient,
    analyzer: Analyzer,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.auth_enforced() {
        warn!("API authentication disabled - do not expose to network!");
    }
    info!(store = store.name(), "Document store ready");

    let app = create_router(store, analyzer, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse a JSON request body, rejecting malformed input with a 400
pub(crate) fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::bad_request(&format!("Invalid request body: {}", e)))
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
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

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
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
        use envirogeo_core::Error as CoreError;

        let err = err.into();
        let client_error = match err.downcast_ref::<CoreError>() {
            Some(
                CoreError::Validation(_)
                | CoreError::UnknownAction(_)
                | CoreError::UnsupportedFormat(_)
                | CoreError::UnknownParameter(_),
            ) => Some(StatusCode::BAD_REQUEST),
            Some(CoreError::NotFound(_)) => Some(StatusCode::NOT_FOUND),
            Some(CoreError::DataSource(_)) => Some(StatusCode::BAD_GATEWAY),
            _ => None,
        };

        match client_error {
            Some(status) => {
                if status == StatusCode::BAD_GATEWAY {
                    warn!(error = %err, "Upstream data source failed");
                }
                Self {
                    status,
                    message: err.to_string(),
                    internal: None,
                }
            }
            None => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(err),
            },
        }
    }
}
