//! Cashcast Web Server
//!
//! Axum-based REST API for the Cashcast forecasting engine.
//!
//! Security features:
//! - Cloudflare Access or API key authentication (secure by default, use --no-auth for local dev)
//! - Every request is scoped to one owner
//! - Restrictive CORS policy
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use cashcast_core::db::Database;
use cashcast_core::models::OwnerId;
use cashcast_core::{ForecastConfig, ForecastService};

mod handlers;

/// Cloudflare Access header for authenticated user email
const CF_ACCESS_USER_HEADER: &str = "cf-access-authenticated-user-email";

/// Explicit owner header for API key clients
const OWNER_HEADER: &str = "x-owner-id";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

const HEALTH_PATH: &str = "/api/health";

/// Owner used for every request when authentication is disabled
pub const LOCAL_DEV_OWNER: &str = "local-dev";

/// Maximum accepted JSON body (budgets are small)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys for service authentication, sent as "Bearer <key>"
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

/// Parse a comma-separated API key list (as in `CASHCAST_API_KEYS`)
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub forecast: ForecastConfig,
    /// Pinned clock (tests); `None` uses the wall clock
    pub today: Option<NaiveDate>,
}

impl AppState {
    /// Forecast service for one request
    pub fn service(&self) -> ForecastService<'_, Database> {
        let service = ForecastService::new(&self.db, &self.forecast);
        match self.today {
            Some(today) => service.with_today(today),
            None => service,
        }
    }
}

/// Authentication middleware - accepts Cloudflare Access headers or API keys
///
/// # Security Notes
///
/// **Cloudflare Access headers**: The `CF-Access-Authenticated-User-Email`
/// header is safe behind Cloudflare Tunnel (which strips/rewrites CF
/// headers), but can be spoofed if the server is exposed directly.
///
/// **API keys**: Compared using constant-time comparison to prevent timing attacks.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    // Liveness stays reachable without credentials
    if !state.config.require_auth || request.uri().path() == HEALTH_PATH {
        return next.run(request).await;
    }

    let cf_user = request
        .headers()
        .get(CF_ACCESS_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    if let Some(email) = cf_user {
        info!(user = %email, path = %request.uri().path(), "Authenticated via Cloudflare Access header");
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
        info!(user = "api-key", path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
/// to prevent timing attacks.
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    for key in valid_keys {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        if provided_bytes.len() == key_bytes.len() && provided_bytes.ct_eq(key_bytes).into() {
            return true;
        }
    }
    false
}

/// Resolve the owner a request acts for
///
/// Cloudflare Access email first, then `x-owner-id`, then `local-dev` when
/// authentication is disabled.
pub fn resolve_owner(headers: &HeaderMap, require_auth: bool) -> Result<OwnerId, AppError> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let raw = header_value(CF_ACCESS_USER_HEADER).or_else(|| header_value(OWNER_HEADER));
    match raw {
        Some(raw) => Ok(OwnerId::parse(&raw)?),
        None if !require_auth => Ok(OwnerId::parse(LOCAL_DEV_OWNER)?),
        None => Err(AppError::bad_request(&format!(
            "Missing owner context: send {} or {}",
            CF_ACCESS_USER_HEADER, OWNER_HEADER
        ))),
    }
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, config: ServerConfig, forecast: ForecastConfig) -> Router {
    create_router_with_options(db, config, forecast, None)
}

/// Create the application router with a pinned clock (for testing)
pub fn create_router_with_options(
    db: Database,
    config: ServerConfig,
    forecast: ForecastConfig,
    today: Option<NaiveDate>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        forecast,
        today,
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Budget lifecycle
        .route(
            "/forecast/budget",
            get(handlers::load_budget)
                .put(handlers::save_budget)
                .delete(handlers::delete_budget),
        )
        .route("/forecast/budget/generate", post(handlers::generate_budget))
        .route("/forecast/budget/edits", post(handlers::edit_budget))
        // Derived views
        .route("/forecast/rolling", get(handlers::rolling_forecast))
        .route("/forecast/variance", get(handlers::variance))
        // Planned items
        .route(
            "/planned-items",
            get(handlers::list_planned_items).post(handlers::create_planned_item),
        )
        .route("/planned-items/:id", delete(handlers::delete_planned_item));

    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16, forecast: ForecastConfig) -> anyhow::Result<()> {
    serve_with_config(db, host, port, ServerConfig::default(), forecast).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
    forecast: ForecastConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        info!("ℹ️  No API keys configured (set CASHCAST_API_KEYS); only Cloudflare Access requests are accepted");
    }

    info!(
        currency = %forecast.reporting_currency,
        lookback_months = forecast.lookback_months,
        "Forecast settings loaded"
    );

    let app = create_router(db, config, forecast);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
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

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
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

    pub fn status(&self) -> StatusCode {
        self.status
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

impl From<cashcast_core::Error> for AppError {
    fn from(err: cashcast_core::Error) -> Self {
        match err {
            cashcast_core::Error::Validation(msg) => Self::bad_request(&msg),
            cashcast_core::Error::NotFound(what) => Self::not_found(&format!("{} not found", what)),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(other.into()),
            },
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}
