//! JagaDoku Web Server
//!
//! Axum-based REST API for the JagaDoku personal finance tracker.
//!
//! Security features:
//! - Bearer API-key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Security headers on every response
//! - Sanitized error responses
//!
//! The application context sits behind a `tokio::sync::Mutex`. Handlers that
//! talk to Google or the AI backend take a snapshot, release the lock for the
//! network call and lock again to apply the result.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use jagadoku_core::ai::{AIBackend, AIClient};
use jagadoku_core::identity::IdentityProvider;
use jagadoku_core::sync::SpreadsheetBackend;
use jagadoku_core::{AppContext, Config};

mod handlers;

/// Longest horizon accepted by the simulator endpoint
pub const MAX_PROJECTION_YEARS: u32 = 100;

const HEALTH_PATH: &str = "/api/health";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as `Authorization: Bearer <key>`
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

/// Parse a comma-separated list of API keys, ignoring blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Remote collaborators used by the handlers
#[derive(Clone)]
pub struct Backends {
    pub ai: Option<AIClient>,
    pub sheets: Arc<dyn SpreadsheetBackend>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Backends {
    /// Google Sheets, Google userinfo and the configured AI backend
    pub fn from_config(config: &Config) -> Self {
        Self {
            ai: config.ai_client(),
            sheets: Arc::new(config.sheets_client()),
            identity: Arc::new(config.identity()),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub ctx: Mutex<AppContext>,
    pub config: ServerConfig,
    pub ai: Option<AIClient>,
    pub sheets: Arc<dyn SpreadsheetBackend>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// API key from an `Authorization: Bearer <key>` header
fn bearer_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION_HEADER)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Rejects requests without a valid API key unless auth is disabled
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth || request.uri().path() == HEALTH_PATH {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let authorized = bearer_key(request.headers())
        .is_some_and(|key| validate_api_key(key, &state.config.api_keys));

    if authorized {
        debug!(path = %path, "API key accepted");
        next.run(request).await
    } else {
        warn!(path = %path, "Rejected request without valid API key");
        AppError::new(StatusCode::UNAUTHORIZED, "Authentication required").into_response()
    }
}

/// Constant-time match against any configured key
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    valid_keys.iter().any(|key| {
        key.len() == provided.len() && bool::from(key.as_bytes().ct_eq(provided.as_bytes()))
    })
}

/// How the caller authenticated: "api-key" or "none"
pub fn auth_method(headers: &HeaderMap) -> &'static str {
    if bearer_key(headers).is_some() {
        "api-key"
    } else {
        "none"
    }
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(
    ctx: AppContext,
    backends: Backends,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    match &backends.ai {
        Some(client) => info!(
            backend = client.backend_name(),
            model = client.model(),
            "AI backend configured"
        ),
        None => info!("ℹ️  AI backend not configured (set GEMINI_API_KEY or OLLAMA_HOST to enable advice)"),
    }

    let state = Arc::new(AppState {
        ctx: Mutex::new(ctx),
        config: config.clone(),
        ai: backends.ai,
        sheets: backends.sheets,
        identity: backends.identity,
    });

    let api_routes = Router::new()
        .route("/me", get(handlers::get_me))
        .route("/dashboard", get(handlers::get_dashboard))
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/:id", delete(handlers::delete_transaction))
        .route("/goals", get(handlers::list_goals).post(handlers::create_goal))
        .route("/goals/:id/contribute", post(handlers::contribute_to_goal))
        .route("/simulate", get(handlers::simulate))
        .route("/advice", post(handlers::request_advice))
        .route("/session/login", post(handlers::login))
        .route("/session/guest", post(handlers::login_as_guest))
        .route("/session/logout", post(handlers::logout))
        .route("/sync", post(handlers::sync_now))
        .route("/notifications", get(handlers::list_notifications))
        .route("/categories", get(handlers::list_categories))
        .route("/health", get(handlers::health));

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    // No configured origins means no cross-origin access at all
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' https: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
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
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    ctx: AppContext,
    backends: Backends,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }

    check_ai_connection(backends.ai.as_ref()).await;

    let app = create_router(ctx, backends, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    match ai {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ AI backend connected: {} ({})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} ({})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  AI backend not configured (set GEMINI_API_KEY or OLLAMA_HOST to enable advice)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Message for failures whose details stay in the server log
const GENERIC_ERROR: &str = "An internal error occurred";

/// Error response: `{"error": message}` with a status code
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn unavailable(msg: &str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, status = %self.status, "Request failed");
        }
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<jagadoku_core::Error> for AppError {
    fn from(err: jagadoku_core::Error) -> Self {
        use jagadoku_core::Error as E;

        let (status, message) = match &err {
            E::Auth(_) => (StatusCode::UNAUTHORIZED, err.to_string()),
            E::Busy(_) => (StatusCode::CONFLICT, err.to_string()),
            E::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            E::InvalidData(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            e if e.is_remote() => (StatusCode::BAD_GATEWAY, err.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR.to_string()),
        };

        Self {
            status,
            message,
            internal: Some(err.into()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            internal: Some(err),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR)
        }
    }
}

#[cfg(test)]
mod tests;
