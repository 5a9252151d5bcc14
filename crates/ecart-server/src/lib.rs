//! Ecart Web Server
//!
//! Axum-based REST API for the Ecart budget tracking backend.
//!
//! Security features:
//! - Caller resolution before any route (API key, registered user header,
//!   or local-dev admin when authentication is disabled)
//! - Role checks through the core authorization predicate
//! - Restrictive CORS policy
//! - Audit logging for all API reads
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use ecart_core::{Caller, ReportConfig, Role, Store};

mod handlers;

/// Maximum audit log page size
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header naming a registered user (set by a trusted front end)
pub const USER_HEADER: &str = "x-ecart-user";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Identity reported for API key callers
pub const API_KEY_USER: &str = "api-key";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as `Authorization: Bearer <key>`; they act as admin
    pub api_keys: Vec<String>,
    /// Admin account created at startup if missing
    pub admin_username: Option<String>,
    /// Designated centres and column padding for the export
    pub report: ReportConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
            admin_username: None,
            report: ReportConfig::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: ServerConfig,
}

/// How the caller was authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
    UserHeader,
    /// Authentication disabled
    None,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::UserHeader => "user_header",
            Self::None => "none",
        }
    }
}

/// Resolved identity, stored in request extensions by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub caller: Caller,
    pub method: AuthMethod,
}

/// Authentication middleware
///
/// Resolution order: a valid API key, then the user header (which must name
/// a registered user), then the local-dev admin when `require_auth` is off.
/// API keys are compared in constant time.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match resolve_caller(&state, request.headers()) {
        Ok(Some(auth)) => {
            debug!(
                user = %auth.caller.username,
                method = auth.method.as_str(),
                path = %path,
                "Authenticated request"
            );
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
        Ok(None) => {
            warn!(path = %path, "Unauthorized request - no valid auth");
            AppError::unauthorized("Authentication required").into_response()
        }
        Err(err) => err.into_response(),
    }
}

fn resolve_caller(state: &AppState, headers: &HeaderMap) -> Result<Option<AuthContext>, AppError> {
    let api_key_valid = headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        return Ok(Some(AuthContext {
            caller: Caller::new(API_KEY_USER, Role::Admin),
            method: AuthMethod::ApiKey,
        }));
    }

    let header_user = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    if let Some(username) = header_user {
        return match state.store.get_user_by_username(username)? {
            Some(user) => Ok(Some(AuthContext {
                caller: Caller::new(user.username, user.role),
                method: AuthMethod::UserHeader,
            })),
            None => {
                warn!(user = %username, "Unknown user in {} header", USER_HEADER);
                Ok(None)
            }
        };
    }

    if !state.config.require_auth {
        return Ok(Some(AuthContext {
            caller: Caller::local_admin(),
            method: AuthMethod::None,
        }));
    }

    Ok(None)
}

/// Validate an API key against the configured keys using constant-time comparison
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

/// Split a comma-separated environment value, dropping blanks
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Create `username` as an admin unless a user with that name exists
///
/// Returns true when the account was created.
pub fn bootstrap_admin(store: &dyn Store, username: &str) -> ecart_core::Result<bool> {
    if store.get_user_by_username(username)?.is_some() {
        debug!(user = %username, "Admin bootstrap skipped, user exists");
        return Ok(false);
    }
    store.create_user(username, Role::Admin)?;
    info!(user = %username, "Created initial admin user");
    Ok(true)
}

/// Create the application router
pub fn create_router(store: Arc<dyn Store>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        store,
        config: config.clone(),
    });

    let api_routes = Router::new()
        .route("/predictions", get(handlers::get_prediction))
        .route("/export/budgets", get(handlers::export_budgets))
        .route("/me", get(handlers::get_me))
        .route("/audit", get(handlers::list_audit_log));

    let methods = [Method::GET, Method::OPTIONS];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
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
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    store: Arc<dyn Store>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }

    if let Some(username) = &config.admin_username {
        bootstrap_admin(store.as_ref(), username)?;
    }

    let app = create_router(store, config);
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
    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: &str) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Map core errors that carry a client-facing meaning to their status;
    /// everything else becomes a sanitized 500
    pub fn from_core(err: ecart_core::Error) -> Self {
        use ecart_core::Error;

        match err {
            Error::PermissionDenied(msg) => Self::forbidden(&msg),
            Error::NotFound(msg) => Self::not_found(&msg),
            Error::InvalidData(msg) => Self::bad_request(&msg),
            other => other.into(),
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
