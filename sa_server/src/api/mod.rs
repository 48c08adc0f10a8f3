//! HTTP API for the credential session service.
//!
//! The API is built with:
//! - **Axum**: Async web framework
//! - **Tower**: CORS middleware
//! - **Signed cookies content**: The session token is a signed projection of
//!   the user record, transported in a cookie
//!
//! # Modules
//!
//! - [`sessions`]: The session endpoint (login, who-am-i, logout)
//! - [`request_id`]: Request ID propagation for log correlation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health   - Health check (public)
//! POST   <base>/   - Verify credentials, open a session (sets cookie)
//! GET    <base>/   - Current session (requires cookie)
//! DELETE <base>/   - Close session (requires cookie, clears it)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use sa_server::api::{AppState, create_router};
//! use sessions_api::auth::{Argon2Verifier, AuthManager, SessionSettings, SessionSigner};
//! use sessions_api::store::MemoryStore;
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let store = Arc::new(MemoryStore::new().with_unique("User", "username"));
//! let auth = AuthManager::new(
//!     store,
//!     Arc::new(Argon2Verifier),
//!     SessionSigner::new(SessionSettings::new("secret_at_least_32_characters_long")),
//!     "User",
//! );
//!
//! let state = AppState { auth: Arc::new(auth) };
//! let app = create_router(state, "/");
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:6969").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod request_id;
pub mod sessions;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use sessions_api::AuthManager;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    /// Authentication manager orchestrating store, hasher, and signer
    pub auth: Arc<AuthManager>,
}

/// Create the complete API router.
///
/// The session route answers POST/GET/DELETE on one path, mounted at
/// `base_path` (`/` mounts it at the root). CORS and request-id middleware
/// apply to all routes.
///
/// # Arguments
///
/// - `state`: Application state
/// - `base_path`: Mount point for the session route (must start with `/`)
pub fn create_router(state: AppState, base_path: &str) -> Router {
    let session_routes = Router::new().route(
        "/",
        post(sessions::create_session)
            .get(sessions::current_session)
            .delete(sessions::destroy_session),
    );

    let router = Router::new().route("/health", get(health_check));
    let router = if base_path == "/" || base_path.is_empty() {
        router.merge(session_routes)
    } else {
        router.nest(base_path, session_routes)
    };

    router
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
