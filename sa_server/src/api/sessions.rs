//! Session API handlers.
//!
//! One route, three methods:
//! - `POST` verifies credentials and opens a session
//! - `GET` reports the current session
//! - `DELETE` closes the session
//!
//! The session token travels in a cookie (default name `userSession`); the
//! response body is always the whitelisted user projection, never the
//! password hash.
//!
//! # Examples
//!
//! Log in:
//! ```bash
//! curl -X POST http://localhost:6969/ \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "abc", "password": "123987"}'
//! ```
//!
//! Check the current session:
//! ```bash
//! curl http://localhost:6969/ --cookie "userSession=<token>"
//! ```

use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use sessions_api::auth::{AuthError, Credentials, Projection};

use super::AppState;
use crate::{logging, metrics};

/// Login request body. Fields are optional at the deserialization layer so
/// missing keys map to a 400 instead of a body rejection.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Authenticate a user and open a session.
///
/// Verifies the posted credentials against the stored password hash and, on
/// success, sets the session cookie.
///
/// # Request Body
///
/// ```json
/// {
///   "username": "abc",
///   "password": "123987"
/// }
/// ```
///
/// # Response
///
/// On success, returns `201 Created` with the whitelisted user projection
/// and the session cookie:
/// ```json
/// {
///   "id": "3f8c...",
///   "username": "abc"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing or blank username/password; no cookie is set
/// - `401 Unauthorized`: Unknown username or wrong password — deliberately
///   indistinguishable; no cookie is set
/// - `500 Internal Server Error`: Store or signing failure; details are not
///   exposed in the body
pub async fn create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(StatusCode, CookieJar, Json<Projection>), (StatusCode, Json<ErrorResponse>)> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        metrics::login_attempts_total("missing_fields");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: AuthError::MissingCredentials.client_message(),
            }),
        ));
    };

    match state.auth.login(Credentials { username, password }).await {
        Ok(outcome) => {
            metrics::login_attempts_total("success");
            let cookie = Cookie::build((
                state.auth.signer().cookie_name().to_string(),
                outcome.token,
            ))
            .path("/")
            .http_only(true)
            .build();

            Ok((StatusCode::CREATED, jar.add(cookie), Json(outcome.user)))
        }
        Err(e) => {
            let status = match e {
                AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };

            match status {
                StatusCode::UNAUTHORIZED => {
                    logging::log_security_event("failed_login", None, "Invalid credentials");
                    metrics::login_attempts_total("invalid_credentials");
                }
                StatusCode::BAD_REQUEST => metrics::login_attempts_total("missing_fields"),
                _ => metrics::login_attempts_total("error"),
            }

            Err((
                status,
                Json(ErrorResponse {
                    error: e.client_message(),
                }),
            ))
        }
    }
}

/// Report the current session (who-am-i).
///
/// # Response
///
/// On success, returns `200 OK` with the projection decoded from the
/// session token — the same body the login response carried.
///
/// # Errors
///
/// - `401 Unauthorized`: No, invalid, or expired session cookie; empty body
pub async fn current_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Projection>, StatusCode> {
    let token = jar
        .get(state.auth.signer().cookie_name())
        .map(|cookie| cookie.value().to_string());

    match state.auth.authenticate(token.as_deref()) {
        Ok(projection) => {
            metrics::session_checks_total(true);
            Ok(Json(projection))
        }
        Err(_) => {
            metrics::session_checks_total(false);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Close the current session.
///
/// Clears the session cookie. The token itself is self-describing, so there
/// is no server-side session state to remove.
///
/// # Response
///
/// On success, returns `204 No Content` with an empty body and a removal
/// cookie.
///
/// # Errors
///
/// - `401 Unauthorized`: No, invalid, or expired session cookie; empty body
pub async fn destroy_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), StatusCode> {
    let cookie_name = state.auth.signer().cookie_name().to_string();
    let token = jar.get(&cookie_name).map(|cookie| cookie.value().to_string());

    if state.auth.authenticate(token.as_deref()).is_err() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    metrics::sessions_destroyed_total();

    // Removal cookie must match the attributes the session cookie was set with
    let mut removal = Cookie::new(cookie_name, "");
    removal.set_path("/");

    Ok((StatusCode::NO_CONTENT, jar.remove(removal)))
}
