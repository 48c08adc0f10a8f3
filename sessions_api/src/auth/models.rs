//! Authentication data models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whitelisted projection of a user record. The shape of both response
/// bodies and session token payloads; never contains the password hash.
pub type Projection = Map<String, Value>;

/// Login request credentials. Deserialized per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Whitelisted user projection to return to the client
    pub user: Projection,
    /// Signed session token to transport in the session cookie
    pub token: String,
}
