//! Authentication module providing credential verification and session tokens.
//!
//! This module implements session-based authentication with:
//! - Argon2id password hashing
//! - Signed, self-describing session tokens (no server-side session store)
//! - A configurable whitelist of user fields exposed in tokens and responses
//!
//! ## Example
//!
//! ```no_run
//! use sessions_api::auth::{
//!     AuthManager, Argon2Verifier, Credentials, SessionSettings, SessionSigner,
//! };
//! use sessions_api::store::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new().with_unique("User", "username"));
//!     let auth = AuthManager::new(
//!         store,
//!         Arc::new(Argon2Verifier),
//!         SessionSigner::new(SessionSettings::new("secret_at_least_32_characters_long")),
//!         "User",
//!     );
//!
//!     let outcome = auth
//!         .login(Credentials {
//!             username: "abc".to_string(),
//!             password: "123987".to_string(),
//!         })
//!         .await?;
//!     println!("Session token: {}", outcome.token);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod password;
pub mod session;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{Credentials, LoginOutcome, Projection};
pub use password::{Argon2Verifier, PasswordVerifier};
pub use session::{
    DEFAULT_COOKIE_NAME, DEFAULT_SESSION_TTL_SECS, SessionSettings, SessionSigner,
};
