//! Authentication manager implementation.

use std::sync::Arc;

use serde_json::Value;

use super::errors::{AuthError, AuthResult};
use super::models::{Credentials, LoginOutcome, Projection};
use super::password::PasswordVerifier;
use super::session::SessionSigner;
use crate::store::RecordStore;

/// Authentication manager.
///
/// Orchestrates the record store, password verifier, and session signer to
/// answer login and session-check requests. Collaborators are injected at
/// construction; any implementation of the capability traits is
/// substitutable.
pub struct AuthManager {
    store: Arc<dyn RecordStore>,
    verifier: Arc<dyn PasswordVerifier>,
    signer: SessionSigner,
    record_kind: String,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `store` - Record store holding user records
    /// * `verifier` - Password hashing/verification adapter
    /// * `signer` - Session token signer
    /// * `record_kind` - Name of the user record kind (e.g. `User`)
    pub fn new(
        store: Arc<dyn RecordStore>,
        verifier: Arc<dyn PasswordVerifier>,
        signer: SessionSigner,
        record_kind: impl Into<String>,
    ) -> Self {
        Self {
            store,
            verifier,
            signer,
            record_kind: record_kind.into(),
        }
    }

    /// Get the session signer (cookie name, projection rules)
    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    /// Get the configured record kind
    pub fn record_kind(&self) -> &str {
        &self.record_kind
    }

    /// Verify credentials and issue a session token
    ///
    /// Looks up the user record by username and verifies the password
    /// against the stored hash. An unknown username is treated identically
    /// to a wrong password so login responses never reveal whether an
    /// account exists.
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingCredentials` - Username or password blank
    /// * `AuthError::InvalidCredentials` - Unknown username or wrong password
    /// * `AuthError::Store` - Record store failure
    /// * `AuthError::Token` - Token signing failure
    pub async fn login(&self, credentials: Credentials) -> AuthResult<LoginOutcome> {
        if credentials.username.trim().is_empty() || credentials.password.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let mut query = Projection::new();
        query.insert(
            "username".to_string(),
            Value::String(credentials.username.clone()),
        );

        let record = self
            .store
            .find(&self.record_kind, &query)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // A record without a stored hash can never authenticate
        let stored_hash = record
            .fields
            .get("password")
            .and_then(Value::as_str)
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verifier.verify(&credentials.password, stored_hash) {
            tracing::warn!(username = %credentials.username, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer.issue(&record)?;

        Ok(LoginOutcome {
            user: self.signer.project(&record),
            token,
        })
    }

    /// Validate a presented session token and return its projection
    ///
    /// # Errors
    ///
    /// * `AuthError::SessionMissing` - No token presented
    /// * `AuthError::SessionInvalid` - Malformed token or signature mismatch
    /// * `AuthError::SessionExpired` - Token past its expiry
    pub fn authenticate(&self, token: Option<&str>) -> AuthResult<Projection> {
        let token = token.ok_or(AuthError::SessionMissing)?;
        self.signer.parse(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Argon2Verifier;
    use crate::auth::session::SessionSettings;
    use crate::store::MemoryStore;
    use serde_json::json;

    const SECRET: &str = "test-secret-test-secret-test-secret";

    async fn manager_with_user(username: &str, password: &str) -> AuthManager {
        let store = Arc::new(MemoryStore::new().with_unique("User", "username"));
        let verifier = Arc::new(Argon2Verifier);

        let mut fields = Projection::new();
        fields.insert("username".to_string(), json!(username));
        fields.insert(
            "password".to_string(),
            json!(verifier.hash(password).unwrap()),
        );
        store.insert("User", fields).await.unwrap();

        AuthManager::new(
            store,
            verifier,
            SessionSigner::new(SessionSettings::new(SECRET)),
            "User",
        )
    }

    #[tokio::test]
    async fn test_login_with_correct_credentials() {
        let manager = manager_with_user("abc", "123987").await;

        let outcome = manager
            .login(Credentials {
                username: "abc".to_string(),
                password: "123987".to_string(),
            })
            .await
            .expect("Login should succeed");

        assert_eq!(outcome.user.get("username"), Some(&json!("abc")));
        assert!(outcome.user.get("id").is_some());
        assert!(outcome.user.get("password").is_none());

        // The issued token authenticates back to the same projection
        let projection = manager.authenticate(Some(outcome.token.as_str())).unwrap();
        assert_eq!(projection, outcome.user);
    }

    #[tokio::test]
    async fn test_login_with_unknown_username() {
        let manager = manager_with_user("abc", "123987").await;

        let err = manager
            .login(Credentials {
                username: "abcdef".to_string(),
                password: "123987".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let manager = manager_with_user("abc", "123987").await;

        let err = manager
            .login(Credentials {
                username: "abc".to_string(),
                password: "456".to_string(),
            })
            .await
            .unwrap_err();

        // Indistinguishable from the unknown-username failure
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_with_blank_fields() {
        let manager = manager_with_user("abc", "123987").await;

        for (username, password) in [("", "123987"), ("abc", ""), ("  ", "123987")] {
            let err = manager
                .login(Credentials {
                    username: username.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::MissingCredentials));
        }
    }

    #[tokio::test]
    async fn test_authenticate_without_token() {
        let manager = manager_with_user("abc", "123987").await;

        assert!(matches!(
            manager.authenticate(None),
            Err(AuthError::SessionMissing)
        ));
        assert!(matches!(
            manager.authenticate(Some("garbage")),
            Err(AuthError::SessionInvalid)
        ));
    }

    #[tokio::test]
    async fn test_login_with_record_missing_hash() {
        let store = Arc::new(MemoryStore::new());
        let mut fields = Projection::new();
        fields.insert("username".to_string(), json!("abc"));
        store.insert("User", fields).await.unwrap();

        let manager = AuthManager::new(
            store,
            Arc::new(Argon2Verifier),
            SessionSigner::new(SessionSettings::new(SECRET)),
            "User",
        );

        let err = manager
            .login(Credentials {
                username: "abc".to_string(),
                password: "123987".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
