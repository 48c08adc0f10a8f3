//! Session token issuing and parsing.
//!
//! Session tokens are self-describing: a signed projection of a user record
//! restricted to the configured expose list, validated by signature and
//! expiry rather than by server-side lookup.

use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{AuthError, AuthResult};
use super::models::Projection;
use crate::store::Record;

/// Default session token lifetime (24 hours)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24;

/// Default name of the cookie carrying the session token
pub const DEFAULT_COOKIE_NAME: &str = "userSession";

/// Session signing configuration
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// HMAC signing secret
    pub secret: String,
    /// Ordered list of record field names permitted in tokens and responses
    pub expose: Vec<String>,
    /// Name of the session cookie
    pub cookie_name: String,
    /// Token lifetime in seconds
    pub ttl_secs: u64,
}

impl SessionSettings {
    /// Settings with the default expose list (`id`, `username`), cookie
    /// name, and lifetime.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expose: vec!["id".to_string(), "username".to_string()],
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

/// JWT claims for a session token: the whitelisted record projection plus
/// standard expiry/issue timestamps.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    exp: i64,
    iat: i64,
    #[serde(flatten)]
    data: Projection,
}

/// Issues and parses signed session tokens (HS256).
#[derive(Clone)]
pub struct SessionSigner {
    settings: SessionSettings,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionSigner {
    /// Create a new signer from settings
    pub fn new(settings: SessionSettings) -> Self {
        let encoding = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding = DecodingKey::from_secret(settings.secret.as_bytes());
        Self {
            settings,
            encoding,
            decoding,
        }
    }

    /// Name of the cookie this signer's tokens are transported in
    pub fn cookie_name(&self) -> &str {
        &self.settings.cookie_name
    }

    /// Project a record onto the expose list.
    ///
    /// The record id is injected under `id`; the `password` field is
    /// excluded even if explicitly listed.
    pub fn project(&self, record: &Record) -> Projection {
        let mut projection = Projection::new();
        for field in &self.settings.expose {
            if field == "password" {
                continue;
            }
            if field == "id" {
                projection.insert("id".to_string(), Value::String(record.id.clone()));
            } else if let Some(value) = record.fields.get(field) {
                projection.insert(field.clone(), value.clone());
            }
        }
        projection
    }

    /// Issue a signed session token carrying the record's projection
    ///
    /// # Errors
    ///
    /// * `AuthError::Token` - Token signing failed
    pub fn issue(&self, record: &Record) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            exp: now + self.settings.ttl_secs as i64,
            iat: now,
            data: self.project(record),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Parse and validate a session token, returning its projection
    ///
    /// # Errors
    ///
    /// * `AuthError::SessionExpired` - Token past its expiry
    /// * `AuthError::SessionInvalid` - Malformed token or signature mismatch
    pub fn parse(&self, token: &str) -> AuthResult<Projection> {
        let token_data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => AuthError::SessionInvalid,
            })?;

        Ok(token_data.claims.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_record() -> Record {
        let mut fields = Projection::new();
        fields.insert("username".to_string(), json!("abc"));
        fields.insert("password".to_string(), json!("$argon2id$fake"));
        fields.insert("email".to_string(), json!("abc@example.com"));
        Record {
            id: "user-1".to_string(),
            fields,
        }
    }

    #[test]
    fn test_issue_parse_round_trip() {
        let signer = SessionSigner::new(SessionSettings::new("test-secret-test-secret-test-secret"));
        let token = signer.issue(&user_record()).expect("Failed to issue token");

        let projection = signer.parse(&token).expect("Failed to parse token");
        assert_eq!(projection.get("id"), Some(&json!("user-1")));
        assert_eq!(projection.get("username"), Some(&json!("abc")));
        assert!(projection.get("password").is_none());
        // exp/iat are consumed as registered claims, not projection fields
        assert!(projection.get("exp").is_none());
    }

    #[test]
    fn test_projection_respects_expose_list() {
        let mut settings = SessionSettings::new("test-secret-test-secret-test-secret");
        settings.expose = vec![
            "id".to_string(),
            "username".to_string(),
            "email".to_string(),
            "password".to_string(), // must be ignored
            "missing".to_string(),  // absent fields are skipped
        ];
        let signer = SessionSigner::new(settings);

        let projection = signer.project(&user_record());
        assert_eq!(projection.len(), 3);
        assert_eq!(projection.get("email"), Some(&json!("abc@example.com")));
        assert!(projection.get("password").is_none());
        assert!(projection.get("missing").is_none());
    }

    #[test]
    fn test_parse_rejects_tampered_token() {
        let signer = SessionSigner::new(SessionSettings::new("test-secret-test-secret-test-secret"));
        let token = signer.issue(&user_record()).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(matches!(
            signer.parse(&tampered),
            Err(AuthError::SessionInvalid)
        ));
        assert!(matches!(
            signer.parse("not.a.token"),
            Err(AuthError::SessionInvalid)
        ));
    }

    #[test]
    fn test_parse_rejects_foreign_secret() {
        let signer = SessionSigner::new(SessionSettings::new("test-secret-test-secret-test-secret"));
        let other = SessionSigner::new(SessionSettings::new("other-secret-other-secret-other-sec"));

        let token = other.issue(&user_record()).unwrap();
        assert!(matches!(signer.parse(&token), Err(AuthError::SessionInvalid)));
    }

    #[test]
    fn test_parse_rejects_expired_token() {
        let secret = "test-secret-test-secret-test-secret";
        let signer = SessionSigner::new(SessionSettings::new(secret));

        // Sign claims expired well past the default validation leeway
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            exp: now - 600,
            iat: now - 700,
            data: Projection::new(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(signer.parse(&token), Err(AuthError::SessionExpired)));
    }
}
