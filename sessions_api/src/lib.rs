//! # Sessions API
//!
//! Core library for a session-based credential-verification service.
//!
//! Three narrow capabilities are wired together by an [`auth::AuthManager`]:
//!
//! - [`auth::PasswordVerifier`]: salted one-way password hashing and
//!   constant-time hash comparison (default: Argon2id)
//! - [`store::RecordStore`]: insert/find/delete of named record kinds with
//!   field-equality queries and uniqueness constraints (in-memory and
//!   PostgreSQL implementations)
//! - [`auth::SessionSigner`]: signed, self-describing session tokens
//!   carrying a whitelisted projection of a user record
//!
//! The server holds no session state: tokens are validated by signature and
//! expiry alone, and the password hash never appears in a token payload or
//! response projection.

/// Credential verification, password hashing, and session tokens.
pub mod auth;
pub use auth::{AuthError, AuthManager, AuthResult, Credentials};

/// Record storage abstraction and implementations.
pub mod store;
pub use store::{MemoryStore, PgRecordStore, Record, RecordStore, StoreError};
