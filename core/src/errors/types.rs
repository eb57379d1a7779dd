//! Domain-specific error types for credential and session operations
//!
//! Token errors cover signed-credential verification failures. Session
//! errors cover the rotation state machine. Every session-level failure
//! during a refresh renders the presented token unusable; callers are
//! expected to discard it and require re-authentication.

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid claims")]
    InvalidClaims,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Session rotation errors
///
/// `ReplayDetected` and `ConcurrentModification` both revoke the session's
/// whole rotation chain before they reach the caller; the difference is only
/// how the condition was observed (stale status on read vs. a lost
/// compare-and-set race).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Refresh token replay detected")]
    ReplayDetected,

    #[error("Session was rotated concurrently")]
    ConcurrentModification,

    #[error("Device mismatch for session")]
    DeviceMismatch,
}

/// Account-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,
}
