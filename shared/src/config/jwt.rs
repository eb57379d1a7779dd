//! Token signing configuration

use serde::{Deserialize, Serialize};

/// JWT signing and lifetime configuration
///
/// Access and refresh tokens are signed with two independent secrets so the
/// key spaces can be rotated separately; a leaked access secret cannot be
/// used to mint refresh tokens or vice versa. Rotating a secret invalidates
/// every outstanding token of that kind immediately; the previous key is
/// not retained.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret key for signing access tokens
    pub access_secret: String,

    /// Secret key for signing refresh tokens
    pub refresh_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Algorithm for JWT signing (default: HS256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Whether a device-descriptor mismatch during refresh is treated as a
    /// compromised chain (revoke and fail) or merely logged
    #[serde(default = "default_strict_device_binding")]
    pub strict_device_binding: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from("access-dev-secret-change-in-production"),
            refresh_secret: String::from("refresh-dev-secret-change-in-production"),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            issuer: String::from("tokensmith"),
            audience: String::from("tokensmith-api"),
            algorithm: default_algorithm(),
            strict_device_binding: default_strict_device_binding(),
        }
    }
}

impl JwtConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let access_secret = std::env::var("JWT_ACCESS_SECRET")
            .unwrap_or_else(|_| defaults.access_secret.clone());
        let refresh_secret = std::env::var("JWT_REFRESH_SECRET")
            .unwrap_or_else(|_| defaults.refresh_secret.clone());
        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.access_token_expiry);
        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.refresh_token_expiry);
        let strict_device_binding = std::env::var("JWT_STRICT_DEVICE_BINDING")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.strict_device_binding);

        Self {
            access_secret,
            refresh_secret,
            access_token_expiry,
            refresh_token_expiry,
            strict_device_binding,
            ..defaults
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if either secret is still a development default (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == "access-dev-secret-change-in-production"
            || self.refresh_secret == "refresh-dev-secret-change-in-production"
    }
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_strict_device_binding() -> bool {
    true
}
