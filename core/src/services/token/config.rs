//! Configuration for the token service

use tk_shared::config::JwtConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Access token expiry in seconds
    pub access_token_expiry: i64,
    /// Refresh token (and session) expiry in seconds
    pub refresh_token_expiry: i64,
    /// Whether a device-descriptor mismatch during refresh revokes the
    /// chain (true) or is merely logged (false)
    pub strict_device_binding: bool,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            strict_device_binding: true,
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
            strict_device_binding: config.strict_device_binding,
        }
    }
}
