//! Credential signer implementation

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use tk_shared::config::JwtConfig;

use crate::clock::Clock;
use crate::domain::entities::token::{Claims, TokenKind};
use crate::errors::{DomainError, DomainResult, TokenError};

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Stateless signer and verifier for access and refresh tokens
///
/// Each token kind is signed with its own secret, so the two key spaces
/// rotate independently and a compromise of one cannot forge tokens of the
/// other kind. Expiry is checked against the injected clock rather than by
/// the JWT library, which keeps time-dependent behavior deterministic under
/// test.
pub struct CredentialSigner {
    access: KeyPair,
    refresh: KeyPair,
    algorithm: Algorithm,
    validation: Validation,
    issuer: String,
    audience: String,
    clock: Arc<dyn Clock>,
}

impl CredentialSigner {
    /// Creates a signer from the JWT configuration
    ///
    /// Fails if the configured algorithm is unknown or not an HMAC variant;
    /// key material here is always a shared secret.
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        let algorithm =
            Algorithm::from_str(&config.algorithm).map_err(|_| DomainError::Internal {
                message: format!("unknown signing algorithm: {}", config.algorithm),
            })?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(DomainError::Internal {
                message: format!(
                    "signing algorithm {} requires asymmetric keys, only HMAC is supported",
                    config.algorithm
                ),
            });
        }

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        // expiry is enforced against the injected clock in verify()
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            access: KeyPair {
                encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            },
            refresh: KeyPair {
                encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            },
            algorithm,
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            clock,
        })
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Signs a token of the given kind
    ///
    /// # Arguments
    /// * `subject` - User id for access tokens, session id for refresh tokens
    /// * `kind` - Token kind, selects the signing key
    /// * `ttl` - Must be positive; expiry = issued-at + ttl
    ///
    /// # Returns
    /// * `Ok((token, issued_at))` - The compact token and its issue instant
    pub fn issue(
        &self,
        subject: Uuid,
        kind: TokenKind,
        ttl: Duration,
    ) -> DomainResult<(String, DateTime<Utc>)> {
        if ttl <= Duration::zero() {
            return Err(DomainError::Validation {
                message: "token ttl must be positive".to_string(),
            });
        }

        let issued_at = self.clock.now();
        let claims = Claims::new(
            subject,
            kind,
            issued_at,
            issued_at + ttl,
            &self.issuer,
            &self.audience,
        );

        let token = encode(&Header::new(self.algorithm), &claims, &self.keys(kind).encoding)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))?;

        Ok((token, issued_at))
    }

    /// Verifies a token and returns its claims
    ///
    /// Fails if the signature does not verify against the expected kind's
    /// key, if the kind claim mismatches, or if the token is expired at the
    /// clock's current instant.
    pub fn verify(&self, token: &str, expected_kind: TokenKind) -> DomainResult<Claims> {
        let data = decode::<Claims>(token, &self.keys(expected_kind).decoding, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    DomainError::Token(TokenError::InvalidSignature)
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer
                | jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    DomainError::Token(TokenError::InvalidClaims)
                }
                _ => DomainError::Token(TokenError::InvalidTokenFormat),
            })?;

        let claims = data.claims;
        if claims.kind != expected_kind {
            return Err(DomainError::Token(TokenError::InvalidClaims));
        }
        if claims.is_expired(self.clock.now()) {
            return Err(DomainError::Token(TokenError::TokenExpired));
        }

        Ok(claims)
    }
}
