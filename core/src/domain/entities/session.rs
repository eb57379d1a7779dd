//! Refresh session entity and its rotation state machine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a refresh session
///
/// `Active` is the only state a refresh exchange may consume. `Rotated` and
/// `Revoked` are one-way: once a session leaves `Active` it never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Rotated,
    Revoked,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Rotated => "rotated",
            SessionStatus::Revoked => "revoked",
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(SessionStatus::Active),
            "rotated" => Ok(SessionStatus::Rotated),
            "revoked" => Ok(SessionStatus::Revoked),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

/// Persistent record of an issued refresh session
///
/// Sessions belonging to one login lineage share a `rotation_chain` id; at
/// most one session per chain is `Active` at any time. `expires_at` is fixed
/// at creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSession {
    /// Unique identifier for the session (refresh token subject)
    pub id: Uuid,

    /// User this session belongs to
    pub user_id: Uuid,

    /// Device descriptor supplied at login, stored verbatim
    pub device_fingerprint: String,

    /// Lineage id shared by every session produced by successive rotations
    pub rotation_chain: Uuid,

    /// Current lifecycle state
    pub status: SessionStatus,

    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the session expires
    pub expires_at: DateTime<Utc>,
}

impl RefreshSession {
    /// Creates the first session of a fresh rotation chain
    pub fn new(
        user_id: Uuid,
        device_fingerprint: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            device_fingerprint: device_fingerprint.into(),
            rotation_chain: Uuid::new_v4(),
            status: SessionStatus::Active,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Creates the successor session after a successful rotation
    ///
    /// The successor joins the same rotation chain, records the fingerprint
    /// presented at the exchange, and gets a full lifetime window equal to
    /// the predecessor's.
    pub fn successor(&self, device_fingerprint: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            device_fingerprint: device_fingerprint.into(),
            rotation_chain: self.rotation_chain,
            status: SessionStatus::Active,
            created_at: now,
            expires_at: now + self.lifetime(),
        }
    }

    /// Duration this session was valid for when created
    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.created_at
    }

    /// Whether the session may be consumed by a refresh exchange
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whether the session is expired at the given instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Marks the session consumed by rotation
    pub fn mark_rotated(&mut self) {
        self.status = SessionStatus::Rotated;
    }

    /// Marks the session revoked
    pub fn revoke(&mut self) {
        self.status = SessionStatus::Revoked;
    }
}
