use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for an isolated customer community (a Discord server).
///
/// All persisted state is partitioned by this key; no credential, structure,
/// or alert data is ever shared across tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Persisted OAuth2 credential for one `(tenant, corporation)` pair.
///
/// Created when the external callback endpoint completes an authorization
/// code exchange, mutated in place on every refresh, and deleted only by
/// explicit tenant removal. The access token is considered valid while
/// `now < issued_at + ttl_seconds` minus a safety margin for clock skew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub tenant_id: TenantId,
    pub corporation_id: i64,
    pub character_id: i64,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Set to the refresh *completion* time on every successful refresh.
    pub issued_at: DateTime<Utc>,
    pub ttl_seconds: i64,
}

impl CredentialRecord {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(self.ttl_seconds)
    }

    /// Whether the stored access token can be reused without a network call.
    ///
    /// # Arguments
    /// - `now` - Current UTC timestamp
    /// - `margin` - Safety margin subtracted from the token lifetime to
    ///   tolerate clock skew between this process and the auth server
    pub fn is_valid(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.access_token.is_some() && now + margin < self.expires_at()
    }

    /// Whether the token is missing, expired, or will expire within `horizon`.
    pub fn expires_within(&self, now: DateTime<Utc>, horizon: Duration) -> bool {
        self.access_token.is_none() || now + horizon >= self.expires_at()
    }
}

/// Event emitted by the external OAuth callback endpoint after a first-time
/// authorization code exchange. Consumed by
/// [`TokenLifecycleManager::register_issued_token`](crate::service::token::TokenLifecycleManager::register_issued_token).
#[derive(Debug, Clone)]
pub struct TokenIssued {
    pub tenant_id: TenantId,
    pub corporation_id: i64,
    pub character_id: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}
