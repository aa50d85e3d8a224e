//! Credential lifecycle: reuse, refresh, or fail.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::data::credential::CredentialStore;
use crate::error::{auth::AuthError, Error};
use crate::esi::EsiClient;
use crate::model::credential::{CredentialRecord, TenantId, TokenIssued};

/// Safety margin subtracted from a token's lifetime before it is considered
/// expired, tolerating clock skew against the authorization server.
pub const TOKEN_VALIDITY_MARGIN_SECONDS: i64 = 60;

/// How far ahead the proactive refresh loop looks for expiring tokens.
/// Twice the refresh tick interval, so a token is never allowed to lapse
/// between two ticks.
pub const REFRESH_HORIZON_SECONDS: i64 = 600;

/// Exchanges a refresh token for a fresh credential record.
///
/// Single-writer discipline: this component never mutates persisted state,
/// it only returns the record the caller should store.
pub struct CredentialRefresher {
    esi: Arc<EsiClient>,
}

impl CredentialRefresher {
    /// Creates a new instance of [`CredentialRefresher`]
    pub fn new(esi: Arc<EsiClient>) -> Self {
        Self { esi }
    }

    /// Performs one refresh-token grant and builds the successor record.
    ///
    /// The new record's `issued_at` is the refresh *completion* time, not the
    /// request time, and a rotated refresh token from the server always
    /// replaces the stored one; when the server omits it, the previous
    /// refresh token is carried forward.
    pub async fn refresh(&self, record: &CredentialRecord) -> Result<CredentialRecord, Error> {
        let refresh_token =
            record
                .refresh_token
                .as_deref()
                .ok_or_else(|| AuthError::NotAuthenticated {
                    tenant: record.tenant_id.clone(),
                    corporation_id: record.corporation_id,
                })?;

        let response = self.esi.refresh_token(refresh_token).await?;

        Ok(CredentialRecord {
            access_token: Some(response.access_token),
            refresh_token: response
                .refresh_token
                .or_else(|| record.refresh_token.clone()),
            issued_at: Utc::now(),
            ttl_seconds: response.expires_in,
            ..record.clone()
        })
    }
}

/// Public entry point for obtaining usable access tokens.
///
/// Decides per call whether to reuse the stored token, refresh it, or fail
/// with [`AuthError::NotAuthenticated`]. All persisted mutation of credential
/// records happens here, under the store's per-entry lock, so a scheduled
/// refresh and a user-triggered one cannot interleave.
pub struct TokenLifecycleManager {
    store: Arc<CredentialStore>,
    refresher: CredentialRefresher,
}

impl TokenLifecycleManager {
    /// Creates a new instance of [`TokenLifecycleManager`]
    pub fn new(store: Arc<CredentialStore>, esi: Arc<EsiClient>) -> Self {
        Self {
            store,
            refresher: CredentialRefresher::new(esi),
        }
    }

    /// Returns a currently valid access token for the pair.
    ///
    /// No network call is made while the stored token is valid within the
    /// safety margin. An expired token with a refresh token on file is
    /// refreshed and persisted before returning; without a refresh token the
    /// tenant requires a fresh interactive grant.
    ///
    /// # Returns
    /// - `Ok(String)` - A valid access token
    /// - `Err(Error::AuthError)` - `NotAuthenticated`, `RefreshDenied`, or a
    ///   malformed token response
    /// - `Err(Error::EsiError)` - Transient network failure during refresh
    pub async fn get_valid_access_token(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
    ) -> Result<String, Error> {
        let lock = self.store.entry_lock(tenant, corporation_id);
        let _guard = lock.lock().await;

        let record = self
            .store
            .get(tenant, corporation_id)?
            .ok_or_else(|| AuthError::NotAuthenticated {
                tenant: tenant.clone(),
                corporation_id,
            })?;

        if record.is_valid(Utc::now(), Duration::seconds(TOKEN_VALIDITY_MARGIN_SECONDS)) {
            if let Some(token) = record.access_token {
                return Ok(token);
            }
        }

        self.refresh_and_store(record).await
    }

    /// Refreshes the pair's token if it expires within `horizon`.
    ///
    /// Used by the proactive refresh loop; returns `Ok(None)` without any
    /// network call when the stored token comfortably outlives the horizon.
    pub async fn refresh_near_expiry(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
        horizon: Duration,
    ) -> Result<Option<String>, Error> {
        let lock = self.store.entry_lock(tenant, corporation_id);
        let _guard = lock.lock().await;

        let record = self
            .store
            .get(tenant, corporation_id)?
            .ok_or_else(|| AuthError::NotAuthenticated {
                tenant: tenant.clone(),
                corporation_id,
            })?;

        if !record.expires_within(Utc::now(), horizon) {
            return Ok(None);
        }

        self.refresh_and_store(record).await.map(Some)
    }

    /// Consumes a `TokenIssued` event from the external OAuth callback and
    /// persists the first credential record for the pair.
    pub fn register_issued_token(&self, issued: TokenIssued) -> Result<CredentialRecord, Error> {
        let record = CredentialRecord {
            tenant_id: issued.tenant_id,
            corporation_id: issued.corporation_id,
            character_id: issued.character_id,
            access_token: Some(issued.access_token),
            refresh_token: Some(issued.refresh_token),
            issued_at: Utc::now(),
            ttl_seconds: issued.expires_in,
        };
        self.store.put(&record)?;

        tracing::info!(
            tenant = %record.tenant_id,
            corporation_id = record.corporation_id,
            "Registered credentials from authorization grant"
        );
        Ok(record)
    }

    /// Explicit tenant removal, the only path that deletes credentials.
    pub fn remove_tenant(&self, tenant: &TenantId) -> Result<usize, Error> {
        Ok(self.store.remove_tenant(tenant)?)
    }

    async fn refresh_and_store(&self, record: CredentialRecord) -> Result<String, Error> {
        if record.refresh_token.is_none() {
            return Err(AuthError::NotAuthenticated {
                tenant: record.tenant_id.clone(),
                corporation_id: record.corporation_id,
            }
            .into());
        }

        let refreshed = self.refresher.refresh(&record).await?;
        self.store.put(&refreshed)?;

        tracing::debug!(
            tenant = %refreshed.tenant_id,
            corporation_id = refreshed.corporation_id,
            "Access token refreshed"
        );

        refreshed.access_token.ok_or_else(|| {
            AuthError::MalformedResponse("refresh produced no access token".to_string()).into()
        })
    }
}
