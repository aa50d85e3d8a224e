use thiserror::Error;

use crate::model::credential::TenantId;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No usable refresh token exists for this tenant/corporation.
    ///
    /// Terminal for automation: only a fresh interactive OAuth grant through
    /// the external callback endpoint can recover from this, so schedulers
    /// surface it once and stop retrying every tick.
    #[error(
        "No usable refresh token for tenant {tenant} corporation {corporation_id}, \
        re-authentication through the login flow is required"
    )]
    NotAuthenticated {
        tenant: TenantId,
        corporation_id: i64,
    },
    /// The authorization server rejected the refresh-token grant.
    #[error("Authorization server rejected the token refresh ({status}): {description}")]
    RefreshDenied { status: u16, description: String },
    /// A 2xx token response that did not contain an access token.
    #[error("Malformed token response from authorization server: {0}")]
    MalformedResponse(String),
}
