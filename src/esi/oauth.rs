//! OAuth2 refresh-token grant against the EVE SSO token endpoint.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{auth::AuthError, esi::EsiError, Error};
use crate::model::esi::{OauthErrorResponse, OauthTokenResponse};

impl super::EsiClient {
    /// Exchanges a refresh token for a new access token.
    ///
    /// Performs a single form-encoded POST with HTTP Basic authentication
    /// built from the configured client id and secret. This method never
    /// touches persisted state; the caller decides what to store.
    ///
    /// # Returns
    /// - `Ok(OauthTokenResponse)` - New access token, optionally a rotated
    ///   refresh token, and its lifetime in seconds
    /// - `Err(Error::EsiError)` - Transport failure (transient, retry-eligible)
    /// - `Err(Error::AuthError)` - The server rejected the grant
    ///   (`RefreshDenied`) or answered 2xx without an access token
    ///   (`MalformedResponse`)
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<OauthTokenResponse, Error> {
        let url = format!("{}/v2/oauth/token", self.login_base());
        let (client_id, client_secret) = self.credentials();
        let basic = BASE64.encode(format!("{client_id}:{client_secret}"));

        let response = self
            .http()
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {basic}"))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(EsiError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let error: OauthErrorResponse = response.json().await.unwrap_or_default();
            return Err(AuthError::RefreshDenied {
                status: status.as_u16(),
                description: error
                    .error_description
                    .or(error.error)
                    .unwrap_or_else(|| "No error description provided.".to_string()),
            }
            .into());
        }

        response
            .json::<OauthTokenResponse>()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()).into())
    }
}
