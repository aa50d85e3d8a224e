//! Typed HTTP client for the EVE SSO token endpoint and the ESI endpoints
//! this crate consumes.
//!
//! Responses are validated into the models in [`crate::model::esi`] at this
//! boundary; unexpected shapes become [`EsiError::MalformedResponse`] before
//! any business logic touches the data. Every request carries the
//! client-level timeout, so no scheduler tick can block indefinitely on a
//! single call.

pub mod oauth;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{esi::EsiError, Error};
use crate::model::esi::{CorporationAsset, CorporationStructure, UniverseStructure};

const DEFAULT_ESI_BASE: &str = "https://esi.evetech.net";
const DEFAULT_LOGIN_BASE: &str = "https://login.eveonline.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct EsiClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    esi_base: String,
    login_base: String,
}

impl EsiClient {
    pub fn builder() -> EsiClientBuilder {
        EsiClientBuilder::default()
    }

    pub(crate) fn login_base(&self) -> &str {
        &self.login_base
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn credentials(&self) -> (&str, &str) {
        (&self.client_id, &self.client_secret)
    }

    /// Lists all structures owned by the corporation.
    ///
    /// Requires a token with the `esi-corporations.read_structures.v1` scope.
    pub async fn get_corporation_structures(
        &self,
        access_token: &str,
        corporation_id: i64,
    ) -> Result<Vec<CorporationStructure>, EsiError> {
        let url = format!(
            "{}/latest/corporations/{}/structures/",
            self.esi_base, corporation_id
        );
        self.get_json(&url, access_token).await
    }

    /// Fetches the full corporation asset list in one request.
    ///
    /// Callers partition the result by `location_id` and `location_flag`
    /// locally, which bounds outbound requests to one per sync regardless of
    /// how many structures the corporation owns.
    pub async fn get_corporation_assets(
        &self,
        access_token: &str,
        corporation_id: i64,
    ) -> Result<Vec<CorporationAsset>, EsiError> {
        let url = format!(
            "{}/latest/corporations/{}/assets/",
            self.esi_base, corporation_id
        );
        self.get_json(&url, access_token).await
    }

    /// Resolves a structure ID to its display name.
    pub async fn get_structure_name(
        &self,
        access_token: &str,
        structure_id: i64,
    ) -> Result<String, EsiError> {
        let url = format!(
            "{}/latest/universe/structures/{}/",
            self.esi_base, structure_id
        );
        let structure: UniverseStructure = self.get_json(&url, access_token).await?;
        Ok(structure.name)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, EsiError> {
        let response = self.http.get(url).bearer_auth(access_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EsiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EsiError::MalformedResponse(e.to_string()))
    }
}

/// Builder for [`EsiClient`].
///
/// Base URLs are overridable so tests can point the client at a local mock
/// server; production code uses the defaults.
pub struct EsiClientBuilder {
    client_id: String,
    client_secret: String,
    user_agent: String,
    esi_base: String,
    login_base: String,
    timeout: Duration,
}

impl Default for EsiClientBuilder {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: "moonwatch".to_string(),
            esi_base: DEFAULT_ESI_BASE.to_string(),
            login_base: DEFAULT_LOGIN_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EsiClientBuilder {
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = client_id.to_string();
        self
    }

    pub fn client_secret(mut self, client_secret: &str) -> Self {
        self.client_secret = client_secret.to_string();
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn esi_base(mut self, esi_base: &str) -> Self {
        self.esi_base = esi_base.trim_end_matches('/').to_string();
        self
    }

    pub fn login_base(mut self, login_base: &str) -> Self {
        self.login_base = login_base.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<EsiClient, Error> {
        let http = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(EsiError::Request)?;

        Ok(EsiClient {
            http,
            client_id: self.client_id,
            client_secret: self.client_secret,
            esi_base: self.esi_base,
            login_base: self.login_base,
        })
    }
}
