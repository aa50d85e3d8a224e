//! Typed wire models for the EVE SSO and ESI endpoints this crate consumes.
//!
//! Responses are validated into these shapes at the API boundary; anything
//! that fails to deserialize surfaces as a declared error before business
//! logic touches the data.

use serde::{Deserialize, Serialize};

/// Successful response from the SSO token endpoint for either grant type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthTokenResponse {
    pub access_token: String,
    /// Refresh tokens may rotate; `None` means the previous one stays valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Error body returned by the SSO token endpoint on a rejected grant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OauthErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Entry of `GET /corporations/{corporation_id}/structures/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporationStructure {
    pub structure_id: i64,
    pub type_id: i64,
    #[serde(default)]
    pub services: Vec<StructureService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureService {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Entry of `GET /corporations/{corporation_id}/assets/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporationAsset {
    pub location_id: i64,
    pub location_flag: String,
    pub type_id: i64,
    pub quantity: i64,
}

/// Response of `GET /universe/structures/{structure_id}/`.
///
/// The endpoint returns more fields (solar system, position); only the
/// display name is consumed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseStructure {
    pub name: String,
}
