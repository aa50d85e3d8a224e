//! Error types for the Moonwatch core.
//!
//! Domain-specific error enums (authentication, ESI, persistence,
//! configuration) are defined in submodules and aggregated into a single
//! [`Error`] type via `thiserror`'s `#[from]` attribute, so the `?` operator
//! works across component boundaries. The retry-strategy mapping used by the
//! scheduler loops lives in [`retry`].

pub mod auth;
pub mod config;
pub mod esi;
pub mod retry;
pub mod store;

use thiserror::Error;

use crate::error::{auth::AuthError, config::ConfigError, esi::EsiError, store::StoreError};

/// Main error type for the Moonwatch core.
///
/// Per-tenant errors of this type are caught at the tenant-iteration boundary
/// inside each scheduler loop; no single tenant's failure may abort a loop or
/// affect other tenants.
#[derive(Error, Debug)]
pub enum Error {
    /// Authentication error (no usable refresh token, rejected refresh,
    /// malformed token response).
    #[error(transparent)]
    AuthError(#[from] AuthError),
    /// ESI request error (network failure, non-2xx status, unexpected shape).
    #[error(transparent)]
    EsiError(#[from] EsiError),
    /// Persistence error (credential, structure, or alert state documents).
    #[error(transparent)]
    StoreError(#[from] StoreError),
    /// Configuration error (missing or invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
}
