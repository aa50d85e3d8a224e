//! Moonwatch core: multi-tenant EVE Online structure fuel monitoring.
//!
//! This crate manages OAuth2 credential lifecycles per `(tenant, corporation)`,
//! periodically synchronizes Metenox moon drill fuel-bay inventory from ESI,
//! projects linear depletion, and emits deduplicated low-fuel alerts through
//! an injected [`notifier::Notifier`] collaborator. Chat command handling,
//! the OAuth callback endpoint, and message transport live outside this crate.

pub mod config;
pub mod data;
pub mod error;
pub mod esi;
pub mod model;
pub mod notifier;
pub mod scheduler;
pub mod service;
pub mod util;
