//! Outbound alert delivery boundary.
//!
//! The alert scheduler talks to this trait only; the embedding application
//! supplies the concrete transport (a Discord channel in practice).

use async_trait::async_trait;
use thiserror::Error;

use crate::model::credential::TenantId;

#[derive(Error, Debug)]
#[error("Failed to deliver alert to destination {destination}: {reason}")]
pub struct NotifyError {
    pub destination: String,
    pub reason: String,
}

/// Delivers a rendered alert message to a tenant's configured destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        tenant: &TenantId,
        destination: &str,
        message: &str,
    ) -> Result<(), NotifyError>;
}

/// Fallback notifier that writes alerts to the log instead of a chat
/// transport. Used when no delivery integration is wired up.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        tenant: &TenantId,
        destination: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(tenant = %tenant, destination, "{message}");
        Ok(())
    }
}
