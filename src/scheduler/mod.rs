//! Background loops: proactive token refresh and periodic alert evaluation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::data::credential::CredentialStore;
use crate::model::credential::TenantId;
use crate::service::alert::AlertScheduler;
use crate::service::token::{TokenLifecycleManager, REFRESH_HORIZON_SECONDS};

/// Handles for the two background loops; aborting them is the embedding
/// application's shutdown path.
pub struct SchedulerHandles {
    pub refresh: JoinHandle<()>,
    pub alerts: JoinHandle<()>,
}

impl SchedulerHandles {
    pub fn abort(&self) {
        self.refresh.abort();
        self.alerts.abort();
    }
}

/// Spawns the token refresh and alert loops on the current runtime.
pub fn spawn(
    tokens: Arc<TokenLifecycleManager>,
    credentials: Arc<CredentialStore>,
    alerts: Arc<AlertScheduler>,
    refresh_interval: Duration,
    alert_interval: Duration,
) -> SchedulerHandles {
    SchedulerHandles {
        refresh: tokio::spawn(refresh_loop(tokens, credentials, refresh_interval)),
        alerts: tokio::spawn(alert_loop(alerts, alert_interval)),
    }
}

async fn refresh_loop(
    tokens: Arc<TokenLifecycleManager>,
    credentials: Arc<CredentialStore>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Pairs whose auth failure was already logged, so a broken tenant does
    // not spam the log on every tick until re-authorized.
    let mut reported: HashSet<(TenantId, i64)> = HashSet::new();

    loop {
        interval.tick().await;
        refresh_tick(&tokens, &credentials, &mut reported).await;
    }
}

/// One pass of the proactive refresh loop over all stored credential pairs.
pub(crate) async fn refresh_tick(
    tokens: &TokenLifecycleManager,
    credentials: &CredentialStore,
    reported: &mut HashSet<(TenantId, i64)>,
) {
    let pairs = match credentials.list() {
        Ok(pairs) => pairs,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list credentials for refresh pass");
            return;
        }
    };

    for (tenant, corporation_id) in pairs {
        let horizon = chrono::Duration::seconds(REFRESH_HORIZON_SECONDS);
        match tokens
            .refresh_near_expiry(&tenant, corporation_id, horizon)
            .await
        {
            Ok(Some(_)) => {
                reported.remove(&(tenant.clone(), corporation_id));
                tracing::debug!(
                    tenant = %tenant,
                    corporation_id,
                    "Proactively refreshed expiring token"
                );
            }
            Ok(None) => {
                reported.remove(&(tenant, corporation_id));
            }
            Err(e) if e.requires_reauthentication() => {
                if reported.insert((tenant.clone(), corporation_id)) {
                    tracing::warn!(
                        tenant = %tenant,
                        corporation_id,
                        error = %e,
                        "Tenant requires re-authorization"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    tenant = %tenant,
                    corporation_id,
                    error = %e,
                    retry = ?e.to_retry_strategy(),
                    "Token refresh pass failed, will retry next tick"
                );
            }
        }
    }
}

async fn alert_loop(alerts: Arc<AlertScheduler>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if let Err(e) = alerts.run_once().await {
            tracing::error!(error = %e, "Alert pass failed");
        }
    }
}
