//! Depletion alert evaluation and delivery.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::data::alert::AlertStateTracker;
use crate::data::channel::AlertChannelStore;
use crate::data::credential::CredentialStore;
use crate::data::structure::StructureCache;
use crate::error::Error;
use crate::model::alert::ThresholdBucket;
use crate::model::credential::TenantId;
use crate::model::structure::ResourceKind;
use crate::notifier::Notifier;
use crate::service::depletion::{estimate, ConsumptionRates, DepletionEstimate};
use crate::service::sync::{StructureSyncer, SyncOutcome};

/// Evaluates every tenant's cached fuel state against the alert tiers and
/// delivers warnings through the configured [`Notifier`].
///
/// One tenant's failure never aborts the pass; errors are logged and the
/// remaining tenants still get evaluated.
pub struct AlertScheduler {
    credentials: Arc<CredentialStore>,
    channels: Arc<AlertChannelStore>,
    syncer: Arc<StructureSyncer>,
    cache: Arc<StructureCache>,
    alerts: Arc<AlertStateTracker>,
    notifier: Arc<dyn Notifier>,
    rates: ConsumptionRates,
    // Pairs whose auth failure was already surfaced; cleared once a sync
    // succeeds again so the next lapse is reported anew
    unauthenticated: Mutex<HashSet<(TenantId, i64)>>,
}

impl AlertScheduler {
    /// Creates a new instance of [`AlertScheduler`]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        credentials: Arc<CredentialStore>,
        channels: Arc<AlertChannelStore>,
        syncer: Arc<StructureSyncer>,
        cache: Arc<StructureCache>,
        alerts: Arc<AlertStateTracker>,
        notifier: Arc<dyn Notifier>,
        rates: ConsumptionRates,
    ) -> Self {
        Self {
            credentials,
            channels,
            syncer,
            cache,
            alerts,
            notifier,
            rates,
            unauthenticated: Mutex::new(HashSet::new()),
        }
    }

    /// Pairs whose credentials currently require a fresh interactive grant,
    /// sorted. The embedding application can surface these to admins.
    pub fn pending_reauthorizations(&self) -> Vec<(TenantId, i64)> {
        let unauthenticated = self
            .unauthenticated
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let mut pairs: Vec<_> = unauthenticated.iter().cloned().collect();
        pairs.sort();
        pairs
    }

    /// Runs one alert pass over all registered tenants.
    pub async fn run_once(&self) -> Result<(), Error> {
        self.run_at(Utc::now()).await
    }

    /// Runs one alert pass evaluated at `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<(), Error> {
        for (tenant, corporation_id) in self.credentials.list()? {
            if let Err(e) = self.process_tenant(&tenant, corporation_id, now).await {
                tracing::error!(
                    tenant = %tenant,
                    corporation_id,
                    error = %e,
                    "Alert evaluation failed for tenant"
                );
            }
        }
        Ok(())
    }

    async fn process_tenant(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let Some(destination) = self.channels.get(tenant)? else {
            tracing::debug!(tenant = %tenant, "No alert destination configured, skipping");
            return Ok(());
        };

        // Refresh the snapshot first so alerts reflect current fuel levels
        match self.syncer.sync(tenant, corporation_id).await? {
            SyncOutcome::Synced { .. } => {
                self.unauthenticated
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .remove(&(tenant.clone(), corporation_id));
            }
            SyncOutcome::Skipped(reason) => {
                let newly_reported = self
                    .unauthenticated
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert((tenant.clone(), corporation_id));
                if newly_reported {
                    tracing::warn!(tenant = %tenant, corporation_id, %reason, "Skipping alert pass");
                } else {
                    tracing::debug!(tenant = %tenant, corporation_id, %reason, "Skipping alert pass");
                }
                return Ok(());
            }
        }

        let Some(snapshot) = self.cache.get(tenant, corporation_id)? else {
            return Ok(());
        };

        for (&structure_id, name) in &snapshot.structures {
            for kind in ResourceKind::ALL {
                let quantity = snapshot.quantity_of(structure_id, kind);
                let projection = estimate(quantity, self.rates.rate_for(kind), now);

                let DepletionEstimate::Depletes {
                    hours_remaining,
                    days,
                    hours,
                    ..
                } = projection
                else {
                    continue;
                };

                for bucket in ThresholdBucket::ALL {
                    if !bucket.matches(hours_remaining) {
                        continue;
                    }
                    if !self
                        .alerts
                        .should_send(tenant, structure_id, kind, bucket, now)?
                    {
                        continue;
                    }

                    let message = render_alert(name, kind, quantity, days, hours);
                    match self.notifier.send(tenant, &destination, &message).await {
                        Ok(()) => {
                            // Only a delivered alert suppresses resends
                            self.alerts
                                .mark_sent(tenant, structure_id, kind, bucket, now)?;
                            tracing::info!(
                                tenant = %tenant,
                                structure_id,
                                resource = kind.key(),
                                bucket = bucket.key(),
                                "Depletion alert sent"
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                                tenant = %tenant,
                                structure_id,
                                error = %e,
                                "Alert delivery failed, will retry next pass"
                            );
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn render_alert(
    structure_name: &str,
    kind: ResourceKind,
    quantity: i64,
    days: i64,
    hours: i64,
) -> String {
    let label = kind.label();
    format!(
        "**{structure_name}**: {label} is running low!\n\
         {label}: ***{quantity}***\n\
         Runs out in: {days} Days {hours} Hours"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_alert_message() {
        let message = render_alert("Drill Alpha", ResourceKind::MagmaticGas, 3000, 0, 20);

        assert_eq!(
            message,
            "**Drill Alpha**: Magmatic Gas is running low!\n\
             Magmatic Gas: ***3000***\n\
             Runs out in: 0 Days 20 Hours"
        );
    }
}
