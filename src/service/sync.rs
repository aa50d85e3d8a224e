//! Per-tenant structure and fuel-bay synchronization from ESI.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::data::structure::StructureCache;
use crate::error::{auth::AuthError, Error};
use crate::esi::EsiClient;
use crate::model::credential::TenantId;
use crate::model::structure::{
    AssetSnapshot, ResourceKind, TenantStructures, UNKNOWN_STRUCTURE_NAME,
};
use crate::service::token::TokenLifecycleManager;

/// EVE Online type ID of the Metenox Moon Drill structure.
pub const MOON_DRILL_TYPE_ID: i64 = 35835;

/// Service name that also identifies a moon drill regardless of type ID.
pub const MOON_DRILL_SERVICE: &str = "Automatic Moon Drilling";

/// ESI location flag for a structure's fuel bay.
pub const FUEL_BAY_LOCATION_FLAG: &str = "StructureFuel";

/// Result of one sync attempt for a tenant.
#[derive(Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced { structures: usize, assets: usize },
    /// The tenant could not be synced but the scheduler should keep
    /// processing other tenants; this is not an error.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotAuthenticated,
    RefreshDenied,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAuthenticated => f.write_str("not authenticated"),
            SkipReason::RefreshDenied => f.write_str("token refresh denied"),
        }
    }
}

/// Fetches a corporation's moon drills and their fuel-bay inventory,
/// replacing the pair's [`StructureCache`] document as a whole.
pub struct StructureSyncer {
    tokens: Arc<TokenLifecycleManager>,
    esi: Arc<EsiClient>,
    cache: Arc<StructureCache>,
}

impl StructureSyncer {
    /// Creates a new instance of [`StructureSyncer`]
    pub fn new(
        tokens: Arc<TokenLifecycleManager>,
        esi: Arc<EsiClient>,
        cache: Arc<StructureCache>,
    ) -> Self {
        Self { tokens, esi, cache }
    }

    /// Synchronizes the tenant's structures and assets.
    ///
    /// Display names are resolved only for structure ids with no cached
    /// name. Missing or denied credentials return
    /// [`SyncOutcome::Skipped`] instead of an error so a scheduler tick can
    /// keep processing the remaining tenants.
    pub async fn sync(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
    ) -> Result<SyncOutcome, Error> {
        self.sync_inner(tenant, corporation_id, false).await
    }

    /// Synchronizes the tenant and re-resolves every display name, dropping
    /// cached names (including `"Unknown Structure"` placeholders).
    pub async fn force_resync(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
    ) -> Result<SyncOutcome, Error> {
        self.sync_inner(tenant, corporation_id, true).await
    }

    async fn sync_inner(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
        resync_names: bool,
    ) -> Result<SyncOutcome, Error> {
        let access_token = match self
            .tokens
            .get_valid_access_token(tenant, corporation_id)
            .await
        {
            Ok(token) => token,
            Err(Error::AuthError(AuthError::NotAuthenticated { .. })) => {
                return Ok(SyncOutcome::Skipped(SkipReason::NotAuthenticated));
            }
            Err(Error::AuthError(AuthError::RefreshDenied { .. })) => {
                return Ok(SyncOutcome::Skipped(SkipReason::RefreshDenied));
            }
            Err(e) => return Err(e),
        };

        let all_structures = self
            .esi
            .get_corporation_structures(&access_token, corporation_id)
            .await?;

        let drills: Vec<_> = all_structures
            .into_iter()
            .filter(|s| {
                s.type_id == MOON_DRILL_TYPE_ID
                    || s.services.iter().any(|svc| svc.name == MOON_DRILL_SERVICE)
            })
            .collect();

        let cached = if resync_names {
            None
        } else {
            self.cache.get(tenant, corporation_id)?
        };

        let mut names = BTreeMap::new();
        for structure in &drills {
            let cached_name = cached
                .as_ref()
                .and_then(|c| c.structures.get(&structure.structure_id))
                .cloned();

            let name = match cached_name {
                Some(name) => name,
                None => match self
                    .esi
                    .get_structure_name(&access_token, structure.structure_id)
                    .await
                {
                    Ok(name) => name,
                    Err(e) => {
                        tracing::warn!(
                            tenant = %tenant,
                            structure_id = structure.structure_id,
                            error = %e,
                            "Failed to resolve structure name, using placeholder"
                        );
                        UNKNOWN_STRUCTURE_NAME.to_string()
                    }
                },
            };
            names.insert(structure.structure_id, name);
        }

        // One asset request per sync regardless of structure count; entries
        // are partitioned locally by location and fuel bay flag.
        let all_assets = self
            .esi
            .get_corporation_assets(&access_token, corporation_id)
            .await?;

        let mut totals: BTreeMap<(i64, ResourceKind), i64> = BTreeMap::new();
        for asset in all_assets {
            if asset.location_flag != FUEL_BAY_LOCATION_FLAG {
                continue;
            }
            if !names.contains_key(&asset.location_id) {
                continue;
            }
            let Some(kind) = ResourceKind::from_type_id(asset.type_id) else {
                continue;
            };
            let total = totals.entry((asset.location_id, kind)).or_insert(0);
            *total = total.saturating_add(asset.quantity);
        }

        let snapshot = TenantStructures {
            structures: names,
            assets: totals
                .into_iter()
                .map(|((structure_id, resource_kind), quantity)| AssetSnapshot {
                    structure_id,
                    resource_kind,
                    quantity,
                })
                .collect(),
            synced_at: Some(Utc::now()),
        };

        let outcome = SyncOutcome::Synced {
            structures: snapshot.structures.len(),
            assets: snapshot.assets.len(),
        };

        // Whole-document swap: stale structures disappear with their assets
        self.cache.replace(tenant, corporation_id, &snapshot)?;

        tracing::debug!(
            tenant = %tenant,
            corporation_id,
            structures = snapshot.structures.len(),
            "Structure sync complete"
        );

        Ok(outcome)
    }
}
