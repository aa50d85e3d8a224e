use std::path::PathBuf;

use crate::data::{ensure_dir, read_document, remove_document, write_document};
use crate::error::store::StoreError;
use crate::model::credential::TenantId;
use crate::model::structure::TenantStructures;

/// Persists the last-known structure id → name map and asset snapshot, one
/// JSON document per `(tenant, corporation)` pair, matching how credentials
/// are keyed.
///
/// The whole document for a pair is swapped on every sync, so a reader never
/// observes a half-updated mix of old and new structure sets, and one
/// corporation's sync never touches another corporation's snapshot.
pub struct StructureCache {
    dir: PathBuf,
}

impl StructureCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn get(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
    ) -> Result<Option<TenantStructures>, StoreError> {
        read_document(&self.path_for(tenant, corporation_id))
    }

    /// Replaces the pair's entire snapshot atomically.
    pub fn replace(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
        snapshot: &TenantStructures,
    ) -> Result<(), StoreError> {
        write_document(&self.path_for(tenant, corporation_id), snapshot)
    }

    pub fn remove(&self, tenant: &TenantId, corporation_id: i64) -> Result<(), StoreError> {
        remove_document(&self.path_for(tenant, corporation_id))
    }

    fn path_for(&self, tenant: &TenantId, corporation_id: i64) -> PathBuf {
        self.dir
            .join(format!("{tenant}_{corporation_id}_structures.json"))
    }
}
