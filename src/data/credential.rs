use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::data::{ensure_dir, read_document, remove_document, write_document};
use crate::error::store::StoreError;
use crate::model::credential::{CredentialRecord, TenantId};

/// Persists OAuth credential records, one JSON document per
/// `(tenant, corporation)` pair.
///
/// This store is the single writer of credential documents. It also hands out
/// per-entry async locks so a scheduled refresh and a user-triggered refresh
/// of the same credential cannot interleave their read-modify-write cycles;
/// writers to different entries proceed independently by construction.
pub struct CredentialStore {
    dir: PathBuf,
    locks: Mutex<HashMap<(TenantId, i64), Arc<tokio::sync::Mutex<()>>>>,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self {
            dir,
            locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn get(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        read_document(&self.path_for(tenant, corporation_id))
    }

    pub fn put(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        write_document(
            &self.path_for(&record.tenant_id, record.corporation_id),
            record,
        )
    }

    pub fn remove(&self, tenant: &TenantId, corporation_id: i64) -> Result<(), StoreError> {
        remove_document(&self.path_for(tenant, corporation_id))
    }

    /// Deletes every credential on file for the tenant, returning the count.
    pub fn remove_tenant(&self, tenant: &TenantId) -> Result<usize, StoreError> {
        let mut removed = 0;
        for (entry_tenant, corporation_id) in self.list()? {
            if &entry_tenant == tenant {
                self.remove(&entry_tenant, corporation_id)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Enumerates every `(tenant, corporation)` pair with a credential on file.
    ///
    /// Sorted for deterministic scheduler iteration order. Files that do not
    /// match the expected naming scheme are skipped with a warning.
    pub fn list(&self) -> Result<Vec<(TenantId, i64)>, StoreError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StoreError::Read {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Read {
                path: self.dir.clone(),
                source: e,
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(key) = parse_file_name(name) else {
                if name.ends_with("_credentials.json") {
                    tracing::warn!(file = name, "Skipping unparseable credential file name");
                }
                continue;
            };
            keys.push(key);
        }
        keys.sort();
        Ok(keys)
    }

    /// Returns the write lock guarding this credential's read-modify-write
    /// cycle. Hold it across the whole reuse-or-refresh decision.
    pub fn entry_lock(
        &self,
        tenant: &TenantId,
        corporation_id: i64,
    ) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry((tenant.clone(), corporation_id))
            .or_default()
            .clone()
    }

    fn path_for(&self, tenant: &TenantId, corporation_id: i64) -> PathBuf {
        self.dir
            .join(format!("{tenant}_{corporation_id}_credentials.json"))
    }
}

fn parse_file_name(name: &str) -> Option<(TenantId, i64)> {
    let stem = name.strip_suffix("_credentials.json")?;
    let (tenant, corporation) = stem.rsplit_once('_')?;
    let corporation_id = corporation.parse().ok()?;
    Some((TenantId::from(tenant), corporation_id))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;

    fn record(tenant: &str, corporation_id: i64) -> CredentialRecord {
        CredentialRecord {
            tenant_id: TenantId::from(tenant),
            corporation_id,
            character_id: 95000001,
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            issued_at: Utc::now(),
            ttl_seconds: 1200,
        }
    }

    #[test]
    fn round_trips_a_record() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        let record = record("1001", 98000001);
        store.put(&record).unwrap();

        let loaded = store.get(&record.tenant_id, record.corporation_id).unwrap();
        assert_eq!(loaded, Some(record));
    }

    #[test]
    fn missing_record_is_none() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        let loaded = store.get(&TenantId::from("1001"), 98000001).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn lists_all_keys_sorted() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        store.put(&record("2002", 98000002)).unwrap();
        store.put(&record("1001", 98000001)).unwrap();
        store.put(&record("1001", 98000009)).unwrap();

        let keys = store.list().unwrap();
        assert_eq!(
            keys,
            vec![
                (TenantId::from("1001"), 98000001),
                (TenantId::from("1001"), 98000009),
                (TenantId::from("2002"), 98000002),
            ]
        );
    }

    #[test]
    fn remove_tenant_only_touches_that_tenant() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        store.put(&record("1001", 98000001)).unwrap();
        store.put(&record("1001", 98000009)).unwrap();
        store.put(&record("2002", 98000002)).unwrap();

        let removed = store.remove_tenant(&TenantId::from("1001")).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.list().unwrap(), vec![(TenantId::from("2002"), 98000002)]);
    }

    #[test]
    fn entry_lock_is_stable_per_key() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        let tenant = TenantId::from("1001");
        let a = store.entry_lock(&tenant, 98000001);
        let b = store.entry_lock(&tenant, 98000001);
        let other = store.entry_lock(&tenant, 98000002);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
    }
}
