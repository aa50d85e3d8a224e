use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::data::{ensure_dir, read_document, write_document};
use crate::error::store::StoreError;
use crate::model::credential::TenantId;

/// Per-tenant alert destination (a chat channel id in practice).
///
/// A tenant without a configured destination is skipped by the alert
/// scheduler without error; the external command layer writes entries here
/// when an admin picks a channel. All tenants share one document, so
/// mutations serialize their read-modify-write cycle behind a store-level
/// lock.
pub struct AlertChannelStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AlertChannelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self {
            path: dir.join("alert_channels.json"),
            write_lock: Mutex::new(()),
        })
    }

    pub fn get(&self, tenant: &TenantId) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(tenant))
    }

    pub fn set(&self, tenant: &TenantId, destination: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut channels = self.load()?;
        channels.insert(tenant.clone(), destination.to_string());
        write_document(&self.path, &channels)
    }

    pub fn remove(&self, tenant: &TenantId) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut channels = self.load()?;
        if channels.remove(tenant).is_some() {
            write_document(&self.path, &channels)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<HashMap<TenantId, String>, StoreError> {
        Ok(read_document(&self.path)?.unwrap_or_default())
    }
}
