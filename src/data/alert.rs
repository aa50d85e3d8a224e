use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::data::{ensure_dir, read_document, write_document};
use crate::error::store::StoreError;
use crate::model::alert::ThresholdBucket;
use crate::model::credential::TenantId;
use crate::model::structure::ResourceKind;

/// Minimum interval before the same alert key may be sent again.
const RESEND_INTERVAL_HOURS: i64 = 24;

/// Persists the timestamp of the last alert sent per
/// `(tenant, structure, resource, threshold bucket)`, one JSON document per
/// tenant, and enforces the minimum resend interval.
///
/// This store is the only reader and writer of alert dedup state. A resource
/// that recovers clears nothing explicitly; stale timestamps simply age past
/// the resend window and stop suppressing.
pub struct AlertStateTracker {
    dir: PathBuf,
}

impl AlertStateTracker {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    /// Whether an alert for this key may be sent at `now`.
    pub fn should_send(
        &self,
        tenant: &TenantId,
        structure_id: i64,
        resource: ResourceKind,
        bucket: ThresholdBucket,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let sent = self.load(tenant)?;
        Ok(match sent.get(&key(structure_id, resource, bucket)) {
            Some(last_sent_at) => now - *last_sent_at >= Duration::hours(RESEND_INTERVAL_HOURS),
            None => true,
        })
    }

    /// Records that an alert for this key was sent at `now`.
    pub fn mark_sent(
        &self,
        tenant: &TenantId,
        structure_id: i64,
        resource: ResourceKind,
        bucket: ThresholdBucket,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut sent = self.load(tenant)?;
        sent.insert(key(structure_id, resource, bucket), now);
        write_document(&self.path_for(tenant), &sent)
    }

    fn load(&self, tenant: &TenantId) -> Result<HashMap<String, DateTime<Utc>>, StoreError> {
        Ok(read_document(&self.path_for(tenant))?.unwrap_or_default())
    }

    fn path_for(&self, tenant: &TenantId) -> PathBuf {
        self.dir.join(format!("{tenant}_alerts.json"))
    }
}

fn key(structure_id: i64, resource: ResourceKind, bucket: ThresholdBucket) -> String {
    format!("{structure_id}:{}:{}", resource.key(), bucket.key())
}
