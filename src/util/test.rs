//! Shared fixtures for service-level tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::esi::EsiClient;
use crate::model::credential::{CredentialRecord, TenantId};
use crate::notifier::{Notifier, NotifyError};

/// Builds an [`EsiClient`] pointed at a mockito server for both ESI and the
/// token endpoint.
pub fn test_esi_client(server_url: &str) -> EsiClient {
    EsiClient::builder()
        .client_id("test-client-id")
        .client_secret("test-client-secret")
        .user_agent("moonwatch-tests")
        .esi_base(server_url)
        .login_base(server_url)
        .build()
        .unwrap()
}

/// Credential record issued `age_seconds` ago with a one-hour lifetime.
pub fn credential_record(tenant: &str, corporation_id: i64, age_seconds: i64) -> CredentialRecord {
    CredentialRecord {
        tenant_id: TenantId::from(tenant),
        corporation_id,
        character_id: 90_000_001,
        access_token: Some("stored-access-token".to_string()),
        refresh_token: Some("stored-refresh-token".to_string()),
        issued_at: Utc::now() - Duration::seconds(age_seconds),
        ttl_seconds: 3600,
    }
}

/// Token endpoint success body with a rotated refresh token.
pub fn token_response_body() -> String {
    json!({
        "access_token": "fresh-access-token",
        "refresh_token": "rotated-refresh-token",
        "expires_in": 1199,
        "token_type": "Bearer"
    })
    .to_string()
}

/// Corporation structures body containing one moon drill and one unrelated
/// structure.
pub fn structures_body(drill_id: i64) -> String {
    json!([
        {
            "structure_id": drill_id,
            "type_id": 35835,
            "services": [{"name": "Automatic Moon Drilling", "state": "online"}]
        },
        {
            "structure_id": 999,
            "type_id": 35832,
            "services": [{"name": "Clone Bay", "state": "online"}]
        }
    ])
    .to_string()
}

/// Corporation assets body with Magmatic Gas and fuel blocks in the drill's
/// fuel bay plus entries that must be filtered out.
pub fn assets_body(drill_id: i64, gas_quantity: i64, fuel_quantity: i64) -> String {
    json!([
        {
            "location_id": drill_id,
            "location_flag": "StructureFuel",
            "type_id": 81143,
            "quantity": gas_quantity
        },
        {
            "location_id": drill_id,
            "location_flag": "StructureFuel",
            "type_id": 4312,
            "quantity": fuel_quantity
        },
        {
            "location_id": drill_id,
            "location_flag": "CorpSAG1",
            "type_id": 81143,
            "quantity": 777777
        },
        {
            "location_id": 424242,
            "location_flag": "StructureFuel",
            "type_id": 81143,
            "quantity": 888888
        }
    ])
    .to_string()
}

pub fn structure_name_body(name: &str) -> String {
    json!({
        "name": name,
        "owner_id": 98000001,
        "solar_system_id": 30000142
    })
    .to_string()
}

/// Notifier that records every delivered message and can be toggled to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(TenantId, String, String)>>,
    pub fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        tenant: &TenantId,
        destination: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        if *self.fail.lock().unwrap() {
            return Err(NotifyError {
                destination: destination.to_string(),
                reason: "simulated delivery failure".to_string(),
            });
        }
        self.sent.lock().unwrap().push((
            tenant.clone(),
            destination.to_string(),
            message.to_string(),
        ));
        Ok(())
    }
}
