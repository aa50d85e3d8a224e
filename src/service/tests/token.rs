use std::sync::Arc;

use chrono::Duration;
use tempfile::TempDir;

use crate::data::credential::CredentialStore;
use crate::error::{auth::AuthError, Error};
use crate::model::credential::{TenantId, TokenIssued};
use crate::service::token::TokenLifecycleManager;
use crate::util::test::{credential_record, test_esi_client, token_response_body};

fn manager(dir: &TempDir, server_url: &str) -> (TokenLifecycleManager, Arc<CredentialStore>) {
    let store = Arc::new(CredentialStore::new(dir.path()).unwrap());
    let esi = Arc::new(test_esi_client(server_url));
    (TokenLifecycleManager::new(store.clone(), esi), store)
}

/// Expect a stored token still within its lifetime to be returned without
/// any call to the token endpoint.
#[tokio::test]
async fn valid_token_is_reused_without_network() {
    let mut server = mockito::Server::new_async().await;
    let token_endpoint = server
        .mock("POST", "/v2/oauth/token")
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (manager, store) = manager(&dir, &server.url());
    store.put(&credential_record("1001", 98000001, 0)).unwrap();

    let token = manager
        .get_valid_access_token(&TenantId::from("1001"), 98000001)
        .await
        .unwrap();

    assert_eq!(token, "stored-access-token");
    token_endpoint.assert_async().await;
}

/// Expect an expired token to be refreshed, with the rotated refresh token
/// and new lifetime persisted before the fresh access token is returned.
#[tokio::test]
async fn expired_token_is_refreshed_and_persisted() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v2/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_response_body())
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (manager, store) = manager(&dir, &server.url());
    let stale = credential_record("1001", 98000001, 7200);
    store.put(&stale).unwrap();

    let token = manager
        .get_valid_access_token(&TenantId::from("1001"), 98000001)
        .await
        .unwrap();
    assert_eq!(token, "fresh-access-token");

    let stored = store
        .get(&TenantId::from("1001"), 98000001)
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("fresh-access-token"));
    assert_eq!(
        stored.refresh_token.as_deref(),
        Some("rotated-refresh-token")
    );
    assert_eq!(stored.ttl_seconds, 1199);
    assert!(stored.issued_at > stale.issued_at);
}

/// Expect a rejected refresh grant to surface as `RefreshDenied` with the
/// server's error description, flagged as requiring re-authorization.
#[tokio::test]
async fn denied_refresh_requires_reauthorization() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v2/oauth/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (manager, store) = manager(&dir, &server.url());
    store
        .put(&credential_record("1001", 98000001, 7200))
        .unwrap();

    let error = manager
        .get_valid_access_token(&TenantId::from("1001"), 98000001)
        .await
        .unwrap_err();

    assert!(error.requires_reauthentication());
    match error {
        Error::AuthError(AuthError::RefreshDenied {
            status,
            description,
        }) => {
            assert_eq!(status, 400);
            assert_eq!(description, "Refresh token revoked");
        }
        other => panic!("expected RefreshDenied, got {other:?}"),
    }
}

/// Expect a 2xx token response without a usable body to surface as a
/// malformed response instead of a panic or a bogus credential.
#[tokio::test]
async fn malformed_token_response_is_an_auth_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v2/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected":"shape"}"#)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (manager, store) = manager(&dir, &server.url());
    store
        .put(&credential_record("1001", 98000001, 7200))
        .unwrap();

    let error = manager
        .get_valid_access_token(&TenantId::from("1001"), 98000001)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        Error::AuthError(AuthError::MalformedResponse(_))
    ));
}

/// Expect a tenant with no stored credentials to get `NotAuthenticated`.
#[tokio::test]
async fn missing_credentials_are_not_authenticated() {
    let server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (manager, _) = manager(&dir, &server.url());

    let error = manager
        .get_valid_access_token(&TenantId::from("1001"), 98000001)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        Error::AuthError(AuthError::NotAuthenticated { .. })
    ));
}

/// Expect the proactive refresh to do nothing while the stored token
/// comfortably outlives the horizon.
#[tokio::test]
async fn proactive_refresh_skips_long_lived_tokens() {
    let mut server = mockito::Server::new_async().await;
    let token_endpoint = server
        .mock("POST", "/v2/oauth/token")
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (manager, store) = manager(&dir, &server.url());
    store.put(&credential_record("1001", 98000001, 0)).unwrap();

    let refreshed = manager
        .refresh_near_expiry(&TenantId::from("1001"), 98000001, Duration::seconds(600))
        .await
        .unwrap();

    assert!(refreshed.is_none());
    token_endpoint.assert_async().await;
}

/// Expect the proactive refresh to renew a token expiring within the
/// horizon even though it is still technically valid.
#[tokio::test]
async fn proactive_refresh_renews_expiring_tokens() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v2/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_response_body())
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (manager, store) = manager(&dir, &server.url());
    // Expires in 5 minutes, inside the 10 minute horizon
    store
        .put(&credential_record("1001", 98000001, 3300))
        .unwrap();

    let refreshed = manager
        .refresh_near_expiry(&TenantId::from("1001"), 98000001, Duration::seconds(600))
        .await
        .unwrap();

    assert_eq!(refreshed.as_deref(), Some("fresh-access-token"));
}

/// Expect an authorization grant event to persist a record that is
/// immediately usable without a refresh.
#[tokio::test]
async fn issued_token_is_registered_and_reused() {
    let mut server = mockito::Server::new_async().await;
    let token_endpoint = server
        .mock("POST", "/v2/oauth/token")
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let (manager, _) = manager(&dir, &server.url());

    manager
        .register_issued_token(TokenIssued {
            tenant_id: TenantId::from("1001"),
            corporation_id: 98000001,
            character_id: 90000001,
            access_token: "granted-access-token".to_string(),
            refresh_token: "granted-refresh-token".to_string(),
            expires_in: 1199,
        })
        .unwrap();

    let token = manager
        .get_valid_access_token(&TenantId::from("1001"), 98000001)
        .await
        .unwrap();

    assert_eq!(token, "granted-access-token");
    token_endpoint.assert_async().await;
}

/// Expect tenant removal to delete every credential pair for that tenant
/// and leave other tenants untouched.
#[tokio::test]
async fn remove_tenant_deletes_all_pairs() {
    let server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (manager, store) = manager(&dir, &server.url());

    store.put(&credential_record("1001", 98000001, 0)).unwrap();
    store.put(&credential_record("1001", 98000002, 0)).unwrap();
    store.put(&credential_record("2002", 98000003, 0)).unwrap();

    let removed = manager.remove_tenant(&TenantId::from("1001")).unwrap();

    assert_eq!(removed, 2);
    assert!(store
        .get(&TenantId::from("1001"), 98000001)
        .unwrap()
        .is_none());
    assert!(store
        .get(&TenantId::from("2002"), 98000003)
        .unwrap()
        .is_some());
}
