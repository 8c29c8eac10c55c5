// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end client flows against a mocked service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use receipt_capture_sdk::{
    AddressToken, Config, Endpoints, FileStorage, KeyStore, LogoutOutcome, ReceiptCapture,
    ReceiptClient, ReceiptResponse, SdkError, SdkResult, StoragePaths,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct MockCapture {
    uploads: Arc<AtomicUsize>,
}

#[async_trait]
impl ReceiptCapture for MockCapture {
    async fn scan(&self) -> SdkResult<Option<String>> {
        Ok(None)
    }

    async fn publish(&self, images: &[String], token: &AddressToken) -> SdkResult<Option<String>> {
        assert_eq!(token.token, "tok-1");
        self.uploads.fetch_add(images.len(), Ordering::SeqCst);
        Ok(Some("receipt-1".to_string()))
    }

    async fn receipt(
        &self,
        receipt_id: &str,
        _token: &AddressToken,
    ) -> SdkResult<Option<Vec<ReceiptResponse>>> {
        Ok(Some(vec![ReceiptResponse {
            id: receipt_id.to_string(),
            merchant: Some("Corner Shop".to_string()),
            ..Default::default()
        }]))
    }
}

fn config() -> Config {
    Config::new(
        "p1",
        "provider-pub",
        "Acme Inc",
        "Delaware",
        "https://acme.test/tos",
        "https://acme.test/privacy",
    )
    .with_origin("com.acme.app")
}

fn client_at(dir: &TempDir, server: &MockServer, capture: MockCapture) -> ReceiptClient<MockCapture> {
    let storage = FileStorage::open(StoragePaths::new(dir.path())).unwrap();
    let endpoints = Endpoints::new(&server.uri()).unwrap();
    ReceiptClient::new(KeyStore::new(storage), &endpoints, capture).unwrap()
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/latest/auth/token"))
        .and(body_string_contains("client_id=addr%3Ap1%3A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "trail publish"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_register(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/latest/registry/addresses"))
        .and(header("X-Provider-Key", "provider-pub"))
        .respond_with(ResponseTemplate::new(204))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_guard(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/latest/trail/guard"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn initialize_twice_reuses_key_and_registers_once() {
    let server = MockServer::start().await;
    mount_register(&server, 1).await;
    mount_token(&server, 2).await;

    let dir = TempDir::new().unwrap();
    let mut client = client_at(&dir, &server, MockCapture::default());
    client.configure(config()).await.unwrap();

    let first = client.initialize("u1").await.unwrap();
    let second = client.initialize("u1").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(client.user().unwrap().address, first);

    let stored = client.key_store().get("p1", "u1").unwrap().unwrap();
    assert!(stored.metadata.registered);
    assert_eq!(stored.address(), first);
}

#[tokio::test]
async fn key_survives_client_restart() {
    let server = MockServer::start().await;
    mount_register(&server, 1).await;
    mount_token(&server, 2).await;
    let dir = TempDir::new().unwrap();

    let mut client = client_at(&dir, &server, MockCapture::default());
    client.configure(config()).await.unwrap();
    let before = client.initialize("u1").await.unwrap();
    drop(client);

    let mut client = client_at(&dir, &server, MockCapture::default());
    client.configure(config()).await.unwrap();
    let after = client.initialize("u1").await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn initialize_without_config_does_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut client = client_at(&dir, &server, MockCapture::default());

    let err = client.initialize("u1").await.unwrap_err();
    assert!(matches!(err, SdkError::ConfigurationMissing));
    assert!(err.is_precondition());
    assert!(client.key_store().get("p1", "u1").unwrap().is_none());
}

#[tokio::test]
async fn failed_registration_is_retried_on_next_initialize() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/latest/registry/addresses"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_register(&server, 1).await;
    mount_token(&server, 1).await;

    let dir = TempDir::new().unwrap();
    let mut client = client_at(&dir, &server, MockCapture::default());
    client.configure(config()).await.unwrap();

    assert!(matches!(
        client.initialize("u1").await,
        Err(SdkError::Network(_))
    ));
    assert!(client.user().is_none());
    assert!(!client.key_store().get("p1", "u1").unwrap().unwrap().metadata.registered);

    client.initialize("u1").await.unwrap();
    assert!(client.key_store().get("p1", "u1").unwrap().unwrap().metadata.registered);
}

#[tokio::test]
async fn empty_token_is_reported_and_retried_later() {
    let server = MockServer::start().await;
    mount_register(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/latest/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_token(&server, 1).await;
    mount_guard(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "verified": true })),
    )
    .await;

    let capture = MockCapture::default();
    let dir = TempDir::new().unwrap();
    let mut client = client_at(&dir, &server, capture.clone());
    client.configure(config()).await.unwrap();

    assert!(matches!(
        client.initialize("u1").await,
        Err(SdkError::TokenIssuance(_))
    ));
    assert!(client.user().is_some());

    let receipt_id = client.publish(&["aW1n".to_string()]).await.unwrap();
    assert_eq!(receipt_id.as_deref(), Some("receipt-1"));
    assert_eq!(capture.uploads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn publish_is_blocked_when_guard_not_verified() {
    let server = MockServer::start().await;
    mount_register(&server, 1).await;
    mount_token(&server, 1).await;
    mount_guard(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "verified": false, "reason": "no license" })),
    )
    .await;

    let capture = MockCapture::default();
    let dir = TempDir::new().unwrap();
    let mut client = client_at(&dir, &server, capture.clone());
    client.configure(config()).await.unwrap();
    client.initialize("u1").await.unwrap();

    match client.publish(&["aW1n".to_string()]).await {
        Err(SdkError::LicenseNotVerified { reason }) => assert_eq!(reason, "no license"),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(capture.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn publish_is_blocked_when_guard_fails() {
    let server = MockServer::start().await;
    mount_register(&server, 1).await;
    mount_token(&server, 1).await;
    mount_guard(&server, ResponseTemplate::new(500)).await;

    let capture = MockCapture::default();
    let dir = TempDir::new().unwrap();
    let mut client = client_at(&dir, &server, capture.clone());
    client.configure(config()).await.unwrap();
    client.initialize("u1").await.unwrap();

    assert!(matches!(
        client.publish(&["aW1n".to_string()]).await,
        Err(SdkError::Network(_))
    ));
    assert_eq!(capture.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn create_license_then_publish() {
    let server = MockServer::start().await;
    mount_register(&server, 1).await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/latest/trail/license"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({
            "ptr": "u1",
            "origin": "com.acme.app",
            "tags": ["purchase_history"],
            "uses": [{ "usecases": ["attribution"], "destinations": ["*"] }]
        })))
        .and(body_string_contains("Acme Inc"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "lic-1",
            "ptr": "u1",
            "origin": "com.acme.app"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_guard(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "verified": true })),
    )
    .await;

    let capture = MockCapture::default();
    let dir = TempDir::new().unwrap();
    let mut client = client_at(&dir, &server, capture.clone());
    client.configure(config()).await.unwrap();
    client.initialize("u1").await.unwrap();

    let license = client.create_license().await.unwrap();
    assert_eq!(license.id, "lic-1");

    let images = vec!["aW1n".to_string(), "aW1nMg==".to_string()];
    let receipt_id = client.publish(&images).await.unwrap();
    assert_eq!(receipt_id.as_deref(), Some("receipt-1"));
    assert_eq!(capture.uploads.load(Ordering::SeqCst), 2);

    let receipts = client.receipt("receipt-1").await.unwrap().unwrap();
    assert_eq!(receipts[0].merchant.as_deref(), Some("Corner Shop"));
}

#[tokio::test]
async fn logout_ends_session_and_is_idempotent() {
    let server = MockServer::start().await;
    mount_register(&server, 1).await;
    mount_token(&server, 1).await;

    let dir = TempDir::new().unwrap();
    let mut client = client_at(&dir, &server, MockCapture::default());
    client.configure(config()).await.unwrap();
    let address = client.initialize("u1").await.unwrap();

    assert_eq!(client.logout().await, LogoutOutcome::LoggedOut { address });
    assert_eq!(client.logout().await, LogoutOutcome::NoActiveSession);
    assert!(matches!(
        client.publish(&["aW1n".to_string()]).await,
        Err(SdkError::UserNotInitialized)
    ));

    // Keys outlive the session.
    assert!(client.key_store().get("p1", "u1").unwrap().is_some());
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_key_surfaces_storage_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let paths = StoragePaths::new(dir.path());
    KeyStore::new(FileStorage::open(paths.clone()).unwrap())
        .get_or_create("p1", "u1")
        .unwrap();
    let pem = paths.key_pem("p1", "u1");
    std::fs::remove_file(&pem).unwrap();
    std::os::unix::fs::symlink(&pem, &pem).unwrap();

    let mut client = client_at(&dir, &server, MockCapture::default());
    client.configure(config()).await.unwrap();

    let err = client.initialize("u1").await.unwrap_err();
    assert!(matches!(err, SdkError::Storage(_)));
    assert_eq!(err.error_code(), "storage_failure");
    assert!(client.user().is_none());
    assert!(std::fs::symlink_metadata(&pem).unwrap().file_type().is_symlink());
}

#[tokio::test]
async fn logout_after_failed_token_exchange_closes_user_session() {
    let server = MockServer::start().await;
    mount_register(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/latest/auth/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut client = client_at(&dir, &server, MockCapture::default());
    client.configure(config()).await.unwrap();

    assert!(matches!(client.initialize("u1").await, Err(SdkError::Network(_))));
    let address = client.user().unwrap().address;

    assert_eq!(client.logout().await, LogoutOutcome::LoggedOut { address });
    assert!(client.user().is_none());
    assert_eq!(client.logout().await, LogoutOutcome::NoActiveSession);
}
