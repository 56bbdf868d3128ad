//! Gateway client against the mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use campus_desk::gateway::{
    BackendClient, CompletionResult, GatewayError, ImageKind, ImageUpload, OrderBackend,
};
use campus_desk_core::{OrderId, Pin, UserId};
use campus_desk_integration_tests::{Endpoint, MockBackend, stationery_order, xerox_order};

#[tokio::test]
async fn test_list_orders_returns_every_record() {
    let mock = MockBackend::start().await;
    mock.add_order(xerox_order("a1", "u1", "notes.pdf")).await;
    mock.add_order(stationery_order("s1", "042")).await;

    let orders = mock.client().list_orders().await.unwrap();
    let ids: Vec<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, ["a1", "s1"]);
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let mock = MockBackend::start().await;
    mock.fail(Endpoint::FetchOrders, 503).await;

    let err = mock.client().list_orders().await.unwrap_err();
    assert_eq!(err, GatewayError::Http { status: 503 });
    assert_eq!(err.to_string(), "HTTP error! status: 503");
}

#[tokio::test]
async fn test_non_json_body_is_network_error() {
    let mock = MockBackend::start().await;
    mock.add_order(xerox_order("a1", "u1", "notes.pdf")).await;
    mock.garble(Endpoint::FetchOrders).await;

    let err = mock.client().list_orders().await.unwrap_err();
    assert!(
        matches!(&err, GatewayError::Network(msg) if msg.starts_with("Invalid response body")),
        "unexpected error: {err:?}"
    );

    mock.recover(Endpoint::FetchOrders).await;
    assert_eq!(mock.client().list_orders().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_json_lookup_is_network_error() {
    let mock = MockBackend::start().await;
    mock.garble(Endpoint::ByPin).await;

    let err = mock
        .client()
        .order_by_pin(&Pin::parse("042").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Network(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Port 9 (discard) is not served by anything in the test environment.
    let client = BackendClient::new("http://127.0.0.1:9/".parse().unwrap()).unwrap();
    let err = client.list_orders().await.unwrap_err();
    assert!(matches!(err, GatewayError::Network(_)));
}

#[tokio::test]
async fn test_file_name_is_path_encoded() {
    let mock = MockBackend::start().await;
    let completion = CompletionResult {
        user_id: UserId::new("u1"),
        file_name: "lab report #2?.pdf".to_string(),
    };

    mock.client().delete_order_file(&completion).await.unwrap();
    assert_eq!(mock.requests().await, ["delete_file u1/lab report #2?.pdf"]);
}

#[tokio::test]
async fn test_record_deletion_reports_file_location() {
    let mock = MockBackend::start().await;
    mock.add_order(xerox_order("a1", "u1", "notes.pdf")).await;

    let record = mock
        .client()
        .delete_order_record(&OrderId::new("a1"))
        .await
        .unwrap();
    let completion = record.into_completion().unwrap();
    assert_eq!(completion.user_id.as_str(), "u1");
    assert_eq!(completion.file_name, "notes.pdf");
    assert!(mock.order_ids().await.is_empty());
}

#[tokio::test]
async fn test_record_deletion_without_metadata() {
    let mock = MockBackend::start().await;
    mock.add_order(xerox_order("a1", "u1", "notes.pdf")).await;
    mock.strip_metadata().await;

    let record = mock
        .client()
        .delete_order_record(&OrderId::new("a1"))
        .await
        .unwrap();
    assert_eq!(record.into_completion(), Err(GatewayError::MissingMetadata));
}

#[tokio::test]
async fn test_order_by_pin_null_body_is_none() {
    let mock = MockBackend::start().await;
    mock.add_order(stationery_order("s1", "042")).await;
    let client = mock.client();

    let found = client.order_by_pin(&Pin::parse("042").unwrap()).await.unwrap();
    assert_eq!(found.unwrap().order_id.as_str(), "s1");

    let missing = client.order_by_pin(&Pin::parse("999").unwrap()).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_deliver_order_removes_record() {
    let mock = MockBackend::start().await;
    mock.add_order(stationery_order("s1", "042")).await;
    let client = mock.client();

    client.deliver_order(&OrderId::new("s1")).await.unwrap();
    assert!(mock.order_ids().await.is_empty());

    let err = client.deliver_order(&OrderId::new("s1")).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_print_job() {
    let mock = MockBackend::start().await;
    let client = mock.client();

    client
        .print_job(&OrderId::new("a1"), "notes.pdf")
        .await
        .unwrap();
    assert_eq!(mock.requests().await, ["print a1/notes.pdf"]);

    mock.fail(Endpoint::Print, 500).await;
    let err = client
        .print_job(&OrderId::new("a1"), "notes.pdf")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_upload_image_sends_named_field() {
    let mock = MockBackend::start().await;

    let uploaded = mock
        .client()
        .upload_image(
            ImageKind::Logo,
            ImageUpload {
                file_name: "crest.png".to_string(),
                content_type: Some("image/png".to_string()),
                bytes: vec![0x89, b'P', b'N', b'G'],
            },
        )
        .await
        .unwrap();

    assert_eq!(uploaded.filename.as_deref(), Some("stored-crest.png"));
    assert_eq!(
        mock.uploads().await,
        [("logo-upload".to_string(), "crest.png".to_string(), 4)]
    );
}
