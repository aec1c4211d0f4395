use std::time::{Duration, Instant};

use gnusdao_core::ipfs::{IpfsClient, IpfsConfig, IpfsError, IpfsProvider, ProposalMetadata};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

fn test_config(api: &MockServer, gateways: &[&MockServer]) -> IpfsConfig {
    let mut urls: Vec<String> = gateways.iter().map(|g| format!("{}/ipfs/", g.uri())).collect();
    let primary = if urls.is_empty() {
        String::new()
    } else {
        urls.remove(0)
    };
    IpfsConfig {
        provider: IpfsProvider::Pinata,
        pinata_api_url: api.uri(),
        pinata_jwt: Some("test-jwt".to_string()),
        node_api_url: api.uri(),
        gateway_url: primary,
        backup_gateways: urls,
        request_timeout_ms: 300,
        max_retries: 2,
        retry_base_delay_ms: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_pinata_file_upload() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(header("authorization", "Bearer test-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "IpfsHash": CID,
            "PinSize": 11,
            "Timestamp": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&api)
        .await;

    let client = IpfsClient::new(test_config(&api, &[&api])).unwrap();
    let result = client.upload_file("notes.txt", b"hello world".to_vec()).await.unwrap();
    assert_eq!(result.hash, CID);
    assert_eq!(result.size, 11);
    assert_eq!(result.url, format!("{}/ipfs/{}", api.uri(), CID));
}

#[tokio::test]
async fn test_upload_rejected_before_network() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;

    let mut config = test_config(&api, &[&api]);
    config.max_file_size = 4;
    let client = IpfsClient::new(config).unwrap();

    let err = client.upload_file("notes.txt", b"too large".to_vec()).await.unwrap_err();
    assert!(matches!(err, IpfsError::FileTooLarge { size: 9, max: 4 }));

    let err = client.upload_file("tool.exe", b"MZ".to_vec()).await.unwrap_err();
    assert!(matches!(err, IpfsError::UnsupportedFileType(_)));
}

#[tokio::test]
async fn test_missing_pinata_credentials() {
    let api = MockServer::start().await;
    let mut config = test_config(&api, &[&api]);
    config.pinata_jwt = None;
    let client = IpfsClient::new(config).unwrap();

    let err = client.upload_file("a.txt", b"hi".to_vec()).await.unwrap_err();
    assert!(matches!(err, IpfsError::Configuration(_)));
}

#[tokio::test]
async fn test_pinata_error_status_surfaces() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinJSONToIPFS"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&api)
        .await;

    let client = IpfsClient::new(test_config(&api, &[&api])).unwrap();
    let err = client.upload_json(&json!({"a": 1}), "doc").await.unwrap_err();
    match err {
        IpfsError::UploadFailed(msg) => assert!(msg.contains("401")),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_node_provider_add_and_pin() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "doc.json",
            "Hash": CID,
            "Size": "27"
        })))
        .mount(&api)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v0/pin/add"))
        .and(query_param("arg", CID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Pins": [CID] })))
        .expect(1)
        .mount(&api)
        .await;

    let mut config = test_config(&api, &[&api]);
    config.provider = IpfsProvider::Node;
    let client = IpfsClient::new(config).unwrap();

    let metadata = ProposalMetadata::new("Title", "Body", 1_700_000_000);
    let result = client.upload_metadata(&metadata).await.unwrap();
    assert_eq!(result.hash, CID);
    assert_eq!(result.size, 27);

    client.pin_by_hash(&format!("ipfs://{}", CID)).await.unwrap();
}

#[tokio::test]
async fn test_fetch_falls_back_to_backup_gateway() {
    let api = MockServer::start().await;
    let primary = MockServer::start().await;
    let backup = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{}", CID)))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{}", CID)))
        .respond_with(ResponseTemplate::new(200).set_body_string("proposal body"))
        .expect(1)
        .mount(&backup)
        .await;

    let client = IpfsClient::new(test_config(&api, &[&primary, &backup])).unwrap();
    let bytes = client.fetch(CID).await.unwrap();
    assert_eq!(bytes, b"proposal body");
}

#[tokio::test]
async fn test_fetch_times_out_slow_gateway() {
    let api = MockServer::start().await;
    let slow = MockServer::start().await;
    let fast = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&slow)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{}", CID)))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&fast)
        .await;

    let client = IpfsClient::new(test_config(&api, &[&slow, &fast])).unwrap();
    let bytes = client.fetch(CID).await.unwrap();
    assert_eq!(bytes, b"ok");
}

#[tokio::test]
async fn test_fetch_exhausts_all_gateways() {
    let api = MockServer::start().await;
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    for server in [&first, &second] {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(server)
            .await;
    }

    let client = IpfsClient::new(test_config(&api, &[&first, &second])).unwrap();
    match client.fetch(CID).await {
        Err(IpfsError::AllGatewaysFailed { hash, attempts }) => {
            assert_eq!(hash, CID);
            assert_eq!(attempts.len(), 4);
        }
        other => panic!("expected AllGatewaysFailed, got {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn test_fetch_backoff_doubles_between_passes() {
    let api = MockServer::start().await;
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&gateway)
        .await;

    let mut config = test_config(&api, &[&gateway]);
    config.max_retries = 3;
    config.retry_base_delay_ms = 100;
    let client = IpfsClient::new(config).unwrap();

    let started = Instant::now();
    let result = client.fetch(CID).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(IpfsError::AllGatewaysFailed { .. })));
    // 100ms before the second pass, 200ms before the third
    assert!(elapsed >= Duration::from_millis(300), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_fetch_rejects_invalid_hash() {
    let api = MockServer::start().await;
    let client = IpfsClient::new(test_config(&api, &[&api])).unwrap();
    assert!(matches!(client.fetch("Qm123").await, Err(IpfsError::InvalidHash(_))));
}

#[tokio::test]
async fn test_fetch_metadata_validates_document() {
    let api = MockServer::start().await;
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{}", CID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "",
            "description": "Body",
            "createdAt": 1
        })))
        .mount(&gateway)
        .await;

    let client = IpfsClient::new(test_config(&api, &[&gateway])).unwrap();
    let err = client.fetch_metadata(CID).await.unwrap_err();
    assert!(matches!(err, IpfsError::InvalidMetadata(_)));
}
