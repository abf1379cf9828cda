use serde_json::json;
use snake_identifier::*;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-123",
        "model": "anthropic/claude-3.5-sonnet",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn client_for(server: &MockServer) -> OpenRouterClient {
    OpenRouterClient::new(OpenRouterConfig::with_api_key("test-key").endpoint(server.uri()))
}

// --- Inference client ---

#[tokio::test]
async fn test_client_sends_expected_request() {
    let server = MockServer::start().await;
    let data_uri = encode_data_uri(PNG_BYTES, "image/png");

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(header("X-Title", "Snake Species Identifier"))
        .and(body_partial_json(json!({
            "model": "anthropic/claude-3.5-sonnet",
            "max_tokens": 500,
            "temperature": 0.3,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text" },
                    { "type": "image_url", "image_url": { "url": data_uri } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).complete(&data_uri).await.unwrap();
    assert_eq!(reply, "ok");
}

#[tokio::test]
async fn test_client_upstream_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(402).set_body_string("insufficient credits"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete("data:image/png;base64,")
        .await
        .unwrap_err();

    match err {
        InferenceError::Upstream { status, body } => {
            assert_eq!(status, 402);
            assert_eq!(body, "insufficient credits");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_no_choices_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete("data:image/png;base64,")
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::EmptyResponse));
}

#[tokio::test]
async fn test_client_missing_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(0)
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(OpenRouterConfig::default().endpoint(server.uri()));
    let err = client.complete("data:image/png;base64,").await.unwrap_err();
    assert!(matches!(err, InferenceError::MissingApiKey));
}

// --- Orchestrator over HTTP ---

#[tokio::test]
async fn test_identify_structured_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"species": "Crotalus atrox", "isVenomous": true, "confidence": 0.93, "description": "Western diamondback rattlesnake"}"#,
        )))
        .mount(&server)
        .await;

    let identifier = SnakeIdentifier::new(client_for(&server));
    let record = identifier.identify(PNG_BYTES, "image/png").await.unwrap();

    assert_eq!(
        record,
        IdentificationRecord {
            species: "Crotalus atrox".to_string(),
            is_venomous: true,
            confidence: 0.93,
            description: "Western diamondback rattlesnake".to_string(),
        }
    );
    assert_eq!(record.confidence_level(), ConfidenceLevel::High);
}

#[tokio::test]
async fn test_identify_prose_reply_uses_extraction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Species: Boa constrictor\nVenomous: no\nConfidence: 0.85\nDescription: large constrictor",
        )))
        .mount(&server)
        .await;

    let identifier = SnakeIdentifier::new(client_for(&server));
    let record = identifier.identify(PNG_BYTES, "image/png").await.unwrap();

    assert_eq!(record.species, "Boa constrictor");
    assert!(!record.is_venomous);
    assert_eq!(record.confidence, 0.85);
    assert_eq!(record.description, "large constrictor");
}

#[tokio::test]
async fn test_identify_missing_key_message() {
    let identifier = SnakeIdentifier::new(OpenRouterClient::new(OpenRouterConfig::default()));
    let err = identifier.identify(PNG_BYTES, "image/png").await.unwrap_err();

    assert_eq!(err, IdentifyError::ApiKeyNotConfigured);
    assert!(err.to_string().contains("API key"));
}

#[tokio::test]
async fn test_identify_upstream_failure_message_differs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let identifier = SnakeIdentifier::new(client_for(&server));
    let err = identifier.identify(PNG_BYTES, "image/png").await.unwrap_err();

    assert_eq!(err, IdentifyError::UpstreamUnavailable);
    assert_ne!(err.to_string(), IdentifyError::ApiKeyNotConfigured.to_string());
}

#[tokio::test]
async fn test_identify_unreachable_endpoint_is_upstream_failure() {
    let client = OpenRouterClient::new(
        OpenRouterConfig::with_api_key("test-key").endpoint("http://127.0.0.1:1"),
    );
    let identifier = SnakeIdentifier::new(client);
    let err = identifier.identify(PNG_BYTES, "image/png").await.unwrap_err();

    assert_eq!(err, IdentifyError::UpstreamUnavailable);
}

#[tokio::test]
async fn test_identify_undecodable_body_is_generic_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let identifier = SnakeIdentifier::new(client_for(&server));
    let err = identifier.identify(PNG_BYTES, "image/png").await.unwrap_err();
    assert_eq!(err, IdentifyError::Failed);
}
