use cinebot::{
    llm::{ErrorKind, InferenceResult},
    recommender::{APOLOGY_TEXT, ReplyText},
};
use pretty_assertions::assert_eq;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

mod common;
use common::{EchoResponder, MockInferenceClient, mount_chat, ollama_client, ollama_reply, service_with};

#[tokio::test]
async fn test_produce_trims_and_passes_content_through() {
    let server = MockServer::start().await;
    mount_chat(&server, ResponseTemplate::new(200).set_body_json(ollama_reply("  Foo  "))).await;

    let service = service_with(Arc::new(ollama_client(&server, 5)));
    assert_eq!(service.produce("qualquer coisa").await, ReplyText::new("Foo"));
}

#[test_log::test(tokio::test)]
async fn test_timeout_degrades_to_apology_within_bound() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(ollama_reply("tarde demais"))
            .set_delay(Duration::from_secs(10)),
    )
    .await;

    let service = service_with(Arc::new(ollama_client(&server, 1)));
    let started = Instant::now();
    let reply = service.produce("um filme de suspense").await;

    assert_eq!(reply.text, APOLOGY_TEXT);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test_log::test(tokio::test)]
async fn test_server_error_degrades_to_apology() {
    let server = MockServer::start().await;
    mount_chat(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

    let client = Arc::new(ollama_client(&server, 5));
    let service = service_with(client);
    let reply = service.produce("drama de guerra").await;

    assert_eq!(reply.text, APOLOGY_TEXT);
    assert!(!reply.text.contains("boom"));
    assert!(!reply.text.contains("500"));
}

#[tokio::test]
async fn test_concurrent_requests_do_not_cross_talk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(EchoResponder)
        .mount(&server)
        .await;

    let service = service_with(Arc::new(ollama_client(&server, 5)));
    let inputs: Vec<String> = (0..12).map(|i| format!("pedido número {}", i)).collect();

    let mut handles = Vec::new();
    for input in inputs.clone() {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let reply = service.produce(&input).await;
            (input, reply)
        }));
    }

    for handle in handles {
        let (input, reply) = handle.await.unwrap();
        assert!(reply.text.starts_with("eco: Pedido do usuário:"));
        assert!(
            reply.text.contains(&format!("\"{}\"", input)),
            "reply for {:?} was {:?}",
            input,
            reply.text
        );
        for other in inputs.iter().filter(|other| **other != input) {
            assert!(!reply.text.contains(&format!("\"{}\"", other)));
        }
    }
}

#[tokio::test]
async fn test_empty_text_completes_normally() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        ResponseTemplate::new(200).set_body_json(ollama_reply("Me conta que tipo de filme você quer ver?")),
    )
    .await;

    let service = service_with(Arc::new(ollama_client(&server, 5)));
    let reply = service.produce("").await;
    assert!(!reply.text.is_empty());
}

#[tokio::test]
async fn test_empty_text_with_failing_endpoint_returns_apology() {
    let mock = MockInferenceClient::new(InferenceResult::failure(
        ErrorKind::NetworkError,
        "connection refused",
    ));
    let service = service_with(Arc::new(mock.clone()));

    assert_eq!(service.produce("").await, ReplyText::apology());
    assert_eq!(mock.get_payloads().len(), 1);
}

#[tokio::test]
async fn test_each_call_builds_a_fresh_payload() {
    let mock = MockInferenceClient::succeeding("1) Cidade de Deus (2002)");
    let service = service_with(Arc::new(mock.clone()));

    service.produce("filme brasileiro").await;
    service.produce("filme brasileiro").await;
    service.produce("animação").await;

    let payloads = mock.get_payloads();
    assert_eq!(payloads.len(), 3);
    assert_eq!(payloads[0], payloads[1]);
    assert!(payloads[2].user_directive.contains("\"animação\""));
}
