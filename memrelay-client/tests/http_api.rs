// Copyright 2025 Memrelay Contributors (https://github.com/memrelay)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP contract tests for the memory client against a mock server:
//! URL shapes, auth header, failure classification, and pagination.

use memrelay_client::{
    retry, ClientConfig, CreateEventOptions, CreateMemoryOptions, EventMessage, MemoryClient,
    MemrelayError, RetrieveOptions, RetryPlan,
};
use std::time::Duration;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> MemoryClient {
    MemoryClient::new(ClientConfig::new(server.uri()))
}

fn memory_json(id: &str, name: &str, status: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "status": status })
}

#[tokio::test]
async fn create_memory_posts_wire_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/memories"))
        .and(body_partial_json(json!({
            "name": "Orders",
            "eventExpiryDays": 21
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "memory": memory_json("Orders-7x2KQ", "Orders", "CREATING")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let opts = CreateMemoryOptions::new("Orders").with_event_expiry_days(21);
    let memory = client.create_memory(&opts).await.unwrap();
    assert_eq!(memory.id, "Orders-7x2KQ");
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/memories"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "memories": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = MemoryClient::new(ClientConfig::new(server.uri()).with_api_key("secret-token"));
    let memories = client.list_memories().await.unwrap();
    assert!(memories.is_empty());
}

#[tokio::test]
async fn list_memories_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/memories"))
        .and(query_param("nextToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "memories": [memory_json("Invoices-Aa1Bb", "Invoices", "ACTIVE")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/memories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "memories": [memory_json("Orders-7x2KQ", "Orders", "ACTIVE")],
            "nextToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let memories = client.list_memories().await.unwrap();
    assert_eq!(memories.len(), 2);
    assert_eq!(memories[0].id, "Orders-7x2KQ");
    assert_eq!(memories[1].id, "Invoices-Aa1Bb");
}

#[tokio::test]
async fn rate_limit_response_classifies_as_throttle() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/memories/Orders-7x2KQ/events"))
        .respond_with(ResponseTemplate::new(429).set_body_string("ThrottledException"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let opts = CreateEventOptions::new(
        "Orders-7x2KQ",
        "agent-actor",
        "agent-session",
        vec![EventMessage::user("hello")],
    );
    let err = client.create_event(&opts).await.unwrap_err();
    assert!(err.is_throttle());
}

#[tokio::test]
async fn conflict_response_classifies_as_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/memories"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string("ValidationException: memory 'Orders' already exists"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .create_memory(&CreateMemoryOptions::new("Orders"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn server_error_surfaces_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/memories/missing"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    match client.get_memory("missing").await.unwrap_err() {
        MemrelayError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal error");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_event_targets_memory_scoped_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/memories/Orders-7x2KQ/events"))
        .and(body_partial_json(json!({
            "actorId": "agent-actor",
            "sessionId": "agent-session",
            "messages": [{ "text": "hello", "role": "USER" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "event": {
                "eventId": "ev-1",
                "memoryId": "Orders-7x2KQ",
                "actorId": "agent-actor",
                "sessionId": "agent-session",
                "timestamp": "2025-08-26T12:00:00Z",
                "messages": [{ "text": "hello", "role": "USER" }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let opts = CreateEventOptions::new(
        "Orders-7x2KQ",
        "agent-actor",
        "agent-session",
        vec![EventMessage::user("hello")],
    );
    let event = client.create_event(&opts).await.unwrap();
    assert_eq!(event.event_id, "ev-1");
}

#[tokio::test]
async fn retrieve_parses_ranked_records() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/memories/Orders-7x2KQ/retrieve"))
        .and(body_partial_json(json!({
            "namespace": "/facts/agent-actor",
            "query": "laptop preferences",
            "topK": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {
                    "recordId": "rec-1",
                    "namespaces": ["/facts/agent-actor"],
                    "content": { "text": "User prefers ThinkPad keyboards" },
                    "score": 0.91
                },
                {
                    "recordId": "rec-2",
                    "namespaces": ["/facts/agent-actor"],
                    "content": { "text": "User runs Linux" },
                    "score": 0.77
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let opts = RetrieveOptions::new("/facts/agent-actor", "laptop preferences").with_top_k(3);
    let records = client
        .retrieve_memories("Orders-7x2KQ", &opts)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text(), "User prefers ThinkPad keyboards");
    assert_eq!(records[0].score, Some(0.91));
}

#[tokio::test]
async fn retried_write_rides_out_two_throttles() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/memories/Orders-7x2KQ/events"))
        .respond_with(ResponseTemplate::new(429).set_body_string("ThrottledException"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/memories/Orders-7x2KQ/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "event": {
                "eventId": "ev-2",
                "memoryId": "Orders-7x2KQ",
                "actorId": "agent-actor",
                "sessionId": "agent-session",
                "timestamp": "2025-08-26T12:00:00Z",
                "messages": [{ "text": "hello", "role": "USER" }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let opts = CreateEventOptions::new(
        "Orders-7x2KQ",
        "agent-actor",
        "agent-session",
        vec![EventMessage::user("hello")],
    );
    let plan = RetryPlan::fixed(5, Duration::from_millis(10));
    let event = retry::write_event_with_retry(&client, &opts, &plan)
        .await
        .unwrap();
    assert_eq!(event.event_id, "ev-2");
}

#[tokio::test]
async fn list_events_query_carries_scope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/memories/Orders-7x2KQ/events"))
        .and(query_param("actorId", "agent-actor"))
        .and(query_param("sessionId", "agent-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [{
                "eventId": "ev-9",
                "memoryId": "Orders-7x2KQ",
                "actorId": "agent-actor",
                "sessionId": "agent-session",
                "timestamp": "2025-08-26T12:00:00Z",
                "messages": [{ "text": "latest", "role": "USER" }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let events = client
        .list_events("Orders-7x2KQ", "agent-actor", "agent-session", None)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, "ev-9");
}
