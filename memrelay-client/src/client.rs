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

//! Memrelay Client
//!
//! Async HTTP client for hosted agent-memory services. One
//! [`MemoryClient`] is constructed at program entry and passed by
//! reference into everything that needs it; there is no global handle.

use crate::error::{MemrelayError, Result};
use crate::types::*;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::time::Duration;

/// Memory client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the memory service
    pub endpoint: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    /// Request timeout (default: 30 seconds)
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a new client configuration.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the bearer token sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The subset of service operations the provisioning, retry, and poll
/// helpers depend on. Implemented by [`MemoryClient`]; tests substitute
/// scripted fakes.
#[async_trait]
pub trait MemoryApi: Send + Sync {
    async fn create_memory(&self, opts: &CreateMemoryOptions) -> Result<MemorySummary>;
    async fn get_memory(&self, memory_id: &str) -> Result<MemorySummary>;
    async fn list_memories(&self) -> Result<Vec<MemorySummary>>;
    async fn create_event(&self, opts: &CreateEventOptions) -> Result<EventRecord>;
    async fn retrieve_memories(
        &self,
        memory_id: &str,
        opts: &RetrieveOptions,
    ) -> Result<Vec<MemoryRecord>>;
}

/// Typed client over the memory service REST API.
///
/// # Example
///
/// ```no_run
/// use memrelay_client::{ClientConfig, CreateEventOptions, EventMessage, MemoryClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = MemoryClient::new(ClientConfig::new("http://localhost:8080"));
///
///     let memories = client.list_memories().await?;
///     for memory in &memories {
///         println!("{} ({:?})", memory.id, memory.status);
///     }
///
///     let event = client
///         .create_event(&CreateEventOptions::new(
///             "Orders-7x2KQ",
///             "agent-actor",
///             "agent-session",
///             vec![EventMessage::user("hello")],
///         ))
///         .await?;
///     println!("appended event {}", event.event_id);
///     Ok(())
/// }
/// ```
pub struct MemoryClient {
    config: ClientConfig,
    http_client: HttpClient,
}

impl MemoryClient {
    /// Create a new memory client.
    pub fn new(config: ClientConfig) -> Self {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Make an HTTP request and classify failures into the error
    /// taxonomy: 429 is a throttle, 409 (or a validation body naming an
    /// existing resource) is a conflict, anything else non-2xx is a
    /// plain API error.
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
        params: Option<&[(&str, String)]>,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.endpoint.trim_end_matches('/'), path);

        let mut request = self
            .http_client
            .request(method, &url)
            .header("Content-Type", "application/json");

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        if let Some(params) = params {
            request = request.query(params);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), message));
        }

        let result = response.json().await?;
        Ok(result)
    }

    /// Provision a new memory. An existing memory with the same name
    /// surfaces as [`MemrelayError::Conflict`].
    pub async fn create_memory(&self, opts: &CreateMemoryOptions) -> Result<MemorySummary> {
        let envelope: MemoryEnvelope = self
            .request(
                reqwest::Method::POST,
                "/v1/memories",
                Some(serde_json::to_value(opts)?),
                None,
            )
            .await?;
        Ok(envelope.memory)
    }

    /// Fetch one memory by id.
    pub async fn get_memory(&self, memory_id: &str) -> Result<MemorySummary> {
        let envelope: MemoryEnvelope = self
            .request(
                reqwest::Method::GET,
                &format!("/v1/memories/{memory_id}"),
                None,
                None,
            )
            .await?;
        Ok(envelope.memory)
    }

    /// List all memories, following pagination to exhaustion.
    pub async fn list_memories(&self) -> Result<Vec<MemorySummary>> {
        let mut memories = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let params = next_token
                .as_ref()
                .map(|token| vec![("nextToken", token.clone())]);
            let page: ListMemoriesResponse = self
                .request(
                    reqwest::Method::GET,
                    "/v1/memories",
                    None,
                    params.as_deref(),
                )
                .await?;

            memories.extend(page.memories);
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(memories)
    }

    /// Delete one memory and everything stored under it.
    pub async fn delete_memory(&self, memory_id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .request(
                reqwest::Method::DELETE,
                &format!("/v1/memories/{memory_id}"),
                None,
                None,
            )
            .await?;
        Ok(())
    }

    /// Append one event under an actor/session scope.
    ///
    /// Throttling surfaces as [`MemrelayError::Throttled`]; wrap the
    /// call in [`crate::retry::write_event_with_retry`] for the
    /// bounded-backoff behavior.
    pub async fn create_event(&self, opts: &CreateEventOptions) -> Result<EventRecord> {
        let envelope: EventEnvelope = self
            .request(
                reqwest::Method::POST,
                &format!("/v1/memories/{}/events", opts.memory_id),
                Some(serde_json::to_value(opts)?),
                None,
            )
            .await?;
        Ok(envelope.event)
    }

    /// List raw events for an actor/session, newest first.
    pub async fn list_events(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        max_results: Option<u32>,
    ) -> Result<Vec<EventRecord>> {
        let mut params = vec![
            ("actorId", actor_id.to_string()),
            ("sessionId", session_id.to_string()),
        ];
        if let Some(max) = max_results {
            params.push(("maxResults", max.to_string()));
        }

        let mut events = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let mut page_params = params.clone();
            if let Some(token) = &next_token {
                page_params.push(("nextToken", token.clone()));
            }
            let page: ListEventsResponse = self
                .request(
                    reqwest::Method::GET,
                    &format!("/v1/memories/{memory_id}/events"),
                    None,
                    Some(&page_params),
                )
                .await?;

            events.extend(page.events);
            if let Some(max) = max_results {
                if events.len() >= max as usize {
                    events.truncate(max as usize);
                    break;
                }
            }
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(events)
    }

    /// Reconstruct the last `k` conversation turns for an actor/session
    /// from the raw event log.
    pub async fn last_k_turns(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        k: usize,
    ) -> Result<Vec<ConversationTurn>> {
        let events = self
            .list_events(memory_id, actor_id, session_id, None)
            .await?;
        Ok(group_turns(&events, k))
    }

    /// Semantic query over derived records in one namespace. Results
    /// are ranked by relevance score, best first.
    pub async fn retrieve_memories(
        &self,
        memory_id: &str,
        opts: &RetrieveOptions,
    ) -> Result<Vec<MemoryRecord>> {
        let response: ListRecordsResponse = self
            .request(
                reqwest::Method::POST,
                &format!("/v1/memories/{memory_id}/retrieve"),
                Some(serde_json::to_value(opts)?),
                None,
            )
            .await?;
        Ok(response.records)
    }

    /// List every derived record under one namespace, unranked.
    pub async fn list_memory_records(
        &self,
        memory_id: &str,
        namespace: &str,
    ) -> Result<Vec<MemoryRecord>> {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let mut params = vec![("namespace", namespace.to_string())];
            if let Some(token) = &next_token {
                params.push(("nextToken", token.clone()));
            }
            let page: ListRecordsResponse = self
                .request(
                    reqwest::Method::GET,
                    &format!("/v1/memories/{memory_id}/records"),
                    None,
                    Some(&params),
                )
                .await?;

            records.extend(page.records);
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl MemoryApi for MemoryClient {
    async fn create_memory(&self, opts: &CreateMemoryOptions) -> Result<MemorySummary> {
        MemoryClient::create_memory(self, opts).await
    }

    async fn get_memory(&self, memory_id: &str) -> Result<MemorySummary> {
        MemoryClient::get_memory(self, memory_id).await
    }

    async fn list_memories(&self) -> Result<Vec<MemorySummary>> {
        MemoryClient::list_memories(self).await
    }

    async fn create_event(&self, opts: &CreateEventOptions) -> Result<EventRecord> {
        MemoryClient::create_event(self, opts).await
    }

    async fn retrieve_memories(
        &self,
        memory_id: &str,
        opts: &RetrieveOptions,
    ) -> Result<Vec<MemoryRecord>> {
        MemoryClient::retrieve_memories(self, memory_id, opts).await
    }
}

/// Map a non-success response to the error taxonomy.
fn classify_failure(status: u16, message: String) -> MemrelayError {
    if status == 429 || message.contains("ThrottledException") {
        MemrelayError::Throttled { message }
    } else if status == 409 || (status == 400 && message.contains("already exists")) {
        MemrelayError::Conflict { message }
    } else {
        MemrelayError::Api { status, message }
    }
}

/// Group a newest-first event log into conversation turns and keep the
/// last `k`. A turn starts at each USER message; messages that arrive
/// before any USER message attach to the turn in progress.
pub(crate) fn group_turns(events: &[EventRecord], k: usize) -> Vec<ConversationTurn> {
    let mut turns: Vec<ConversationTurn> = Vec::new();

    // walk oldest -> newest
    for event in events.iter().rev() {
        for message in &event.messages {
            let starts_turn = message.role == MessageRole::User;
            if starts_turn || turns.is_empty() {
                turns.push(ConversationTurn::default());
            }
            turns
                .last_mut()
                .expect("just pushed a turn")
                .messages
                .push(message.clone());
        }
    }

    if turns.len() > k {
        turns.drain(..turns.len() - k);
    }
    turns
}
