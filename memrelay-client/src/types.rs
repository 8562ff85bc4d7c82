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

//! Memrelay wire types
//!
//! DTOs for the memory service REST API plus the option builders the
//! client methods accept. Field names follow the service's camelCase
//! wire format; strategy configs are externally tagged the way the
//! service expects them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a remote memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoryStatus {
    Creating,
    Active,
    Failed,
    Deleting,
}

/// One remote memory as reported by create/get/list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySummary {
    /// Server-assigned identifier. Prefixed by the requested name,
    /// e.g. `Orders` -> `Orders-7x2KQ`.
    pub id: String,
    pub name: String,
    pub status: MemoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_expiry_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Parameters shared by the built-in derivation strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyParams {
    pub name: String,
    pub namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parameters for the custom summary strategy, which additionally
/// carries the summarization prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSummaryParams {
    pub name: String,
    pub namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Long-term derivation strategy attached to a memory at creation.
///
/// Externally tagged: each variant serializes as a single-key object,
/// e.g. `{"semanticMemoryStrategy": {"name": ..., "namespaces": [...]}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrategyConfig {
    #[serde(rename = "semanticMemoryStrategy")]
    Semantic(StrategyParams),
    #[serde(rename = "userPreferenceMemoryStrategy")]
    UserPreference(StrategyParams),
    #[serde(rename = "summaryMemoryStrategy")]
    Summary(StrategyParams),
    #[serde(rename = "customSummaryMemoryStrategy")]
    CustomSummary(CustomSummaryParams),
}

impl StrategyConfig {
    /// Semantic fact extraction into `namespace`.
    pub fn semantic(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        StrategyConfig::Semantic(StrategyParams {
            name: name.into(),
            namespaces: vec![namespace.into()],
            description: None,
        })
    }

    /// User preference extraction into `namespace`.
    pub fn user_preference(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        StrategyConfig::UserPreference(StrategyParams {
            name: name.into(),
            namespaces: vec![namespace.into()],
            description: None,
        })
    }

    /// Session summarization into `namespace`.
    pub fn summary(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        StrategyConfig::Summary(StrategyParams {
            name: name.into(),
            namespaces: vec![namespace.into()],
            description: None,
        })
    }
}

/// Role of one message inside an appended event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
    Other,
}

/// One message of a conversation exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub text: String,
    pub role: MessageRole,
}

impl EventMessage {
    pub fn new(text: impl Into<String>, role: MessageRole) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, MessageRole::User)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, MessageRole::Assistant)
    }
}

/// One raw event as stored by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_id: String,
    pub memory_id: String,
    pub actor_id: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub messages: Vec<EventMessage>,
}

/// A user/assistant exchange reconstructed from raw events.
#[derive(Debug, Clone, Default)]
pub struct ConversationTurn {
    pub messages: Vec<EventMessage>,
}

/// Inner content of a derived record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordContent {
    pub text: String,
}

/// One record derived asynchronously by the service (fact, preference,
/// or summary). `score` is only present on semantic-query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    pub record_id: String,
    pub namespaces: Vec<String>,
    pub content: RecordContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    /// The record's content text.
    pub fn text(&self) -> &str {
        &self.content.text
    }
}

/// Options for creating a memory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strategies: Vec<StrategyConfig>,
    pub event_expiry_days: u32,
}

impl CreateMemoryOptions {
    /// New options with no strategies and a 90-day event expiry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            strategies: Vec::new(),
            event_expiry_days: 90,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn with_event_expiry_days(mut self, days: u32) -> Self {
        self.event_expiry_days = days;
        self
    }
}

/// Options for appending one event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventOptions {
    #[serde(skip_serializing)]
    pub memory_id: String,
    pub actor_id: String,
    pub session_id: String,
    pub messages: Vec<EventMessage>,
}

impl CreateEventOptions {
    pub fn new(
        memory_id: impl Into<String>,
        actor_id: impl Into<String>,
        session_id: impl Into<String>,
        messages: Vec<EventMessage>,
    ) -> Self {
        Self {
            memory_id: memory_id.into(),
            actor_id: actor_id.into(),
            session_id: session_id.into(),
            messages,
        }
    }
}

/// Options for a semantic query over derived records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveOptions {
    pub namespace: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl RetrieveOptions {
    pub fn new(namespace: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            query: query.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// Namespace for semantic facts extracted for `actor`.
pub fn facts_namespace(actor: &str) -> String {
    format!("/facts/{actor}")
}

/// Namespace for preferences extracted for `actor`.
pub fn preferences_namespace(actor: &str) -> String {
    format!("/preferences/{actor}")
}

/// Namespace for summaries of one actor's session.
pub fn summaries_namespace(actor: &str, session: &str) -> String {
    format!("/summaries/{actor}/{session}")
}

// ---- response envelopes ----

#[derive(Debug, Deserialize)]
pub(crate) struct MemoryEnvelope {
    pub memory: MemorySummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListMemoriesResponse {
    pub memories: Vec<MemorySummary>,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventEnvelope {
    pub event: EventRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListEventsResponse {
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListRecordsResponse {
    pub records: Vec<MemoryRecord>,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_serializes_externally_tagged() {
        let strategy = StrategyConfig::semantic("semanticFacts", "/facts/agent-actor");
        let value = serde_json::to_value(&strategy).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "semanticMemoryStrategy": {
                    "name": "semanticFacts",
                    "namespaces": ["/facts/agent-actor"]
                }
            })
        );
    }

    #[test]
    fn role_uses_wire_casing() {
        let msg = EventMessage::user("hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "USER");
    }

    #[test]
    fn status_parses_screaming_snake() {
        let status: MemoryStatus = serde_json::from_str("\"ACTIVE\"").unwrap();
        assert_eq!(status, MemoryStatus::Active);
    }

    #[test]
    fn create_memory_body_omits_empty_strategies() {
        let opts = CreateMemoryOptions::new("Orders").with_event_expiry_days(21);
        let value = serde_json::to_value(&opts).unwrap();
        assert!(value.get("strategies").is_none());
        assert_eq!(value["eventExpiryDays"], 21);
    }

    #[test]
    fn namespace_helpers_match_wire_paths() {
        assert_eq!(facts_namespace("alice"), "/facts/alice");
        assert_eq!(preferences_namespace("alice"), "/preferences/alice");
        assert_eq!(summaries_namespace("alice", "s1"), "/summaries/alice/s1");
    }

    #[test]
    fn record_score_is_optional() {
        let json = serde_json::json!({
            "recordId": "rec-1",
            "namespaces": ["/facts/alice"],
            "content": { "text": "prefers dark themes" }
        });
        let record: MemoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.text(), "prefers dark themes");
        assert!(record.score.is_none());
    }
}
