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

//! # Memrelay client
//!
//! Typed async client for hosted agent-memory services: append
//! conversation events, let the service derive facts/preferences/
//! summaries asynchronously, query them semantically.
//!
//! Two helpers cover the patterns every integration ends up needing:
//! [`provision::get_or_create_memory`] makes named-memory provisioning
//! idempotent, and [`retry::write_event_with_retry`] rides out service
//! rate limits with bounded backoff.
//!
//! ## Quick start
//!
//! ```no_run
//! use memrelay_client::{
//!     provision, retry, ClientConfig, CreateEventOptions, EventMessage, MemoryClient,
//!     RetryPlan,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MemoryClient::new(ClientConfig::new("http://localhost:8080"));
//!
//!     // idempotent: same id on every run
//!     let spec = provision::long_term_spec("AgentLongTermMemory", "agent-actor");
//!     let memory_id = provision::get_or_create_memory(&client, &spec).await?;
//!
//!     // throttle-tolerant append
//!     let opts = CreateEventOptions::new(
//!         &memory_id,
//!         "agent-actor",
//!         "agent-session",
//!         vec![
//!             EventMessage::user("I prefer dark UI themes"),
//!             EventMessage::assistant("Noted!"),
//!         ],
//!     );
//!     retry::write_event_with_retry(&client, &opts, &RetryPlan::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod poll;
pub mod provision;
pub mod retry;
pub mod types;

pub use client::{ClientConfig, MemoryApi, MemoryClient};
pub use error::{MemrelayError, Result};
pub use poll::PollConfig;
pub use retry::{BackoffPolicy, RetryPlan};
pub use types::{
    facts_namespace, preferences_namespace, summaries_namespace, ConversationTurn,
    CreateEventOptions, CreateMemoryOptions, CustomSummaryParams, EventMessage, EventRecord,
    MemoryRecord, MemoryStatus, MemorySummary, MessageRole, RecordContent, RetrieveOptions,
    StrategyConfig, StrategyParams,
};
