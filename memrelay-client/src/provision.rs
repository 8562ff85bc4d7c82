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

//! Idempotent memory provisioning
//!
//! `get_or_create_memory` makes "ensure this named memory exists" safe
//! to run on every script start: the first run creates, later runs hit
//! the name conflict and fall back to a lookup. The service assigns ids
//! by suffixing the requested name (`Orders` -> `Orders-7x2KQ`), so the
//! fallback matches on id prefix.

use crate::client::MemoryApi;
use crate::error::{MemrelayError, Result};
use crate::poll::{await_memory_active, PollConfig};
use crate::types::{
    facts_namespace, preferences_namespace, CreateMemoryOptions, MemorySummary, StrategyConfig,
};

/// Return a stable id for the logically named memory, creating it if
/// absent.
///
/// A conflict on create falls back to listing and picking the memory
/// whose id starts with the requested name. Conflict with no such entry
/// is a fatal inconsistency ([`MemrelayError::MissingAfterConflict`]),
/// not something to retry. Every other create failure propagates.
pub async fn get_or_create_memory<C: MemoryApi>(
    api: &C,
    opts: &CreateMemoryOptions,
) -> Result<String> {
    match api.create_memory(opts).await {
        Ok(memory) => {
            tracing::info!(id = %memory.id, name = %opts.name, "memory created");
            Ok(memory.id)
        }
        Err(e) if e.is_conflict() => {
            tracing::info!(name = %opts.name, "memory already exists, looking up id");
            let memories = api.list_memories().await?;
            memories
                .into_iter()
                .find(|m| m.id.starts_with(&opts.name))
                .map(|m| m.id)
                .ok_or_else(|| MemrelayError::MissingAfterConflict {
                    name: opts.name.clone(),
                })
        }
        Err(e) => Err(e),
    }
}

/// Get-or-create, then poll until the memory reports ACTIVE.
pub async fn provision_and_wait<C: MemoryApi>(
    api: &C,
    opts: &CreateMemoryOptions,
    wait: &PollConfig,
) -> Result<MemorySummary> {
    let id = get_or_create_memory(api, opts).await?;
    await_memory_active(api, &id, wait).await
}

/// Short-term memory preset: raw events only, 21-day expiry.
pub fn short_term_spec(name: impl Into<String>) -> CreateMemoryOptions {
    CreateMemoryOptions::new(name)
        .with_description("short-term memory - raw conversation events")
        .with_event_expiry_days(21)
}

/// Long-term memory preset: semantic fact and user preference
/// strategies scoped to `actor`, 365-day expiry.
pub fn long_term_spec(name: impl Into<String>, actor: &str) -> CreateMemoryOptions {
    CreateMemoryOptions::new(name)
        .with_description("long-term memory - semantic and preference strategies")
        .with_strategy(StrategyConfig::semantic(
            "semanticFacts",
            facts_namespace(actor),
        ))
        .with_strategy(StrategyConfig::user_preference(
            "userPreferences",
            preferences_namespace(actor),
        ))
        .with_event_expiry_days(365)
}
