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

//! Bounded polling for asynchronous server-side work
//!
//! The service derives long-term records (and activates freshly created
//! memories) on its own schedule, invisible to the client. Instead of
//! sleeping a guessed duration, these helpers re-read with a fixed
//! interval until the condition holds or a timeout elapses. The
//! derivation latency itself stays a black box; timeout expiry means
//! "not yet", not "never".

use crate::client::MemoryApi;
use crate::error::{MemrelayError, Result};
use crate::types::{MemoryRecord, MemoryStatus, MemorySummary, RetrieveOptions};
use std::time::Duration;

/// Interval/timeout pair for a bounded poll.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(120),
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Poll one memory until it reports ACTIVE.
///
/// FAILED is terminal and surfaces as
/// [`MemrelayError::ProvisioningFailed`]; still CREATING past the
/// timeout surfaces as [`MemrelayError::Timeout`].
pub async fn await_memory_active<C: MemoryApi>(
    api: &C,
    memory_id: &str,
    config: &PollConfig,
) -> Result<MemorySummary> {
    let mut waited = Duration::ZERO;

    loop {
        let memory = api.get_memory(memory_id).await?;
        match memory.status {
            MemoryStatus::Active => return Ok(memory),
            MemoryStatus::Failed => {
                return Err(MemrelayError::ProvisioningFailed {
                    id: memory_id.to_string(),
                })
            }
            _ => {}
        }

        if waited >= config.timeout {
            return Err(MemrelayError::Timeout { waited });
        }
        tracing::debug!(memory_id, status = ?memory.status, "memory not active yet");
        tokio::time::sleep(config.interval).await;
        waited += config.interval;
    }
}

/// Re-run a semantic query until at least `min_results` derived records
/// show up, or the timeout elapses.
pub async fn await_derived_records<C: MemoryApi>(
    api: &C,
    memory_id: &str,
    opts: &RetrieveOptions,
    min_results: usize,
    config: &PollConfig,
) -> Result<Vec<MemoryRecord>> {
    let mut waited = Duration::ZERO;

    loop {
        let records = api.retrieve_memories(memory_id, opts).await?;
        if records.len() >= min_results {
            return Ok(records);
        }

        if waited >= config.timeout {
            return Err(MemrelayError::Timeout { waited });
        }
        tracing::debug!(
            memory_id,
            namespace = %opts.namespace,
            found = records.len(),
            "derived records not ready yet"
        );
        tokio::time::sleep(config.interval).await;
        waited += config.interval;
    }
}
