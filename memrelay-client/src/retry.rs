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

//! Throttle-tolerant writes
//!
//! The service rate-limits event appends under load. [`RetryPlan`]
//! retries *only* that signal, sleeping a [`BackoffPolicy`] delay
//! between attempts and giving up after a bounded attempt count. Any
//! other failure propagates immediately without a retry.

use crate::client::MemoryApi;
use crate::error::{MemrelayError, Result};
use crate::types::{CreateEventOptions, EventRecord};
use std::future::Future;
use std::time::Duration;

/// Delay schedule between throttled attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Constant delay between attempts.
    Fixed(Duration),
    /// Delay doubles after every throttled attempt, unbounded.
    Exponential { initial: Duration },
    /// Delay doubles after every throttled attempt, clamped at `max`.
    CappedExponential { initial: Duration, max: Duration },
}

impl BackoffPolicy {
    /// Delay slept after attempt number `attempt` (zero-based) before
    /// the next one.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match *self {
            BackoffPolicy::Fixed(delay) => delay,
            BackoffPolicy::Exponential { initial } => doubled(initial, attempt),
            BackoffPolicy::CappedExponential { initial, max } => doubled(initial, attempt).min(max),
        }
    }
}

fn doubled(initial: Duration, attempt: u32) -> Duration {
    initial.saturating_mul(1u32 << attempt.min(31))
}

/// Bounded retry loop over a throttleable operation.
#[derive(Debug, Clone)]
pub struct RetryPlan {
    /// Total invocation bound, counting the first attempt.
    pub max_attempts: u32,
    pub backoff: BackoffPolicy,
}

impl RetryPlan {
    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: BackoffPolicy::Fixed(delay),
        }
    }

    /// Exponential backoff starting at `initial`, no cap.
    pub fn exponential(max_attempts: u32, initial: Duration) -> Self {
        Self {
            max_attempts,
            backoff: BackoffPolicy::Exponential { initial },
        }
    }

    /// Exponential backoff clamped at `max`.
    pub fn capped(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            backoff: BackoffPolicy::CappedExponential { initial, max },
        }
    }

    /// Run `op` until it succeeds, fails with a non-throttle error, or
    /// the attempt bound is spent. Exactly `max_attempts` invocations
    /// happen in the always-throttled case; zero attempts is exhaustion
    /// without ever invoking `op`.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last: Option<MemrelayError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.backoff.delay_for_attempt(attempt - 1);
                tracing::debug!(attempt, ?delay, "throttled, backing off");
                tokio::time::sleep(delay).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_throttle() => last = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(MemrelayError::RetriesExhausted {
            attempts: self.max_attempts,
            last: last
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts were made".into()),
        })
    }
}

impl Default for RetryPlan {
    /// Five attempts with exponential backoff from one second, capped
    /// at thirty.
    fn default() -> Self {
        Self::capped(5, Duration::from_secs(1), Duration::from_secs(30))
    }
}

/// Append one event, riding out rate limits per `plan`.
pub async fn write_event_with_retry<C: MemoryApi>(
    api: &C,
    opts: &CreateEventOptions,
    plan: &RetryPlan,
) -> Result<EventRecord> {
    plan.run(|| api.create_event(opts)).await
}
