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

//! Memrelay error types
//!
//! The taxonomy mirrors how the remote service fails in practice:
//! throttling and name conflicts are expected and recovered locally
//! (by [`crate::retry`] and [`crate::provision`] respectively), while
//! everything else propagates to the caller untouched.

use std::time::Duration;
use thiserror::Error;

/// Result type for memory service operations.
pub type Result<T> = std::result::Result<T, MemrelayError>;

/// Errors that can occur when talking to a memory service.
#[derive(Debug, Error)]
pub enum MemrelayError {
    /// HTTP transport failure (connect, timeout, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any non-success API response that is neither a throttle nor a
    /// conflict. Never retried.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service rejected the call with a rate-limit signal.
    /// Retryable through a [`crate::retry::RetryPlan`] only.
    #[error("throttled by service: {message}")]
    Throttled { message: String },

    /// The named resource already exists. Recovered by the
    /// provisioner's fallback lookup.
    #[error("resource already exists: {message}")]
    Conflict { message: String },

    /// Create reported "already exists" but no listed memory carries
    /// the requested name as an id prefix. Signals a naming or
    /// propagation bug upstream; never silently retried.
    #[error("memory '{name}' reported as existing but absent from listing")]
    MissingAfterConflict { name: String },

    /// A memory entered FAILED state while waiting for it to come up.
    #[error("memory '{id}' entered FAILED state during provisioning")]
    ProvisioningFailed { id: String },

    /// A throttled write gave up after the configured attempt bound.
    #[error("write gave up after {attempts} throttled attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// A bounded poll elapsed before its condition became true.
    #[error("condition not met after waiting {waited:?}")]
    Timeout { waited: Duration },
}

impl MemrelayError {
    /// Whether this error is a rate-limit signal worth retrying.
    pub fn is_throttle(&self) -> bool {
        matches!(self, MemrelayError::Throttled { .. })
    }

    /// Whether this error is an "already exists" conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, MemrelayError::Conflict { .. })
    }
}
