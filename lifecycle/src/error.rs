//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Error types for running shutdown hooks

use std::time::Duration;
use thiserror::Error;

/// Result type for lifecycle operations
pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

/// Shutdown hook error types
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The hooks did not all finish within the allowed time
    #[error("Timed out after {timeout:?} with {pending} shutdown hook(s) pending")]
    Timeout {
        /// The time allowed
        timeout: Duration,
        /// Hooks that had not finished when time ran out
        pending: usize,
    },

    /// Some hooks panicked. The remaining hooks still ran.
    #[error("{count} shutdown hook(s) panicked")]
    HookPanicked {
        /// Number of hooks that panicked
        count: usize,
    },

    /// The worker thread that runs the hooks could not be started
    #[error("Failed to spawn shutdown worker: {0}")]
    Spawn(#[from] std::io::Error),
}

impl LifecycleError {
    /// Check if some hooks may still be running in the background
    pub fn is_timeout(&self) -> bool {
        matches!(self, LifecycleError::Timeout { .. })
    }
}
