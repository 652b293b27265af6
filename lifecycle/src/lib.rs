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

//! Process shutdown hooks.
//!
//! A [`ShutdownHooks`] registry collects cleanup callbacks, typically
//! terminal restoration, and runs them once, in registration order, before
//! the process exits. Running never blocks for longer than a timeout so a
//! stuck hook cannot keep the process alive.

mod error;
mod hooks;

pub use self::error::{LifecycleError, LifecycleResult};
pub use self::hooks::{DEFAULT_EXIT_TIMEOUT, ShutdownHooks};
