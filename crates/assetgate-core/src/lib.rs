// Copyright 2025 Fernando Borretti
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

//! assetgate-core: Core library for the assetgate readiness tracker.
//!
//! This library is runtime-free and WASM-compatible. It provides:
//! - The per-resource ledger that turns load resolutions into snapshots
//! - The [`TrackerState`] snapshot handed to callers
//! - The gate latch deciding between placeholder and content
//! - The TOML gate manifest

pub mod error;
pub mod gate;
pub mod ledger;
pub mod manifest;
pub mod state;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, fail};
pub use gate::{GateLatch, GateView};
pub use ledger::ResourceLedger;
pub use manifest::{Fallback, GateManifest};
pub use state::{LoadOutcome, TrackerState};
