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

//! Asynchronous tracking sessions.
//!
//! A session fans out one load per resource slot and folds the results into
//! a [`ResourceLedger`](assetgate_core::ResourceLedger) owned by a single
//! task, which publishes a snapshot after every resolution.

pub mod loader;
pub mod session;
#[cfg(test)]
pub mod testing;
