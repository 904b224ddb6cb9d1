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

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

/// The load state of a single resource slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LoadOutcome {
    Pending,
    Loaded,
    Failed,
}

impl LoadOutcome {
    /// Whether this is `Loaded` or `Failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, LoadOutcome::Pending)
    }
}

impl Display for LoadOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadOutcome::Pending => write!(f, "pending"),
            LoadOutcome::Loaded => write!(f, "loaded"),
            LoadOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// A read-only snapshot of a tracking session.
///
/// `resolved` and `total` count slots, not distinct identifiers: a repeated
/// identifier counts once per occurrence towards both, while it appears at
/// most once in `loaded` or `failed`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub ready: bool,
    pub progress_percent: f64,
    pub loaded: BTreeSet<String>,
    pub failed: BTreeSet<String>,
    pub resolved: usize,
    pub total: usize,
}

impl TrackerState {
    /// The terminal state of a session over an empty resource set.
    pub fn empty_ready() -> Self {
        Self {
            ready: true,
            progress_percent: 100.0,
            loaded: BTreeSet::new(),
            failed: BTreeSet::new(),
            resolved: 0,
            total: 0,
        }
    }

    /// Serialize the snapshot as JSON.
    pub fn to_json(&self) -> String {
        // A struct of strings, sets and numbers always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Display for TrackerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.0}% ({}/{} resolved, {} loaded, {} failed)",
            self.progress_percent,
            self.resolved,
            self.total,
            self.loaded.len(),
            self.failed.len()
        )?;
        if self.ready {
            write!(f, " ready")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_outcomes() {
        assert!(!LoadOutcome::Pending.is_terminal());
        assert!(LoadOutcome::Loaded.is_terminal());
        assert!(LoadOutcome::Failed.is_terminal());
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let mut state = TrackerState::empty_ready();
        state.loaded.insert("b.png".to_string());
        state.loaded.insert("a.png".to_string());
        let json = state.to_json();
        assert_eq!(
            json,
            r#"{"ready":true,"progressPercent":100.0,"loaded":["a.png","b.png"],"failed":[],"resolved":0,"total":0}"#
        );
    }

    #[test]
    fn test_display() {
        let state = TrackerState::empty_ready();
        assert_eq!(
            state.to_string(),
            "100% (0/0 resolved, 0 loaded, 0 failed) ready"
        );
    }
}
