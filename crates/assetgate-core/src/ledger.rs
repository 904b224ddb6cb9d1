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

use crate::state::LoadOutcome;
use crate::state::TrackerState;

/// Per-resource bookkeeping for one tracking session.
///
/// Each identifier in the input gets its own slot, so repeated identifiers
/// are tracked independently. A slot moves from `Pending` to a terminal
/// outcome exactly once; later resolutions of the same slot are ignored.
///
/// The ledger has a single owner. Whatever drives the loads (a tokio task,
/// browser event handlers) must funnel every resolution through that owner.
#[derive(Clone, Debug)]
pub struct ResourceLedger {
    ids: Vec<String>,
    outcomes: Vec<LoadOutcome>,
    resolved: usize,
}

impl ResourceLedger {
    /// Construct a new [`ResourceLedger`] with every slot pending.
    pub fn new(ids: Vec<String>) -> Self {
        let outcomes = vec![LoadOutcome::Pending; ids.len()];
        Self {
            ids,
            outcomes,
            resolved: 0,
        }
    }

    /// The number of slots.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The identifiers, in input order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// The identifier held by a slot.
    pub fn id(&self, slot: usize) -> Option<&str> {
        self.ids.get(slot).map(String::as_str)
    }

    /// The current outcome of a slot.
    pub fn outcome(&self, slot: usize) -> Option<LoadOutcome> {
        self.outcomes.get(slot).copied()
    }

    /// True once every slot is terminal. An empty ledger is complete.
    pub fn is_complete(&self) -> bool {
        self.resolved == self.ids.len()
    }

    /// Record the outcome of a slot and return the recomputed snapshot.
    ///
    /// Returns `None`, and changes nothing, if the slot does not exist, is
    /// already terminal, or `outcome` is `Pending`.
    pub fn resolve(&mut self, slot: usize, outcome: LoadOutcome) -> Option<TrackerState> {
        if !outcome.is_terminal() {
            return None;
        }
        let current = self.outcomes.get_mut(slot)?;
        if current.is_terminal() {
            return None;
        }
        *current = outcome;
        self.resolved += 1;
        Some(self.snapshot())
    }

    /// Compute the aggregate snapshot.
    pub fn snapshot(&self) -> TrackerState {
        let total = self.ids.len();
        if total == 0 {
            return TrackerState::empty_ready();
        }
        let mut loaded: BTreeSet<String> = BTreeSet::new();
        let mut failed: BTreeSet<String> = BTreeSet::new();
        for (id, outcome) in self.ids.iter().zip(self.outcomes.iter()) {
            match outcome {
                LoadOutcome::Loaded => {
                    loaded.insert(id.clone());
                }
                LoadOutcome::Failed => {
                    failed.insert(id.clone());
                }
                LoadOutcome::Pending => {}
            }
        }
        // An identifier with both a loaded and a failed occurrence counts as
        // loaded, so the two sets stay disjoint.
        failed.retain(|id| !loaded.contains(id));
        let progress_percent = if self.resolved == total {
            100.0
        } else {
            (self.resolved as f64 / total as f64) * 100.0
        };
        TrackerState {
            ready: self.resolved == total,
            progress_percent,
            loaded,
            failed,
            resolved: self.resolved,
            total,
        }
    }
}
