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

use crate::state::TrackerState;

/// What a gated view should render.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GateView {
    /// Render the loading placeholder, with a progress bar if `progress` is
    /// present.
    Placeholder { progress: Option<f64> },
    /// Render the real content.
    Content,
}

/// Decides between placeholder and content for a stream of snapshots.
///
/// Once content has been shown the latch stays open, whatever snapshots
/// arrive afterwards.
#[derive(Clone, Debug, Default)]
pub struct GateLatch {
    show_progress: bool,
    open: bool,
}

impl GateLatch {
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Observe a snapshot and return the view to render.
    pub fn observe(&mut self, state: &TrackerState) -> GateView {
        if state.ready {
            self.open = true;
        }
        if self.open {
            GateView::Content
        } else {
            GateView::Placeholder {
                progress: self.show_progress.then_some(state.progress_percent),
            }
        }
    }
}
