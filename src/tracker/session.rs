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

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use assetgate_core::LoadOutcome;
use assetgate_core::ResourceLedger;
use assetgate_core::TrackerState;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::Id;
use tokio::task::JoinHandle;
use tokio::task::JoinSet;

use crate::tracker::loader::AssetLoader;
use crate::tracker::loader::LoadError;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// The caller's side of a tracking session.
///
/// Dropping the handle stops the session.
pub struct TrackingHandle {
    id: u64,
    current: watch::Receiver<TrackerState>,
    updates: mpsc::UnboundedReceiver<TrackerState>,
    owner: Option<JoinHandle<()>>,
    live: Arc<Mutex<bool>>,
    stopped: bool,
}

/// Start a tracking session over `ids`.
///
/// Every load is spawned before this returns; there is no concurrency cap.
/// Must be called from within a tokio runtime.
pub fn start_tracking<L: AssetLoader>(ids: Vec<String>, loader: Arc<L>) -> TrackingHandle {
    let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
    let ledger = ResourceLedger::new(ids);
    let (state_tx, current) = watch::channel(ledger.snapshot());
    let (update_tx, updates) = mpsc::unbounded_channel();
    let live = Arc::new(Mutex::new(true));

    if ledger.is_empty() {
        log::debug!("session {id}: no resources, ready immediately");
        let _ = update_tx.send(ledger.snapshot());
        return TrackingHandle {
            id,
            current,
            updates,
            owner: None,
            live,
            stopped: false,
        };
    }

    log::debug!("session {id}: loading {} resources", ledger.len());
    let mut loads: JoinSet<Result<(), LoadError>> = JoinSet::new();
    let mut slots: HashMap<Id, usize> = HashMap::new();
    for (slot, resource) in ledger.ids().iter().cloned().enumerate() {
        let loader = Arc::clone(&loader);
        let handle = loads.spawn(async move { loader.load(&resource).await });
        slots.insert(handle.id(), slot);
    }

    let owner = tokio::spawn(run_session(
        id,
        ledger,
        loads,
        slots,
        Arc::clone(&live),
        state_tx,
        update_tx,
    ));
    TrackingHandle {
        id,
        current,
        updates,
        owner: Some(owner),
        live,
        stopped: false,
    }
}

/// The single writer of a session's ledger.
///
/// Owning the `JoinSet` means dropping this future, which is what aborting
/// the owner task does, aborts every load still in flight.
///
/// Abort only lands at the next yield point, so every publish happens under
/// the `live` lock and is skipped once [`TrackingHandle::stop`] has cleared it.
async fn run_session(
    id: u64,
    mut ledger: ResourceLedger,
    mut loads: JoinSet<Result<(), LoadError>>,
    slots: HashMap<Id, usize>,
    live: Arc<Mutex<bool>>,
    state_tx: watch::Sender<TrackerState>,
    update_tx: mpsc::UnboundedSender<TrackerState>,
) {
    while let Some(joined) = loads.join_next_with_id().await {
        let (task, outcome) = match joined {
            Ok((task, Ok(()))) => (task, LoadOutcome::Loaded),
            Ok((task, Err(e))) => {
                let resource = slots.get(&task).and_then(|slot| ledger.id(*slot));
                log::debug!(
                    "session {id}: failed to load '{}': {e}",
                    resource.unwrap_or("?")
                );
                (task, LoadOutcome::Failed)
            }
            Err(e) => {
                log::warn!("session {id}: load task did not finish: {e}");
                (e.id(), LoadOutcome::Failed)
            }
        };
        let Some(slot) = slots.get(&task).copied() else {
            continue;
        };
        let Some(state) = ledger.resolve(slot, outcome) else {
            log::warn!("session {id}: ignoring repeated resolution of slot {slot}");
            continue;
        };
        log::debug!(
            "session {id}: '{}' {outcome}, {state}",
            ledger.id(slot).unwrap_or("?")
        );
        {
            let Ok(live) = live.lock() else {
                break;
            };
            if !*live {
                log::debug!("session {id}: stopped, dropping late resolution of slot {slot}");
                break;
            }
            state_tx.send_replace(state.clone());
            // The caller may have dropped its receiver; the watch still holds
            // the latest state.
            let _ = update_tx.send(state);
        }
        if ledger.is_complete() {
            log::info!("session {id}: ready");
            break;
        }
    }
}

impl TrackingHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The latest snapshot.
    pub fn state(&self) -> TrackerState {
        self.current.borrow().clone()
    }

    /// A receiver notified on every change, for push-based observers.
    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.current.clone()
    }

    /// The next emitted snapshot, in emission order.
    ///
    /// Returns `None` once the final snapshot has been taken, or after
    /// [`stop`](Self::stop). A session whose loads never resolve never
    /// returns.
    pub async fn next_state(&mut self) -> Option<TrackerState> {
        if self.stopped {
            return None;
        }
        self.updates.recv().await
    }

    /// Wait until the session is ready and return that snapshot.
    ///
    /// Returns `None` if the session is stopped first.
    pub async fn wait_ready(&self) -> Option<TrackerState> {
        if self.stopped {
            return None;
        }
        let mut current = self.current.clone();
        let state = current.wait_for(|state| state.ready).await.ok()?;
        Some(state.clone())
    }

    /// Stop the session. In-flight loads are aborted and no further
    /// snapshots are delivered, to this handle or to any subscriber, once
    /// this returns. The last snapshot stays readable.
    ///
    /// Must not be called while holding a borrow of a subscribed receiver.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Ok(mut live) = self.live.lock() {
            *live = false;
        }
        self.updates.close();
        if let Some(owner) = self.owner.take() {
            if !owner.is_finished() {
                log::debug!("session {}: stopped before completion", self.id);
            }
            owner.abort();
        }
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
