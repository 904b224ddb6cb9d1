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

//! Loaders for driving tracking sessions from tests.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::sleep;
use tokio::time::timeout;

use crate::tracker::loader::AssetLoader;
use crate::tracker::loader::LoadError;

type Resolver = oneshot::Sender<Result<(), LoadError>>;

#[derive(Default)]
struct Pending {
    started: usize,
    resolvers: HashMap<String, VecDeque<Resolver>>,
}

/// A loader whose loads resolve only when the test says so.
///
/// A load whose resolver is dropped without being used never resolves.
pub struct ScriptedLoader {
    pending: Arc<Mutex<Pending>>,
}

/// The test's side of a [`ScriptedLoader`].
pub struct Script {
    pending: Arc<Mutex<Pending>>,
}

impl ScriptedLoader {
    pub fn new() -> (Arc<Self>, Script) {
        let pending = Arc::new(Mutex::new(Pending::default()));
        let loader = Arc::new(Self {
            pending: pending.clone(),
        });
        (loader, Script { pending })
    }

    /// How many loads have started.
    pub fn started(&self) -> usize {
        self.pending.lock().unwrap().started
    }

    /// Wait until at least `n` loads have started.
    pub async fn wait_started(&self, n: usize) {
        timeout(Duration::from_secs(5), async {
            while self.started() < n {
                sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("loads did not start");
    }
}

impl AssetLoader for ScriptedLoader {
    async fn load(&self, id: &str) -> Result<(), LoadError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().unwrap();
            pending.started += 1;
            pending
                .resolvers
                .entry(id.to_string())
                .or_default()
                .push_back(tx);
        }
        match rx.await {
            Ok(result) => result,
            Err(_) => std::future::pending().await,
        }
    }
}

impl Script {
    /// Resolve the oldest pending load of `id` successfully. Returns false if
    /// there was none, or its load was cancelled.
    pub fn succeed(&self, id: &str) -> bool {
        self.resolve(id, Ok(()))
    }

    /// Resolve the oldest pending load of `id` with a failure.
    pub fn fail(&self, id: &str) -> bool {
        self.resolve(id, Err(LoadError::Status(404)))
    }

    /// Whether the oldest pending load of `id` has been dropped.
    pub fn abandoned(&self, id: &str) -> bool {
        let pending = self.pending.lock().unwrap();
        pending
            .resolvers
            .get(id)
            .and_then(|queue| queue.front())
            .is_some_and(|tx| tx.is_closed())
    }

    fn resolve(&self, id: &str, result: Result<(), LoadError>) -> bool {
        let tx = {
            let mut pending = self.pending.lock().unwrap();
            pending.resolvers.get_mut(id).and_then(|queue| queue.pop_front())
        };
        match tx {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }
}

/// A loader that answers every load with a function of the identifier.
pub struct FnLoader<F> {
    f: F,
}

impl<F> FnLoader<F>
where
    F: Fn(&str) -> Result<(), LoadError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Arc<Self> {
        Arc::new(Self { f })
    }
}

impl<F> AssetLoader for FnLoader<F>
where
    F: Fn(&str) -> Result<(), LoadError> + Send + Sync + 'static,
{
    async fn load(&self, id: &str) -> Result<(), LoadError> {
        tokio::task::yield_now().await;
        (self.f)(id)
    }
}
