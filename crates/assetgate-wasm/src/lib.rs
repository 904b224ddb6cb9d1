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

//! WASM bindings for assetgate - preloads images in the browser.
//!
//! Each image is loaded through an `HtmlImageElement`. Its `load` and
//! `error` events resolve the image's slot in a [`ResourceLedger`], and the
//! new snapshot is handed to an optional JavaScript callback as JSON.

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use std::rc::Weak;

use assetgate_core::LoadOutcome;
use assetgate_core::ResourceLedger;
use assetgate_core::TrackerState;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;
use web_sys::console;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console::log_1(&"assetgate WASM initialized".into());
}

/// State shared between a preloader and its image event handlers.
///
/// Handlers hold a weak reference, and check `live` before touching the
/// ledger, so events that arrive after teardown are dropped.
struct Session {
    ledger: RefCell<ResourceLedger>,
    live: Cell<bool>,
    on_change: Option<js_sys::Function>,
}

impl Session {
    fn new(urls: Vec<String>, on_change: Option<js_sys::Function>) -> Self {
        Self {
            ledger: RefCell::new(ResourceLedger::new(urls)),
            live: Cell::new(true),
            on_change,
        }
    }

    /// Record a load event. Returns the new snapshot, if it changed anything.
    fn resolve(&self, slot: usize, outcome: LoadOutcome) -> Option<TrackerState> {
        if !self.live.get() {
            return None;
        }
        let state = self.ledger.borrow_mut().resolve(slot, outcome)?;
        self.notify(&state);
        Some(state)
    }

    fn notify(&self, state: &TrackerState) {
        if let Some(on_change) = &self.on_change {
            let json = JsValue::from_str(&state.to_json());
            if let Err(e) = on_change.call1(&JsValue::NULL, &json) {
                console::error_2(&"assetgate: on_change callback threw".into(), &e);
            }
        }
    }

    fn snapshot(&self) -> TrackerState {
        self.ledger.borrow().snapshot()
    }
}

/// Preloads a list of image URLs and reports readiness.
#[wasm_bindgen]
pub struct ImagePreloader {
    session: Rc<Session>,
    images: Vec<HtmlImageElement>,
    /// Kept alive for as long as the images may fire events.
    handlers: Vec<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl ImagePreloader {
    /// Start loading every image in `urls_json` (a JSON array of strings).
    ///
    /// `on_change` is called with the JSON snapshot after every image
    /// resolves, or once, immediately, if the list is empty.
    #[wasm_bindgen(constructor)]
    pub fn new(
        urls_json: &str,
        on_change: Option<js_sys::Function>,
    ) -> Result<ImagePreloader, JsValue> {
        let urls: Vec<String> = serde_json::from_str(urls_json)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse image URLs: {}", e)))?;
        let mut preloader = ImagePreloader {
            session: Rc::new(Session::new(urls.clone(), on_change)),
            images: Vec::new(),
            handlers: Vec::new(),
        };
        if urls.is_empty() {
            preloader.session.notify(&preloader.session.snapshot());
            return Ok(preloader);
        }
        for (slot, url) in urls.iter().enumerate() {
            let image = HtmlImageElement::new()?;
            let onload = preloader.handler(slot, LoadOutcome::Loaded);
            let onerror = preloader.handler(slot, LoadOutcome::Failed);
            image.set_onload(Some(onload.as_ref().unchecked_ref()));
            image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            image.set_src(url);
            preloader.images.push(image);
            preloader.handlers.push(onload);
            preloader.handlers.push(onerror);
        }
        Ok(preloader)
    }

    /// The current snapshot as JSON.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        self.session.snapshot().to_json()
    }

    #[wasm_bindgen]
    pub fn is_ready(&self) -> bool {
        self.session.snapshot().ready
    }

    /// Progress as a percentage in [0, 100].
    #[wasm_bindgen]
    pub fn progress(&self) -> f64 {
        self.session.snapshot().progress_percent
    }

    /// Stop tracking. Pending image loads are cancelled by clearing their
    /// `src`, and no further callbacks are made.
    #[wasm_bindgen]
    pub fn stop(&mut self) {
        if !self.session.live.replace(false) {
            return;
        }
        for image in &self.images {
            image.set_onload(None);
            image.set_onerror(None);
            if !image.complete() {
                image.set_src("");
            }
        }
    }
}

impl ImagePreloader {
    fn handler(&self, slot: usize, outcome: LoadOutcome) -> Closure<dyn FnMut()> {
        let session: Weak<Session> = Rc::downgrade(&self.session);
        Closure::new(move || {
            if let Some(session) = session.upgrade() {
                session.resolve(slot, outcome);
            }
        })
    }
}

impl Drop for ImagePreloader {
    fn drop(&mut self) {
        self.stop();
    }
}
