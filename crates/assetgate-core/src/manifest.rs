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

use serde::Deserialize;

use crate::error::Fallible;

const DEFAULT_TITLE: &str = "assetgate";
const DEFAULT_FALLBACK: &str = "Loading...";

/// The TOML configuration of a gated page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateManifest {
    #[serde(default = "default_title")]
    pub title: String,
    /// Path to a Markdown file, relative to the manifest, rendered once the
    /// gate opens.
    #[serde(default)]
    pub content: Option<String>,
    /// Whether the placeholder shows a progress bar.
    #[serde(default)]
    pub show_progress: bool,
    /// Resource identifiers to preload, in order. Repeats are allowed.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub fallback: Fallback,
}

/// Text shown while the gate is closed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fallback {
    pub heading: String,
    #[serde(default)]
    pub subheading: Option<String>,
}

impl Default for Fallback {
    fn default() -> Self {
        Self {
            heading: DEFAULT_FALLBACK.to_string(),
            subheading: None,
        }
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl GateManifest {
    /// Parse a manifest from TOML text.
    pub fn parse(text: &str) -> Fallible<Self> {
        let manifest: GateManifest = toml::from_str(text)?;
        Ok(manifest)
    }

    /// A manifest with default settings over the given images.
    pub fn from_images(images: Vec<String>) -> Self {
        Self {
            title: default_title(),
            content: None,
            show_progress: false,
            images,
            fallback: Fallback::default(),
        }
    }
}
