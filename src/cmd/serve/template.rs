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

use assetgate_core::Fallback;
use assetgate_core::GateManifest;
use assetgate_core::GateView;
use maud::DOCTYPE;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::utils::asset_url;

/// Seconds between reloads of the placeholder page.
const REFRESH_SECONDS: &str = "1";

pub fn page_template(title: &str, refresh: bool, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                @if refresh {
                    meta http-equiv="refresh" content=(REFRESH_SECONDS);
                }
                title { (title) }
                link rel="stylesheet" href="/style.css";
            }
            body {
                (body)
            }
        }
    }
}

/// Render the page for the given gate view.
pub fn render_gate(manifest: &GateManifest, content: Option<&str>, view: GateView) -> Markup {
    match view {
        GateView::Placeholder { progress } => page_template(
            &manifest.title,
            true,
            render_placeholder(&manifest.fallback, progress),
        ),
        GateView::Content => {
            page_template(&manifest.title, false, render_content(manifest, content))
        }
    }
}

fn render_placeholder(fallback: &Fallback, progress: Option<f64>) -> Markup {
    html! {
        div.placeholder {
            @if let Some(progress) = progress {
                div.progress-bar {
                    div.progress-fill style=(format!("width: {progress:.0}%;")) {}
                }
            }
            div.fallback-heading { (fallback.heading) }
            @if let Some(subheading) = &fallback.subheading {
                div.fallback-subheading { (subheading) }
            }
        }
    }
}

fn render_content(manifest: &GateManifest, content: Option<&str>) -> Markup {
    html! {
        main.content {
            @if let Some(content) = content {
                (PreEscaped(content))
            } @else {
                h1 { (manifest.title) }
                div.gallery {
                    @for id in &manifest.images {
                        img src=(asset_url(id)) alt=(id);
                    }
                }
            }
        }
    }
}
