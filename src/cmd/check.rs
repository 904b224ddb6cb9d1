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
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use assetgate_core::TrackerState;
use walkdir::WalkDir;

use crate::error::Fallible;
use crate::error::fail;
use crate::gate::Gate;
use crate::media::fetch::AssetFetcher;
use crate::media::sniff::has_image_extension;
use crate::tracker::session::start_tracking;

/// Preload the images of a manifest, or of every image file under a
/// directory, printing each snapshot as it arrives.
///
/// Fails if any image failed to load.
pub async fn check_assets(path: Option<String>) -> Fallible<()> {
    let path: PathBuf = PathBuf::from(path.unwrap_or_else(|| ".".to_string()));
    if !path.exists() {
        return fail("path does not exist.");
    }
    let (root, ids) = if path.is_dir() {
        let root: PathBuf = path.canonicalize()?;
        let ids: Vec<String> = find_images(&root)?;
        (root, ids)
    } else {
        let gate = Gate::open(&path)?;
        (gate.root, gate.manifest.images)
    };
    // Repeated entries are one image as far as the summary goes.
    let distinct: usize = ids.iter().collect::<BTreeSet<_>>().len();
    let state = run_check(root, ids).await?;
    for id in &state.failed {
        println!("failed: {id}");
    }
    println!(
        "{} loaded, {} failed.",
        state.loaded.len(),
        state.failed.len()
    );
    if !state.failed.is_empty() {
        return fail(format!(
            "{} of {distinct} images failed to load.",
            state.failed.len()
        ));
    }
    Ok(())
}

async fn run_check(root: PathBuf, ids: Vec<String>) -> Fallible<TrackerState> {
    let mut tracking = start_tracking(ids, Arc::new(AssetFetcher::new(root)));
    while let Some(state) = tracking.next_state().await {
        println!("{state}");
    }
    match tracking.wait_ready().await {
        Some(state) => Ok(state),
        None => fail("tracking stopped before completion."),
    }
}

/// Every image file under `root`, as a `/`-separated relative path, in
/// file name order.
fn find_images(root: &Path) -> Fallible<Vec<String>> {
    let mut ids: Vec<String> = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path: &Path = entry.path();
        if !entry.file_type().is_file() || !has_image_extension(path) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let id: String = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        ids.push(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::PNG_BYTES;
    use crate::helper::create_tmp_directory;

    fn create_tmp_assets() -> Fallible<PathBuf> {
        let root = create_tmp_directory()?;
        std::fs::create_dir_all(root.join("sub"))?;
        std::fs::write(root.join("a.png"), PNG_BYTES)?;
        std::fs::write(root.join("bad.jpg"), "not an image")?;
        std::fs::write(root.join("notes.txt"), "ignored")?;
        std::fs::write(root.join("sub/b.gif"), "GIF89a\x01\x00\x01\x00")?;
        Ok(root)
    }

    #[test]
    fn test_find_images() -> Fallible<()> {
        let root = create_tmp_assets()?;
        assert_eq!(find_images(&root)?, vec!["a.png", "bad.jpg", "sub/b.gif"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_check() -> Fallible<()> {
        let root = create_tmp_assets()?;
        let ids = find_images(&root)?;
        let state = run_check(root, ids).await?;
        assert!(state.ready);
        assert_eq!(
            state.loaded,
            BTreeSet::from(["a.png".to_string(), "sub/b.gif".to_string()])
        );
        assert_eq!(state.failed, BTreeSet::from(["bad.jpg".to_string()]));
        Ok(())
    }

    #[tokio::test]
    async fn test_check_directory_with_failures() -> Fallible<()> {
        let root = create_tmp_assets()?;
        let result = check_assets(Some(root.display().to_string())).await;
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: 1 of 3 images failed to load.".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_check_manifest() -> Fallible<()> {
        let root = create_tmp_assets()?;
        std::fs::write(
            root.join("assetgate.toml"),
            "images = [\"a.png\", \"sub/b.gif\", \"a.png\"]\n",
        )?;
        check_assets(Some(root.join("assetgate.toml").display().to_string())).await
    }

    #[tokio::test]
    async fn test_check_counts_repeated_images_once() -> Fallible<()> {
        let root = create_tmp_assets()?;
        std::fs::write(
            root.join("assetgate.toml"),
            "images = [\"bad.jpg\", \"bad.jpg\", \"a.png\"]\n",
        )?;
        let result = check_assets(Some(root.join("assetgate.toml").display().to_string())).await;
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: 1 of 2 images failed to load.".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_check_empty_directory() -> Fallible<()> {
        let root = create_tmp_directory()?;
        check_assets(Some(root.display().to_string())).await
    }

    #[tokio::test]
    async fn test_check_missing_path() -> Fallible<()> {
        let result = check_assets(Some("./derpherp".to_string())).await;
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: path does not exist.".to_string())
        );
        Ok(())
    }
}
