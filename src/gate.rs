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

use std::path::Path;
use std::path::PathBuf;

use assetgate_core::GateManifest;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::markdown::markdown_to_html;
use crate::media::load::MediaLoader;

/// The file name looked up when no manifest path is given.
pub const DEFAULT_MANIFEST: &str = "assetgate.toml";

/// A manifest together with the directory its relative paths resolve
/// against.
pub struct Gate {
    /// Absolute path to the directory containing the manifest.
    pub root: PathBuf,
    pub manifest: GateManifest,
}

impl Gate {
    /// Read and parse the manifest at `path`.
    pub fn open(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail("manifest does not exist.");
        }
        if !path.is_file() {
            return fail("manifest is not a file.");
        }
        let text: String = std::fs::read_to_string(path)?;
        let manifest = GateManifest::parse(&text)?;
        let root: PathBuf = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.canonicalize()?,
            _ => std::env::current_dir()?.canonicalize()?,
        };
        log::debug!(
            "Loaded manifest {} with {} images",
            path.display(),
            manifest.images.len()
        );
        Ok(Self { root, manifest })
    }

    /// Render the manifest's Markdown content, if it has any.
    pub fn render_content(&self) -> Fallible<Option<String>> {
        let Some(content) = &self.manifest.content else {
            return Ok(None);
        };
        let loader = MediaLoader::new(self.root.clone());
        let path: PathBuf = loader.validate(content).map_err(|e| {
            ErrorReport::new(format!("Failed to load content '{content}': {e}"))
        })?;
        let markdown: String = std::fs::read_to_string(path)?;
        Ok(Some(markdown_to_html(&markdown)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_open_missing() -> Fallible<()> {
        let root = create_tmp_directory()?;
        let result = Gate::open(&root.join("assetgate.toml"));
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: manifest does not exist.".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_open_directory() -> Fallible<()> {
        let root = create_tmp_directory()?;
        let result = Gate::open(&root);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_open_and_render() -> Fallible<()> {
        let root = create_tmp_directory()?;
        std::fs::write(
            root.join("assetgate.toml"),
            "content = \"welcome.md\"\nimages = [\"goal.png\"]\n",
        )?;
        std::fs::write(root.join("welcome.md"), "# Welcome")?;
        let gate = Gate::open(&root.join("assetgate.toml"))?;
        assert_eq!(gate.root, root);
        assert_eq!(gate.manifest.images, vec!["goal.png"]);
        assert_eq!(
            gate.render_content()?,
            Some("<h1>Welcome</h1>\n".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_missing_content() -> Fallible<()> {
        let root = create_tmp_directory()?;
        std::fs::write(root.join("assetgate.toml"), "content = \"nope.md\"\n")?;
        let gate = Gate::open(&root.join("assetgate.toml"))?;
        let err = gate.render_content().unwrap_err();
        assert_eq!(
            err.to_string(),
            "error: Failed to load content 'nope.md': file not found."
        );
        Ok(())
    }

    #[test]
    fn test_no_content() -> Fallible<()> {
        let root = create_tmp_directory()?;
        std::fs::write(root.join("assetgate.toml"), "")?;
        let gate = Gate::open(&root.join("assetgate.toml"))?;
        assert_eq!(gate.render_content()?, None);
        Ok(())
    }
}
