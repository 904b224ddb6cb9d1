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

use std::path::PathBuf;

use crate::media::load::MediaLoader;
use crate::media::sniff::sniff;
use crate::tracker::loader::AssetLoader;
use crate::tracker::loader::LoadError;

/// Loads image identifiers from the web or from a local asset root.
///
/// Identifiers of the form `http://...` or `https://...` are fetched over
/// HTTP. Identifiers with any other `scheme://` prefix are rejected.
/// Everything else is a path relative to the asset root. There is no timeout
/// and no retry: each identifier is attempted once.
pub struct AssetFetcher {
    files: MediaLoader,
    client: reqwest::Client,
}

impl AssetFetcher {
    /// Construct a new [`AssetFetcher`] over the given absolute asset root.
    pub fn new(root: PathBuf) -> Self {
        Self {
            files: MediaLoader::new(root),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch(&self, id: &str) -> Result<Vec<u8>, LoadError> {
        match id.split_once("://") {
            Some(("http", _)) | Some(("https", _)) => self.fetch_remote(id).await,
            Some((scheme, _)) => Err(LoadError::UnsupportedScheme(scheme.to_string())),
            None => self.fetch_local(id).await,
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_local(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let path: PathBuf = self.files.validate(path)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| LoadError::Io(e.to_string()))
    }
}

impl AssetLoader for AssetFetcher {
    async fn load(&self, id: &str) -> Result<(), LoadError> {
        let bytes = self.fetch(id).await?;
        match sniff(&bytes) {
            Some(format) => {
                log::trace!("'{id}' is {} ({} bytes)", format.content_type(), bytes.len());
                Ok(())
            }
            None => Err(LoadError::Decode),
        }
    }
}
