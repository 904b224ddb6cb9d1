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

use std::fmt::Display;
use std::fmt::Formatter;

use crate::media::load::MediaLoaderError;

/// Loads a single resource.
///
/// A load succeeds or fails. Either way the tracker records the result and
/// moves on; a failure never aborts the other loads of the session.
pub trait AssetLoader: Send + Sync + 'static {
    fn load(&self, id: &str) -> impl Future<Output = Result<(), LoadError>> + Send;
}

/// Why a resource failed to load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The identifier is not a valid local path, or nothing is there.
    InvalidPath(MediaLoaderError),
    /// The identifier has a scheme other than `http` or `https`.
    UnsupportedScheme(String),
    /// The request could not be completed.
    Network(String),
    /// The server answered with a non-success status.
    Status(u16),
    /// The file could not be read.
    Io(String),
    /// The payload is not a recognised image.
    Decode,
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::InvalidPath(e) => write!(f, "invalid path: {e}"),
            LoadError::UnsupportedScheme(scheme) => {
                write!(f, "unsupported scheme '{scheme}'.")
            }
            LoadError::Network(e) => write!(f, "network error: {e}"),
            LoadError::Status(code) => write!(f, "server responded with status {code}."),
            LoadError::Io(e) => write!(f, "I/O error: {e}"),
            LoadError::Decode => write!(f, "payload is not a recognised image."),
        }
    }
}

impl From<MediaLoaderError> for LoadError {
    fn from(value: MediaLoaderError) -> Self {
        LoadError::InvalidPath(value)
    }
}
