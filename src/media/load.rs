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
use std::path::Component;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;

/// The media loader takes root-relative file paths, as they appear in a
/// manifest or in a request URL, and returns the absolute path to the file,
/// if it exists.
///
/// This takes unsafe strings from the client, so we have to ensure there's
/// no possibility of directory traversals.
#[derive(Clone, Debug)]
pub struct MediaLoader {
    /// Absolute path to the asset root directory.
    root: PathBuf,
}

/// Errors that can occur when loading a path.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MediaLoaderError {
    /// Path is the empty string.
    Empty,
    /// Path is absolute.
    Absolute,
    /// Path does not exist.
    NotFound,
    /// Path is not a file.
    NotFile,
    /// Path points to a symbolic link.
    SymbolicLink,
    /// Path contains parent (`..`) components.
    ParentComponent,
}

impl Display for MediaLoaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            MediaLoaderError::Empty => "path is the empty string.",
            MediaLoaderError::Absolute => "absolute paths are not allowed.",
            MediaLoaderError::NotFound => "file not found.",
            MediaLoaderError::NotFile => "path is not a file.",
            MediaLoaderError::SymbolicLink => "symbolic links are not allowed.",
            MediaLoaderError::ParentComponent => "path has a parent component.",
        };
        write!(f, "{msg}")
    }
}

/// Decode percent-encoded characters in a URL path (e.g., %20 to space).
fn percent_decode(s: &str) -> Option<String> {
    percent_decode_str(s)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

impl MediaLoader {
    /// Construct a new [`MediaLoader`].
    pub fn new(path: PathBuf) -> Self {
        assert!(path.is_absolute());
        Self { root: path }
    }

    /// Given a path string from the client, check that a file exists at that
    /// location within the root directory.
    ///
    /// Symbolic links and absolute paths are rejected. If the path is not
    /// found, the percent-decoded path is tried as well.
    pub fn validate(&self, path: &str) -> Result<PathBuf, MediaLoaderError> {
        match self.validate_inner(path) {
            Err(MediaLoaderError::NotFound) => {
                if let Some(decoded) = percent_decode(path) {
                    if decoded != path {
                        return self.validate_inner(&decoded);
                    }
                }
                Err(MediaLoaderError::NotFound)
            }
            result => result,
        }
    }

    fn validate_inner(&self, path: &str) -> Result<PathBuf, MediaLoaderError> {
        let path: &str = path.trim();
        if path.is_empty() {
            return Err(MediaLoaderError::Empty);
        }
        let path: PathBuf = PathBuf::from(path);
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(MediaLoaderError::ParentComponent);
        }
        if path.is_absolute() {
            return Err(MediaLoaderError::Absolute);
        }
        let path: PathBuf = self.root.join(path);
        if path.is_symlink() {
            return Err(MediaLoaderError::SymbolicLink);
        }
        if !path.exists() {
            return Err(MediaLoaderError::NotFound);
        }
        if !path.is_file() {
            return Err(MediaLoaderError::NotFile);
        }
        Ok(path)
    }
}
