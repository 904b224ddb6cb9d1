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

/// An image format recognised from a payload's leading bytes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
    Ico,
    Svg,
}

impl ImageFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Ico => "image/x-icon",
            ImageFormat::Svg => "image/svg+xml",
        }
    }
}

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff";
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";
const BMP_MAGIC: &[u8] = b"BM";
/// Sizes of the DIB headers that may follow a BMP file header.
const BMP_DIB_HEADER_SIZES: &[u32] = &[12, 40, 52, 56, 64, 108, 124];
const ICO_MAGIC: &[u8] = b"\x00\x00\x01\x00";

/// How many leading bytes of a text payload are searched for an `<svg` tag.
const SVG_SCAN_LIMIT: usize = 1024;

/// Identify the image format of a payload, if it is one.
pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(PNG_MAGIC) {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(JPEG_MAGIC) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(GIF87_MAGIC) || bytes.starts_with(GIF89_MAGIC) {
        Some(ImageFormat::Gif)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(ImageFormat::WebP)
    } else if is_bmp(bytes) {
        Some(ImageFormat::Bmp)
    } else if bytes.starts_with(ICO_MAGIC) {
        Some(ImageFormat::Ico)
    } else if is_svg(bytes) {
        Some(ImageFormat::Svg)
    } else {
        None
    }
}

/// A 14-byte file header (magic, file size, two zero reserved words, pixel
/// offset) followed by a DIB header of a known size.
fn is_bmp(bytes: &[u8]) -> bool {
    if bytes.len() < 18 || !bytes.starts_with(BMP_MAGIC) {
        return false;
    }
    let le32 = |at: usize| {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    };
    let file_size = le32(2);
    let reserved = le32(6);
    let pixel_offset = le32(10);
    let dib_size = le32(14);
    reserved == 0
        && BMP_DIB_HEADER_SIZES.contains(&dib_size)
        && pixel_offset >= 14 + dib_size
        && (file_size == 0 || file_size >= pixel_offset)
}

fn is_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SCAN_LIMIT)];
    match std::str::from_utf8(head) {
        Ok(text) => text.trim_start().starts_with('<') && text.contains("<svg"),
        // The scan window may split a multi-byte character.
        Err(e) => match std::str::from_utf8(&head[..e.valid_up_to()]) {
            Ok(text) => text.trim_start().starts_with('<') && text.contains("<svg"),
            Err(_) => false,
        },
    }
}

/// The content type to serve a file with, based on its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "md" => "text/markdown",
        _ => "application/octet-stream",
    }
}

/// Whether a path looks like an image file, going by its extension.
pub fn has_image_extension(path: &Path) -> bool {
    content_type_for(path).starts_with("image/")
}
