// Copyright 2025 John Brosnihan
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
//! Image decoding and caching
//!
//! Decoded bitmaps are cached by a SHA-256 digest of the encoded bytes
//! combined with a digest of the colour remap applied at load time. A key is
//! decoded at most once until it is invalidated. Decoding happens outside the
//! cache lock behind an in-flight marker: loaders of the same key wait for
//! the first one, loaders of other keys are not blocked.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::render::Color;

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA bytes
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Wrap raw RGBA bytes, checking the length matches the dimensions
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(EngineError::AssetDecodeFailure(format!(
                "{}x{} bitmap needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Bitmap {
            width,
            height,
            pixels,
        })
    }

    /// Colour at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut color = [0; 4];
        color.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(color)
    }
}

/// Turns encoded image bytes into a [`Bitmap`]
pub trait ImageDecoder: Send + Sync {
    /// Decode `bytes`
    fn decode(&self, bytes: &[u8]) -> Result<Bitmap>;
}

/// Decoder backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct PngDecoder;

impl ImageDecoder for PngDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Bitmap> {
        let image = image::load_from_memory(bytes)
            .map_err(|err| EngineError::AssetDecodeFailure(err.to_string()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Bitmap::from_rgba(width, height, image.into_raw())
    }
}

/// Exact-match colour substitution applied once at load time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorRemap {
    map: BTreeMap<Color, Color>,
}

impl ColorRemap {
    /// Empty remap
    pub fn new() -> Self {
        ColorRemap::default()
    }

    /// Replace every `from` pixel with `to`
    pub fn with(mut self, from: Color, to: Color) -> Self {
        self.map.insert(from, to);
        self
    }

    /// Whether no colours are remapped
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Rewrite matching pixels in place, returning how many changed
    pub fn apply(&self, bitmap: &mut Bitmap) -> usize {
        if self.map.is_empty() {
            return 0;
        }
        let mut changed = 0;
        for pixel in bitmap.pixels.chunks_exact_mut(4) {
            let mut color = [0; 4];
            color.copy_from_slice(pixel);
            if let Some(to) = self.map.get(&color) {
                pixel.copy_from_slice(to);
                changed += 1;
            }
        }
        changed
    }
}

/// Cache key: SHA-256 over the content digest and the remap digest
pub type CacheKey = [u8; 32];

/// Compute the cache key for `bytes` loaded with `remap`.
///
/// No remap and an empty remap give the same key.
pub fn cache_key(bytes: &[u8], remap: Option<&ColorRemap>) -> CacheKey {
    let content = Sha256::digest(bytes);

    let mut remap_hasher = Sha256::new();
    for (from, to) in remap.into_iter().flat_map(|remap| &remap.map) {
        remap_hasher.update(from);
        remap_hasher.update(to);
    }

    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher.update(remap_hasher.finalize());
    hasher.finalize().into()
}

enum Entry {
    /// Some loader is decoding this key
    Loading,
    Ready(Arc<Bitmap>),
}

/// Thread-safe decoded image cache
pub struct ImageCache {
    decoder: Arc<dyn ImageDecoder>,
    entries: Mutex<HashMap<CacheKey, Entry>>,
    loaded: Condvar,
    decodes: AtomicUsize,
}

impl ImageCache {
    /// Create a cache that decodes with `decoder`
    pub fn new(decoder: Arc<dyn ImageDecoder>) -> Self {
        ImageCache {
            decoder,
            entries: Mutex::new(HashMap::new()),
            loaded: Condvar::new(),
            decodes: AtomicUsize::new(0),
        }
    }

    /// Decoded bitmap for `bytes`, decoding and remapping on first use.
    ///
    /// A failed decode is not cached; the next call tries again.
    pub fn get(&self, bytes: &[u8], remap: Option<&ColorRemap>) -> Result<Arc<Bitmap>> {
        let key = cache_key(bytes, remap);
        {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            loop {
                let loading = match entries.get(&key) {
                    Some(Entry::Ready(bitmap)) => return Ok(Arc::clone(bitmap)),
                    Some(Entry::Loading) => true,
                    None => false,
                };
                if !loading {
                    entries.insert(key, Entry::Loading);
                    break;
                }
                entries = self.loaded.wait(entries).unwrap_or_else(PoisonError::into_inner);
            }
        }

        let decoded = self.decode(bytes, remap);

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let result = match decoded {
            Ok(bitmap) => {
                let bitmap = Arc::new(bitmap);
                entries.insert(key, Entry::Ready(Arc::clone(&bitmap)));
                Ok(bitmap)
            }
            Err(err) => {
                entries.remove(&key);
                Err(err)
            }
        };
        self.loaded.notify_all();
        result
    }

    fn decode(&self, bytes: &[u8], remap: Option<&ColorRemap>) -> Result<Bitmap> {
        let mut bitmap = self.decoder.decode(bytes)?;
        if let Some(remap) = remap {
            let changed = remap.apply(&mut bitmap);
            debug!(changed, "applied colour remap");
        }
        self.decodes.fetch_add(1, Ordering::Relaxed);
        Ok(bitmap)
    }

    /// Drop one entry; returns whether it was cached
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        matches!(removed, Some(Entry::Ready(_)))
    }

    /// Drop everything
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Number of cached bitmaps
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| matches!(entry, Entry::Ready(_)))
            .count()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes performed so far
    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("len", &self.len())
            .field("decodes", &self.decode_count())
            .finish()
    }
}
