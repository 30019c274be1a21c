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
//! Background image prefetch
//!
//! While one background is on screen the next one is decoded off the frame
//! thread. The result lands in a single mutex-guarded slot tagged with its
//! background index; the scene takes it when the switch comes, blocking only
//! if the decode has not finished yet. Requests are fire-and-forget and are
//! never cancelled; dropping the scene drops its handle to the slot.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::Result;
use crate::platform::assets::{Bitmap, ImageCache};
use crate::scene::karaoke::session::KaraokeSession;

struct Prefetched {
    index: usize,
    result: Result<Arc<Bitmap>>,
}

#[derive(Default)]
struct Slot {
    ready: Mutex<Option<Prefetched>>,
    filled: Condvar,
}

/// Single-slot background decoder
#[derive(Clone, Default)]
pub struct BackgroundPrefetch {
    slot: Arc<Slot>,
}

impl BackgroundPrefetch {
    /// Create an empty slot
    pub fn new() -> Self {
        BackgroundPrefetch::default()
    }

    /// Start decoding background `index` of `session` in the background
    pub fn request(&self, session: Arc<KaraokeSession>, index: usize, cache: Arc<ImageCache>) {
        let slot = Arc::clone(&self.slot);
        let task = move || {
            let result = match session.backgrounds.get(index) {
                Some(background) => cache.get(&background.image, None),
                None => Err(crate::error::EngineError::InvalidSessionData(format!(
                    "background {} does not exist",
                    index
                ))),
            };
            if let Err(err) = &result {
                warn!(index, %err, "background prefetch failed");
            }
            let mut ready = slot.ready.lock().unwrap_or_else(PoisonError::into_inner);
            *ready = Some(Prefetched { index, result });
            slot.filled.notify_all();
            debug!(index, "background prefetched");
        };

        #[cfg(feature = "parallel")]
        rayon::spawn(task);
        #[cfg(not(feature = "parallel"))]
        std::thread::spawn(task);
    }

    /// Take background `index` if its decode has finished
    pub fn try_take(&self, index: usize) -> Option<Result<Arc<Bitmap>>> {
        let mut ready = self.slot.ready.lock().unwrap_or_else(PoisonError::into_inner);
        if ready.as_ref().map_or(false, |prefetched| prefetched.index == index) {
            ready.take().map(|prefetched| prefetched.result)
        } else {
            None
        }
    }

    /// Take background `index`, waiting for a decode already requested
    pub fn wait(&self, index: usize) -> Result<Arc<Bitmap>> {
        let ready = self.slot.ready.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ready = self
            .slot
            .filled
            .wait_while(ready, |slot| !matches!(slot, Some(p) if p.index == index))
            .unwrap_or_else(PoisonError::into_inner);
        match ready.take() {
            Some(prefetched) => prefetched.result,
            None => Err(crate::error::EngineError::AssetDecodeFailure(format!(
                "background {} was not prefetched",
                index
            ))),
        }
    }
}

impl std::fmt::Debug for BackgroundPrefetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ready = self
            .slot
            .ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|p| p.index);
        f.debug_struct("BackgroundPrefetch").field("ready", &ready).finish()
    }
}
