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
//! Audio playback interface
//!
//! The mixer itself lives outside the crate. Scenes start and pause players
//! and read their position, which the rhythm scene uses as its clock. An
//! [`AudioBackend`] opens players for the sound effects and music attached to
//! entities; the headless backend pulls samples at the frame clock so
//! one-shot sounds end on time without an output device.

use std::collections::HashMap;
use std::fmt;
use std::iter::Peekable;
use std::sync::Arc;
use std::time::Duration;

/// Decoded interleaved PCM samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmStream {
    /// Samples per second per channel
    pub sample_rate: u32,
    /// Interleaved channel count
    pub channels: u16,
    /// Interleaved samples
    pub samples: Arc<[i16]>,
}

impl PcmStream {
    /// Wrap interleaved samples
    pub fn new(sample_rate: u32, channels: u16, samples: impl Into<Arc<[i16]>>) -> Self {
        PcmStream {
            sample_rate,
            channels,
            samples: samples.into(),
        }
    }

    /// Playback length
    pub fn duration(&self) -> Duration {
        let frames_per_second = self.sample_rate as u64 * self.channels.max(1) as u64;
        if frames_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / frames_per_second as f64)
    }
}

/// Plays `intro` once, then repeats `body` forever.
///
/// With an empty body the iterator ends after the intro.
#[derive(Debug, Clone)]
pub struct IntroLoop {
    intro: Arc<[i16]>,
    body: Arc<[i16]>,
    cursor: usize,
    in_intro: bool,
}

impl IntroLoop {
    /// Loop over `body` after playing `intro`
    pub fn new(intro: &PcmStream, body: &PcmStream) -> Self {
        IntroLoop {
            intro: Arc::clone(&intro.samples),
            body: Arc::clone(&body.samples),
            cursor: 0,
            in_intro: true,
        }
    }

    /// Play `stream` once and end
    pub fn once(stream: &PcmStream) -> Self {
        IntroLoop {
            intro: Arc::clone(&stream.samples),
            body: Arc::from(Vec::<i16>::new()),
            cursor: 0,
            in_intro: true,
        }
    }

    /// Loop `stream`, playing its first `intro` only once.
    ///
    /// The split lands on a whole frame so channels stay aligned.
    pub fn split(stream: &PcmStream, intro: Duration) -> Self {
        let channels = stream.channels.max(1) as usize;
        let frames = (intro.as_secs_f64() * stream.sample_rate as f64) as usize;
        let at = frames.saturating_mul(channels).min(stream.samples.len());
        IntroLoop {
            intro: Arc::from(&stream.samples[..at]),
            body: Arc::from(&stream.samples[at..]),
            cursor: 0,
            in_intro: true,
        }
    }
}

impl Iterator for IntroLoop {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.in_intro {
            if let Some(&sample) = self.intro.get(self.cursor) {
                self.cursor += 1;
                return Some(sample);
            }
            self.in_intro = false;
            self.cursor = 0;
        }
        if self.body.is_empty() {
            return None;
        }
        let sample = self.body[self.cursor % self.body.len()];
        self.cursor = (self.cursor + 1) % self.body.len();
        Some(sample)
    }
}

/// Music player handed to scenes
pub trait AudioPlayer: Send {
    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Whether audio is currently playing
    fn is_playing(&self) -> bool;

    /// Playback position
    fn position(&self) -> Duration;

    /// Advance a player driven by the frame clock; real players ignore this
    fn advance(&mut self, _dt: Duration) {}
}

/// How a sound plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Once, then the player stops
    Once,
    /// Forever, with the first `intro` played only on the first pass
    Loop {
        /// Part of the stream not repeated
        intro: Duration,
    },
}

/// Plays decoded PCM.
///
/// An output device pulls samples with [`fill`](Self::fill); without one,
/// [`advance`](AudioPlayer::advance) consumes them at the frame clock. Either
/// way a one-shot player stops once its samples run out.
pub struct PcmPlayer {
    samples: Peekable<IntroLoop>,
    /// Interleaved samples per second
    rate: f64,
    playing: bool,
    finished: bool,
    clock: Duration,
    pulled: u64,
}

impl PcmPlayer {
    /// Player for `stream`, paused at the start
    pub fn new(stream: &PcmStream, playback: Playback) -> Self {
        let samples = match playback {
            Playback::Once => IntroLoop::once(stream),
            Playback::Loop { intro } => IntroLoop::split(stream, intro),
        };
        let rate = stream.sample_rate as f64 * stream.channels.max(1) as f64;
        PcmPlayer {
            samples: samples.peekable(),
            rate,
            playing: false,
            finished: stream.samples.is_empty() || rate <= 0.0,
            clock: Duration::ZERO,
            pulled: 0,
        }
    }

    /// Copy the next samples into `out`, returning how many were written
    pub fn fill(&mut self, out: &mut [i16]) -> usize {
        if !self.playing {
            return 0;
        }
        let mut written = 0;
        for slot in out.iter_mut() {
            let Some(sample) = self.samples.next() else {
                break;
            };
            *slot = sample;
            written += 1;
        }
        self.pulled += written as u64;
        self.finish_if_drained();
        written
    }

    /// Interleaved samples consumed so far
    pub fn samples_played(&self) -> u64 {
        self.pulled
    }

    fn finish_if_drained(&mut self) {
        if self.samples.peek().is_none() {
            self.playing = false;
            self.finished = true;
        }
    }
}

impl AudioPlayer for PcmPlayer {
    fn play(&mut self) {
        if !self.finished {
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn position(&self) -> Duration {
        Duration::from_secs_f64(self.pulled as f64 / self.rate)
    }

    fn advance(&mut self, dt: Duration) {
        if !self.playing {
            return;
        }
        self.clock += dt;
        let target = (self.clock.as_secs_f64() * self.rate) as u64;
        while self.pulled < target && self.samples.next().is_some() {
            self.pulled += 1;
        }
        self.finish_if_drained();
    }
}

impl fmt::Debug for PcmPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcmPlayer")
            .field("playing", &self.playing)
            .field("finished", &self.finished)
            .field("pulled", &self.pulled)
            .finish()
    }
}

/// Name of a sound in a [`SoundBank`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundId(String);

impl SoundId {
    /// Sound named `id`
    pub fn new(id: impl Into<String>) -> Self {
        SoundId(id.into())
    }

    /// The name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SoundId {
    fn from(id: &str) -> Self {
        SoundId::new(id)
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded sounds by name
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    sounds: HashMap<SoundId, PcmStream>,
}

impl SoundBank {
    /// Empty bank
    pub fn new() -> Self {
        SoundBank::default()
    }

    /// Add `stream` under `id`
    pub fn with(mut self, id: impl Into<SoundId>, stream: PcmStream) -> Self {
        self.insert(id, stream);
        self
    }

    /// Add or replace `id`
    pub fn insert(&mut self, id: impl Into<SoundId>, stream: PcmStream) {
        self.sounds.insert(id.into(), stream);
    }

    /// Stream named `id`
    pub fn get(&self, id: &SoundId) -> Option<&PcmStream> {
        self.sounds.get(id)
    }

    /// Number of sounds
    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    /// Whether the bank has no sounds
    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}

/// Opens players for sound effects and music
pub trait AudioBackend: Send + Sync + fmt::Debug {
    /// New paused player for `stream`
    fn open(&self, stream: &PcmStream, playback: Playback) -> Box<dyn AudioPlayer>;
}

/// Backend of [`PcmPlayer`]s driven by the frame clock
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessAudioBackend;

impl AudioBackend for HeadlessAudioBackend {
    fn open(&self, stream: &PcmStream, playback: Playback) -> Box<dyn AudioPlayer> {
        Box::new(PcmPlayer::new(stream, playback))
    }
}

/// Silent player whose position follows the frame clock.
///
/// With a length set it stops by itself at the end, like a finished track.
#[derive(Debug, Clone, Default)]
pub struct NullAudioPlayer {
    playing: bool,
    position: Duration,
    length: Option<Duration>,
}

impl NullAudioPlayer {
    /// Player that never ends
    pub fn new() -> Self {
        NullAudioPlayer::default()
    }

    /// Player for a track of `length`
    pub fn with_length(length: Duration) -> Self {
        NullAudioPlayer {
            length: Some(length),
            ..NullAudioPlayer::default()
        }
    }
}

impl AudioPlayer for NullAudioPlayer {
    fn play(&mut self) {
        if self.length.map_or(true, |length| self.position < length) {
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn advance(&mut self, dt: Duration) {
        if !self.playing {
            return;
        }
        self.position += dt;
        if let Some(length) = self.length {
            if self.position >= length {
                self.position = length;
                self.playing = false;
            }
        }
    }
}
