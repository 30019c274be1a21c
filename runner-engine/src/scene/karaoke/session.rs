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
//! Rhythm session data
//!
//! A session is a JSON document holding the timed notes, the backgrounds
//! shown while singing and the music length. Images are embedded as encoded
//! bytes and decoded through the asset cache.

use std::path::Path;
use std::time::Duration;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, Result};
use crate::platform::input::InputKind;

/// Format version written by this build
pub const SESSION_FORMAT_VERSION: &str = "1.0.0";

/// Format versions this build can read
pub fn supported_versions() -> VersionReq {
    VersionReq {
        comparators: vec![semver::Comparator {
            op: semver::Op::Caret,
            major: 1,
            minor: None,
            patch: None,
            pre: semver::Prerelease::EMPTY,
        }],
    }
}

/// The four note sounds, one per rhythm input
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KaraokeSound {
    /// Bottom lane
    A,
    /// Third lane
    B,
    /// Second lane
    X,
    /// Top lane
    Y,
}

impl KaraokeSound {
    /// Every sound
    pub const ALL: [KaraokeSound; 4] = [KaraokeSound::A, KaraokeSound::B, KaraokeSound::X, KaraokeSound::Y];

    /// Sound for a stored id
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(KaraokeSound::A),
            1 => Some(KaraokeSound::B),
            2 => Some(KaraokeSound::X),
            3 => Some(KaraokeSound::Y),
            _ => None,
        }
    }

    /// Input that plays this sound
    pub fn input_kind(self) -> InputKind {
        match self {
            KaraokeSound::A => InputKind::KaraokeA,
            KaraokeSound::B => InputKind::KaraokeB,
            KaraokeSound::X => InputKind::KaraokeX,
            KaraokeSound::Y => InputKind::KaraokeY,
        }
    }

    /// Lane index from the top
    pub fn lane(self) -> usize {
        match self {
            KaraokeSound::Y => 0,
            KaraokeSound::X => 1,
            KaraokeSound::B => 2,
            KaraokeSound::A => 3,
        }
    }
}

/// One timed note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KaraokeInput {
    /// Sound id, 0 to 3
    pub sound: u8,
    /// When the note should be hit, in milliseconds of music time
    pub target_hit_ms: u64,
}

impl KaraokeInput {
    /// When the note should be hit
    pub fn target(&self) -> Duration {
        Duration::from_millis(self.target_hit_ms)
    }
}

/// One background image and how long it stays up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KaraokeBackground {
    /// Encoded image bytes
    pub image: Vec<u8>,
    /// Time before switching to the next background, in milliseconds
    pub duration_ms: u64,
    /// Cross-fade length when this background appears, in milliseconds
    pub fade_in_ms: u64,
}

impl KaraokeBackground {
    /// Display time
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Cross-fade length
    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }
}

/// A complete rhythm session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KaraokeSession {
    /// Format version of the document
    pub format_version: Version,
    /// Song title
    pub title: String,
    /// Music length in milliseconds
    pub music_duration_ms: u64,
    /// Notes in target order
    pub inputs: Vec<KaraokeInput>,
    /// Backgrounds in display order
    pub backgrounds: Vec<KaraokeBackground>,
}

impl KaraokeSession {
    /// Parse and validate a JSON session
    pub fn from_json(text: &str) -> Result<Self> {
        let session: KaraokeSession =
            serde_json::from_str(text).map_err(|err| EngineError::InvalidSessionData(err.to_string()))?;
        session.validate()?;
        Ok(session)
    }

    /// Read a session file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| EngineError::InvalidSessionData(format!("{}: {}", path.display(), err)))?;
        let session = Self::from_json(&text)?;
        info!(title = %session.title, notes = session.inputs.len(), "loaded karaoke session");
        Ok(session)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| EngineError::InvalidSessionData(err.to_string()))
    }

    /// Music length
    pub fn music_duration(&self) -> Duration {
        Duration::from_millis(self.music_duration_ms)
    }

    /// Check the version and contents
    pub fn validate(&self) -> Result<()> {
        let supported = supported_versions();
        if !supported.matches(&self.format_version) {
            return Err(EngineError::IncompatibleSessionVersion {
                found: self.format_version.clone(),
                supported,
            });
        }
        if self.backgrounds.is_empty() {
            return Err(EngineError::InvalidSessionData("session has no backgrounds".into()));
        }
        if self.inputs.is_empty() {
            return Err(EngineError::InvalidSessionData("session has no inputs".into()));
        }
        if let Some((index, input)) = self
            .inputs
            .iter()
            .enumerate()
            .find(|(_, input)| KaraokeSound::from_id(input.sound).is_none())
        {
            return Err(EngineError::InvalidSessionData(format!(
                "input {} has unknown sound id {}",
                index, input.sound
            )));
        }
        Ok(())
    }
}
