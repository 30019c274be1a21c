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
//! Polled input devices
//!
//! A device reports how many consecutive frames each logical input has been
//! held, the way keyboard and gamepad backends both can. [`ButtonTracker`]
//! turns those durations into an [`InputSnapshot`] with press edges, which is
//! all the game ever reads.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

/// Logical inputs, independent of the physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InputKind {
    /// Up on the d-pad or arrow keys
    MoveUp,
    /// Down on the d-pad or arrow keys
    MoveDown,
    /// Left on the d-pad or arrow keys
    MoveLeft,
    /// Right on the d-pad or arrow keys
    MoveRight,
    /// Jump button
    Jump,
    /// Shoot button
    Shoot,
    /// Menu confirm
    Confirm,
    /// Rhythm lane A
    KaraokeA,
    /// Rhythm lane B
    KaraokeB,
    /// Rhythm lane X
    KaraokeX,
    /// Rhythm lane Y
    KaraokeY,
    /// Debug: run the game faster while held
    FastGameSpeed,
    /// Debug: toggle the collider overlay on release
    ToggleCollisionOverlay,
}

impl InputKind {
    /// Every input kind
    pub const ALL: [InputKind; 13] = [
        InputKind::MoveUp,
        InputKind::MoveDown,
        InputKind::MoveLeft,
        InputKind::MoveRight,
        InputKind::Jump,
        InputKind::Shoot,
        InputKind::Confirm,
        InputKind::KaraokeA,
        InputKind::KaraokeB,
        InputKind::KaraokeX,
        InputKind::KaraokeY,
        InputKind::FastGameSpeed,
        InputKind::ToggleCollisionOverlay,
    ];
}

/// A keyboard, gamepad or scripted source of input
pub trait InputDevice {
    /// Advance the device by one frame
    fn poll(&mut self) {}

    /// Consecutive frames `kind` has been held, 0 when released
    fn press_duration(&self, kind: InputKind) -> u32;
}

/// State of one input for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Frames held so far
    pub pressed_frames: u32,
    /// Pressed this frame but not the previous one
    pub just_pressed: bool,
    /// Released this frame after being held
    pub just_released: bool,
}

/// Input state for a single frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    buttons: BTreeMap<InputKind, ButtonState>,
}

impl InputSnapshot {
    /// Snapshot with nothing pressed
    pub fn new() -> Self {
        InputSnapshot::default()
    }

    /// Build a snapshot directly, mostly for tests
    pub fn with_state(mut self, kind: InputKind, state: ButtonState) -> Self {
        self.buttons.insert(kind, state);
        self
    }

    /// Snapshot where `kinds` were pressed this frame
    pub fn pressed(kinds: &[InputKind]) -> Self {
        kinds.iter().fold(InputSnapshot::new(), |snapshot, kind| {
            snapshot.with_state(
                *kind,
                ButtonState {
                    pressed_frames: 1,
                    just_pressed: true,
                    just_released: false,
                },
            )
        })
    }

    fn state(&self, kind: InputKind) -> ButtonState {
        self.buttons.get(&kind).copied().unwrap_or_default()
    }

    /// Whether `kind` is held
    pub fn is_pressed(&self, kind: InputKind) -> bool {
        self.state(kind).pressed_frames > 0
    }

    /// Frames `kind` has been held
    pub fn pressed_duration(&self, kind: InputKind) -> u32 {
        self.state(kind).pressed_frames
    }

    /// Whether `kind` went down this frame
    pub fn just_pressed(&self, kind: InputKind) -> bool {
        self.state(kind).just_pressed
    }

    /// Whether `kind` went up this frame
    pub fn just_released(&self, kind: InputKind) -> bool {
        self.state(kind).just_released
    }
}

/// Derives press edges from per-frame press durations
#[derive(Debug, Default)]
pub struct ButtonTracker {
    previous: HashMap<InputKind, u32>,
}

impl ButtonTracker {
    /// Create a tracker with nothing held
    pub fn new() -> Self {
        ButtonTracker::default()
    }

    /// Read every input kind from `device` and compute this frame's snapshot
    pub fn capture(&mut self, device: &dyn InputDevice) -> InputSnapshot {
        let mut snapshot = InputSnapshot::new();
        for kind in InputKind::ALL {
            let frames = device.press_duration(kind);
            let before = self.previous.insert(kind, frames).unwrap_or(0);
            let state = ButtonState {
                pressed_frames: frames,
                just_pressed: frames > 0 && (before == 0 || frames < before),
                just_released: frames == 0 && before > 0,
            };
            if state != ButtonState::default() {
                snapshot.buttons.insert(kind, state);
            }
        }
        snapshot
    }
}

/// Device that replays a fixed script, one entry per frame.
///
/// Each entry lists the inputs held during that frame. Once the script runs
/// out every input reads as released.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    script: VecDeque<Vec<InputKind>>,
    held: HashMap<InputKind, u32>,
}

impl ScriptedInput {
    /// Create a device from per-frame held inputs
    pub fn new(script: impl IntoIterator<Item = Vec<InputKind>>) -> Self {
        ScriptedInput {
            script: script.into_iter().collect(),
            held: HashMap::new(),
        }
    }

    /// Append `frames` frames holding `kinds`
    pub fn hold(&mut self, kinds: &[InputKind], frames: usize) {
        for _ in 0..frames {
            self.script.push_back(kinds.to_vec());
        }
    }

    /// Frames left in the script
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputDevice for ScriptedInput {
    fn poll(&mut self) {
        let current = self.script.pop_front().unwrap_or_default();
        self.held.retain(|kind, _| current.contains(kind));
        for kind in current {
            *self.held.entry(kind).or_insert(0) += 1;
        }
    }

    fn press_duration(&self, kind: InputKind) -> u32 {
        self.held.get(&kind).copied().unwrap_or(0)
    }
}
