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
//! Scene management
//!
//! A scene owns its world, scheduler and context. The [`SceneController`]
//! holds exactly one active scene, drives it once per frame and performs the
//! `end(old)` then `start(new)` handoff when a scene asks to switch.

pub mod karaoke;
mod main_game;
mod title;

pub use main_game::MainGameScene;
pub use title::TitleScene;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::config::GameConfig;
use crate::error::{EngineError, Result};
use crate::platform::assets::ImageCache;
use crate::platform::audio::{AudioBackend, HeadlessAudioBackend, NullAudioPlayer, SoundBank};
use crate::platform::input::{ButtonTracker, InputDevice, InputSnapshot};
use crate::render::{RenderQueue, Surface};
use karaoke::{KaraokeScene, KaraokeSession};

/// Scenes the game can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneId {
    /// Menu
    Title,
    /// Side-scrolling runner
    MainGame,
    /// Rhythm game
    Karaoke,
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneId::Title => "title",
            SceneId::MainGame => "main game",
            SceneId::Karaoke => "karaoke",
        };
        f.write_str(name)
    }
}

/// What a scene wants after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep running this scene
    Stay,
    /// Hand off to another scene
    Switch(SceneId),
    /// Stop the game loop
    Quit,
}

/// One screen of the game
pub trait Scene {
    /// Which scene this is
    fn id(&self) -> SceneId;

    /// Build the scene's entities; called once before the first update
    fn start(&mut self) -> Result<()>;

    /// Tear the scene down; called once after the last update
    fn end(&mut self) -> Result<()>;

    /// Advance by `dt` with this frame's input
    fn update(&mut self, dt: Duration, input: &InputSnapshot) -> Result<Transition>;

    /// Queue this frame's draw commands
    fn draw(&self, queue: &mut RenderQueue) -> Result<()>;
}

/// Builds scenes on demand
pub trait SceneFactory {
    /// Create a fresh, not yet started scene
    fn create(&mut self, id: SceneId) -> Result<Box<dyn Scene>>;

    /// Whether `id` can be created
    fn is_available(&self, _id: SceneId) -> bool {
        true
    }
}

/// Factory for the shipped scenes
pub struct GameScenes {
    config: GameConfig,
    seed: u64,
    session: Option<Arc<KaraokeSession>>,
    cache: Arc<ImageCache>,
    sounds: Arc<SoundBank>,
    audio: Arc<dyn AudioBackend>,
    runs: u64,
}

impl GameScenes {
    /// Factory without a rhythm session; karaoke is unavailable
    pub fn new(config: GameConfig, seed: u64, cache: Arc<ImageCache>) -> Self {
        GameScenes {
            config,
            seed,
            session: None,
            cache,
            sounds: Arc::new(SoundBank::new()),
            audio: Arc::new(HeadlessAudioBackend),
            runs: 0,
        }
    }

    /// Play main game sounds from `sounds` through `audio`
    pub fn with_audio(mut self, sounds: SoundBank, audio: Arc<dyn AudioBackend>) -> Self {
        self.sounds = Arc::new(sounds);
        self.audio = audio;
        self
    }

    /// Make the karaoke scene available with `session`
    pub fn with_karaoke(mut self, session: KaraokeSession) -> Self {
        self.session = Some(Arc::new(session));
        self
    }
}

impl SceneFactory for GameScenes {
    fn create(&mut self, id: SceneId) -> Result<Box<dyn Scene>> {
        match id {
            SceneId::Title => Ok(Box::new(TitleScene::new(&self.config, self.session.is_some()))),
            SceneId::MainGame => {
                // each run gets its own level
                let seed = self.seed.wrapping_add(self.runs);
                self.runs += 1;
                Ok(Box::new(
                    MainGameScene::new(self.config.clone(), seed)
                        .with_audio(Arc::clone(&self.sounds), Arc::clone(&self.audio)),
                ))
            }
            SceneId::Karaoke => {
                let session = self
                    .session
                    .clone()
                    .ok_or_else(|| EngineError::SceneNotAvailable(id.to_string()))?;
                let audio = NullAudioPlayer::with_length(session.music_duration());
                Ok(Box::new(KaraokeScene::new(
                    &self.config,
                    session,
                    Arc::clone(&self.cache),
                    Box::new(audio),
                )))
            }
        }
    }

    fn is_available(&self, id: SceneId) -> bool {
        id != SceneId::Karaoke || self.session.is_some()
    }
}

/// Owns the active scene and runs the frame loop body
pub struct SceneController {
    factory: Box<dyn SceneFactory>,
    active: Box<dyn Scene>,
    tracker: ButtonTracker,
    queue: RenderQueue,
    running: bool,
    frames: u64,
}

impl SceneController {
    /// Create and start the `initial` scene
    pub fn new(mut factory: Box<dyn SceneFactory>, initial: SceneId) -> Result<Self> {
        let mut active = factory.create(initial)?;
        active.start()?;
        info!(scene = %initial, "scene started");
        Ok(SceneController {
            factory,
            active,
            tracker: ButtonTracker::new(),
            queue: RenderQueue::new(),
            running: true,
            frames: 0,
        })
    }

    /// The active scene
    pub fn active(&self) -> SceneId {
        self.active.id()
    }

    /// False once a scene asked to quit or the controller shut down
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame: read input, update, draw, then apply the transition.
    ///
    /// Returns whether the loop should keep going.
    pub fn frame(&mut self, dt: Duration, device: &mut dyn InputDevice, surface: &mut dyn Surface) -> Result<bool> {
        if !self.running {
            return Ok(false);
        }
        device.poll();
        let input = self.tracker.capture(&*device);

        let transition = self.active.update(dt, &input)?;
        self.active.draw(&mut self.queue)?;
        self.queue.flush(surface)?;
        self.frames += 1;

        match transition {
            Transition::Stay => {}
            Transition::Switch(id) => self.change_scene(id)?,
            Transition::Quit => self.shutdown()?,
        }
        Ok(self.running)
    }

    /// End the active scene and start `id` in its place.
    ///
    /// The new scene is created before the old one ends. When it fails to
    /// start, the old scene is started again and the error is returned.
    pub fn change_scene(&mut self, id: SceneId) -> Result<()> {
        let mut next = self.factory.create(id)?;
        let previous = self.active.id();
        self.active.end()?;
        if let Err(err) = next.start() {
            error!(scene = %id, %err, "scene failed to start, restoring previous scene");
            let mut restored = self.factory.create(previous)?;
            restored.start()?;
            self.active = restored;
            return Err(err);
        }
        info!(from = %previous, to = %id, "scene changed");
        self.active = next;
        Ok(())
    }

    /// End the active scene and stop the loop
    pub fn shutdown(&mut self) -> Result<()> {
        if self.running {
            self.running = false;
            self.active.end()?;
            info!(frames = self.frames, "controller shut down");
        }
        Ok(())
    }
}
