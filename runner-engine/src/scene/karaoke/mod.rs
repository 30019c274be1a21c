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
//! Rhythm scene
//!
//! The scene runs through three states. `Starting` fades the first
//! background in before the music begins. `Singing` follows the music
//! position, grades presses against the notes and swaps backgrounds as their
//! durations run out. `Complete` shows the final score once the music stops.

mod prefetch;
mod scoring;
mod session;

pub use prefetch::BackgroundPrefetch;
pub use scoring::{KaraokeGrade, Note, NoteTrack, ScoreWindows};
pub use session::{
    supported_versions, KaraokeBackground, KaraokeInput, KaraokeSession, KaraokeSound, SESSION_FORMAT_VERSION,
};

use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::ecs::components::{Animation, Sprite, Text, Transform};
use crate::ecs::{Entity, EntityBuilder, Scheduler, World};
use crate::error::Result;
use crate::game::entities;
use crate::game::{AnimationSystem, ConstantSpeedSystem, DestroyBoundSystem};
use crate::math::Rect;
use crate::physics::KinematicSystem;
use crate::platform::assets::{Bitmap, ImageCache};
use crate::platform::audio::AudioPlayer;
use crate::platform::font::{FontShaper, MonospaceShaper};
use crate::platform::input::{InputKind, InputSnapshot};
use crate::render::{colors, RenderLayer, RenderQueue, SpriteRenderSystem, TextRenderSystem, TextureId};
use crate::scene::{Scene, SceneId, Transition};

/// Size of a note marker
const NOTE_SIZE: DVec2 = DVec2::new(48.0, 48.0);
/// Top of the first lane
const LANE_TOP: f64 = 120.0;
/// Vertical distance between lanes
const LANE_SPACING: f64 = 72.0;
/// Speed of the grade labels
const LABEL_SPEED: DVec2 = DVec2::new(800.0, 0.0);

/// Where the rhythm scene is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KaraokeState {
    /// First background fading in, music not started
    Starting,
    /// Music playing, presses are graded
    Singing,
    /// Music finished, score on screen
    Complete,
}

/// Rhythm game scene
pub struct KaraokeScene {
    config: GameConfig,
    session: Arc<KaraokeSession>,
    cache: Arc<ImageCache>,
    audio: Box<dyn AudioPlayer>,
    prefetch: BackgroundPrefetch,
    world: World,
    scheduler: Scheduler<()>,
    track: NoteTrack,
    state: KaraokeState,
    clock: Duration,
    background_index: usize,
    background_started: Duration,
    background: Option<Arc<Bitmap>>,
    front: Option<Entity>,
    back: Option<Entity>,
    markers: Vec<Entity>,
}

impl KaraokeScene {
    /// Scene for `session`, decoding backgrounds through `cache` and playing
    /// music on `audio`
    pub fn new(
        config: &GameConfig,
        session: Arc<KaraokeSession>,
        cache: Arc<ImageCache>,
        audio: Box<dyn AudioPlayer>,
    ) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.add_system(ConstantSpeedSystem);
        scheduler.add_system(KinematicSystem);
        scheduler.add_system(DestroyBoundSystem);
        scheduler.add_system(AnimationSystem);
        scheduler.add_system(SpriteRenderSystem);
        scheduler.add_system(TextRenderSystem);

        let track = NoteTrack::new(&session, ScoreWindows::from_config(&config.karaoke));
        KaraokeScene {
            config: config.clone(),
            session,
            cache,
            audio,
            prefetch: BackgroundPrefetch::new(),
            world: World::new(),
            scheduler,
            track,
            state: KaraokeState::Starting,
            clock: Duration::ZERO,
            background_index: 0,
            background_started: Duration::ZERO,
            background: None,
            front: None,
            back: None,
            markers: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> KaraokeState {
        self.state
    }

    /// Fade-in time while starting, music position while singing
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Index of the background in front
    pub fn background_index(&self) -> usize {
        self.background_index
    }

    /// Decoded image of the background in front
    pub fn background(&self) -> Option<&Arc<Bitmap>> {
        self.background.as_ref()
    }

    /// Score so far
    pub fn total_score(&self) -> u32 {
        self.track.total_score()
    }

    /// Notes and their hit state
    pub fn track(&self) -> &NoteTrack {
        &self.track
    }

    /// Opacity of the front background, 0 before start
    pub fn front_opacity(&self) -> f64 {
        self.front
            .and_then(|front| self.world.get::<Sprite>(front).ok().map(|sprite| sprite.opacity))
            .unwrap_or(0.0)
    }

    /// The scene's entities
    pub fn world(&self) -> &World {
        &self.world
    }

    fn background_texture(index: usize) -> String {
        format!("karaoke/background/{}", index)
    }

    fn screen(&self) -> DVec2 {
        DVec2::new(self.config.world.width, self.config.world.height)
    }

    fn lane_y(lane: usize) -> f64 {
        LANE_TOP + lane as f64 * LANE_SPACING
    }

    fn set_front_opacity(&self, opacity: f64) -> Result<()> {
        if let Some(front) = self.front {
            self.world.get_mut::<Sprite>(front)?.opacity = opacity.clamp(0.0, 1.0);
        }
        Ok(())
    }

    /// Fraction of `total` elapsed after `elapsed`; an empty fade is done
    fn fade(elapsed: Duration, total: Duration) -> f64 {
        if total.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0)
        }
    }

    fn spawn_stage(&mut self) -> Result<()> {
        let screen = self.screen();

        let mut back = Sprite::new(Self::background_texture(0), RenderLayer::Background);
        back.visible = false;
        self.back = Some(
            EntityBuilder::new()
                .with(Transform::new(DVec2::ZERO, screen))
                .with(back)
                .build(&mut self.world)?,
        );

        let mut front = Sprite::new(Self::background_texture(0), RenderLayer::Background);
        front.opacity = 0.0;
        self.front = Some(
            EntityBuilder::new()
                .with(Transform::new(DVec2::ZERO, screen))
                .with(front)
                .build(&mut self.world)?,
        );

        EntityBuilder::new()
            .with(Transform::at(64.0, screen.y - 256.0, 192.0, 192.0))
            .with(Sprite::new("karaoke/singer", RenderLayer::Objects))
            .with(Animation::new("karaoke/singer", 4, Duration::from_millis(120)))
            .build(&mut self.world)?;

        let lanes = KaraokeSound::ALL.len();
        let hit_line_height = lanes as f64 * LANE_SPACING;
        EntityBuilder::new()
            .with(Transform::at(self.config.karaoke.hit_line_x, LANE_TOP, 4.0, hit_line_height))
            .with(Sprite::new("karaoke/hit_line", RenderLayer::Ui))
            .build(&mut self.world)?;

        let mut markers = Vec::with_capacity(self.track.notes().len());
        for note in self.track.notes() {
            let position = DVec2::new(self.marker_x(note.target), Self::lane_y(note.sound.lane()));
            let marker = EntityBuilder::new()
                .with(Transform::new(position, NOTE_SIZE))
                .with(Sprite::new(format!("karaoke/note/{:?}", note.sound), RenderLayer::Ui))
                .build(&mut self.world)?;
            markers.push(marker);
        }
        self.markers = markers;
        Ok(())
    }

    fn marker_x(&self, target: Duration) -> f64 {
        let ahead = target.as_secs_f64() - self.clock.as_secs_f64();
        self.config.karaoke.hit_line_x + ahead * self.config.karaoke.note_speed
    }

    fn place_markers(&self) -> Result<()> {
        for (note, &marker) in self.track.notes().iter().zip(&self.markers) {
            self.world.get_mut::<Transform>(marker)?.position.x = self.marker_x(note.target);
            self.world.get_mut::<Sprite>(marker)?.visible = note.hit.is_none();
        }
        Ok(())
    }

    fn grade_presses(&mut self, input: &InputSnapshot) -> Result<()> {
        let screen = self.screen();
        for sound in KaraokeSound::ALL {
            if !input.just_pressed(sound.input_kind()) {
                continue;
            }
            let Some((index, grade)) = self.track.register_press(sound, self.clock) else {
                continue;
            };
            debug!(note = index, ?grade, clock_ms = self.clock.as_millis() as u64, "note hit");
            let position = DVec2::new(self.config.karaoke.hit_line_x, Self::lane_y(sound.lane()));
            entities::floating_text(
                grade.label(),
                position,
                LABEL_SPEED,
                grade.color(),
                Rect::new(-500.0, -500.0, screen.x + 1000.0, screen.y + 1000.0),
            )
            .build(&mut self.world)?;
        }
        Ok(())
    }

    /// Swap to the next background once the current one has run its course
    fn advance_background(&mut self) -> Result<()> {
        let next = self.background_index + 1;
        if next >= self.session.backgrounds.len() {
            return Ok(());
        }
        let current = &self.session.backgrounds[self.background_index];
        if self.clock < self.background_started + current.duration() {
            return Ok(());
        }

        let bitmap = self.prefetch.wait(next)?;
        self.background = Some(bitmap);
        if let (Some(front), Some(back)) = (self.front, self.back) {
            let shown = {
                let mut front_sprite = self.world.get_mut::<Sprite>(front)?;
                let shown = front_sprite.texture.clone();
                front_sprite.texture = TextureId::new(Self::background_texture(next));
                front_sprite.opacity = 0.0;
                shown
            };
            let mut back_sprite = self.world.get_mut::<Sprite>(back)?;
            back_sprite.texture = shown;
            back_sprite.visible = true;
            back_sprite.opacity = 1.0;
        }
        self.background_index = next;
        self.background_started = self.clock;
        if next + 1 < self.session.backgrounds.len() {
            self.prefetch
                .request(Arc::clone(&self.session), next + 1, Arc::clone(&self.cache));
        }
        info!(background = next, "background switched");
        Ok(())
    }

    fn complete(&mut self) -> Result<()> {
        self.state = KaraokeState::Complete;
        let total = self.track.total_score();
        info!(
            total,
            hits = self.track.hit_count(),
            notes = self.track.notes().len(),
            "karaoke complete"
        );

        let content = format!("SCORE {}", total);
        let size = 64.0;
        let shaper = MonospaceShaper::default();
        let x = shaper.centered_x(&content, size, self.config.world.width);
        let mut text = Text::new(content, size);
        text.color = colors::YELLOW;
        EntityBuilder::new()
            .with(Transform::at(x, self.config.world.height / 2.0 - size, 0.0, size))
            .with(text)
            .build(&mut self.world)?;
        Ok(())
    }
}

impl Scene for KaraokeScene {
    fn id(&self) -> SceneId {
        SceneId::Karaoke
    }

    fn start(&mut self) -> Result<()> {
        self.session.validate()?;
        let first = self.cache.get(&self.session.backgrounds[0].image, None)?;
        self.background = Some(first);
        self.spawn_stage()?;
        if self.session.backgrounds.len() > 1 {
            self.prefetch
                .request(Arc::clone(&self.session), 1, Arc::clone(&self.cache));
        }
        self.scheduler.sync(&mut self.world, &mut ())?;
        info!(title = %self.session.title, notes = self.track.notes().len(), "karaoke started");
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.audio.pause();
        self.scheduler.shutdown(&mut self.world, &mut ())
    }

    fn update(&mut self, dt: Duration, input: &InputSnapshot) -> Result<Transition> {
        let dt = if input.is_pressed(InputKind::FastGameSpeed) {
            dt.mul_f64(self.config.debug.fast_forward_factor.max(0.0))
        } else {
            dt
        };
        self.audio.advance(dt);

        match self.state {
            KaraokeState::Starting => {
                self.clock += dt;
                let fade_in = Duration::from_millis(self.config.karaoke.start_fade_in_ms);
                self.set_front_opacity(Self::fade(self.clock, fade_in))?;
                if self.clock >= fade_in {
                    self.set_front_opacity(1.0)?;
                    self.state = KaraokeState::Singing;
                    self.clock = Duration::ZERO;
                    self.background_started = Duration::ZERO;
                    self.audio.play();
                    info!("music started");
                }
            }
            KaraokeState::Singing => {
                self.clock = self.audio.position();
                self.advance_background()?;
                if self.background_index > 0 {
                    let fade_in = self.session.backgrounds[self.background_index].fade_in();
                    let shown_for = self.clock.saturating_sub(self.background_started);
                    self.set_front_opacity(Self::fade(shown_for, fade_in))?;
                }
                self.grade_presses(input)?;
                if !self.audio.is_playing() {
                    self.complete()?;
                }
            }
            KaraokeState::Complete => {
                if input.just_pressed(InputKind::Confirm) || input.just_pressed(InputKind::Jump) {
                    return Ok(Transition::Switch(SceneId::Title));
                }
            }
        }

        self.place_markers()?;
        self.scheduler.update(&mut self.world, &mut (), dt.as_secs_f64())?;
        Ok(Transition::Stay)
    }

    fn draw(&self, queue: &mut RenderQueue) -> Result<()> {
        self.scheduler.render(&self.world, &(), queue)
    }
}
