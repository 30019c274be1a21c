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
//! Side-scrolling runner scene

use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use tracing::info;

use crate::config::GameConfig;
use crate::ecs::components::{Life, Text, Transform};
use crate::ecs::{Entity, EntityBuilder, Scheduler, World};
use crate::error::Result;
use crate::game::{entities, main_game_scheduler, GameContext};
use crate::math::Rect;
use crate::platform::audio::{AudioBackend, SoundBank};
use crate::platform::input::{InputKind, InputSnapshot};
use crate::render::RenderQueue;
use crate::scene::{Scene, SceneId, Transition};

/// Parallax layers, back to front: texture and scroll modifier
const BACKGROUND_LAYERS: [(&str, f64); 2] = [("background/sky", 0.2), ("background/city", 0.5)];

/// Runner scene: endless generated level, returns to the title on game over
pub struct MainGameScene {
    ctx: GameContext,
    world: World,
    scheduler: Scheduler<GameContext>,
    player: Option<Entity>,
    hud: Option<Entity>,
}

impl MainGameScene {
    /// Scene whose level is generated from `seed`
    pub fn new(config: GameConfig, seed: u64) -> Self {
        MainGameScene {
            ctx: GameContext::new(config, seed),
            world: World::new(),
            scheduler: Scheduler::new(),
            player: None,
            hud: None,
        }
    }

    /// Play the scene's sounds from `sounds` through `audio`
    pub fn with_audio(mut self, sounds: Arc<SoundBank>, audio: Arc<dyn AudioBackend>) -> Self {
        self.ctx.sounds = sounds;
        self.ctx.audio = audio;
        self
    }

    /// Shared game state
    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    /// The scene's entities
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The player, while alive
    pub fn player(&self) -> Option<Entity> {
        self.player.filter(|&player| self.world.is_entity_alive(player))
    }

    fn update_hud(&self) -> Result<()> {
        let Some(hud) = self.hud else {
            return Ok(());
        };
        let hp = match self.player() {
            Some(player) => self.world.get::<Life>(player)?.hp,
            None => 0.0,
        };
        self.world.get_mut::<Text>(hud)?.content = format!("HP {}", hp.max(0.0));
        Ok(())
    }
}

impl Scene for MainGameScene {
    fn id(&self) -> SceneId {
        SceneId::MainGame
    }

    fn start(&mut self) -> Result<()> {
        self.scheduler = main_game_scheduler(&self.ctx)?;
        let width = self.ctx.level.width;
        let height = self.ctx.level.height;

        for (texture, modifier) in BACKGROUND_LAYERS {
            for copy in 0..2 {
                let position = DVec2::new(copy as f64 * width, 0.0);
                entities::background(texture, position, DVec2::new(width, height), modifier, width)
                    .build(&mut self.world)?;
            }
        }

        entities::music(entities::CITY_MUSIC, entities::CITY_MUSIC_INTRO).build(&mut self.world)?;
        self.player = Some(entities::player(&self.ctx.config).build(&mut self.world)?);
        entities::kill_box(Rect::new(-400.0, -height, 200.0, height * 3.0)).build(&mut self.world)?;
        entities::kill_box(Rect::new(-400.0, height + 200.0, width + 800.0, 200.0)).build(&mut self.world)?;
        self.hud = Some(
            EntityBuilder::new()
                .with(Transform::at(16.0, 16.0, 0.0, 32.0))
                .with(Text::new("", 32.0))
                .build(&mut self.world)?,
        );
        self.update_hud()?;

        self.scheduler.sync(&mut self.world, &mut self.ctx)?;
        info!(systems = self.scheduler.system_count(), "main game started");
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.player = None;
        self.hud = None;
        self.scheduler.shutdown(&mut self.world, &mut self.ctx)?;
        self.ctx.space.clear();
        Ok(())
    }

    fn update(&mut self, dt: Duration, input: &InputSnapshot) -> Result<Transition> {
        let dt = if input.is_pressed(InputKind::FastGameSpeed) {
            dt.mul_f64(self.ctx.config.debug.fast_forward_factor.max(0.0))
        } else {
            dt
        };
        self.ctx.input = input.clone();
        self.scheduler
            .update(&mut self.world, &mut self.ctx, dt.as_secs_f64())?;
        self.update_hud()?;

        if self.ctx.outcome.is_some() {
            return Ok(Transition::Switch(SceneId::Title));
        }
        Ok(Transition::Stay)
    }

    fn draw(&self, queue: &mut RenderQueue) -> Result<()> {
        self.scheduler.render(&self.world, &self.ctx, queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Sound, Tag};
    use crate::game::GameOutcome;
    use crate::platform::audio::{HeadlessAudioBackend, PcmStream};
    use crate::render::{RecordingSurface, RenderLayer};

    const DT: Duration = Duration::from_millis(16);

    #[test]
    fn test_start_builds_world() {
        let mut scene = MainGameScene::new(GameConfig::default(), 1);
        scene.start().unwrap();
        assert!(scene.player().is_some());
        assert_eq!(scene.context().space.filter_by_tag(Tag::KillBox).len(), 2);

        scene.update(DT, &InputSnapshot::new()).unwrap();
        assert!(!scene.context().space.filter_by_tag(Tag::Ground).is_empty());

        let mut queue = RenderQueue::new();
        scene.draw(&mut queue).unwrap();
        let mut surface = RecordingSurface::new();
        queue.flush(&mut surface).unwrap();
        assert_eq!(surface.layers().first(), Some(&RenderLayer::Background));
        assert!(surface.texts().contains(&"HP 3"));
    }

    #[test]
    fn test_outcome_returns_to_title() {
        let mut scene = MainGameScene::new(GameConfig::default(), 1);
        scene.start().unwrap();
        scene.ctx.end_run(GameOutcome::Died);
        assert_eq!(
            scene.update(DT, &InputSnapshot::new()).unwrap(),
            Transition::Switch(SceneId::Title)
        );
    }

    #[test]
    fn test_city_music_loops_past_its_length() {
        // ten seconds at 100 samples per second, eight of them intro
        let sounds = SoundBank::new().with(entities::CITY_MUSIC, PcmStream::new(100, 1, vec![0i16; 1000]));
        let mut scene = MainGameScene::new(GameConfig::default(), 1)
            .with_audio(Arc::new(sounds), Arc::new(HeadlessAudioBackend));
        scene.start().unwrap();

        for _ in 0..700 {
            scene.update(DT, &InputSnapshot::new()).unwrap();
        }
        let world = scene.world();
        let music: Vec<_> = world
            .entities()
            .filter(|&entity| {
                world
                    .get::<Sound>(entity)
                    .map_or(false, |sound| sound.clip.as_str() == entities::CITY_MUSIC)
            })
            .collect();
        assert_eq!(music.len(), 1);
        assert!(world.get::<Sound>(music[0]).unwrap().active);
    }

    #[test]
    fn test_end_empties_world_and_space() {
        let mut scene = MainGameScene::new(GameConfig::default(), 1);
        scene.start().unwrap();
        scene.update(DT, &InputSnapshot::new()).unwrap();
        scene.end().unwrap();
        assert_eq!(scene.world().entity_count(), 0);
        assert!(scene.context().space.is_empty());
        assert!(scene.player().is_none());
    }
}
