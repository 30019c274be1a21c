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
//! Title menu

use std::time::Duration;

use glam::DVec2;
use tracing::debug;

use crate::config::GameConfig;
use crate::ecs::components::{Text, Transform};
use crate::ecs::{Entity, EntityBuilder, Scheduler, World};
use crate::error::Result;
use crate::platform::font::{FontShaper, MonospaceShaper};
use crate::platform::input::{InputKind, InputSnapshot};
use crate::render::{colors, RenderQueue, TextRenderSystem};
use crate::scene::{Scene, SceneId, Transition};

const TITLE_SIZE: f64 = 96.0;
const ENTRY_SIZE: f64 = 48.0;

/// Menu choosing between the main game and karaoke
pub struct TitleScene {
    width: f64,
    height: f64,
    options: Vec<SceneId>,
    selected: usize,
    entries: Vec<Entity>,
    world: World,
    scheduler: Scheduler<()>,
}

impl TitleScene {
    /// Menu for a screen the size of the configured world
    pub fn new(config: &GameConfig, karaoke_available: bool) -> Self {
        let mut options = vec![SceneId::MainGame];
        if karaoke_available {
            options.push(SceneId::Karaoke);
        }
        let mut scheduler = Scheduler::new();
        scheduler.add_system(TextRenderSystem);
        TitleScene {
            width: config.world.width,
            height: config.world.height,
            options,
            selected: 0,
            entries: Vec::new(),
            world: World::new(),
            scheduler,
        }
    }

    /// Scenes offered, top to bottom
    pub fn options(&self) -> &[SceneId] {
        &self.options
    }

    /// Scene under the cursor
    pub fn selected(&self) -> SceneId {
        self.options[self.selected]
    }

    fn label(id: SceneId) -> &'static str {
        match id {
            SceneId::Title => "TITLE",
            SceneId::MainGame => "START",
            SceneId::Karaoke => "KARAOKE",
        }
    }

    fn spawn_text(&mut self, content: &str, size: f64, y: f64) -> Result<Entity> {
        let shaper = MonospaceShaper::default();
        let x = shaper.centered_x(content, size, self.width);
        EntityBuilder::new()
            .with(Transform::new(DVec2::new(x, y), DVec2::new(0.0, size)))
            .with(Text::new(content, size))
            .build(&mut self.world)
    }

    fn highlight(&self) -> Result<()> {
        for (index, &entry) in self.entries.iter().enumerate() {
            self.world.get_mut::<Text>(entry)?.color = if index == self.selected {
                colors::YELLOW
            } else {
                colors::WHITE
            };
        }
        Ok(())
    }
}

impl Scene for TitleScene {
    fn id(&self) -> SceneId {
        SceneId::Title
    }

    fn start(&mut self) -> Result<()> {
        self.spawn_text("WHALE RUNNER", TITLE_SIZE, self.height / 4.0)?;
        let mut entries = Vec::with_capacity(self.options.len());
        for (index, &id) in self.options.clone().iter().enumerate() {
            let y = self.height / 2.0 + index as f64 * ENTRY_SIZE * 1.5;
            entries.push(self.spawn_text(Self::label(id), ENTRY_SIZE, y)?);
        }
        self.entries = entries;
        self.highlight()?;
        self.scheduler.sync(&mut self.world, &mut ())
    }

    fn end(&mut self) -> Result<()> {
        self.entries.clear();
        self.scheduler.shutdown(&mut self.world, &mut ())
    }

    fn update(&mut self, dt: Duration, input: &InputSnapshot) -> Result<Transition> {
        let count = self.options.len();
        if input.just_pressed(InputKind::MoveDown) {
            self.selected = (self.selected + 1) % count;
        } else if input.just_pressed(InputKind::MoveUp) {
            self.selected = (self.selected + count - 1) % count;
        }
        self.highlight()?;
        self.scheduler.update(&mut self.world, &mut (), dt.as_secs_f64())?;

        if input.just_pressed(InputKind::Confirm) || input.just_pressed(InputKind::Jump) {
            debug!(choice = %self.selected(), "menu confirmed");
            return Ok(Transition::Switch(self.selected()));
        }
        Ok(Transition::Stay)
    }

    fn draw(&self, queue: &mut RenderQueue) -> Result<()> {
        self.scheduler.render(&self.world, &(), queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;

    fn press(scene: &mut TitleScene, kind: InputKind) -> Transition {
        scene
            .update(Duration::from_millis(16), &InputSnapshot::pressed(&[kind]))
            .unwrap()
    }

    #[test]
    fn test_karaoke_listed_only_when_available() {
        assert_eq!(TitleScene::new(&GameConfig::default(), false).options(), &[SceneId::MainGame]);
        assert_eq!(
            TitleScene::new(&GameConfig::default(), true).options(),
            &[SceneId::MainGame, SceneId::Karaoke]
        );
    }

    #[test]
    fn test_selection_wraps_and_confirms() {
        let mut scene = TitleScene::new(&GameConfig::default(), true);
        scene.start().unwrap();

        assert_eq!(press(&mut scene, InputKind::MoveUp), Transition::Stay);
        assert_eq!(scene.selected(), SceneId::Karaoke);
        press(&mut scene, InputKind::MoveDown);
        assert_eq!(scene.selected(), SceneId::MainGame);
        press(&mut scene, InputKind::MoveDown);
        assert_eq!(press(&mut scene, InputKind::Confirm), Transition::Switch(SceneId::Karaoke));
    }

    #[test]
    fn test_draws_title_and_entries() {
        let mut scene = TitleScene::new(&GameConfig::default(), false);
        scene.start().unwrap();
        let mut queue = RenderQueue::new();
        scene.draw(&mut queue).unwrap();
        let mut surface = RecordingSurface::new();
        queue.flush(&mut surface).unwrap();
        assert_eq!(surface.texts(), vec!["WHALE RUNNER", "START"]);
    }
}
