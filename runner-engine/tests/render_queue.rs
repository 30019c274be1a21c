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
//! Render queue ordering through the render systems

use glam::DVec2;
use runner_engine::ecs::components::{Sprite, Text, Transform};
use runner_engine::ecs::{EntityBuilder, Scheduler, World};
use runner_engine::render::{
    colors, Drawable, RecordingSurface, RenderLayer, RenderQueue, SpriteRenderSystem, TextDraw, TextRenderSystem,
};

fn label(content: &str) -> Drawable {
    Drawable::Text(TextDraw {
        content: content.to_string(),
        position: DVec2::ZERO,
        size: 10.0,
        color: colors::WHITE,
    })
}

#[test]
fn test_layers_draw_back_to_front_keeping_submission_order() {
    let mut queue = RenderQueue::new();
    queue.push(RenderLayer::Effects, label("spark"));
    queue.push(RenderLayer::Background, label("sky"));
    queue.push(RenderLayer::Objects, label("whale"));
    queue.push(RenderLayer::Background, label("city"));

    let mut surface = RecordingSurface::new();
    assert_eq!(queue.flush(&mut surface).unwrap(), 4);
    assert_eq!(surface.texts(), vec!["sky", "city", "whale", "spark"]);
    assert_eq!(
        surface.layers(),
        vec![
            RenderLayer::Background,
            RenderLayer::Background,
            RenderLayer::Objects,
            RenderLayer::Effects
        ]
    );
    assert!(queue.is_empty());
}

#[test]
fn test_render_systems_feed_one_queue() {
    let mut world = World::new();
    let mut scheduler = Scheduler::<()>::new();
    scheduler.add_system(TextRenderSystem);
    scheduler.add_system(SpriteRenderSystem);

    EntityBuilder::new()
        .with(Transform::at(0.0, 0.0, 10.0, 10.0))
        .with(Text::new("score", 12.0))
        .build(&mut world)
        .unwrap();
    EntityBuilder::new()
        .with(Transform::at(0.0, 0.0, 100.0, 100.0))
        .with(Sprite::new("background/sky", RenderLayer::Background))
        .build(&mut world)
        .unwrap();
    let mut hidden = Sprite::new("ghost", RenderLayer::Objects);
    hidden.visible = false;
    EntityBuilder::new()
        .with(Transform::at(0.0, 0.0, 10.0, 10.0))
        .with(hidden)
        .build(&mut world)
        .unwrap();

    scheduler.update(&mut world, &mut (), 0.016).unwrap();
    let mut queue = RenderQueue::new();
    scheduler.render(&world, &(), &mut queue).unwrap();
    let mut surface = RecordingSurface::new();
    queue.flush(&mut surface).unwrap();

    assert_eq!(surface.layers(), vec![RenderLayer::Background, RenderLayer::Text]);
    match &surface.commands[0].drawable {
        Drawable::Sprite(sprite) => assert_eq!(sprite.texture.as_str(), "background/sky"),
        other => panic!("expected a sprite, got {:?}", other),
    }
}
