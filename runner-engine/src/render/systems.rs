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
//! Render systems for sprites and text

use crate::ecs::components::{Sprite, Text, Transform};
use crate::ecs::{Capability, Frame, RenderFrame, System};
use crate::error::Result;
use crate::game::priority;
use crate::render::{Drawable, SpriteDraw, TextDraw};

/// Queues every visible Transform + Sprite entity on its sprite's layer
#[derive(Debug, Default)]
pub struct SpriteRenderSystem;

impl<C> System<C> for SpriteRenderSystem {
    fn name(&self) -> &str {
        "SpriteRenderSystem"
    }

    fn priority(&self) -> i32 {
        priority::SPRITE_RENDER
    }

    fn capability(&self) -> Capability {
        Capability::new().with::<Transform>().with::<Sprite>()
    }

    fn update(&mut self, _frame: Frame<'_, C>) -> Result<()> {
        Ok(())
    }

    fn render(&self, frame: RenderFrame<'_, C>) -> Result<()> {
        for &entity in frame.members {
            let transform = frame.world.get::<Transform>(entity)?;
            let sprite = frame.world.get::<Sprite>(entity)?;
            if !sprite.visible || sprite.opacity <= 0.0 {
                continue;
            }
            frame.queue.push(
                sprite.layer,
                Drawable::Sprite(SpriteDraw {
                    texture: sprite.texture.clone(),
                    frame: sprite.frame,
                    position: transform.position,
                    size: transform.size,
                    scale: transform.scale,
                    invert_x: transform.invert_x,
                    invert_y: transform.invert_y,
                    opacity: sprite.opacity.min(1.0),
                    invert_color: sprite.invert_color,
                }),
            );
        }
        Ok(())
    }
}

/// Queues every Transform + Text entity
#[derive(Debug, Default)]
pub struct TextRenderSystem;

impl<C> System<C> for TextRenderSystem {
    fn name(&self) -> &str {
        "TextRenderSystem"
    }

    fn priority(&self) -> i32 {
        priority::TEXT_RENDER
    }

    fn capability(&self) -> Capability {
        Capability::new().with::<Transform>().with::<Text>()
    }

    fn update(&mut self, _frame: Frame<'_, C>) -> Result<()> {
        Ok(())
    }

    fn render(&self, frame: RenderFrame<'_, C>) -> Result<()> {
        for &entity in frame.members {
            let transform = frame.world.get::<Transform>(entity)?;
            let text = frame.world.get::<Text>(entity)?;
            if text.content.is_empty() {
                continue;
            }
            frame.queue.push(
                text.layer,
                Drawable::Text(TextDraw {
                    content: text.content.clone(),
                    position: transform.position,
                    size: text.size,
                    color: text.color,
                }),
            );
        }
        Ok(())
    }
}
