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
//! Layer-ordered render command queue
//!
//! Render systems push `(layer, drawable)` pairs in any order during the
//! render pass. [`RenderQueue::flush`] performs a single stable sort by layer
//! and hands each command to a [`Surface`], so commands on the same layer
//! draw in submission order.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::Rect;

/// RGBA colour, one byte per channel
pub type Color = [u8; 4];

/// Common colours
pub mod colors {
    use super::Color;

    /// Opaque white
    pub const WHITE: Color = [255, 255, 255, 255];
    /// Opaque black
    pub const BLACK: Color = [0, 0, 0, 255];
    /// Opaque red, used for collider outlines
    pub const RED: Color = [255, 0, 0, 255];
    /// Opaque yellow
    pub const YELLOW: Color = [255, 221, 0, 255];
}

/// Draw layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderLayer {
    /// Parallax backgrounds
    Background = 0,
    /// Buildings, the player, enemies and bullets
    Objects = 1,
    /// Particles and transient effects
    Effects = 2,
    /// HUD and menus
    Ui = 3,
    /// Collider outlines
    Debug = 4,
    /// Text on top of everything
    Text = 5,
}

/// Identifier of a texture or frameset owned by the platform layer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextureId(pub String);

impl TextureId {
    /// Create an id from any string-like value
    pub fn new(name: impl Into<String>) -> Self {
        TextureId(name.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TextureId {
    fn from(name: &str) -> Self {
        TextureId::new(name)
    }
}

/// A textured quad
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    /// Texture or frameset to sample
    pub texture: TextureId,
    /// Frame index inside the frameset
    pub frame: usize,
    /// Top-left corner in screen space
    pub position: DVec2,
    /// Drawn size before scaling
    pub size: DVec2,
    /// Scale factor
    pub scale: DVec2,
    /// Mirror horizontally
    pub invert_x: bool,
    /// Mirror vertically
    pub invert_y: bool,
    /// 0 is transparent, 1 is opaque
    pub opacity: f64,
    /// Draw with inverted colours
    pub invert_color: bool,
}

/// A run of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    /// Text to draw
    pub content: String,
    /// Top-left corner of the first line
    pub position: DVec2,
    /// Glyph height in pixels
    pub size: f64,
    /// Fill colour
    pub color: Color,
}

/// Something a [`Surface`] can draw
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// Textured quad
    Sprite(SpriteDraw),
    /// Text run
    Text(TextDraw),
    /// Rectangle outline
    Outline {
        /// Outlined rectangle
        rect: Rect,
        /// Line colour
        color: Color,
    },
}

/// One queued draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Layer the command belongs to
    pub layer: RenderLayer,
    /// What to draw
    pub drawable: Drawable,
}

/// Backend that turns draw commands into pixels
pub trait Surface {
    /// Draw one command; called in layer order
    fn draw(&mut self, command: &DrawCommand) -> Result<()>;
}

/// Per-frame draw command accumulator
#[derive(Debug, Default)]
pub struct RenderQueue {
    commands: Vec<DrawCommand>,
}

impl RenderQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        RenderQueue::default()
    }

    /// Enqueue a drawable on a layer
    pub fn push(&mut self, layer: RenderLayer, drawable: Drawable) {
        self.commands.push(DrawCommand { layer, drawable });
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Queued commands in submission order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop everything without drawing
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Stable-sort by layer, draw everything and empty the queue.
    ///
    /// Returns the number of commands drawn.
    pub fn flush(&mut self, surface: &mut dyn Surface) -> Result<usize> {
        self.commands.sort_by_key(|command| command.layer);
        let count = self.commands.len();
        for command in self.commands.drain(..) {
            surface.draw(&command)?;
        }
        Ok(count)
    }
}

/// Surface that records what it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Every command drawn so far, in draw order
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Create an empty recorder
    pub fn new() -> Self {
        RecordingSurface::default()
    }

    /// Layers of the recorded commands, in draw order
    pub fn layers(&self) -> Vec<RenderLayer> {
        self.commands.iter().map(|c| c.layer).collect()
    }

    /// Text of every recorded text command
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match &c.drawable {
                Drawable::Text(text) => Some(text.content.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn draw(&mut self, command: &DrawCommand) -> Result<()> {
        self.commands.push(command.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> Drawable {
        Drawable::Text(TextDraw {
            content: content.to_string(),
            position: DVec2::ZERO,
            size: 12.0,
            color: colors::WHITE,
        })
    }

    #[test]
    fn test_flush_sorts_by_layer() {
        let mut queue = RenderQueue::new();
        queue.push(RenderLayer::Text, text("label"));
        queue.push(RenderLayer::Background, text("sky"));
        queue.push(RenderLayer::Debug, text("outline"));

        let mut surface = RecordingSurface::new();
        assert_eq!(queue.flush(&mut surface).unwrap(), 3);
        assert_eq!(surface.texts(), vec!["sky", "outline", "label"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_layer_numbering() {
        assert_eq!(RenderLayer::Background as u8, 0);
        assert_eq!(RenderLayer::Effects as u8, 2);
        assert!(RenderLayer::Ui < RenderLayer::Text);
    }

    #[test]
    fn test_flush_empty_queue() {
        let mut queue = RenderQueue::new();
        let mut surface = RecordingSurface::new();
        assert_eq!(queue.flush(&mut surface).unwrap(), 0);
        assert!(surface.commands.is_empty());
    }
}
