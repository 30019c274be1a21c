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
//! Text measurement

use glam::DVec2;

use crate::render::{Color, Drawable, RenderLayer, RenderQueue, TextDraw};

/// Size of a shaped run of text
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

/// Measures and queues text
pub trait FontShaper {
    /// Size of `text` at glyph height `size`
    fn measure(&self, text: &str, size: f64) -> BoundingBox;

    /// Queue `text` with its top-left corner at `position`
    fn draw(&self, queue: &mut RenderQueue, layer: RenderLayer, text: &str, position: DVec2, size: f64, color: Color) {
        queue.push(
            layer,
            Drawable::Text(TextDraw {
                content: text.to_string(),
                position,
                size,
                color,
            }),
        );
    }

    /// Left edge that centres `text` inside `width`
    fn centered_x(&self, text: &str, size: f64, width: f64) -> f64 {
        (width - self.measure(text, size).width) / 2.0
    }
}

/// Fixed-advance shaper, enough for layout without a font file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceShaper {
    /// Glyph advance as a fraction of the glyph height
    pub advance: f64,
    /// Line height as a fraction of the glyph height
    pub line_height: f64,
}

impl Default for MonospaceShaper {
    fn default() -> Self {
        MonospaceShaper {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl FontShaper for MonospaceShaper {
    fn measure(&self, text: &str, size: f64) -> BoundingBox {
        let (lines, longest) = text
            .lines()
            .fold((0usize, 0usize), |(lines, longest), line| {
                (lines + 1, longest.max(line.chars().count()))
            });
        BoundingBox {
            width: longest as f64 * self.advance * size,
            height: lines as f64 * self.line_height * size,
        }
    }
}
