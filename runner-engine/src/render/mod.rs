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
//! Rendering
//!
//! Systems never draw directly. They push commands into a [`RenderQueue`],
//! which is flushed once per frame in layer order.

mod queue;
mod systems;

pub use queue::{colors, Color, DrawCommand, Drawable, RecordingSurface, RenderLayer, RenderQueue, SpriteDraw, Surface, TextDraw, TextureId};
pub use systems::{SpriteRenderSystem, TextRenderSystem};
