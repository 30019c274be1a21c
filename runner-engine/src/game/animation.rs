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
//! Frame animation

use std::time::Duration;

use crate::ecs::components::{Animation, Sprite};
use crate::ecs::{Capability, Frame, System};
use crate::error::Result;
use crate::game::priority;

/// Advances animations and points each sprite at the current frame
#[derive(Debug, Default)]
pub struct AnimationSystem;

impl<C> System<C> for AnimationSystem {
    fn name(&self) -> &str {
        "AnimationSystem"
    }

    fn priority(&self) -> i32 {
        priority::ANIMATION
    }

    fn capability(&self) -> Capability {
        Capability::new().with::<Animation>().with::<Sprite>()
    }

    fn update(&mut self, frame: Frame<'_, C>) -> Result<()> {
        let dt = Duration::from_secs_f64(frame.dt.max(0.0));
        for &entity in frame.members {
            let mut anim = frame.world.get_mut::<Animation>(entity)?;
            let mut sprite = frame.world.get_mut::<Sprite>(entity)?;
            anim.advance(dt);
            if sprite.texture != anim.frameset {
                sprite.texture = anim.frameset.clone();
            }
            sprite.frame = anim.current_frame;
        }
        Ok(())
    }
}
