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
//! Device input to movement intents

use tracing::debug;

use crate::ecs::components::{Intents, Movement, PlayerInput};
use crate::ecs::{Capability, Frame, System};
use crate::error::Result;
use crate::game::{priority, GameContext};
use crate::platform::input::{InputKind, InputSnapshot};

/// Intents implied by one frame of input
pub fn intents_from(input: &InputSnapshot) -> Intents {
    Intents {
        move_up: input.is_pressed(InputKind::Jump) || input.is_pressed(InputKind::MoveUp),
        move_down: input.is_pressed(InputKind::MoveDown),
        move_left: input.is_pressed(InputKind::MoveLeft),
        move_right: input.is_pressed(InputKind::MoveRight),
        shoot: input.is_pressed(InputKind::Shoot),
    }
}

/// Copies the frame's input into every input-driven entity
#[derive(Debug, Default)]
pub struct InputSystem;

impl System<GameContext> for InputSystem {
    fn name(&self) -> &str {
        "InputSystem"
    }

    fn priority(&self) -> i32 {
        priority::INPUT
    }

    fn capability(&self) -> Capability {
        Capability::new().with::<Movement>().with::<PlayerInput>()
    }

    fn update(&mut self, frame: Frame<'_, GameContext>) -> Result<()> {
        if frame.ctx.input.just_released(InputKind::ToggleCollisionOverlay) {
            frame.ctx.show_colliders = !frame.ctx.show_colliders;
            debug!(show = frame.ctx.show_colliders, "collider overlay toggled");
        }

        let intents = intents_from(&frame.ctx.input);
        for &entity in frame.members {
            let mut movement = frame.world.get_mut::<Movement>(entity)?;
            movement.input = frame.ctx.input.clone();
            movement.intents = intents;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_and_up_both_mean_up() {
        assert!(intents_from(&InputSnapshot::pressed(&[InputKind::Jump])).move_up);
        assert!(intents_from(&InputSnapshot::pressed(&[InputKind::MoveUp])).move_up);

        let intents = intents_from(&InputSnapshot::pressed(&[InputKind::MoveLeft, InputKind::Shoot]));
        assert!(intents.move_left && intents.shoot);
        assert!(!intents.move_up && !intents.move_right);
    }
}
