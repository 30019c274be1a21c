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
//! Procedural ground generation
//!
//! Buildings are laid out left to right from the scroll frontier until the
//! world width is covered. Every gap is drawn from
//! `[min_gap, min_gap + gap_jitter]`, which configuration keeps within
//! `jumpable_gap`, so the level is always traversable.

use glam::DVec2;
use rand::Rng;

use crate::config::LevelConfig;
use crate::ecs::components::Tag;
use crate::error::{EngineError, Result};
use crate::game::entities::{ENEMY_SIZE, TOKEN_SIZE};
use crate::math::Rect;

/// Building width range, in tiles
const BLOCK_WIDTH_TILES: std::ops::RangeInclusive<u32> = 5..=9;
/// Building height range, in tiles
const BLOCK_HEIGHT_TILES: std::ops::RangeInclusive<u32> = 5..=10;
/// Height above the roof at which tokens float
const TOKEN_HOVER: f64 = 120.0;

/// Pickup placed above a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenPlan {
    /// `JumpToken` or `SpeedToken`
    pub tag: Tag,
    /// Top-left corner
    pub position: DVec2,
}

/// One generated building and what stands on it
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPlan {
    /// Building bounds; the bottom touches the world floor
    pub rect: Rect,
    /// Enemy spawn position on the roof
    pub enemy: Option<DVec2>,
    /// Token above the roof
    pub token: Option<TokenPlan>,
}

/// Lays out ground blocks
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGenerator {
    tile_size: f64,
    min_gap: f64,
    gap_jitter: f64,
    enemy_chance: f64,
    token_chance: f64,
}

impl LevelGenerator {
    /// Generator for `config`; rejects layouts that could be untraversable
    pub fn new(config: &LevelConfig) -> Result<Self> {
        if config.tile_size <= 0.0 || config.min_gap <= 0.0 || config.gap_jitter < 0.0 {
            return Err(EngineError::InvalidConfig(
                "level tile size and gaps must be positive".into(),
            ));
        }
        if config.min_gap + config.gap_jitter > config.jumpable_gap {
            return Err(EngineError::InvalidConfig(format!(
                "min_gap + gap_jitter ({}) exceeds jumpable_gap ({})",
                config.min_gap + config.gap_jitter,
                config.jumpable_gap
            )));
        }
        for chance in [config.enemy_chance, config.token_chance] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(EngineError::InvalidConfig(format!(
                    "spawn chance {} is outside 0..=1",
                    chance
                )));
            }
        }
        Ok(LevelGenerator {
            tile_size: config.tile_size,
            min_gap: config.min_gap,
            gap_jitter: config.gap_jitter,
            enemy_chance: config.enemy_chance,
            token_chance: config.token_chance,
        })
    }

    /// Largest gap this generator can produce
    pub fn max_gap(&self) -> f64 {
        self.min_gap + self.gap_jitter
    }

    /// Plan blocks from `frontier` until `width` is covered.
    ///
    /// Returns the plans and the new frontier, which sits one gap past the
    /// last block.
    pub fn plan_blocks<R: Rng + ?Sized>(
        &self,
        frontier: f64,
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> (Vec<BlockPlan>, f64) {
        let mut plans = Vec::new();
        let mut x = frontier;

        while x < width {
            let size = DVec2::new(
                f64::from(rng.gen_range(BLOCK_WIDTH_TILES)) * self.tile_size,
                f64::from(rng.gen_range(BLOCK_HEIGHT_TILES)) * self.tile_size,
            );
            let rect = Rect::from_vectors(DVec2::new(x, height - size.y), size);
            let roof_center = rect.left() + size.x / 2.0;

            let enemy = rng
                .gen_bool(self.enemy_chance)
                .then(|| DVec2::new(roof_center - ENEMY_SIZE.x / 2.0, rect.top() - ENEMY_SIZE.y));
            let token = rng.gen_bool(self.token_chance).then(|| TokenPlan {
                tag: if rng.gen_bool(0.5) {
                    Tag::JumpToken
                } else {
                    Tag::SpeedToken
                },
                position: DVec2::new(
                    roof_center - TOKEN_SIZE.x / 2.0,
                    rect.top() - TOKEN_HOVER - TOKEN_SIZE.y,
                ),
            });

            plans.push(BlockPlan { rect, enemy, token });
            x += size.x + self.min_gap + rng.gen_range(0.0..=self.gap_jitter);
        }

        (plans, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_untraversable_gaps() {
        let config = LevelConfig {
            min_gap: 120.0,
            gap_jitter: 40.0,
            jumpable_gap: 150.0,
            ..LevelConfig::default()
        };
        assert!(matches!(LevelGenerator::new(&config), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_blocks_rest_on_floor_and_cover_width() {
        let generator = LevelGenerator::new(&LevelConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let (plans, frontier) = generator.plan_blocks(0.0, 1920.0, 1080.0, &mut rng);

        assert!(!plans.is_empty());
        assert_eq!(plans[0].rect.left(), 0.0);
        for plan in &plans {
            assert_eq!(plan.rect.bottom(), 1080.0);
            assert!(plan.rect.size.x >= 5.0 * 32.0 && plan.rect.size.x <= 9.0 * 32.0);
            assert!(plan.rect.size.y >= 5.0 * 32.0 && plan.rect.size.y <= 10.0 * 32.0);
        }
        assert!(frontier >= 1920.0);
        assert!(plans.last().unwrap().rect.left() < 1920.0);
    }

    #[test]
    fn test_nothing_planned_past_width() {
        let generator = LevelGenerator::new(&LevelConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let (plans, frontier) = generator.plan_blocks(2000.0, 1920.0, 1080.0, &mut rng);
        assert!(plans.is_empty());
        assert_eq!(frontier, 2000.0);
    }

    #[test]
    fn test_certain_spawns_sit_on_roof() {
        let config = LevelConfig {
            enemy_chance: 1.0,
            token_chance: 1.0,
            ..LevelConfig::default()
        };
        let generator = LevelGenerator::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let (plans, _) = generator.plan_blocks(0.0, 500.0, 1080.0, &mut rng);

        for plan in plans {
            let enemy = plan.enemy.unwrap();
            assert_eq!(enemy.y + ENEMY_SIZE.y, plan.rect.top());
            let token = plan.token.unwrap();
            assert!(matches!(token.tag, Tag::JumpToken | Tag::SpeedToken));
            assert!(token.position.y < plan.rect.top());
        }
    }
}
