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
//! Sound effects and music attached to entities

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::ecs::components::Sound;
use crate::ecs::{Capability, Entity, Frame, System, World};
use crate::error::Result;
use crate::game::priority;
use crate::platform::audio::{AudioBackend, AudioPlayer, SoundBank};

/// Opens a player for every active [`Sound`] and retires it when it ends.
///
/// A restart drops the current player so the next one starts from the
/// beginning. Deactivating a sound stops it; reactivating plays it from the
/// start.
pub struct SoundSystem {
    bank: Arc<SoundBank>,
    backend: Arc<dyn AudioBackend>,
    players: HashMap<Entity, Box<dyn AudioPlayer>>,
}

impl SoundSystem {
    /// Sound system playing clips from `bank` through `backend`
    pub fn new(bank: Arc<SoundBank>, backend: Arc<dyn AudioBackend>) -> Self {
        SoundSystem {
            bank,
            backend,
            players: HashMap::new(),
        }
    }

    /// Entities with an open player
    pub fn open_players(&self) -> usize {
        self.players.len()
    }

    fn stop(&mut self, entity: Entity) {
        if let Some(mut player) = self.players.remove(&entity) {
            player.pause();
        }
    }
}

impl fmt::Debug for SoundSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundSystem")
            .field("sounds", &self.bank.len())
            .field("players", &self.players.len())
            .finish()
    }
}

impl<C> System<C> for SoundSystem {
    fn name(&self) -> &str {
        "SoundSystem"
    }

    fn priority(&self) -> i32 {
        priority::SOUND
    }

    fn capability(&self) -> Capability {
        Capability::new().with::<Sound>()
    }

    fn on_entity_removed(&mut self, entity: Entity, _world: &World, _ctx: &mut C) -> Result<()> {
        self.stop(entity);
        Ok(())
    }

    fn update(&mut self, frame: Frame<'_, C>) -> Result<()> {
        let dt = Duration::from_secs_f64(frame.dt.max(0.0));
        for &entity in frame.members {
            let mut sound = frame.world.get_mut::<Sound>(entity)?;
            if sound.restart {
                self.stop(entity);
                sound.restart = false;
            }
            if !sound.active {
                self.stop(entity);
                continue;
            }

            let player = match self.players.entry(entity) {
                Entry::Occupied(open) => open.into_mut(),
                Entry::Vacant(slot) => {
                    let Some(stream) = self.bank.get(&sound.clip) else {
                        debug!(%entity, clip = %sound.clip, "no such sound");
                        sound.active = false;
                        continue;
                    };
                    let mut player = self.backend.open(stream, sound.playback);
                    player.play();
                    trace!(%entity, clip = %sound.clip, "sound started");
                    slot.insert(player)
                }
            };

            player.advance(dt);
            if !player.is_playing() {
                sound.active = false;
                self.players.remove(&entity);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Commands, EntityBuilder, Scheduler};
    use crate::platform::audio::{HeadlessAudioBackend, PcmStream, Playback};
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Headless backend that counts opened players
    #[derive(Debug, Default)]
    struct CountingBackend {
        opened: AtomicUsize,
    }

    impl AudioBackend for CountingBackend {
        fn open(&self, stream: &PcmStream, playback: Playback) -> Box<dyn AudioPlayer> {
            self.opened.fetch_add(1, Ordering::Relaxed);
            HeadlessAudioBackend.open(stream, playback)
        }
    }

    fn bank() -> Arc<SoundBank> {
        // 100 mono samples per second
        Arc::new(
            SoundBank::new()
                .with("blip", PcmStream::new(100, 1, vec![0i16; 10]))
                .with("music", PcmStream::new(100, 1, vec![0i16; 50])),
        )
    }

    fn setup() -> (World, Scheduler<()>, Arc<CountingBackend>) {
        let backend = Arc::new(CountingBackend::default());
        let mut scheduler = Scheduler::new();
        scheduler.add_system(SoundSystem::new(bank(), Arc::clone(&backend) as Arc<dyn AudioBackend>));
        (World::new(), scheduler, backend)
    }

    #[test]
    fn test_one_shot_deactivates_when_done() {
        let (mut world, mut scheduler, backend) = setup();
        let mut sound = Sound::new("blip", Playback::Once);
        sound.trigger("blip");
        let entity = EntityBuilder::new().with(sound).build(&mut world).unwrap();

        scheduler.update(&mut world, &mut (), 0.05).unwrap();
        assert!(world.get::<Sound>(entity).unwrap().active);
        assert!(!world.get::<Sound>(entity).unwrap().restart);

        scheduler.update(&mut world, &mut (), 0.06).unwrap();
        assert!(!world.get::<Sound>(entity).unwrap().active);
        assert_eq!(backend.opened.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_music_loops_past_its_length() {
        let (mut world, mut scheduler, _) = setup();
        let entity = EntityBuilder::new()
            .with(Sound::music("music", Duration::from_millis(100)))
            .build(&mut world)
            .unwrap();

        for _ in 0..20 {
            scheduler.update(&mut world, &mut (), 0.1).unwrap();
        }
        assert!(world.get::<Sound>(entity).unwrap().active);
    }

    #[test]
    fn test_restart_opens_a_new_player() {
        let (mut world, mut scheduler, backend) = setup();
        let entity = EntityBuilder::new()
            .with(Sound::music("music", Duration::ZERO))
            .build(&mut world)
            .unwrap();
        scheduler.update(&mut world, &mut (), 0.016).unwrap();
        scheduler.update(&mut world, &mut (), 0.016).unwrap();
        assert_eq!(backend.opened.load(Ordering::Relaxed), 1);

        world.get_mut::<Sound>(entity).unwrap().trigger("blip");
        scheduler.update(&mut world, &mut (), 0.016).unwrap();
        assert_eq!(backend.opened.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_unknown_clip_is_dropped() {
        let (mut world, mut scheduler, backend) = setup();
        let entity = EntityBuilder::new()
            .with(Sound::music("missing", Duration::ZERO))
            .build(&mut world)
            .unwrap();

        scheduler.update(&mut world, &mut (), 0.016).unwrap();
        assert!(!world.get::<Sound>(entity).unwrap().active);
        assert_eq!(backend.opened.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_removal_closes_the_player() {
        let mut world = World::new();
        let entity = EntityBuilder::new()
            .with(Sound::music("music", Duration::ZERO))
            .build(&mut world)
            .unwrap();
        let mut system = SoundSystem::new(bank(), Arc::new(HeadlessAudioBackend));
        let members = BTreeSet::from([entity]);
        let mut commands = Commands::new();

        System::<()>::update(
            &mut system,
            Frame {
                world: &world,
                members: &members,
                commands: &mut commands,
                ctx: &mut (),
                dt: 0.016,
            },
        )
        .unwrap();
        assert_eq!(system.open_players(), 1);

        System::<()>::on_entity_removed(&mut system, entity, &world, &mut ()).unwrap();
        assert_eq!(system.open_players(), 0);
    }
}
