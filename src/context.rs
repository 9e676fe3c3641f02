//! What an entity can reach while it runs.
//!
//! [`FrameServices`] bundles the engine-owned, frame-scoped resources (time,
//! input, audio queue, randomness, collision table). The scene manager wraps
//! them in a [`FrameContext`] for every update and callback, adding the
//! scene's [`Spawner`], its director (the scene tools) and a read-only view
//! of the other live entities.
use arrayvec::ArrayVec;
use log::debug;

use crate::arena::director::ArenaDirector;
use crate::entity::{Entity, EntityId, EntityKind};
use crate::error::EntityFault;
use crate::resources::audio::AudioManager;
use crate::resources::collisiontable::CollisionTable;
use crate::resources::input::{InputState, Key, KeyBindings};
use crate::resources::worldtime::WorldTime;
use crate::scene::SceneDirector;

/// Engine-owned state lent to the scene manager for one frame.
pub struct FrameServices<'a> {
    pub time: &'a WorldTime,
    pub input: &'a InputState,
    pub keys: &'a KeyBindings,
    pub audio: &'a mut AudioManager,
    pub rng: &'a mut fastrand::Rng,
    pub table: &'a CollisionTable,
}

/// Queue of entities created during a frame, plus the scene's id counter.
#[derive(Debug, Default)]
pub struct Spawner {
    next_id: u64,
    pending: Vec<Entity>,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn assign_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    /// Queue `entity` for the live set. It joins at the start of the next
    /// frame, never mid-iteration.
    pub fn add_new_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = self.assign_id();
        entity.core.id = id;
        debug!("queued {:?} #{} '{}'", entity.kind(), id, entity.name());
        self.pending.push(entity);
        id
    }

    pub fn pending(&self) -> &[Entity] {
        &self.pending
    }

    pub(crate) fn take_pending(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.pending)
    }
}

/// Read-only view of the live entities other than the ones being
/// dispatched. Built from at most three disjoint slices.
#[derive(Debug, Clone, Default)]
pub struct Neighbours<'a> {
    parts: ArrayVec<&'a [Entity], 3>,
}

impl<'a> Neighbours<'a> {
    /// Everything except the entity between `before` and `after`.
    pub fn around(before: &'a [Entity], after: &'a [Entity]) -> Self {
        let mut parts = ArrayVec::new();
        parts.push(before);
        parts.push(after);
        Self { parts }
    }

    /// Everything except two entities splitting the list in three.
    pub fn between(head: &'a [Entity], middle: &'a [Entity], tail: &'a [Entity]) -> Self {
        let mut parts = ArrayVec::new();
        parts.push(head);
        parts.push(middle);
        parts.push(tail);
        Self { parts }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> + '_ {
        self.parts.iter().copied().flat_map(|part| part.iter())
    }

    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.parts.iter().map(|p| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle given to entity updates and callbacks.
pub struct FrameContext<'f, 's> {
    services: &'f mut FrameServices<'s>,
    spawner: &'f mut Spawner,
    director: Option<&'f mut SceneDirector>,
    neighbours: Neighbours<'f>,
    caller: (EntityId, EntityKind),
}

impl<'f, 's> FrameContext<'f, 's> {
    pub(crate) fn new(
        services: &'f mut FrameServices<'s>,
        spawner: &'f mut Spawner,
        director: Option<&'f mut SceneDirector>,
        neighbours: Neighbours<'f>,
        caller: (EntityId, EntityKind),
    ) -> Self {
        Self {
            services,
            spawner,
            director,
            neighbours,
            caller,
        }
    }

    /// Switch the entity faults are attributed to.
    pub(crate) fn set_caller(&mut self, caller: &Entity) {
        self.caller = (caller.id(), caller.kind());
    }

    pub fn delta_time(&self) -> f32 {
        self.services.time.delta
    }

    pub fn elapsed(&self) -> f32 {
        self.services.time.elapsed
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.services.input.is_key_pressed(key)
    }

    pub fn is_key_just_pressed(&self, key: Key) -> bool {
        self.services.input.is_key_just_pressed(key)
    }

    pub fn keys(&self) -> &KeyBindings {
        self.services.keys
    }

    pub fn rng(&mut self) -> &mut fastrand::Rng {
        &mut *self.services.rng
    }

    pub fn collision_table(&self) -> &CollisionTable {
        self.services.table
    }

    /// Queue a new entity; see [`Spawner::add_new_entity`].
    pub fn add_new_entity(&mut self, entity: Entity) -> EntityId {
        self.spawner.add_new_entity(entity)
    }

    pub fn play_sound(&mut self, name: &str) {
        self.services.audio.play_sound(name);
    }

    /// Play one of `names` at random. Does nothing for an empty list.
    pub fn play_random_sound(&mut self, names: &[&str]) {
        if names.is_empty() {
            return;
        }
        let pick = self.services.rng.usize(..names.len());
        self.services.audio.play_sound(names[pick]);
    }

    pub fn play_music(&mut self, path: &str) {
        self.services.audio.play_music(path);
    }

    /// Another live entity, by id. The entities being dispatched are not
    /// part of the view.
    pub fn get_entity_by_id(&self, id: EntityId) -> Option<&'f Entity> {
        self.neighbours.get(id)
    }

    pub fn neighbours(&self) -> &Neighbours<'f> {
        &self.neighbours
    }

    /// The arena scene tools, together with the spawner and randomness they
    /// work with.
    ///
    /// Fails when the live scene's camera carries no arena director, which
    /// is a capability fault for the calling entity.
    pub fn scene_tools(&mut self) -> Result<SceneTools<'_>, EntityFault> {
        match self.director.as_deref_mut() {
            Some(SceneDirector::Arena(arena)) => Ok(SceneTools {
                arena,
                spawner: &mut *self.spawner,
                rng: &mut *self.services.rng,
            }),
            _ => Err(EntityFault::MissingCapability {
                entity: self.caller.0,
                kind: self.caller.1,
                capability: "scene tools",
            }),
        }
    }
}

/// Borrowed view of the arena director for one call.
pub struct SceneTools<'a> {
    pub arena: &'a mut ArenaDirector,
    pub spawner: &'a mut Spawner,
    pub rng: &'a mut fastrand::Rng,
}

#[cfg(test)]
pub(crate) mod testing {
    //! Owns everything a [`FrameContext`] borrows, for behaviour tests.
    use super::*;
    use rustc_hash::FxHashMap;

    pub struct Harness {
        pub time: WorldTime,
        pub input: InputState,
        pub keys: KeyBindings,
        pub audio: AudioManager,
        pub rng: fastrand::Rng,
        pub table: CollisionTable,
        pub spawner: Spawner,
        pub director: Option<SceneDirector>,
    }

    impl Harness {
        /// `sounds` are registered and loaded so that playing them is
        /// recorded in the audio queue.
        pub fn new(director: Option<SceneDirector>, sounds: &[&str]) -> Self {
            let table: FxHashMap<String, String> = sounds
                .iter()
                .map(|s| (s.to_string(), format!("{s}.wav")))
                .collect();
            let mut audio = AudioManager::new(table, 5, 10);
            audio.prepare_scene(sounds.iter().copied());
            audio.drain();
            Self {
                time: WorldTime {
                    delta: 0.1,
                    ..WorldTime::default()
                },
                input: InputState::default(),
                keys: KeyBindings::default(),
                audio,
                rng: fastrand::Rng::with_seed(42),
                table: CollisionTable::new(crate::arena::layers::COUNT)
                    .unwrap_or_else(|e| panic!("{e}")),
                spawner: Spawner::new(),
                director,
            }
        }

        /// Harness whose director is an arena built from `rows`.
        pub fn with_arena(rows: &[&str], sounds: &[&str]) -> Self {
            let layout = crate::arena::layout::LevelLayout {
                rows: rows.iter().map(|r| r.to_string()).collect(),
                music: None,
                perk_probability: 100,
                next_scene: None,
                skybox: None,
            };
            let arena = ArenaDirector::new(layout.grid(), 1, None, layout.perk_probability);
            Self::new(Some(SceneDirector::Arena(arena)), sounds)
        }

        pub fn run<R>(
            &mut self,
            caller: (EntityId, EntityKind),
            f: impl FnOnce(&mut FrameContext<'_, '_>) -> R,
        ) -> R {
            let mut services = FrameServices {
                time: &self.time,
                input: &self.input,
                keys: &self.keys,
                audio: &mut self.audio,
                rng: &mut self.rng,
                table: &self.table,
            };
            let mut ctx = FrameContext::new(
                &mut services,
                &mut self.spawner,
                self.director.as_mut(),
                Neighbours::default(),
                caller,
            );
            f(&mut ctx)
        }

        pub fn arena(&self) -> &ArenaDirector {
            match &self.director {
                Some(SceneDirector::Arena(arena)) => arena,
                _ => panic!("harness has no arena director"),
            }
        }

        pub fn arena_mut(&mut self) -> &mut ArenaDirector {
            match &mut self.director {
                Some(SceneDirector::Arena(arena)) => arena,
                _ => panic!("harness has no arena director"),
            }
        }

        pub fn played(&mut self) -> Vec<String> {
            self.audio
                .drain()
                .filter_map(|cmd| match cmd {
                    crate::events::audio::AudioCmd::PlayFx { id } => Some(id),
                    _ => None,
                })
                .collect()
        }
    }
}
