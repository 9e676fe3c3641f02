//! Per-frame entity lifecycle of the live scene.
//!
//! [`SceneManager::run_frame`] runs the phases in a fixed order:
//!
//! 1. **Promote** – entities queued through the spawner during the previous
//!    frame join the live list, unless one of their layers is out of range. One of their spawn sounds plays. Blocking
//!    pairs they already overlap go into the initial collision map; trigger
//!    pairs they overlap fire `on_trigger_enter` on both sides, newcomer
//!    first.
//! 2. **Direct** – the scene director (if any) looks at the frame.
//! 3. **Update** – every live entity not flagged for destruction runs its
//!    update, in list order.
//! 4. **Move** – every entity with a pending movement is resolved against
//!    the others, moved, and the contacts of that step are dispatched to
//!    both participants, mover first.
//! 5. **Sweep** – flagged entities are removed in one pass.
//!
//! Faults returned by behaviours are logged and only skip the behaviour
//! that raised them.
use glam::Vec3;
use log::{debug, trace, warn};
use rustc_hash::FxHashSet;

use crate::context::{FrameContext, FrameServices, Neighbours};
use crate::entity::Entity;
use crate::error::EntityFault;
use crate::events::collision::{Contact, ContactKind};
use crate::events::scene::SceneRequest;
use crate::scene::{Scene, check_layers};
use crate::systems::collision::{do_collide, is_blocking_pair, resolve_movement};

pub struct SceneManager {
    scene: Scene,
    contacts: Vec<Contact>,
}

impl SceneManager {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            contacts: Vec::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn entities(&self) -> &[Entity] {
        &self.scene.entities
    }

    /// Make `scene` live and hand back the one it replaces.
    pub fn replace_scene(&mut self, scene: Scene) -> Scene {
        self.contacts.clear();
        std::mem::replace(&mut self.scene, scene)
    }

    /// Contacts dispatched during the last frame, in dispatch order.
    pub fn last_contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Scene request raised by the director during the last frame.
    pub fn take_request(&mut self) -> Option<SceneRequest> {
        self.scene.camera.director.as_mut()?.take_request()
    }

    pub fn run_frame(&mut self, services: &mut FrameServices<'_>) {
        self.contacts.clear();
        self.promote_pending(services);

        let Scene {
            camera, entities, ..
        } = &mut self.scene;
        if let Some(director) = camera.director.as_mut() {
            director.begin_frame(entities, services.input, services.time.delta);
        }

        self.update_entities(services);
        self.move_entities(services);
        self.sweep();
    }

    fn promote_pending(&mut self, services: &mut FrameServices<'_>) {
        let pending = self.scene.spawner.take_pending();
        for entity in pending {
            if let Err(err) = check_layers(&entity, services.table.layer_count()) {
                warn!("dropping spawned entity: {}", err);
                continue;
            }
            if !entity.core.spawn_sounds.is_empty() {
                let pick = services.rng.usize(..entity.core.spawn_sounds.len());
                services.audio.play_sound(&entity.core.spawn_sounds[pick]);
            }
            trace!("promoted {:?} #{}", entity.kind(), entity.id());
            self.scene.entities.push(entity);

            let newcomer = self.scene.entities.len() - 1;
            for other in 0..newcomer {
                let entities = &self.scene.entities;
                let (a, b) = (&entities[newcomer], &entities[other]);
                if a.is_flagged()
                    || b.is_flagged()
                    || !do_collide(a.collider(), a.position(), b.collider(), b.position())
                {
                    continue;
                }
                if is_blocking_pair(a.collider(), b.collider(), services.table) {
                    let (a, b) = (a.id(), b.id());
                    self.scene.initial_collisions.insert(a, b);
                } else {
                    self.dispatch(services, newcomer, other, ContactKind::Trigger);
                }
            }
        }
    }

    fn update_entities(&mut self, services: &mut FrameServices<'_>) {
        let Scene {
            camera,
            entities,
            spawner,
            ..
        } = &mut self.scene;
        for i in 0..entities.len() {
            let (before, rest) = entities.split_at_mut(i);
            let Some((entity, after)) = rest.split_first_mut() else {
                break;
            };
            if entity.is_flagged() {
                continue;
            }
            let mut ctx = FrameContext::new(
                services,
                spawner,
                camera.director.as_mut(),
                Neighbours::around(before, after),
                (entity.id(), entity.kind()),
            );
            if let Err(fault) = entity.update(&mut ctx) {
                report(&fault, "update");
            }
        }
    }

    fn move_entities(&mut self, services: &mut FrameServices<'_>) {
        for i in 0..self.scene.entities.len() {
            let entity = &self.scene.entities[i];
            let movement = entity.target_movement();
            if entity.is_flagged() || movement == Vec3::ZERO {
                continue;
            }
            let resolution = resolve_movement(
                &self.scene.entities,
                i,
                movement,
                services.table,
                &self.scene.initial_collisions,
            );

            let entity = &mut self.scene.entities[i];
            entity.core.transform.translate(resolution.movement);
            entity.core.target_movement = Vec3::ZERO;
            self.scene
                .initial_collisions
                .prune_separated(&self.scene.entities, i);

            for &other in &resolution.collided {
                self.dispatch(services, i, other, ContactKind::Collision);
            }
            for &other in &resolution.triggered {
                self.dispatch(services, i, other, ContactKind::Trigger);
            }
        }
    }

    /// Fire the callbacks of one contact on both sides, `first` first.
    fn dispatch(&mut self, services: &mut FrameServices<'_>, first: usize, second: usize, kind: ContactKind) {
        let Scene {
            camera,
            entities,
            spawner,
            ..
        } = &mut self.scene;
        let (lo, hi) = (first.min(second), first.max(second));
        if lo == hi || hi >= entities.len() {
            return;
        }
        let (head, rest) = entities.split_at_mut(lo);
        let (lo_entity, rest) = rest.split_at_mut(1);
        let (middle, rest) = rest.split_at_mut(hi - lo - 1);
        let (hi_entity, tail) = rest.split_at_mut(1);
        let (a, b) = if first < second {
            (&mut lo_entity[0], &mut hi_entity[0])
        } else {
            (&mut hi_entity[0], &mut lo_entity[0])
        };

        let mut ctx = FrameContext::new(
            services,
            spawner,
            camera.director.as_mut(),
            Neighbours::between(head, middle, tail),
            (a.id(), a.kind()),
        );
        let result = match kind {
            ContactKind::Collision => a.on_collision_enter(b, &mut ctx),
            ContactKind::Trigger => a.on_trigger_enter(b, &mut ctx),
        };
        if let Err(fault) = result {
            report(&fault, "contact");
        }

        ctx.set_caller(b);
        let result = match kind {
            ContactKind::Collision => b.on_collision_enter(a, &mut ctx),
            ContactKind::Trigger => b.on_trigger_enter(a, &mut ctx),
        };
        if let Err(fault) = result {
            report(&fault, "contact");
        }

        trace!("{:?} #{} -> #{}", kind, a.id(), b.id());
        self.contacts.push(Contact {
            a: a.id(),
            b: b.id(),
            kind,
        });
    }

    fn sweep(&mut self) {
        let mut removed = FxHashSet::default();
        self.scene.entities.retain(|entity| {
            if entity.is_flagged() {
                debug!("destroyed {:?} #{}", entity.kind(), entity.id());
                removed.insert(entity.id());
                false
            } else {
                true
            }
        });
        self.scene.initial_collisions.remove_entities(&removed);
    }
}

fn report(fault: &EntityFault, phase: &str) {
    warn!("{} skipped: {}", phase, fault);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::actors::Behavior;
    use crate::components::collider::Collider;
    use crate::entity::{EntityCore, EntityId};
    use crate::resources::audio::AudioManager;
    use crate::resources::collisiontable::CollisionTable;
    use crate::resources::input::{InputState, KeyBindings};
    use crate::resources::worldtime::WorldTime;

    type Journal = Arc<Mutex<Vec<String>>>;

    struct World {
        time: WorldTime,
        input: InputState,
        keys: KeyBindings,
        audio: AudioManager,
        rng: fastrand::Rng,
        table: CollisionTable,
    }

    impl World {
        fn new() -> Self {
            Self {
                time: WorldTime {
                    delta: 0.1,
                    ..WorldTime::default()
                },
                input: InputState::default(),
                keys: KeyBindings::default(),
                audio: AudioManager::new(Default::default(), 5, 5),
                rng: fastrand::Rng::with_seed(1),
                table: CollisionTable::new(2).unwrap(),
            }
        }

        fn frame(&mut self, manager: &mut SceneManager) {
            let mut services = FrameServices {
                time: &self.time,
                input: &self.input,
                keys: &self.keys,
                audio: &mut self.audio,
                rng: &mut self.rng,
                table: &self.table,
            };
            manager.run_frame(&mut services);
        }
    }

    /// Moves by `velocity` every frame and journals every callback.
    struct Recorder {
        label: &'static str,
        velocity: Vec3,
        journal: Journal,
        spawn_once: Option<Entity>,
        destroy_on_contact: bool,
    }

    impl Recorder {
        fn new(label: &'static str, journal: &Journal) -> Self {
            Self {
                label,
                velocity: Vec3::ZERO,
                journal: journal.clone(),
                spawn_once: None,
                destroy_on_contact: false,
            }
        }

        fn moving(mut self, velocity: Vec3) -> Self {
            self.velocity = velocity;
            self
        }

        fn log(&self, line: String) {
            self.journal.lock().unwrap().push(line);
        }
    }

    impl Behavior for Recorder {
        fn update(&mut self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
            self.log(format!("update {}", self.label));
            core.target_movement = self.velocity * ctx.delta_time();
            if let Some(child) = self.spawn_once.take() {
                ctx.add_new_entity(child);
            }
            Ok(())
        }

        fn on_collision_enter(
            &mut self,
            core: &mut EntityCore,
            other: &mut Entity,
            _ctx: &mut FrameContext<'_, '_>,
        ) -> Result<(), EntityFault> {
            self.log(format!("collision {} {}", self.label, other.name()));
            if self.destroy_on_contact {
                core.destroy();
            }
            Ok(())
        }

        fn on_trigger_enter(
            &mut self,
            _core: &mut EntityCore,
            other: &mut Entity,
            _ctx: &mut FrameContext<'_, '_>,
        ) -> Result<(), EntityFault> {
            self.log(format!("trigger {} {}", self.label, other.name()));
            Ok(())
        }
    }

    /// Always asks for scene tools that a bare scene does not have.
    struct NeedsTools;

    impl Behavior for NeedsTools {
        fn update(&mut self, _core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
            ctx.scene_tools()?;
            Ok(())
        }
    }

    fn square(layer: usize) -> Collider {
        Collider::rectangle(layer, 1.0, 1.0)
    }

    fn take(journal: &Journal) -> Vec<String> {
        std::mem::take(&mut *journal.lock().unwrap())
    }

    #[test]
    fn test_contacts_fire_on_both_sides_mover_first() {
        let journal = Journal::default();
        let mut scene = Scene::new(1, "test");
        scene.spawn(Entity::custom(
            "a",
            Vec3::ZERO,
            square(0),
            Recorder::new("a", &journal).moving(Vec3::new(10.0, 0.0, 0.0)),
        ));
        scene.spawn(Entity::custom("b", Vec3::new(1.5, 0.0, 0.0), square(0), Recorder::new("b", &journal)));
        let mut manager = SceneManager::new(scene);
        let mut world = World::new();

        world.frame(&mut manager);
        assert_eq!(
            take(&journal),
            vec!["update a", "update b", "collision a b", "collision b a"]
        );
        assert_eq!(manager.entities()[0].position(), Vec3::ZERO);
        assert_eq!(
            manager.last_contacts(),
            &[Contact {
                a: EntityId(1),
                b: EntityId(2),
                kind: ContactKind::Collision
            }]
        );

        // Still pushing: the contact is reported again.
        world.frame(&mut manager);
        assert_eq!(manager.last_contacts().len(), 1);
    }

    #[test]
    fn test_triggers_never_block() {
        let journal = Journal::default();
        let mut scene = Scene::new(1, "test");
        scene.spawn(Entity::custom(
            "a",
            Vec3::ZERO,
            square(0),
            Recorder::new("a", &journal).moving(Vec3::new(10.0, 0.0, 0.0)),
        ));
        scene.spawn(Entity::custom(
            "t",
            Vec3::new(1.5, 0.0, 0.0),
            square(0).as_trigger(),
            Recorder::new("t", &journal),
        ));
        let mut manager = SceneManager::new(scene);
        World::new().frame(&mut manager);

        assert_eq!(manager.entities()[0].position(), Vec3::new(1.0, 0.0, 0.0));
        let log = take(&journal);
        assert_eq!(&log[2..], &["trigger a t", "trigger t a"]);
    }

    #[test]
    fn test_spawned_entities_join_next_frame() {
        let journal = Journal::default();
        let mut parent = Recorder::new("parent", &journal);
        parent.spawn_once = Some(Entity::custom(
            "child",
            Vec3::new(10.0, 0.0, 0.0),
            square(0),
            Recorder::new("child", &journal),
        ));
        let mut scene = Scene::new(1, "test");
        scene.spawn(Entity::custom("parent", Vec3::ZERO, square(0), parent));
        let mut manager = SceneManager::new(scene);
        let mut world = World::new();

        world.frame(&mut manager);
        assert_eq!(take(&journal), vec!["update parent"]);
        assert_eq!(manager.entities().len(), 1);
        assert_eq!(manager.scene().spawner.pending().len(), 1);

        world.frame(&mut manager);
        assert_eq!(take(&journal), vec!["update parent", "update child"]);
        assert_eq!(manager.entities()[1].id(), EntityId(2));
    }

    #[test]
    fn test_spawn_with_unknown_layer_is_dropped() {
        let journal = Journal::default();
        let mut parent = Recorder::new("parent", &journal);
        parent.spawn_once = Some(Entity::custom(
            "stray",
            Vec3::new(0.5, 0.0, 0.0),
            square(9),
            Recorder::new("stray", &journal).moving(Vec3::new(-10.0, 0.0, 0.0)),
        ));
        let mut scene = Scene::new(1, "test");
        scene.spawn(Entity::custom("parent", Vec3::ZERO, square(0), parent));
        let mut manager = SceneManager::new(scene);
        let mut world = World::new();

        world.frame(&mut manager);
        world.frame(&mut manager);
        assert_eq!(manager.entities().len(), 1);
        assert!(manager.scene().spawner.pending().is_empty());
        assert_eq!(take(&journal), vec!["update parent", "update parent"]);
    }

    #[test]
    fn test_promotion_records_overlaps_and_fires_triggers() {
        let journal = Journal::default();
        let mut parent = Recorder::new("parent", &journal);
        parent.spawn_once = Some(Entity::custom(
            "zone",
            Vec3::ZERO,
            square(0).as_trigger(),
            Recorder::new("zone", &journal),
        ));
        let mut scene = Scene::new(1, "test");
        scene.spawn(Entity::custom("parent", Vec3::ZERO, square(0), parent));
        scene.spawner.add_new_entity(Entity::custom(
            "block",
            Vec3::new(0.5, 0.0, 0.0),
            square(0),
            Recorder::new("block", &journal),
        ));
        let mut manager = SceneManager::new(scene);
        let mut world = World::new();

        world.frame(&mut manager);
        assert!(manager.scene().initial_collisions.contains(EntityId(1), EntityId(2)));
        take(&journal);

        world.frame(&mut manager);
        let log = take(&journal);
        assert_eq!(&log[..2], &["trigger zone parent", "trigger parent zone"]);
        assert_eq!(&log[2..4], &["trigger zone block", "trigger block zone"]);
    }

    #[test]
    fn test_overlapping_pair_can_separate() {
        let journal = Journal::default();
        let mut scene = Scene::new(1, "test");
        scene.spawn(Entity::custom(
            "a",
            Vec3::ZERO,
            square(0),
            Recorder::new("a", &journal).moving(Vec3::new(-5.0, 0.0, 0.0)),
        ));
        scene.spawn(Entity::custom("b", Vec3::new(0.5, 0.0, 0.0), square(0), Recorder::new("b", &journal)));
        let table = CollisionTable::new(2).unwrap();
        scene.prepare(&table).unwrap();
        let mut manager = SceneManager::new(scene);
        let mut world = World::new();

        world.frame(&mut manager);
        assert_eq!(manager.entities()[0].position(), Vec3::new(-0.5, 0.0, 0.0));
        assert!(manager.scene().initial_collisions.is_empty());
        assert!(manager.last_contacts().is_empty());
    }

    #[test]
    fn test_destroyed_entities_are_swept_after_callbacks() {
        let journal = Journal::default();
        let mut victim = Recorder::new("b", &journal);
        victim.destroy_on_contact = true;
        let mut scene = Scene::new(1, "test");
        scene.spawn(Entity::custom(
            "a",
            Vec3::ZERO,
            square(0),
            Recorder::new("a", &journal).moving(Vec3::new(10.0, 0.0, 0.0)),
        ));
        scene.spawn(Entity::custom("b", Vec3::new(1.5, 0.0, 0.0), square(0), victim));
        let mut manager = SceneManager::new(scene);
        World::new().frame(&mut manager);

        assert_eq!(take(&journal).last().map(String::as_str), Some("collision b a"));
        assert_eq!(manager.entities().len(), 1);
        assert_eq!(manager.entities()[0].name(), "a");
    }

    #[test]
    fn test_fault_skips_only_the_faulting_entity() {
        let journal = Journal::default();
        let mut scene = Scene::new(1, "test");
        scene.spawn(Entity::custom("needy", Vec3::new(5.0, 0.0, 0.0), square(1), NeedsTools));
        scene.spawn(Entity::custom("b", Vec3::ZERO, square(0), Recorder::new("b", &journal)));
        let mut manager = SceneManager::new(scene);
        World::new().frame(&mut manager);
        assert_eq!(take(&journal), vec!["update b"]);
        assert_eq!(manager.entities().len(), 2);
    }
}
