//! The entity model.
//!
//! An [`Entity`] is split in two halves:
//!
//! - [`EntityCore`] holds the state every entity has: identity, transform,
//!   collider, the pending movement delta, the destruction flag and draw data.
//! - [`Actor`] is the closed set of behaviours (player, bomb, enemy, ...)
//!   plus a `Custom` escape hatch. Dispatch is a `match`, not a vtable chain.
//!
//! Entities never own each other. They refer to one another by
//! [`EntityId`] and reach the rest of the scene through the
//! [`FrameContext`] handed to every update and callback.
use std::fmt;

use glam::Vec3;
use log::trace;

use crate::actors::{Actor, Behavior, Damageable, apply_damage};
use crate::components::appearance::Appearance;
use crate::components::collider::Collider;
use crate::components::transform::Transform;
use crate::context::FrameContext;
use crate::error::EntityFault;

/// Identity of an entity inside its scene.
///
/// Ids are assigned monotonically when an entity is added to a scene,
/// starting at 1. Every scene restarts the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Placeholder carried by entities that were not added to a scene yet.
    pub const UNASSIGNED: EntityId = EntityId(0);

    pub fn is_assigned(&self) -> bool {
        *self != Self::UNASSIGNED
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Explicit kind tag, checked before any kind-specific access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Wall,
    Player,
    Bomb,
    Box,
    Explosion,
    Perk,
    Portal,
    Enemy,
    Custom,
}

/// State shared by every entity.
#[derive(Debug, Clone)]
pub struct EntityCore {
    pub id: EntityId,
    pub name: String,
    pub transform: Transform,
    pub collider: Collider,
    /// Movement requested during `update`, consumed by the move pass.
    pub target_movement: Vec3,
    pub need_to_be_destroyed: bool,
    pub appearance: Appearance,
    /// One of these is played when the entity enters the live set.
    pub spawn_sounds: Vec<String>,
}

impl EntityCore {
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn destroy(&mut self) {
        self.need_to_be_destroyed = true;
    }
}

pub struct Entity {
    pub core: EntityCore,
    pub actor: Actor,
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.core.id)
            .field("name", &self.core.name)
            .field("kind", &self.kind())
            .field("position", &self.core.transform.position)
            .finish()
    }
}

impl Entity {
    pub fn new(
        name: impl Into<String>,
        transform: Transform,
        collider: Collider,
        appearance: Appearance,
        actor: Actor,
    ) -> Self {
        Self {
            core: EntityCore {
                id: EntityId::UNASSIGNED,
                name: name.into(),
                transform,
                collider,
                target_movement: Vec3::ZERO,
                need_to_be_destroyed: false,
                appearance,
                spawn_sounds: Vec::new(),
            },
            actor,
        }
    }

    /// Entity driven by a game- or test-defined behaviour.
    pub fn custom(
        name: impl Into<String>,
        position: Vec3,
        collider: Collider,
        behavior: impl Behavior + 'static,
    ) -> Self {
        let name = name.into();
        let appearance = Appearance::new(name.clone());
        Self::new(
            name,
            Transform::at(position),
            collider,
            appearance,
            Actor::Custom(Box::new(behavior)),
        )
    }

    pub fn with_spawn_sounds<I, S>(mut self, sounds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.core.spawn_sounds = sounds.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> EntityId {
        self.core.id
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn kind(&self) -> EntityKind {
        self.actor.kind()
    }

    pub fn position(&self) -> Vec3 {
        self.core.transform.position
    }

    pub fn collider(&self) -> &Collider {
        &self.core.collider
    }

    pub fn target_movement(&self) -> Vec3 {
        self.core.target_movement
    }

    pub fn is_flagged(&self) -> bool {
        self.core.need_to_be_destroyed
    }

    pub fn destroy(&mut self) {
        self.core.destroy();
    }

    pub fn is_damageable(&self) -> bool {
        self.actor.damageable().is_some()
    }

    pub fn damageable(&self) -> Option<&dyn Damageable> {
        self.actor.damageable()
    }

    /// Run this entity's per-frame logic.
    ///
    /// Damageable entities advance their damage cooldown first.
    pub fn update(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        let Entity { core, actor } = self;
        if let Some(target) = actor.damageable_mut() {
            target.health_mut().tick(ctx.delta_time(), &mut core.collider);
        }
        actor.update(core, ctx)
    }

    pub fn on_collision_enter(
        &mut self,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        trace!("#{} collision with #{}", self.core.id, other.core.id);
        let Entity { core, actor } = self;
        actor.on_collision_enter(core, other, ctx)
    }

    pub fn on_trigger_enter(
        &mut self,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        trace!("#{} trigger with #{}", self.core.id, other.core.id);
        let Entity { core, actor } = self;
        actor.on_trigger_enter(core, other, ctx)
    }

    /// Apply one hit through the shared damage flow.
    ///
    /// Returns `Ok(true)` if the hit landed, `Ok(false)` if it was absorbed
    /// (dead or still in the damage cooldown). `sounds` are the damaging
    /// sounds the target may pick from.
    pub fn take_damage(
        &mut self,
        ctx: &mut FrameContext<'_, '_>,
        sounds: &[&str],
    ) -> Result<bool, EntityFault> {
        let kind = self.kind();
        let Entity { core, actor } = self;
        let Some(target) = actor.damageable_mut() else {
            return Err(EntityFault::NotDamageable {
                entity: core.id,
                kind,
            });
        };

        apply_damage(target, core, ctx, sounds)
    }
}
