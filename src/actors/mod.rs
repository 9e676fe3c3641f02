//! Actor behaviours.
//!
//! Every entity carries one [`Actor`]. The variant doubles as the entity's
//! kind tag; behaviour is reached through the [`Behavior`] capability set
//! and, for actors that can be hurt, [`Damageable`].
//!
//! Submodules:
//! - [`player`] – keyboard-driven bomber
//! - [`bomb`] – fused bomb that can be kicked
//! - [`boxblock`] – destructible box that may hide a perk or the portal
//! - [`explosion`] – short-lived damaging trigger
//! - [`perk`] – pick-up boosting the player
//! - [`portal`] – level exit
//! - [`enemy`] – chasing and wandering enemies
pub mod bomb;
pub mod boxblock;
pub mod enemy;
pub mod explosion;
pub mod perk;
pub mod player;
pub mod portal;

use log::trace;

use crate::components::health::Health;
use crate::context::FrameContext;
use crate::entity::{Entity, EntityCore, EntityKind};
use crate::error::EntityFault;

pub use bomb::Bomb;
pub use boxblock::BoxBlock;
pub use enemy::{Enemy, EnemyMode};
pub use explosion::Explosion;
pub use perk::{Perk, PerkKind};
pub use player::Player;
pub use portal::Portal;

/// Capabilities an actor may implement. Every method defaults to a no-op.
///
/// Faults are returned, not panicked: the scene manager logs them and skips
/// the rest of that behaviour for the frame.
pub trait Behavior: Send {
    fn update(
        &mut self,
        _core: &mut EntityCore,
        _ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        Ok(())
    }

    /// A blocking collider was hit during a move step.
    fn on_collision_enter(
        &mut self,
        _core: &mut EntityCore,
        _other: &mut Entity,
        _ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        Ok(())
    }

    /// A non-blocking overlap was reported during a move step or on spawn.
    fn on_trigger_enter(
        &mut self,
        _core: &mut EntityCore,
        _other: &mut Entity,
        _ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        Ok(())
    }

    fn damageable(&self) -> Option<&dyn Damageable> {
        None
    }

    fn damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        None
    }
}

/// Actors with hit points.
///
/// The damage flow itself lives in [`apply_damage`]: it checks
/// [`Health::can_take_damage`], applies the hit, calls
/// [`Damageable::on_take_damage`] and, on the killing hit only,
/// [`Damageable::on_death`].
pub trait Damageable {
    fn health(&self) -> &Health;

    fn health_mut(&mut self) -> &mut Health;

    fn on_take_damage(
        &mut self,
        _core: &mut EntityCore,
        _ctx: &mut FrameContext<'_, '_>,
        _sounds: &[&str],
    ) -> Result<(), EntityFault> {
        Ok(())
    }

    fn on_death(
        &mut self,
        core: &mut EntityCore,
        _ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        core.destroy();
        Ok(())
    }
}

/// The shared damage flow.
///
/// Returns `Ok(true)` if the hit landed, `Ok(false)` if it was absorbed
/// (dead or still in the damage cooldown). [`Damageable::on_death`] fires
/// on the killing hit only.
pub fn apply_damage(
    target: &mut dyn Damageable,
    core: &mut EntityCore,
    ctx: &mut FrameContext<'_, '_>,
    sounds: &[&str],
) -> Result<bool, EntityFault> {
    let died = {
        let health = target.health_mut();
        if !health.can_take_damage() {
            return Ok(false);
        }
        health.apply_hit(&mut core.collider);
        health.hp() == 0 && health.kill()
    };
    target.on_take_damage(core, ctx, sounds)?;
    if died {
        trace!("#{} died", core.id);
        target.on_death(core, ctx)?;
    }
    Ok(true)
}

/// Closed set of actor variants. `Custom` hosts behaviours defined outside
/// this crate's game.
pub enum Actor {
    /// Static obstacle with no behaviour.
    Wall,
    Player(Player),
    Bomb(Bomb),
    Box(BoxBlock),
    Explosion(Explosion),
    Perk(Perk),
    Portal(Portal),
    Enemy(Enemy),
    Custom(Box<dyn Behavior>),
}

impl Actor {
    pub fn kind(&self) -> EntityKind {
        match self {
            Actor::Wall => EntityKind::Wall,
            Actor::Player(_) => EntityKind::Player,
            Actor::Bomb(_) => EntityKind::Bomb,
            Actor::Box(_) => EntityKind::Box,
            Actor::Explosion(_) => EntityKind::Explosion,
            Actor::Perk(_) => EntityKind::Perk,
            Actor::Portal(_) => EntityKind::Portal,
            Actor::Enemy(_) => EntityKind::Enemy,
            Actor::Custom(_) => EntityKind::Custom,
        }
    }

    fn behavior(&self) -> Option<&dyn Behavior> {
        match self {
            Actor::Wall => None,
            Actor::Player(a) => Some(a),
            Actor::Bomb(a) => Some(a),
            Actor::Box(a) => Some(a),
            Actor::Explosion(a) => Some(a),
            Actor::Perk(a) => Some(a),
            Actor::Portal(a) => Some(a),
            Actor::Enemy(a) => Some(a),
            Actor::Custom(a) => Some(a.as_ref()),
        }
    }

    fn behavior_mut(&mut self) -> Option<&mut dyn Behavior> {
        match self {
            Actor::Wall => None,
            Actor::Player(a) => Some(a),
            Actor::Bomb(a) => Some(a),
            Actor::Box(a) => Some(a),
            Actor::Explosion(a) => Some(a),
            Actor::Perk(a) => Some(a),
            Actor::Portal(a) => Some(a),
            Actor::Enemy(a) => Some(a),
            Actor::Custom(a) => Some(a.as_mut()),
        }
    }

    pub fn update(
        &mut self,
        core: &mut EntityCore,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        match self.behavior_mut() {
            Some(behavior) => behavior.update(core, ctx),
            None => Ok(()),
        }
    }

    pub fn on_collision_enter(
        &mut self,
        core: &mut EntityCore,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        match self.behavior_mut() {
            Some(behavior) => behavior.on_collision_enter(core, other, ctx),
            None => Ok(()),
        }
    }

    pub fn on_trigger_enter(
        &mut self,
        core: &mut EntityCore,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        match self.behavior_mut() {
            Some(behavior) => behavior.on_trigger_enter(core, other, ctx),
            None => Ok(()),
        }
    }

    pub fn damageable(&self) -> Option<&dyn Damageable> {
        self.behavior().and_then(|b| b.damageable())
    }

    pub fn damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        self.behavior_mut().and_then(|b| b.damageable_mut())
    }
}
