//! Fused bomb.
//!
//! A resting bomb burns its fuse and, when it runs out, damages itself. Its
//! death fills the surrounding cross with explosions. A kicked bomb slides
//! instead and blows up on the first thing it runs into other than the
//! entity that pushed it.
use glam::Vec3;

use crate::actors::{Actor, Behavior, Damageable, apply_damage};
use crate::arena::layers;
use crate::components::appearance::Appearance;
use crate::components::collider::Collider;
use crate::components::health::Health;
use crate::components::transform::Transform;
use crate::context::FrameContext;
use crate::entity::{Entity, EntityCore, EntityId};
use crate::error::EntityFault;

pub const BOMB_SIZE: f32 = 0.8;
pub const SLIDE_SPEED: f32 = 7.0;

/// One of these plays when a bomb is placed.
pub const SOUNDS: &[&str] = &["put_bomb_1", "put_bomb_2"];

#[derive(Debug, Clone)]
pub struct Bomb {
    health: Health,
    fuse: f32,
    range: usize,
    slide_speed: f32,
    direction: Vec3,
    pusher: Option<EntityId>,
}

impl Bomb {
    pub fn new(fuse: f32, range: usize) -> Self {
        Self {
            health: Health::new(1, layers::BOMB, layers::BOMB, 0.0),
            fuse,
            range,
            slide_speed: 0.0,
            direction: Vec3::ZERO,
            pusher: None,
        }
    }

    pub fn entity(position: Vec3, fuse: f32, range: usize) -> Entity {
        let mut appearance = Appearance::new("Bomb");
        appearance.animation.looped = false;
        appearance.animation.play("Idle", 1.0);
        Entity::new(
            "Bomb",
            Transform::at(position),
            Collider::rectangle(layers::BOMB, BOMB_SIZE, BOMB_SIZE),
            appearance,
            Actor::Bomb(Self::new(fuse, range)),
        )
        .with_spawn_sounds(SOUNDS.iter().copied())
    }

    pub fn range(&self) -> usize {
        self.range
    }

    pub fn fuse(&self) -> f32 {
        self.fuse
    }

    pub fn is_sliding(&self) -> bool {
        self.slide_speed != 0.0
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Start sliding along one axis. Ignored while already sliding or for a
    /// zero direction; a diagonal push keeps only its X component.
    pub fn push(&mut self, x_sign: i32, z_sign: i32, pusher: EntityId) {
        if self.is_sliding() || (x_sign == 0 && z_sign == 0) {
            return;
        }
        let z_sign = if x_sign != 0 { 0 } else { z_sign };
        self.pusher = Some(pusher);
        self.slide_speed = SLIDE_SPEED;
        self.direction = Vec3::new(x_sign.signum() as f32, 0.0, z_sign.signum() as f32);
    }
}

impl Behavior for Bomb {
    fn update(&mut self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        let dt = ctx.delta_time();
        if self.is_sliding() {
            core.appearance.animation.stop();
            core.target_movement = self.direction * self.slide_speed * dt;
            return Ok(());
        }
        self.fuse -= dt;
        if self.fuse <= 0.0 {
            apply_damage(self, core, ctx, &[])?;
        }
        Ok(())
    }

    fn on_collision_enter(
        &mut self,
        core: &mut EntityCore,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        if self.is_sliding() && self.pusher != Some(other.id()) {
            apply_damage(self, core, ctx, &[])?;
        }
        Ok(())
    }

    fn damageable(&self) -> Option<&dyn Damageable> {
        Some(self)
    }

    fn damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        Some(self)
    }
}

impl Damageable for Bomb {
    fn health(&self) -> &Health {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    fn on_death(&mut self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        core.destroy();
        let tools = ctx.scene_tools()?;
        tools.arena.put_explosion(tools.spawner, core.position(), self.range);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::Harness;
    use crate::entity::EntityKind;

    const ROOM: &[&str] = &["#####", "#...#", "#...#", "#...#", "#####"];

    #[test]
    fn test_fuse_explodes_into_cross() {
        let mut harness = Harness::with_arena(ROOM, &[]);
        let mut bomb = Bomb::entity(Vec3::new(2.0, 0.0, 2.0), 0.25, 1);
        bomb.core.id = EntityId(1);
        let caller = (bomb.id(), bomb.kind());

        harness.run(caller, |ctx| bomb.update(ctx)).unwrap();
        harness.run(caller, |ctx| bomb.update(ctx)).unwrap();
        assert!(!bomb.is_flagged());
        harness.run(caller, |ctx| bomb.update(ctx)).unwrap();
        assert!(bomb.is_flagged());

        let pending = harness.spawner.pending();
        assert_eq!(pending.len(), 5);
        assert!(pending.iter().all(|e| e.kind() == EntityKind::Explosion));
    }

    #[test]
    fn test_push_keeps_one_axis_and_ignores_repeats() {
        let mut bomb = Bomb::new(2.5, 2);
        bomb.push(0, 0, EntityId(1));
        assert!(!bomb.is_sliding());
        bomb.push(-1, 1, EntityId(1));
        assert_eq!(bomb.direction(), Vec3::NEG_X);
        bomb.push(0, 1, EntityId(1));
        assert_eq!(bomb.direction(), Vec3::NEG_X);
    }

    #[test]
    fn test_sliding_bomb_explodes_on_anything_but_pusher() {
        let mut harness = Harness::with_arena(ROOM, &[]);
        let mut bomb = Bomb::entity(Vec3::new(2.0, 0.0, 2.0), 2.5, 1);
        bomb.core.id = EntityId(2);
        let mut pusher = crate::actors::Player::entity(Vec3::new(1.0, 0.0, 2.0));
        pusher.core.id = EntityId(1);
        let mut wall = Entity::new(
            "Wall",
            Transform::at(Vec3::new(4.0, 0.0, 2.0)),
            Collider::rectangle(layers::WALL, 1.0, 1.0),
            Appearance::new("Wall"),
            Actor::Wall,
        );
        wall.core.id = EntityId(3);
        if let Actor::Bomb(state) = &mut bomb.actor {
            state.push(1, 0, EntityId(1));
        }
        let caller = (bomb.id(), bomb.kind());

        harness.run(caller, |ctx| bomb.update(ctx)).unwrap();
        assert!((bomb.target_movement().x - SLIDE_SPEED * 0.1).abs() < 1e-6);

        harness.run(caller, |ctx| bomb.on_collision_enter(&mut pusher, ctx)).unwrap();
        assert!(!bomb.is_flagged());
        harness.run(caller, |ctx| bomb.on_collision_enter(&mut wall, ctx)).unwrap();
        assert!(bomb.is_flagged());
        assert!(!harness.spawner.pending().is_empty());
    }
}
