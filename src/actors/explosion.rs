//! One cell of a bomb blast.
use glam::Vec3;

use crate::actors::{Actor, Behavior};
use crate::arena::layers;
use crate::components::appearance::Appearance;
use crate::components::collider::Collider;
use crate::components::transform::Transform;
use crate::context::FrameContext;
use crate::entity::{Entity, EntityCore, EntityKind};
use crate::error::EntityFault;

pub const EXPLOSION_SIZE: f32 = 0.9;
pub const EXPLOSION_LIFETIME: f32 = 1.0;

/// Played when an explosion burns the player.
pub const SOUNDS: &[&str] = &["burn_player_1", "burn_player_2"];

#[derive(Debug, Clone)]
pub struct Explosion {
    timer: f32,
}

impl Default for Explosion {
    fn default() -> Self {
        Self {
            timer: EXPLOSION_LIFETIME,
        }
    }
}

impl Explosion {
    pub fn entity(position: Vec3) -> Entity {
        Entity::new(
            "Explosion",
            Transform::at(position).with_scale(Vec3::splat(0.8)),
            Collider::rectangle(layers::EXPLOSION, EXPLOSION_SIZE, EXPLOSION_SIZE).as_trigger(),
            Appearance::new("Fire"),
            Actor::Explosion(Self::default()),
        )
    }
}

impl Behavior for Explosion {
    fn update(&mut self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        self.timer -= ctx.delta_time();
        if self.timer <= 0.0 {
            core.destroy();
        }
        Ok(())
    }

    /// Anything damageable caught in the blast takes a hit.
    fn on_trigger_enter(
        &mut self,
        _core: &mut EntityCore,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        if !other.is_damageable() {
            return Ok(());
        }
        let sounds: &[&str] = if other.kind() == EntityKind::Player {
            SOUNDS
        } else {
            &[]
        };
        other.take_damage(ctx, sounds)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{BoxBlock, Player};
    use crate::context::testing::Harness;
    use crate::entity::EntityId;

    #[test]
    fn test_explosion_burns_player_and_expires() {
        let mut harness = Harness::with_arena(&["###", "#P#", "###"], SOUNDS);
        let mut explosion = Explosion::entity(Vec3::new(1.0, 0.0, 1.0));
        explosion.core.id = EntityId(2);
        let mut player = Player::entity(Vec3::new(1.0, 0.0, 1.0));
        player.core.id = EntityId(1);
        let caller = (explosion.id(), explosion.kind());

        harness.run(caller, |ctx| explosion.on_trigger_enter(&mut player, ctx)).unwrap();
        assert_eq!(player.damageable().unwrap().health().hp(), 2);
        let played = harness.played();
        assert_eq!(played.len(), 1);
        assert!(SOUNDS.contains(&played[0].as_str()));

        for _ in 0..11 {
            harness.run(caller, |ctx| explosion.update(ctx)).unwrap();
        }
        assert!(explosion.is_flagged());
    }

    #[test]
    fn test_explosion_ignores_walls_and_hits_boxes_silently() {
        let mut harness = Harness::with_arena(&["###", "#P#", "###"], SOUNDS);
        let mut explosion = Explosion::entity(Vec3::ZERO);
        explosion.core.id = EntityId(1);
        let mut wall = Entity::new(
            "Wall",
            Transform::default(),
            Collider::rectangle(layers::WALL, 1.0, 1.0),
            Appearance::new("Wall"),
            Actor::Wall,
        );
        let mut block = BoxBlock::entity(Vec3::ZERO, false);
        let caller = (explosion.id(), explosion.kind());

        harness.run(caller, |ctx| explosion.on_trigger_enter(&mut wall, ctx)).unwrap();
        harness.run(caller, |ctx| explosion.on_trigger_enter(&mut block, ctx)).unwrap();
        assert!(!block.damageable().unwrap().health().is_alive());
        assert!(harness.played().is_empty());
    }
}
