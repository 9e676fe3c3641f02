//! Level exit revealed by a box.
use glam::Vec3;

use crate::actors::{Actor, Behavior};
use crate::arena::layers;
use crate::components::appearance::Appearance;
use crate::components::collider::Collider;
use crate::components::transform::Transform;
use crate::context::FrameContext;
use crate::entity::{Entity, EntityCore, EntityKind};
use crate::error::EntityFault;

pub const PORTAL_DIAMETER: f32 = 0.6;
/// How close to the centre the player must stand, per axis.
pub const PORTAL_TOLERANCE: f32 = 0.1;

pub const SOUNDS: &[&str] = &["portal_spawn"];

#[derive(Debug, Clone, Default)]
pub struct Portal {
    triggered: bool,
}

impl Portal {
    pub fn entity(position: Vec3) -> Entity {
        Entity::new(
            "Portal",
            Transform::at(position),
            Collider::circle(layers::PORTAL, PORTAL_DIAMETER).as_trigger(),
            Appearance::new("Portal"),
            Actor::Portal(Self::default()),
        )
        .with_spawn_sounds(SOUNDS.iter().copied())
    }

    pub fn has_triggered(&self) -> bool {
        self.triggered
    }
}

impl Behavior for Portal {
    fn on_trigger_enter(
        &mut self,
        core: &mut EntityCore,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        if self.triggered || other.kind() != EntityKind::Player {
            return Ok(());
        }
        let distance = core.position() - other.position();
        if distance.x.abs() <= PORTAL_TOLERANCE && distance.z.abs() <= PORTAL_TOLERANCE {
            ctx.scene_tools()?.arena.level_succeeded();
            self.triggered = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::Player;
    use crate::context::testing::Harness;
    use crate::entity::EntityId;

    #[test]
    fn test_portal_needs_player_near_centre() {
        let mut harness = Harness::with_arena(&["###", "#P#", "###"], &[]);
        let mut portal = Portal::entity(Vec3::new(1.0, 0.0, 1.0));
        portal.core.id = EntityId(2);
        let mut player = Player::entity(Vec3::new(1.3, 0.0, 1.0));
        player.core.id = EntityId(1);
        let caller = (portal.id(), portal.kind());

        harness.run(caller, |ctx| portal.on_trigger_enter(&mut player, ctx)).unwrap();
        assert!(!harness.arena().is_level_succeeded());

        player.core.transform.position.x = 1.05;
        harness.run(caller, |ctx| portal.on_trigger_enter(&mut player, ctx)).unwrap();
        assert!(harness.arena().is_level_succeeded());
        let Actor::Portal(state) = &portal.actor else { unreachable!() };
        assert!(state.has_triggered());
    }

    #[test]
    fn test_portal_without_scene_tools_faults() {
        let mut harness = Harness::new(None, &[]);
        let mut portal = Portal::entity(Vec3::ZERO);
        let mut player = Player::entity(Vec3::ZERO);
        let caller = (portal.id(), portal.kind());
        let fault = harness
            .run(caller, |ctx| portal.on_trigger_enter(&mut player, ctx))
            .unwrap_err();
        assert!(matches!(fault, EntityFault::MissingCapability { .. }));
    }
}
