//! Destructible box.
//!
//! One hit sets the box on fire: it moves to the wall layer, burns for a
//! second and then disappears, leaving behind the portal it was hiding or,
//! by chance, a perk.
use glam::Vec3;
use log::debug;

use crate::actors::{Actor, Behavior, Damageable, Perk, Portal};
use crate::arena::layers;
use crate::components::appearance::Appearance;
use crate::components::collider::Collider;
use crate::components::health::Health;
use crate::components::transform::Transform;
use crate::context::FrameContext;
use crate::entity::{Entity, EntityCore};
use crate::error::EntityFault;

pub const BOX_SIZE: f32 = 1.0;
pub const BURN_TIME: f32 = 1.0;

const BOX_COLOR: Vec3 = Vec3::new(0.55, 0.3, 0.1);
const BURNING_COLOR: Vec3 = Vec3::new(0.9, 0.6, 0.1);

#[derive(Debug, Clone)]
pub struct BoxBlock {
    health: Health,
    on_fire: bool,
    burn_timer: f32,
    hides_portal: bool,
}

impl BoxBlock {
    pub fn new(hides_portal: bool) -> Self {
        Self {
            health: Health::new(1, layers::BOX, layers::WALL, BURN_TIME),
            on_fire: false,
            burn_timer: BURN_TIME,
            hides_portal,
        }
    }

    pub fn entity(position: Vec3, hides_portal: bool) -> Entity {
        Entity::new(
            "Box",
            Transform::at(position),
            Collider::rectangle(layers::BOX, BOX_SIZE, BOX_SIZE),
            Appearance::new("Wall").with_color(BOX_COLOR),
            Actor::Box(Self::new(hides_portal)),
        )
    }

    pub fn is_on_fire(&self) -> bool {
        self.on_fire
    }

    pub fn hides_portal(&self) -> bool {
        self.hides_portal
    }

    fn burn_out(&self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        let position = core.position();
        if self.hides_portal {
            debug!("box #{} reveals the portal", core.id);
            ctx.add_new_entity(Portal::entity(position));
            return Ok(());
        }
        let roll = ctx.rng().u8(..100);
        let tools = ctx.scene_tools()?;
        if roll < tools.arena.perk_probability() {
            let kind = tools.arena.roll_perk(tools.rng);
            tools.spawner.add_new_entity(Perk::entity(position, kind));
        }
        Ok(())
    }
}

impl Behavior for BoxBlock {
    fn update(&mut self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        if !self.on_fire {
            return Ok(());
        }
        self.burn_timer -= ctx.delta_time();
        if self.burn_timer <= 0.0 && !core.need_to_be_destroyed {
            core.destroy();
            self.burn_out(core, ctx)?;
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

impl Damageable for BoxBlock {
    fn health(&self) -> &Health {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    fn on_death(&mut self, core: &mut EntityCore, _ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        core.appearance.color = Some(BURNING_COLOR);
        self.on_fire = true;
        Ok(())
    }
}
