//! Pick-ups dropped by destroyed boxes.
use glam::Vec3;

use crate::actors::{Actor, Behavior};
use crate::arena::layers;
use crate::components::appearance::Appearance;
use crate::components::collider::Collider;
use crate::components::transform::Transform;
use crate::context::FrameContext;
use crate::entity::{Entity, EntityCore, EntityKind};
use crate::error::EntityFault;

pub const PERK_SIZE: f32 = 0.8;

/// One of these plays when a good perk is picked up.
pub const SOUNDS: &[&str] = &["get_perk_1", "get_perk_2", "get_perk_3", "get_perk_4"];
/// Played by the player when a damage perk hurts it.
pub const DAMAGE_SOUNDS: &[&str] = &["bad_perk"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerkKind {
    Speed,
    Range,
    MaxBomb,
    Damage,
    Kick,
}

/// Drop weights, in roll order.
const DROP_TABLE: [(PerkKind, u32); 5] = [
    (PerkKind::Speed, 4),
    (PerkKind::Range, 3),
    (PerkKind::MaxBomb, 4),
    (PerkKind::Damage, 1),
    (PerkKind::Kick, 2),
];

impl PerkKind {
    /// Weighted random pick. With `kick_allowed` false the kick perk is
    /// rerolled.
    pub fn roll(rng: &mut fastrand::Rng, kick_allowed: bool) -> PerkKind {
        let table = DROP_TABLE
            .iter()
            .filter(|(kind, _)| kick_allowed || *kind != PerkKind::Kick);
        let total: u32 = table.clone().map(|(_, weight)| weight).sum();
        let mut pick = rng.u32(..total);
        for &(kind, weight) in table {
            if pick < weight {
                return kind;
            }
            pick -= weight;
        }
        PerkKind::Speed
    }

    pub fn model_name(self) -> &'static str {
        match self {
            PerkKind::Speed => "SpeedPerk",
            PerkKind::Range => "RangePerk",
            PerkKind::MaxBomb => "MaxBombPerk",
            PerkKind::Damage => "DamagePerk",
            PerkKind::Kick => "KickPerk",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Perk {
    kind: PerkKind,
}

impl Perk {
    pub fn entity(position: Vec3, kind: PerkKind) -> Entity {
        Entity::new(
            "Perk",
            Transform::at(position),
            Collider::rectangle(layers::PERK, PERK_SIZE, PERK_SIZE).as_trigger(),
            Appearance::new(kind.model_name()),
            Actor::Perk(Perk { kind }),
        )
    }

    pub fn kind(&self) -> PerkKind {
        self.kind
    }
}

impl Behavior for Perk {
    fn on_trigger_enter(
        &mut self,
        core: &mut EntityCore,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        if other.kind() != EntityKind::Player || core.need_to_be_destroyed {
            return Ok(());
        }
        core.destroy();
        if self.kind == PerkKind::Damage {
            other.take_damage(ctx, DAMAGE_SOUNDS)?;
            return Ok(());
        }
        ctx.play_random_sound(SOUNDS);
        if let Actor::Player(player) = &mut other.actor {
            player.apply_perk(self.kind, ctx)?;
        }
        Ok(())
    }
}
