//! Keyboard-driven bomber.
//!
//! Each frame the player ages its bomb cooldowns, places a bomb when the
//! bomb key is pressed and a slot is free, and turns the movement keys into
//! a `target_movement`. Diagonal input is normalised so moving diagonally is
//! not faster. While the kick perk is active and the kick key is held,
//! walking into a bomb pushes it along the dominant axis.
use glam::Vec3;
use log::debug;

use crate::actors::{Actor, Behavior, Damageable, PerkKind};
use crate::arena::layers;
use crate::components::appearance::Appearance;
use crate::components::collider::Collider;
use crate::components::health::Health;
use crate::components::transform::Transform;
use crate::context::FrameContext;
use crate::entity::{Entity, EntityCore, EntityKind};
use crate::error::EntityFault;

pub const PLAYER_DIAMETER: f32 = 0.8;
pub const PLAYER_SPEED: f32 = 6.0;
pub const PLAYER_HP: u32 = 3;
/// Length of the post-hit cooldown, spent on the player-special layer.
pub const PLAYER_DAMAGED_TIME: f32 = 2.0;
pub const PLAYER_MAX_BOMBS: usize = 2;
/// Bomb fuse, and the time before the bomb's slot frees up again.
pub const BOMB_COOLDOWN: f32 = 2.5;
pub const BOMB_RANGE: usize = 2;

pub const SPEED_BOOST: f32 = 0.8;

/// Sounds the player needs loaded.
pub const SOUNDS: &[&str] = &["defeat_effect", "defeat_voice"];

#[derive(Debug, Clone)]
pub struct Player {
    health: Health,
    speed: f32,
    max_bombs: usize,
    bomb_cooldown: f32,
    bomb_range: usize,
    bomb_kick: bool,
    bomb_timers: Vec<f32>,
    hud_synced: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            health: Health::new(
                PLAYER_HP,
                layers::PLAYER,
                layers::PLAYER_SPECIAL,
                PLAYER_DAMAGED_TIME,
            ),
            speed: PLAYER_SPEED,
            max_bombs: PLAYER_MAX_BOMBS,
            bomb_cooldown: BOMB_COOLDOWN,
            bomb_range: BOMB_RANGE,
            bomb_kick: false,
            bomb_timers: Vec::new(),
            hud_synced: false,
        }
    }

    pub fn entity(position: Vec3) -> Entity {
        Entity::new(
            "Player",
            Transform::at(position),
            Collider::circle(layers::PLAYER, PLAYER_DIAMETER),
            Appearance::new("Player"),
            Actor::Player(Self::new()),
        )
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn max_bombs(&self) -> usize {
        self.max_bombs
    }

    pub fn bomb_range(&self) -> usize {
        self.bomb_range
    }

    pub fn can_kick(&self) -> bool {
        self.bomb_kick
    }

    /// Bombs whose cooldown is still running.
    pub fn bombs_out(&self) -> usize {
        self.bomb_timers.len()
    }

    fn sync_hud(&self, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        let tools = ctx.scene_tools()?;
        tools.arena.tell_player_hp(self.health.hp());
        tools
            .arena
            .set_perk_values(self.speed, self.max_bombs, self.bomb_range, self.bomb_kick);
        Ok(())
    }

    /// Apply a picked-up perk. Damage perks go through the damage flow
    /// instead and are ignored here.
    pub fn apply_perk(&mut self, kind: PerkKind, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        match kind {
            PerkKind::Speed => self.speed += SPEED_BOOST,
            PerkKind::Range => self.bomb_range += 1,
            PerkKind::MaxBomb => self.max_bombs += 1,
            PerkKind::Kick => self.bomb_kick = true,
            PerkKind::Damage => return Ok(()),
        }
        debug!("player got {:?} perk", kind);
        self.sync_hud(ctx)
    }

    fn movement_direction(ctx: &FrameContext<'_, '_>) -> Vec3 {
        let keys = *ctx.keys();
        let mut x_sign = 0.0;
        let mut z_sign = 0.0;
        if ctx.is_key_pressed(keys.left) {
            x_sign -= 1.0;
        }
        if ctx.is_key_pressed(keys.right) {
            x_sign += 1.0;
        }
        if ctx.is_key_pressed(keys.up) {
            z_sign -= 1.0;
        }
        if ctx.is_key_pressed(keys.down) {
            z_sign += 1.0;
        }
        if x_sign != 0.0 && z_sign != 0.0 {
            let diagonal = std::f32::consts::FRAC_1_SQRT_2;
            Vec3::new(x_sign * diagonal, 0.0, z_sign * diagonal)
        } else {
            Vec3::new(x_sign, 0.0, z_sign)
        }
    }
}

impl Behavior for Player {
    fn update(&mut self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        if !self.health.is_alive() {
            return Ok(());
        }
        let dt = ctx.delta_time();

        for timer in &mut self.bomb_timers {
            *timer -= dt;
        }
        self.bomb_timers.retain(|t| *t > 0.0);

        let direction = Self::movement_direction(ctx);
        if direction != Vec3::ZERO {
            core.appearance.animation.play("Run", self.speed / PLAYER_SPEED);
            core.transform
                .set_yaw(direction.x.atan2(direction.z).to_degrees());
        } else {
            core.appearance.animation.play("Idle", 1.0);
        }
        core.target_movement = direction * self.speed * dt;

        if !self.hud_synced {
            self.sync_hud(ctx)?;
            self.hud_synced = true;
        }

        let bomb_key = ctx.keys().bomb;
        if ctx.is_key_just_pressed(bomb_key)
            && self.bomb_timers.len() < self.max_bombs
            && !self.health.is_damaged()
        {
            let tools = ctx.scene_tools()?;
            if tools
                .arena
                .put_bomb(tools.spawner, core.position(), self.bomb_cooldown, self.bomb_range)
            {
                self.bomb_timers.push(self.bomb_cooldown);
            }
        }
        Ok(())
    }

    fn on_collision_enter(
        &mut self,
        core: &mut EntityCore,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        let kick_key = ctx.keys().kick;
        if !self.bomb_kick || other.kind() != EntityKind::Bomb || !ctx.is_key_pressed(kick_key) {
            return Ok(());
        }

        let mut offset = other.position() - core.position();
        if offset.x.abs() >= offset.z.abs() {
            offset.z = 0.0;
        } else {
            offset.x = 0.0;
        }
        let x_sign = sign(offset.x);
        let z_sign = sign(offset.z);
        let next = other.position() + Vec3::new(x_sign as f32, 0.0, z_sign as f32);

        let tools = ctx.scene_tools()?;
        if tools.arena.can_put_bomb_at(next) {
            if let Actor::Bomb(bomb) = &mut other.actor {
                bomb.push(x_sign, z_sign, core.id);
            }
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

fn sign(value: f32) -> i32 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

impl Damageable for Player {
    fn health(&self) -> &Health {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    fn on_take_damage(
        &mut self,
        _core: &mut EntityCore,
        ctx: &mut FrameContext<'_, '_>,
        sounds: &[&str],
    ) -> Result<(), EntityFault> {
        if self.health.hp() > 0 {
            ctx.play_random_sound(sounds);
        } else {
            ctx.play_sound("defeat_effect");
            ctx.play_sound("defeat_voice");
        }
        ctx.scene_tools()?.arena.tell_player_hp(self.health.hp());
        Ok(())
    }

    /// The body stays in the arena, motionless, back on the base layer.
    fn on_death(&mut self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        core.collider.set_layer(self.health.base_layer());
        core.target_movement = Vec3::ZERO;
        core.appearance.animation.stop();
        ctx.scene_tools()?.arena.player_died();
        Ok(())
    }
}
