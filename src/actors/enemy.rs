//! Grid-walking enemies.
//!
//! Both kinds follow a queue of cells, moving towards the centre of the
//! first one and dropping it on arrival. A chaser refills the queue with
//! the shortest path to the player on every AI refresh tick; a wanderer
//! picks a random free neighbour every few seconds. Touching the player
//! hurts it.
use glam::Vec3;

use crate::actors::{Actor, Behavior, Damageable};
use crate::arena::grid::Cell;
use crate::arena::layers;
use crate::components::appearance::Appearance;
use crate::components::collider::Collider;
use crate::components::health::Health;
use crate::components::transform::Transform;
use crate::context::FrameContext;
use crate::entity::{Entity, EntityCore, EntityKind};
use crate::error::EntityFault;

pub const ENEMY_DIAMETER: f32 = 0.8;
pub const WANDER_SPEED: f32 = 1.0;
pub const CHASE_SPEED: f32 = 1.5;
/// Seconds between two random moves of a wanderer.
pub const WANDER_INTERVAL: f32 = 3.0;
/// Distance per axis at which a cell centre counts as reached.
pub const ARRIVAL_TOLERANCE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyMode {
    Chase,
    Wander,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    health: Health,
    mode: EnemyMode,
    speed: f32,
    way: Vec<Cell>,
    wander_timer: f32,
}

impl Enemy {
    pub fn new(mode: EnemyMode) -> Self {
        let speed = match mode {
            EnemyMode::Chase => CHASE_SPEED,
            EnemyMode::Wander => WANDER_SPEED,
        };
        Self {
            health: Health::new(1, layers::ENEMY, layers::ENEMY_SPECIAL, 0.0),
            mode,
            speed,
            way: Vec::new(),
            wander_timer: 0.0,
        }
    }

    pub fn entity(position: Vec3, mode: EnemyMode) -> Entity {
        let model = match mode {
            EnemyMode::Chase => "EnemyChaser",
            EnemyMode::Wander => "EnemyBasic",
        };
        Entity::new(
            "Enemy",
            Transform::at(position),
            Collider::circle(layers::ENEMY, ENEMY_DIAMETER),
            Appearance::new(model),
            Actor::Enemy(Self::new(mode)),
        )
    }

    pub fn mode(&self) -> EnemyMode {
        self.mode
    }

    /// Cells still to walk, next one first.
    pub fn way(&self) -> &[Cell] {
        &self.way
    }

    fn plan(&mut self, core: &EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        let dt = ctx.delta_time();
        let tools = ctx.scene_tools()?;
        let Some(cell) = tools.arena.grid().cell_at(core.position()) else {
            return Ok(());
        };
        match self.mode {
            EnemyMode::Chase => {
                if tools.arena.refresh_ai() {
                    self.way = tools.arena.chase_path(cell).unwrap_or_default();
                }
            }
            EnemyMode::Wander => {
                self.wander_timer -= dt;
                if self.wander_timer <= 0.0 {
                    self.wander_timer = WANDER_INTERVAL;
                    self.way.clear();
                    if let Some(next) = tools.arena.random_free_neighbour(cell, tools.rng) {
                        self.way.push(next);
                    }
                }
            }
        }
        Ok(())
    }

    /// Step towards the first cell of the way.
    fn walk(&mut self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        let Some(&target) = self.way.first() else {
            core.target_movement = Vec3::ZERO;
            core.appearance.animation.play("Idle", 1.0);
            return Ok(());
        };
        let target = ctx.scene_tools()?.arena.grid().center(target);
        let offset = target - core.position();
        let x_sign = axis_sign(offset.x);
        let z_sign = axis_sign(offset.z);
        if x_sign == 0.0 && z_sign == 0.0 {
            core.target_movement = Vec3::ZERO;
            self.way.remove(0);
            return Ok(());
        }

        let mut direction = Vec3::new(x_sign, 0.0, z_sign);
        if x_sign != 0.0 && z_sign != 0.0 {
            direction *= std::f32::consts::FRAC_1_SQRT_2;
        }
        let mut step = direction * self.speed * ctx.delta_time();
        step.x = step.x.clamp(-offset.x.abs(), offset.x.abs());
        step.z = step.z.clamp(-offset.z.abs(), offset.z.abs());
        core.target_movement = step;
        core.transform.set_yaw(direction.x.atan2(direction.z).to_degrees());
        core.appearance.animation.play("Run", self.speed);
        Ok(())
    }
}

fn axis_sign(offset: f32) -> f32 {
    if offset < -ARRIVAL_TOLERANCE {
        -1.0
    } else if offset > ARRIVAL_TOLERANCE {
        1.0
    } else {
        0.0
    }
}

impl Behavior for Enemy {
    fn update(&mut self, core: &mut EntityCore, ctx: &mut FrameContext<'_, '_>) -> Result<(), EntityFault> {
        self.plan(core, ctx)?;
        self.walk(core, ctx)
    }

    fn on_collision_enter(
        &mut self,
        _core: &mut EntityCore,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        if other.kind() == EntityKind::Player {
            other.take_damage(ctx, &[])?;
        }
        Ok(())
    }

    /// A player in its damage cooldown does not block enemies; the contact
    /// is still a hit once the cooldown is over.
    fn on_trigger_enter(
        &mut self,
        core: &mut EntityCore,
        other: &mut Entity,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), EntityFault> {
        self.on_collision_enter(core, other, ctx)
    }

    fn damageable(&self) -> Option<&dyn Damageable> {
        Some(self)
    }

    fn damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        Some(self)
    }
}

impl Damageable for Enemy {
    fn health(&self) -> &Health {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::Player;
    use crate::context::testing::Harness;
    use crate::entity::EntityId;

    const CORRIDOR: &[&str] = &["######", "#P...#", "######"];

    #[test]
    fn test_chaser_walks_towards_player() {
        let mut harness = Harness::with_arena(CORRIDOR, &[]);
        let player = {
            let mut p = Player::entity(Vec3::new(1.0, 0.0, 1.0));
            p.core.id = EntityId(1);
            p
        };
        harness.arena_mut().refresh_occupancy(std::slice::from_ref(&player));
        let input = harness.input.clone();
        harness.arena_mut().begin_frame(std::slice::from_ref(&player), &input, 0.1);

        let mut enemy = Enemy::entity(Vec3::new(4.0, 0.0, 1.0), EnemyMode::Chase);
        enemy.core.id = EntityId(2);
        harness.run((enemy.id(), enemy.kind()), |ctx| enemy.update(ctx)).unwrap();

        let Actor::Enemy(state) = &enemy.actor else { unreachable!() };
        assert_eq!(state.way(), &[Cell::new(3, 1), Cell::new(2, 1), Cell::new(1, 1)]);
        let movement = enemy.target_movement();
        assert!((movement.x + CHASE_SPEED * 0.1).abs() < 1e-6);
        assert_eq!(movement.z, 0.0);
    }

    #[test]
    fn test_arrival_drops_cell_and_step_never_overshoots() {
        let mut harness = Harness::with_arena(CORRIDOR, &[]);
        let mut enemy = Enemy::entity(Vec3::new(2.03, 0.0, 1.0), EnemyMode::Wander);
        enemy.core.id = EntityId(2);
        if let Actor::Enemy(state) = &mut enemy.actor {
            state.way = vec![Cell::new(2, 1), Cell::new(3, 1)];
            state.wander_timer = WANDER_INTERVAL;
        }
        let caller = (enemy.id(), enemy.kind());

        harness.run(caller, |ctx| enemy.update(ctx)).unwrap();
        let Actor::Enemy(state) = &enemy.actor else { unreachable!() };
        assert_eq!(state.way(), &[Cell::new(3, 1)]);
        assert_eq!(enemy.target_movement(), Vec3::ZERO);

        harness.time.delta = 2.0;
        harness.run(caller, |ctx| enemy.update(ctx)).unwrap();
        assert!((enemy.target_movement().x - 0.97).abs() < 1e-5);
    }

    #[test]
    fn test_touching_player_hurts() {
        let mut harness = Harness::with_arena(CORRIDOR, &[]);
        let mut enemy = Enemy::entity(Vec3::new(2.0, 0.0, 1.0), EnemyMode::Wander);
        let mut player = Player::entity(Vec3::new(1.0, 0.0, 1.0));
        harness
            .run((enemy.id(), enemy.kind()), |ctx| enemy.on_collision_enter(&mut player, ctx))
            .unwrap();
        assert_eq!(player.damageable().unwrap().health().hp(), 2);
    }
}
