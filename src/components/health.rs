//! Hit points and damage cooldown for damageable actors.
//!
//! A hit switches the owner's collider to the *damaged* layer for
//! `damaged_max_time` seconds; while that cooldown runs further hits are
//! ignored. When the cooldown expires the collider returns to the *base*
//! layer, but only while the owner is still alive.
use crate::components::collider::{Collider, LayerTag};

#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    alive: bool,
    hp: u32,
    base_layer: LayerTag,
    damaged_layer: LayerTag,
    damaged_max_time: f32,
    time_damaged: f32,
}

impl Health {
    pub fn new(hp: u32, base_layer: LayerTag, damaged_layer: LayerTag, damaged_max_time: f32) -> Self {
        Self {
            alive: hp != 0,
            hp,
            base_layer,
            damaged_layer,
            damaged_max_time,
            time_damaged: 0.0,
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// True while the post-hit cooldown is running.
    pub fn is_damaged(&self) -> bool {
        self.time_damaged > 0.0
    }

    pub fn base_layer(&self) -> LayerTag {
        self.base_layer
    }

    pub fn damaged_layer(&self) -> LayerTag {
        self.damaged_layer
    }

    pub fn can_take_damage(&self) -> bool {
        self.alive && self.time_damaged <= 0.0
    }

    /// Advance the cooldown, restoring the base layer when it expires.
    pub fn tick(&mut self, dt: f32, collider: &mut Collider) {
        if self.alive && self.time_damaged > 0.0 {
            self.time_damaged -= dt;
            if self.time_damaged <= 0.0 {
                collider.set_layer(self.base_layer);
            }
        }
    }

    /// Apply one hit: lose a hit point, start the cooldown and move the
    /// collider to the damaged layer.
    pub fn apply_hit(&mut self, collider: &mut Collider) {
        if !self.alive {
            return;
        }
        self.hp = self.hp.saturating_sub(1);
        self.time_damaged = self.damaged_max_time;
        collider.set_layer(self.damaged_layer);
    }

    /// Mark as dead. Returns `true` only the first time.
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }
}
