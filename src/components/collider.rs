//! Shape and layer descriptor attached to every entity.
//!
//! Colliders live in the XZ plane. `width` spans the X axis and `height`
//! spans the Z axis; both are *full* extents, so callers halve them when
//! they need a half-extent or a radius. Circles use `width` as their
//! diameter.
//!
//! A collider is immutable after construction except for its layer tag,
//! which damage transitions swap between a base and a damaged layer.
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Index into the game's collision layer table.
pub type LayerTag = usize;

/// Penetration below this distance counts as touching, not overlapping.
pub const CONTACT_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderShape {
    Rectangle,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    shape: ColliderShape,
    layer: LayerTag,
    width: f32,
    height: f32,
    is_trigger: bool,
}

impl Collider {
    pub fn new(shape: ColliderShape, layer: LayerTag, width: f32, height: f32) -> Self {
        Self {
            shape,
            layer,
            width,
            height,
            is_trigger: false,
        }
    }

    pub fn rectangle(layer: LayerTag, width: f32, height: f32) -> Self {
        Self::new(ColliderShape::Rectangle, layer, width, height)
    }

    /// Circle of the given diameter.
    pub fn circle(layer: LayerTag, diameter: f32) -> Self {
        Self::new(ColliderShape::Circle, layer, diameter, diameter)
    }

    /// Turn this collider into a trigger: it reports overlaps but never
    /// blocks movement.
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    pub fn layer(&self) -> LayerTag {
        self.layer
    }

    /// Swap the layer tag (damage state transitions).
    pub fn set_layer(&mut self, layer: LayerTag) {
        self.layer = layer;
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn radius(&self) -> f32 {
        self.width * 0.5
    }

    /// Bounding rectangle of this collider centred at `position`.
    pub fn bounds(&self, position: Vec3) -> RectanglePoints {
        RectanglePoints::new(self, position)
    }
}

/// Axis-aligned extents of a collider in the XZ plane.
///
/// `top` is the smaller Z value, `bot` the larger one, matching the
/// screen-down convention of the arena camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectanglePoints {
    pub top: f32,
    pub bot: f32,
    pub left: f32,
    pub right: f32,
}

impl RectanglePoints {
    pub fn new(collider: &Collider, position: Vec3) -> Self {
        let half = collider.half_extents();
        Self {
            top: position.z - half.y,
            bot: position.z + half.y,
            left: position.x - half.x,
            right: position.x + half.x,
        }
    }

    /// Extents covering both `self` and `self` translated by `movement`.
    pub fn swept(&self, movement: Vec3) -> Self {
        Self {
            top: self.top.min(self.top + movement.z),
            bot: self.bot.max(self.bot + movement.z),
            left: self.left.min(self.left + movement.x),
            right: self.right.max(self.right + movement.x),
        }
    }

    pub fn translated(&self, movement: Vec3) -> Self {
        Self {
            top: self.top + movement.z,
            bot: self.bot + movement.z,
            left: self.left + movement.x,
            right: self.right + movement.x,
        }
    }

    /// Corners as (x, z) pairs: top-left, top-right, bot-right, bot-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left, self.top),
            Vec2::new(self.right, self.top),
            Vec2::new(self.right, self.bot),
            Vec2::new(self.left, self.bot),
        ]
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.left < other.right - CONTACT_EPSILON
            && self.right > other.left + CONTACT_EPSILON
            && self.top < other.bot - CONTACT_EPSILON
            && self.bot > other.top + CONTACT_EPSILON
    }

    pub fn contains_point(&self, x: f32, z: f32) -> bool {
        x >= self.left && x <= self.right && z >= self.top && z <= self.bot
    }

    /// Closest point of the rectangle to `(x, z)`.
    pub fn closest_point(&self, x: f32, z: f32) -> Vec2 {
        Vec2::new(x.clamp(self.left, self.right), z.clamp(self.top, self.bot))
    }
}
