//! Collision resolution for one mover.
//!
//! [`resolve_movement`] takes the live entity list, the index of the entity
//! that wants to move and its requested movement, and returns a
//! [`Resolution`]: the movement it may actually perform plus the entities it
//! collided with and the triggers it touched.
//!
//! # Broad phase
//!
//! Every other live entity that is not flagged for destruction is a
//! candidate. A candidate is *blocking* when neither collider is a trigger
//! and the [`CollisionTable`] enables the layer pair; otherwise it is a
//! *trigger* candidate. Blocking pairs listed in the scene's
//! [`InitialCollisionMap`], or that already overlap before the move, are
//! left out of the blocking tests: a mover may always leave a collider it
//! is already inside.
//!
//! # Narrow phase
//!
//! A candidate is hit by a movement if the exact shapes overlap at the end
//! position, or if the candidate crosses the swept region between start and
//! end. The swept region is bounded by two [`LineInfo`] paths traced by the
//! mover's outermost points perpendicular to the motion (bounding corners
//! for a rectangle, tangent points for a circle). Rectangles are tested
//! against that region with separating axes; circles with the quadratic
//! line–circle intersection on either path, or by their centre lying
//! strictly inside the region.
//!
//! # Shortcut
//!
//! If the full movement hits a blocking candidate, a diagonal movement is
//! retried on each single axis, larger component first, and the first
//! unobstructed one wins. When neither works the movement is zero for the
//! frame.
use glam::{Vec2, Vec3};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::components::collider::{
    CONTACT_EPSILON, Collider, ColliderShape, RectanglePoints,
};
use crate::entity::{Entity, EntityId};
use crate::resources::collisiontable::CollisionTable;

/// Horizontal extent below which a movement line is treated as vertical.
const VERTICAL_EPSILON: f32 = 1e-6;

/// Outcome of resolving one entity's requested movement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Movement to apply. Zero, the requested movement or a single-axis
    /// shortcut of it.
    pub movement: Vec3,
    /// Indices of blocking candidates hit by the requested movement.
    pub collided: SmallVec<[usize; 4]>,
    /// Indices of trigger candidates touched at the final position or along
    /// the resolved path.
    pub triggered: SmallVec<[usize; 4]>,
}

/// Blocking pairs that overlapped when they entered the live set.
///
/// Such pairs do not block each other until they separate; the pair is
/// dropped from the map as soon as they no longer overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialCollisionMap {
    pairs: FxHashSet<(EntityId, EntityId)>,
}

impl InitialCollisionMap {
    fn key(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn insert(&mut self, a: EntityId, b: EntityId) {
        self.pairs.insert(Self::key(a, b));
    }

    pub fn contains(&self, a: EntityId, b: EntityId) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Forget every pair involving one of `ids`.
    pub fn remove_entities(&mut self, ids: &FxHashSet<EntityId>) {
        if ids.is_empty() {
            return;
        }
        self.pairs.retain(|(a, b)| !ids.contains(a) && !ids.contains(b));
    }

    /// Drop the pairs of `entities[index]` that no longer overlap.
    pub fn prune_separated(&mut self, entities: &[Entity], index: usize) {
        let mover = &entities[index];
        let id = mover.id();
        if !self.pairs.iter().any(|(a, b)| *a == id || *b == id) {
            return;
        }
        let separated: SmallVec<[(EntityId, EntityId); 4]> = self
            .pairs
            .iter()
            .filter(|(a, b)| *a == id || *b == id)
            .filter(|(a, b)| {
                let other = if *a == id { *b } else { *a };
                match entities.iter().find(|e| e.id() == other) {
                    Some(o) => !do_collide(mover.collider(), mover.position(), o.collider(), o.position()),
                    None => true,
                }
            })
            .copied()
            .collect();
        for pair in separated {
            self.pairs.remove(&pair);
        }
    }

    /// Record every blocking pair of `entities` that overlaps right now.
    pub fn rebuild(&mut self, entities: &[Entity], table: &CollisionTable) {
        self.pairs.clear();
        for (i, a) in entities.iter().enumerate() {
            for b in &entities[i + 1..] {
                if is_blocking_pair(a.collider(), b.collider(), table)
                    && do_collide(a.collider(), a.position(), b.collider(), b.position())
                {
                    self.insert(a.id(), b.id());
                }
            }
        }
    }
}

/// Whether two colliders block each other rather than trigger.
pub fn is_blocking_pair(a: &Collider, b: &Collider, table: &CollisionTable) -> bool {
    !a.is_trigger() && !b.is_trigger() && table.collides(a.layer(), b.layer())
}

fn plane(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Exact overlap test of two colliders at the given positions. Touching
/// shapes do not overlap.
pub fn do_collide(a: &Collider, pa: Vec3, b: &Collider, pb: Vec3) -> bool {
    match (a.shape(), b.shape()) {
        (ColliderShape::Rectangle, ColliderShape::Rectangle) => a.bounds(pa).overlaps(&b.bounds(pb)),
        (ColliderShape::Circle, ColliderShape::Circle) => {
            plane(pa).distance(plane(pb)) < a.radius() + b.radius() - CONTACT_EPSILON
        }
        (ColliderShape::Rectangle, ColliderShape::Circle) => {
            rect_circle(&a.bounds(pa), plane(pb), b.radius())
        }
        (ColliderShape::Circle, ColliderShape::Rectangle) => {
            rect_circle(&b.bounds(pb), plane(pa), a.radius())
        }
    }
}

fn rect_circle(rect: &RectanglePoints, center: Vec2, radius: f32) -> bool {
    if rect.contains_point(center.x, center.y) {
        return true;
    }
    let closest = rect.closest_point(center.x, center.y);
    closest.distance(center) < radius - CONTACT_EPSILON
}

/// A circle written as `x_square*x² + x*x + z_square*z² + z*z + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleEquation {
    pub x_square: f32,
    pub x: f32,
    pub z_square: f32,
    pub z: f32,
    pub c: f32,
}

impl CircleEquation {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            x_square: 1.0,
            x: -2.0 * center.x,
            z_square: 1.0,
            z: -2.0 * center.y,
            c: center.x * center.x + center.y * center.y - radius * radius,
        }
    }
}

/// Path of one bounding point over the movement: the segment from `start`
/// to `end` on the line `z = slope * x + intercept`, or `x = intercept`
/// when `is_vertical`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineInfo {
    pub slope: f32,
    pub intercept: f32,
    pub is_vertical: bool,
    pub start: Vec2,
    pub end: Vec2,
}

impl LineInfo {
    /// Line through `start` along `movement` (both in the XZ plane).
    pub fn through(start: Vec2, movement: Vec2) -> Self {
        let end = start + movement;
        if movement.x.abs() <= VERTICAL_EPSILON {
            Self {
                slope: 0.0,
                intercept: start.x,
                is_vertical: true,
                start,
                end,
            }
        } else {
            let slope = movement.y / movement.x;
            Self {
                slope,
                intercept: start.y - slope * start.x,
                is_vertical: false,
                start,
                end,
            }
        }
    }

    /// Which parallel line `point` lies on: its intercept for a sloped line,
    /// its x for a vertical one.
    pub fn band_value(&self, point: Vec2) -> f32 {
        if self.is_vertical {
            point.x
        } else {
            point.y - self.slope * point.x
        }
    }

    /// `CONTACT_EPSILON` expressed in band units.
    fn band_epsilon(&self) -> f32 {
        if self.is_vertical {
            CONTACT_EPSILON
        } else {
            CONTACT_EPSILON * (1.0 + self.slope * self.slope).sqrt()
        }
    }

    /// Whether the segment crosses the circle's interior.
    ///
    /// Substitutes the line into the circle equation and solves the
    /// resulting quadratic; the chord between the two roots must overlap
    /// the segment by a positive length. Vertical lines substitute `x`
    /// instead, with `z` as the unknown.
    pub fn intersects_circle(&self, circle: &CircleEquation) -> bool {
        let (a, b, c, lo, hi) = if self.is_vertical {
            let q = self.intercept;
            (
                circle.z_square,
                circle.z,
                circle.x_square * q * q + circle.x * q + circle.c,
                self.start.y.min(self.end.y),
                self.start.y.max(self.end.y),
            )
        } else {
            let (m, q) = (self.slope, self.intercept);
            (
                circle.x_square + circle.z_square * m * m,
                circle.x + 2.0 * circle.z_square * m * q + circle.z * m,
                circle.z_square * q * q + circle.z * q + circle.c,
                self.start.x.min(self.end.x),
                self.start.x.max(self.end.x),
            )
        };

        let discriminant = b * b - 4.0 * a * c;
        if discriminant <= 0.0 {
            return false;
        }
        let root = discriminant.sqrt();
        let r1 = (-b - root) / (2.0 * a);
        let r2 = (-b + root) / (2.0 * a);
        r2.min(hi) - r1.max(lo) > CONTACT_EPSILON
    }
}

/// Region swept between the two bounding paths of a movement.
#[derive(Debug, Clone, Copy)]
struct Sweep {
    lines: [LineInfo; 2],
    movement: Vec2,
}

impl Sweep {
    fn new(collider: &Collider, position: Vec3, movement: Vec3) -> Self {
        let m = plane(movement);
        let normal = m.perp();
        let (a, b) = match collider.shape() {
            ColliderShape::Circle => {
                let offset = normal.normalize_or_zero() * collider.radius();
                let c = plane(position);
                (c + offset, c - offset)
            }
            ColliderShape::Rectangle => {
                let corners = collider.bounds(position).corners();
                // Extreme corners across the motion; ties go to the corner
                // further along it.
                let pick = |sign: f32| {
                    corners
                        .iter()
                        .copied()
                        .reduce(|best, c| {
                            let (nb, nc) = (sign * normal.dot(best), sign * normal.dot(c));
                            if nc > nb + CONTACT_EPSILON
                                || ((nc - nb).abs() <= CONTACT_EPSILON && m.dot(c) > m.dot(best))
                            {
                                c
                            } else {
                                best
                            }
                        })
                        .unwrap_or(corners[0])
                };
                (pick(1.0), pick(-1.0))
            }
        };
        Self {
            lines: [LineInfo::through(a, m), LineInfo::through(b, m)],
            movement: m,
        }
    }

    fn band(&self) -> (f32, f32) {
        let qa = self.lines[0].band_value(self.lines[0].start);
        let qb = self.lines[1].band_value(self.lines[1].start);
        (qa.min(qb), qa.max(qb))
    }

    /// Unit normal of the region's side edges `a - b`, oriented along the
    /// motion. For a circle the sides are square to the motion.
    fn side_axis(&self) -> Vec2 {
        let side = self.lines[0].start - self.lines[1].start;
        let axis = side.perp().try_normalize().unwrap_or(self.movement.normalize_or_zero());
        if axis.dot(self.movement) < 0.0 { -axis } else { axis }
    }

    /// Projection range of the region on [`side_axis`](Self::side_axis).
    fn along(&self, axis: Vec2) -> (f32, f32) {
        let start = axis.dot(self.lines[0].start);
        (start, start + axis.dot(self.movement))
    }

    fn vertices(&self) -> [Vec2; 4] {
        [
            self.lines[0].start,
            self.lines[0].end,
            self.lines[1].end,
            self.lines[1].start,
        ]
    }

    fn contains_point(&self, p: Vec2) -> bool {
        let eps = self.lines[0].band_epsilon();
        let (lo, hi) = self.band();
        let v = self.lines[0].band_value(p);
        let axis = self.side_axis();
        let (alo, ahi) = self.along(axis);
        let t = axis.dot(p);
        v > lo + eps && v < hi - eps && t > alo + CONTACT_EPSILON && t < ahi - CONTACT_EPSILON
    }

    fn hits_rectangle(&self, rect: &RectanglePoints) -> bool {
        let verts = self.vertices();
        let (min, max) = verts
            .iter()
            .fold((verts[0], verts[0]), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
        let aabb = RectanglePoints {
            top: min.y,
            bot: max.y,
            left: min.x,
            right: max.x,
        };
        if !aabb.overlaps(rect) {
            return false;
        }

        let corners = rect.corners();
        let overlaps = |range: (f32, f32), values: [f32; 4], eps: f32| {
            let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
            let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            hi > range.0 + eps && lo < range.1 - eps
        };

        let line = &self.lines[0];
        let band_values = corners.map(|c| line.band_value(c));
        if !overlaps(self.band(), band_values, line.band_epsilon()) {
            return false;
        }
        let axis = self.side_axis();
        let along_values = corners.map(|c| axis.dot(c));
        overlaps(self.along(axis), along_values, CONTACT_EPSILON)
    }

    fn hits_circle(&self, center: Vec2, radius: f32) -> bool {
        let circle = CircleEquation::new(center, radius);
        self.lines.iter().any(|line| line.intersects_circle(&circle)) || self.contains_point(center)
    }

    fn hits(&self, collider: &Collider, position: Vec3) -> bool {
        match collider.shape() {
            ColliderShape::Rectangle => self.hits_rectangle(&collider.bounds(position)),
            ColliderShape::Circle => self.hits_circle(plane(position), collider.radius()),
        }
    }
}

/// Whether moving `collider` from `start` by `movement` runs into `other`.
pub fn movement_hits(collider: &Collider, start: Vec3, movement: Vec3, other: &Entity) -> bool {
    if do_collide(collider, start + movement, other.collider(), other.position()) {
        return true;
    }
    if plane(movement) == Vec2::ZERO {
        return false;
    }
    Sweep::new(collider, start, movement).hits(other.collider(), other.position())
}

/// Resolve the movement requested by `entities[index]`.
///
/// Zero movement resolves to zero with no contacts.
pub fn resolve_movement(
    entities: &[Entity],
    index: usize,
    movement: Vec3,
    table: &CollisionTable,
    exempt: &InitialCollisionMap,
) -> Resolution {
    if movement == Vec3::ZERO {
        return Resolution::default();
    }
    let mover = &entities[index];
    let collider = mover.collider();
    let start = mover.position();

    let mut blockers: SmallVec<[usize; 8]> = SmallVec::new();
    let mut triggers: SmallVec<[usize; 8]> = SmallVec::new();
    for (i, other) in entities.iter().enumerate() {
        if i == index || other.is_flagged() {
            continue;
        }
        if is_blocking_pair(collider, other.collider(), table) {
            let already_inside = exempt.contains(mover.id(), other.id())
                || do_collide(collider, start, other.collider(), other.position());
            if !already_inside {
                blockers.push(i);
            }
        } else {
            triggers.push(i);
        }
    }

    let collided: SmallVec<[usize; 4]> = blockers
        .iter()
        .copied()
        .filter(|&i| movement_hits(collider, start, movement, &entities[i]))
        .collect();

    let resolved = if collided.is_empty() {
        movement
    } else {
        shortcut(entities, collider, start, movement, &blockers)
    };

    let end = start + resolved;
    let triggered = triggers
        .iter()
        .copied()
        .filter(|&i| {
            let other = &entities[i];
            do_collide(collider, end, other.collider(), other.position())
                || (resolved != Vec3::ZERO && movement_hits(collider, start, resolved, other))
        })
        .collect();

    Resolution {
        movement: resolved,
        collided,
        triggered,
    }
}

/// Single-axis retry for a blocked diagonal movement.
fn shortcut(
    entities: &[Entity],
    collider: &Collider,
    start: Vec3,
    movement: Vec3,
    blockers: &[usize],
) -> Vec3 {
    if movement.x == 0.0 || movement.z == 0.0 {
        return Vec3::ZERO;
    }
    let x_only = Vec3::new(movement.x, movement.y, 0.0);
    let z_only = Vec3::new(0.0, movement.y, movement.z);
    let order = if movement.x.abs() >= movement.z.abs() {
        [x_only, z_only]
    } else {
        [z_only, x_only]
    };
    order
        .into_iter()
        .find(|attempt| {
            !blockers
                .iter()
                .any(|&i| movement_hits(collider, start, *attempt, &entities[i]))
        })
        .unwrap_or(Vec3::ZERO)
}
