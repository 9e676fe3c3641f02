//! Data carried by every entity.
//!
//! Submodules overview:
//! - [`appearance`] – model name, colour tint and animation state for the renderer
//! - [`collider`] – rectangle or circle footprint on the ground plane, layer and trigger flag
//! - [`health`] – hit points, damage cooldown and the layer swap that goes with it
//! - [`transform`] – position, euler rotation and scale

pub mod appearance;
pub mod collider;
pub mod health;
pub mod transform;
