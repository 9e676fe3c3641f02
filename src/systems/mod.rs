//! Engine systems.
//!
//! Submodules overview
//! - [`audio`] – audio thread and forwarding of queued commands
//! - [`collision`] – overlap tests, swept movement resolution, initial overlaps
//! - [`input`] – poll the input collaborator into [`crate::resources::input::InputState`]
//! - [`pathfinding`] – breadth-first shortest path on the arena grid
//! - [`time`] – update simulation time, measure frame deltas

pub mod audio;
pub mod collision;
pub mod input;
pub mod pathfinding;
pub mod time;
