//! arenacore library.
//!
//! The real-time simulation core of a 3D arena-action game: entities with
//! 2D colliders on the ground plane, a swept collision resolver with layer
//! rules, a per-frame scene manager, a background scene loader and the game
//! loop that ties them together. The bundled [`game::BombArena`] game runs
//! on top of it.
//!
//! Rendering, audio playback and input devices stay outside; see
//! [`platform`] for the interfaces the engine drives.

pub mod actors;
pub mod arena;
pub mod components;
pub mod context;
pub mod engine;
pub mod entity;
pub mod error;
pub mod events;
pub mod game;
pub mod platform;
pub mod resources;
pub mod scene;
pub mod sceneloader;
pub mod scenemanager;
pub mod systems;
