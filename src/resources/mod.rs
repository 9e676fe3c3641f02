//! Long-lived state owned by the engine and lent to each frame.
//!
//! Overview
//! - `audio` – frame-side audio manager and the bridge to the audio thread
//! - `collisiontable` – which layer pairs block each other
//! - `gameconfig` – INI-backed engine settings
//! - `input` – per-frame keyboard state and key bindings
//! - `worldtime` – simulation time and delta
pub mod audio;
pub mod collisiontable;
pub mod gameconfig;
pub mod input;
pub mod worldtime;
