//! Messages exchanged between the engine and its collaborators.
//!
//! Submodules:
//! - [`audio`] – commands and messages for the background audio thread
//! - [`collision`] – contacts reported by the move pass
//! - [`scene`] – scene change and quit requests raised during a frame
pub mod audio;
pub mod collision;
pub mod scene;
