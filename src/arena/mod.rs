//! The bundled bomb arena game: grid, level files and scene directors.
//!
//! Submodules:
//! - [`grid`] – static wall grid and cell arithmetic
//! - [`layout`] – level files (`<levels_dir>/<name>.json`)
//! - [`director`] – per-scene logic reached by entities as scene tools
pub mod director;
pub mod grid;
pub mod layout;

pub use director::{ArenaDirector, Hud, MenuDirector};
pub use grid::{Cell, Grid};
pub use layout::{LevelLayout, Tile};

/// Collision layers of the arena game.
pub mod layers {
    use crate::components::collider::LayerTag;

    pub const WALL: LayerTag = 0;
    pub const BOX: LayerTag = 1;
    pub const PLAYER: LayerTag = 2;
    /// Player during its post-hit cooldown.
    pub const PLAYER_SPECIAL: LayerTag = 3;
    pub const ENEMY: LayerTag = 4;
    pub const ENEMY_SPECIAL: LayerTag = 5;
    pub const BOMB: LayerTag = 6;
    pub const EXPLOSION: LayerTag = 7;
    pub const PERK: LayerTag = 8;
    pub const PORTAL: LayerTag = 9;

    pub const COUNT: usize = 10;

    /// Layer pairs that never block each other.
    pub const DISABLED_PAIRS: [(LayerTag, LayerTag); 5] = [
        (BOMB, EXPLOSION),
        (PLAYER_SPECIAL, ENEMY),
        (ENEMY, ENEMY),
        (PERK, ENEMY),
        (EXPLOSION, WALL),
    ];
}
