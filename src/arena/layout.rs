//! Level files.
//!
//! A level is a JSON document:
//!
//! ```json
//! {
//!   "rows": ["#####", "#P.b#", "#####"],
//!   "music": "assets/music/forest.ogg",
//!   "perk_probability": 30,
//!   "next_scene": "desert"
//! }
//! ```
//!
//! Row `r`, column `c` of `rows` is grid cell `(c, r)`.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::arena::grid::{Cell, Grid};
use crate::error::SceneLoadError;

/// What a layout character places in its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Wall,
    Box,
    /// Box hiding the level's exit portal.
    PortalBox,
    Player,
    Chaser,
    Wanderer,
}

impl Tile {
    pub fn from_char(c: char) -> Option<Tile> {
        match c {
            '.' | ' ' => Some(Tile::Floor),
            '#' => Some(Tile::Wall),
            'b' => Some(Tile::Box),
            'x' => Some(Tile::PortalBox),
            'P' => Some(Tile::Player),
            'E' => Some(Tile::Chaser),
            'e' => Some(Tile::Wanderer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub rows: Vec<String>,
    #[serde(default)]
    pub music: Option<String>,
    /// Chance in percent that a destroyed box drops a perk.
    #[serde(default)]
    pub perk_probability: u8,
    #[serde(default)]
    pub next_scene: Option<String>,
    #[serde(default)]
    pub skybox: Option<String>,
}

impl LevelLayout {
    pub fn from_file(path: &Path) -> Result<Self, SceneLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneLoadError::Asset {
            path: path.to_path_buf(),
            source,
        })?;
        let layout: LevelLayout =
            serde_json::from_str(&text).map_err(|source| SceneLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.chars().count())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Rectangular, known characters only, exactly one player, and a
    /// percentage that makes sense.
    pub fn validate(&self) -> Result<(), SceneLoadError> {
        let width = self.width();
        if width == 0 {
            return Err(SceneLoadError::InvalidLayout("level has no cells".into()));
        }
        let mut players = 0;
        for (row, line) in self.rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(SceneLoadError::InvalidLayout(format!(
                    "row {row} is {} cells wide, expected {width}",
                    line.chars().count()
                )));
            }
            for (col, c) in line.chars().enumerate() {
                match Tile::from_char(c) {
                    Some(Tile::Player) => players += 1,
                    Some(_) => {}
                    None => {
                        return Err(SceneLoadError::InvalidLayout(format!(
                            "unknown character '{c}' at ({col}, {row})"
                        )));
                    }
                }
            }
        }
        if players != 1 {
            return Err(SceneLoadError::InvalidLayout(format!(
                "expected exactly one player, found {players}"
            )));
        }
        if self.perk_probability > 100 {
            return Err(SceneLoadError::InvalidLayout(format!(
                "perk_probability {} is above 100",
                self.perk_probability
            )));
        }
        Ok(())
    }

    /// Every cell with its tile, row by row. Unknown characters read as
    /// floor; call [`validate`](Self::validate) first to reject them.
    pub fn tiles(&self) -> impl Iterator<Item = (Cell, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, line)| {
            line.chars()
                .enumerate()
                .map(move |(col, c)| (Cell::new(col, row), Tile::from_char(c).unwrap_or(Tile::Floor)))
        })
    }

    /// The static wall grid of this level.
    pub fn grid(&self) -> Grid {
        let mut grid = Grid::new(self.width(), self.height());
        for (cell, tile) in self.tiles() {
            if tile == Tile::Wall {
                grid.set_wall(cell);
            }
        }
        grid
    }
}
