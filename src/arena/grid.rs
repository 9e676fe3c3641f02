//! Static arena grid.
//!
//! Cells are one world unit wide. Cell `(col, row)` is centred at
//! `x = col`, `z = row`; rows grow towards +Z.
use arrayvec::ArrayVec;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

impl Cell {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    walls: Vec<bool>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            walls: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.col < self.width && cell.row < self.height
    }

    pub fn set_wall(&mut self, cell: Cell) {
        if self.in_bounds(cell) {
            self.walls[cell.row * self.width + cell.col] = true;
        }
    }

    /// Out-of-bounds cells count as walls.
    pub fn is_wall(&self, cell: Cell) -> bool {
        !self.in_bounds(cell) || self.walls[cell.row * self.width + cell.col]
    }

    /// World-space centre of `cell`.
    pub fn center(&self, cell: Cell) -> Vec3 {
        Vec3::new(cell.col as f32, 0.0, cell.row as f32)
    }

    /// Cell containing `position`, if it lies on the grid.
    pub fn cell_at(&self, position: Vec3) -> Option<Cell> {
        let col = (position.x + 0.5).floor();
        let row = (position.z + 0.5).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let cell = Cell::new(col as usize, row as usize);
        self.in_bounds(cell).then_some(cell)
    }

    /// The cell one step away in direction `(dx, dz)`, if on the grid.
    pub fn offset(&self, cell: Cell, dx: i32, dz: i32) -> Option<Cell> {
        let col = cell.col.checked_add_signed(dx as isize)?;
        let row = cell.row.checked_add_signed(dz as isize)?;
        let next = Cell::new(col, row);
        self.in_bounds(next).then_some(next)
    }

    /// Non-wall cells sharing an edge with `cell`: up, down, left, right.
    pub fn open_neighbours(&self, cell: Cell) -> ArrayVec<Cell, 4> {
        let mut out = ArrayVec::new();
        for (dx, dz) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            if let Some(next) = self.offset(cell, dx, dz) {
                if !self.is_wall(next) {
                    out.push(next);
                }
            }
        }
        out
    }
}
