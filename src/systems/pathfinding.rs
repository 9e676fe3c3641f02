//! Breadth-first shortest paths over the arena grid.
//!
//! Every open cell is a node and edges join cells sharing a side, all with
//! the same cost, so BFS yields a shortest path. The visited map doubles as
//! the cycle guard.
use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::arena::grid::{Cell, Grid};

/// Shortest path from `start` to `goal`.
///
/// The returned cells exclude `start` and end with `goal`; an empty path
/// means the two are the same cell. `blocked` marks cells that cannot be
/// entered besides walls (boxes, bombs). The goal itself is always
/// enterable.
pub fn shortest_path(
    grid: &Grid,
    start: Cell,
    goal: Cell,
    blocked: impl Fn(Cell) -> bool,
) -> Option<Vec<Cell>> {
    if start == goal {
        return Some(Vec::new());
    }
    if grid.is_wall(goal) {
        return None;
    }

    let mut came_from: FxHashMap<Cell, Cell> = FxHashMap::default();
    let mut frontier = VecDeque::new();
    came_from.insert(start, start);
    frontier.push_back(start);

    while let Some(current) = frontier.pop_front() {
        if current == goal {
            let mut path = vec![goal];
            let mut step = goal;
            while let Some(&prev) = came_from.get(&step) {
                if prev == start {
                    break;
                }
                path.push(prev);
                step = prev;
            }
            path.reverse();
            return Some(path);
        }
        for next in grid.open_neighbours(current) {
            if came_from.contains_key(&next) || (next != goal && blocked(next)) {
                continue;
            }
            came_from.insert(next, current);
            frontier.push_back(next);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&str]) -> Grid {
        let mut grid = Grid::new(rows[0].len(), rows.len());
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '#' {
                    grid.set_wall(Cell::new(col, row));
                }
            }
        }
        grid
    }

    #[test]
    fn test_path_goes_around_walls() {
        let grid = grid_from(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        let path = shortest_path(&grid, Cell::new(1, 1), Cell::new(3, 3), |_| false).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(&Cell::new(3, 3)));
        for pair in path.windows(2) {
            let d = pair[0].col.abs_diff(pair[1].col) + pair[0].row.abs_diff(pair[1].row);
            assert_eq!(d, 1);
        }
    }

    #[test]
    fn test_blocked_cells_cut_the_path() {
        let grid = grid_from(&["#####", "#...#", "#####"]);
        let blocked = |c: Cell| c == Cell::new(2, 1);
        assert!(shortest_path(&grid, Cell::new(1, 1), Cell::new(3, 1), blocked).is_none());
        let path = shortest_path(&grid, Cell::new(1, 1), Cell::new(2, 1), blocked).unwrap();
        assert_eq!(path, vec![Cell::new(2, 1)]);
    }

    #[test]
    fn test_same_cell_is_an_empty_path() {
        let grid = Grid::new(2, 2);
        assert_eq!(
            shortest_path(&grid, Cell::new(0, 0), Cell::new(0, 0), |_| true),
            Some(Vec::new())
        );
    }
}
