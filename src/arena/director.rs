//! Scene directors.
//!
//! A director rides on the scene camera and runs once per frame before the
//! entity updates. [`ArenaDirector`] is what arena actors reach as their
//! scene tools: it knows the wall grid, where boxes, bombs and the player
//! are this frame, places bombs and explosions, and turns level success or
//! the player's death into a scene request. [`MenuDirector`] only waits for
//! a key.
use glam::Vec3;
use log::{debug, info};
use rustc_hash::FxHashSet;

use crate::actors::{Bomb, Explosion, PerkKind};
use crate::arena::grid::{Cell, Grid};
use crate::context::Spawner;
use crate::entity::{Entity, EntityId, EntityKind};
use crate::events::scene::SceneRequest;
use crate::resources::input::{InputState, Key};
use crate::systems::pathfinding::shortest_path;

/// Seconds between two enemy path refreshes.
pub const AI_REFRESH_INTERVAL: f32 = 0.5;
/// Delay between reaching the portal and loading the next scene.
pub const SUCCESS_DELAY: f32 = 1.0;
/// Delay between the player's death and returning to the menu.
pub const DEFEAT_DELAY: f32 = 2.0;
/// Scene index of the main menu.
pub const MENU_SCENE: usize = 0;

/// Player values shown on the heads-up display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hud {
    pub hp: u32,
    pub speed: f32,
    pub max_bombs: usize,
    pub range: usize,
    pub kick: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    Playing,
    Succeeded { remaining: f32 },
    Defeated { remaining: f32 },
    Resolved,
}

#[derive(Debug)]
pub struct ArenaDirector {
    grid: Grid,
    boxes: FxHashSet<Cell>,
    bombs: FxHashSet<Cell>,
    player: Option<(EntityId, Cell)>,
    hud: Hud,
    ai_timer: f32,
    refresh_ai: bool,
    outcome: Outcome,
    this_scene: usize,
    next_scene: Option<usize>,
    perk_probability: u8,
    kick_dropped: bool,
    request: Option<SceneRequest>,
}

impl ArenaDirector {
    pub fn new(grid: Grid, this_scene: usize, next_scene: Option<usize>, perk_probability: u8) -> Self {
        Self {
            grid,
            boxes: FxHashSet::default(),
            bombs: FxHashSet::default(),
            player: None,
            hud: Hud::default(),
            ai_timer: 0.0,
            refresh_ai: false,
            outcome: Outcome::Playing,
            this_scene,
            next_scene,
            perk_probability: perk_probability.min(100),
            kick_dropped: false,
            request: None,
        }
    }

    pub fn begin_frame(&mut self, entities: &[Entity], input: &InputState, dt: f32) {
        self.refresh_occupancy(entities);

        self.ai_timer -= dt;
        self.refresh_ai = self.ai_timer <= 0.0;
        if self.refresh_ai {
            self.ai_timer = AI_REFRESH_INTERVAL;
        }

        self.outcome = match self.outcome {
            Outcome::Succeeded { remaining } if remaining - dt <= 0.0 => {
                let target = self.next_scene.unwrap_or(MENU_SCENE);
                info!("level {} cleared, loading scene {}", self.this_scene, target);
                self.request(SceneRequest::Load(target));
                Outcome::Resolved
            }
            Outcome::Succeeded { remaining } => Outcome::Succeeded {
                remaining: remaining - dt,
            },
            Outcome::Defeated { remaining } if remaining - dt <= 0.0 => {
                info!("player defeated in scene {}, back to the menu", self.this_scene);
                self.request(SceneRequest::Load(MENU_SCENE));
                Outcome::Resolved
            }
            Outcome::Defeated { remaining } => Outcome::Defeated {
                remaining: remaining - dt,
            },
            other => other,
        };

        if input.is_key_just_pressed(Key::Escape) {
            self.request(SceneRequest::Load(MENU_SCENE));
        } else if input.is_key_just_pressed(Key::R) {
            self.request(SceneRequest::Load(self.this_scene));
        }
    }

    /// Record where boxes, bombs and the player stand right now.
    pub fn refresh_occupancy(&mut self, entities: &[Entity]) {
        self.boxes.clear();
        self.bombs.clear();
        self.player = None;
        for entity in entities.iter().filter(|e| !e.is_flagged()) {
            let Some(cell) = self.grid.cell_at(entity.position()) else {
                continue;
            };
            match entity.kind() {
                EntityKind::Box => {
                    self.boxes.insert(cell);
                }
                EntityKind::Bomb => {
                    self.bombs.insert(cell);
                }
                EntityKind::Player if self.player.is_none() => {
                    self.player = Some((entity.id(), cell));
                }
                _ => {}
            }
        }
    }

    fn request(&mut self, request: SceneRequest) {
        if self.request.is_none() {
            self.request = Some(request);
        }
    }

    pub fn take_request(&mut self) -> Option<SceneRequest> {
        self.request.take()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn tell_player_hp(&mut self, hp: u32) {
        self.hud.hp = hp;
    }

    pub fn set_perk_values(&mut self, speed: f32, max_bombs: usize, range: usize, kick: bool) {
        self.hud.speed = speed;
        self.hud.max_bombs = max_bombs;
        self.hud.range = range;
        self.hud.kick = kick;
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player.map(|(id, _)| id)
    }

    pub fn player_cell(&self) -> Option<Cell> {
        self.player.map(|(_, cell)| cell)
    }

    /// True on the frames enemies should recompute their paths.
    pub fn refresh_ai(&self) -> bool {
        self.refresh_ai
    }

    pub fn perk_probability(&self) -> u8 {
        self.perk_probability
    }

    pub fn is_box(&self, cell: Cell) -> bool {
        self.boxes.contains(&cell)
    }

    pub fn is_bomb(&self, cell: Cell) -> bool {
        self.bombs.contains(&cell)
    }

    /// Whether `cell` is free of walls, boxes and bombs.
    pub fn can_put_bomb(&self, cell: Cell) -> bool {
        !self.grid.is_wall(cell) && !self.is_box(cell) && !self.is_bomb(cell)
    }

    pub fn can_put_bomb_at(&self, position: Vec3) -> bool {
        self.grid
            .cell_at(position)
            .is_some_and(|cell| self.can_put_bomb(cell))
    }

    /// Place a bomb in the cell containing `position`.
    ///
    /// Returns `false` when the cell is off the grid or already taken.
    pub fn put_bomb(&mut self, spawner: &mut Spawner, position: Vec3, fuse: f32, range: usize) -> bool {
        let Some(cell) = self.grid.cell_at(position) else {
            return false;
        };
        if !self.can_put_bomb(cell) {
            return false;
        }
        self.bombs.insert(cell);
        let id = spawner.add_new_entity(Bomb::entity(self.grid.center(cell), fuse, range));
        debug!("bomb #{} placed at ({}, {})", id, cell.col, cell.row);
        true
    }

    /// Fill the cross of `range` cells around `position` with explosions.
    ///
    /// Each arm stops before a wall and right after the first box or bomb.
    /// Returns the number of explosions placed.
    pub fn put_explosion(&mut self, spawner: &mut Spawner, position: Vec3, range: usize) -> usize {
        let Some(center) = self.grid.cell_at(position) else {
            return 0;
        };
        spawner.add_new_entity(Explosion::entity(self.grid.center(center)));
        let mut placed = 1;
        for (dx, dz) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            let mut cell = center;
            for _ in 0..range {
                match self.grid.offset(cell, dx, dz) {
                    Some(next) if !self.grid.is_wall(next) => cell = next,
                    _ => break,
                }
                spawner.add_new_entity(Explosion::entity(self.grid.center(cell)));
                placed += 1;
                if self.is_box(cell) || self.is_bomb(cell) {
                    break;
                }
            }
        }
        placed
    }

    /// Pick the type of a dropped perk. The kick perk drops at most once per
    /// scene.
    pub fn roll_perk(&mut self, rng: &mut fastrand::Rng) -> PerkKind {
        let kind = PerkKind::roll(rng, !self.kick_dropped);
        if kind == PerkKind::Kick {
            self.kick_dropped = true;
        }
        kind
    }

    /// Shortest walkable path from `from` to the player's cell, avoiding
    /// boxes and bombs. Excludes `from`, ends on the player's cell.
    pub fn chase_path(&self, from: Cell) -> Option<Vec<Cell>> {
        let goal = self.player_cell()?;
        shortest_path(&self.grid, from, goal, |cell| self.is_box(cell) || self.is_bomb(cell))
    }

    /// A random open neighbour of `cell` without box or bomb.
    pub fn random_free_neighbour(&self, cell: Cell, rng: &mut fastrand::Rng) -> Option<Cell> {
        let free: Vec<Cell> = self
            .grid
            .open_neighbours(cell)
            .into_iter()
            .filter(|c| !self.is_box(*c) && !self.is_bomb(*c))
            .collect();
        if free.is_empty() {
            None
        } else {
            Some(free[rng.usize(..free.len())])
        }
    }

    /// The player reached the portal. Only the first call counts.
    pub fn level_succeeded(&mut self) {
        if self.outcome == Outcome::Playing {
            info!("portal reached in scene {}", self.this_scene);
            self.outcome = Outcome::Succeeded {
                remaining: SUCCESS_DELAY,
            };
        }
    }

    pub fn player_died(&mut self) {
        if self.outcome == Outcome::Playing {
            self.outcome = Outcome::Defeated {
                remaining: DEFEAT_DELAY,
            };
        }
    }

    /// True between the portal being reached and the next scene request.
    pub fn is_level_succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded { .. })
    }
}

/// Main menu: `Enter` or `Space` starts the first level, `Escape` quits.
#[derive(Debug)]
pub struct MenuDirector {
    first_level: usize,
    request: Option<SceneRequest>,
}

impl MenuDirector {
    pub fn new(first_level: usize) -> Self {
        Self {
            first_level,
            request: None,
        }
    }

    pub fn begin_frame(&mut self, input: &InputState) {
        if self.request.is_some() {
            return;
        }
        if input.is_key_just_pressed(Key::Enter) || input.is_key_just_pressed(Key::Space) {
            self.request = Some(SceneRequest::Load(self.first_level));
        } else if input.is_key_just_pressed(Key::Escape) {
            self.request = Some(SceneRequest::Quit);
        }
    }

    pub fn take_request(&mut self) -> Option<SceneRequest> {
        self.request.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{BoxBlock, Player};
    use crate::arena::layout::LevelLayout;

    fn director(rows: &[&str]) -> ArenaDirector {
        let layout = LevelLayout {
            rows: rows.iter().map(|r| r.to_string()).collect(),
            music: None,
            perk_probability: 0,
            next_scene: None,
            skybox: None,
        };
        ArenaDirector::new(layout.grid(), 1, Some(2), 0)
    }

    fn assigned(mut entities: Vec<Entity>) -> Vec<Entity> {
        for (i, e) in entities.iter_mut().enumerate() {
            e.core.id = EntityId(i as u64 + 1);
        }
        entities
    }

    #[test]
    fn test_explosion_cross_stops_at_walls_and_boxes() {
        let mut arena = director(&[
            "#######", //
            "#.....#",
            "#..P.b#",
            "#.....#",
            "#######",
        ]);
        let entities = assigned(vec![
            Player::entity(Vec3::new(3.0, 0.0, 2.0)),
            BoxBlock::entity(Vec3::new(4.0, 0.0, 2.0), false),
        ]);
        arena.refresh_occupancy(&entities);

        let mut spawner = Spawner::new();
        // Centre (2,2) with range 3: up 1 (wall after), down 1, left 1,
        // right stops on the box at (4,2) after (3,2).
        let placed = arena.put_explosion(&mut spawner, Vec3::new(2.0, 0.0, 2.0), 3);
        assert_eq!(placed, 1 + 1 + 1 + 1 + 2);
        assert!(spawner.pending().iter().all(|e| e.kind() == EntityKind::Explosion));
        let xs: Vec<f32> = spawner.pending().iter().map(|e| e.position().x).collect();
        assert!(!xs.contains(&5.0));
    }

    #[test]
    fn test_put_bomb_refuses_taken_cells() {
        let mut arena = director(&["#####", "#P.b#", "#####"]);
        let entities = assigned(vec![BoxBlock::entity(Vec3::new(3.0, 0.0, 1.0), false)]);
        arena.refresh_occupancy(&entities);
        let mut spawner = Spawner::new();

        assert!(arena.put_bomb(&mut spawner, Vec3::new(1.1, 0.0, 0.9), 2.5, 2));
        assert!(!arena.put_bomb(&mut spawner, Vec3::new(1.0, 0.0, 1.0), 2.5, 2));
        assert!(!arena.put_bomb(&mut spawner, Vec3::new(3.0, 0.0, 1.0), 2.5, 2));
        assert!(!arena.put_bomb(&mut spawner, Vec3::new(0.0, 0.0, 1.0), 2.5, 2));
        assert_eq!(spawner.pending().len(), 1);
        assert_eq!(spawner.pending()[0].position(), Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_success_requests_next_scene_after_delay() {
        let mut arena = director(&["###", "#P#", "###"]);
        let input = InputState::default();
        arena.level_succeeded();
        arena.player_died();
        arena.begin_frame(&[], &input, 0.6);
        assert_eq!(arena.take_request(), None);
        arena.begin_frame(&[], &input, 0.6);
        assert_eq!(arena.take_request(), Some(SceneRequest::Load(2)));
        arena.begin_frame(&[], &input, 5.0);
        assert_eq!(arena.take_request(), None);
    }

    #[test]
    fn test_escape_and_restart_keys() {
        let mut arena = director(&["###", "#P#", "###"]);
        let mut input = InputState::default();
        input.button_state_changed(Key::R, true);
        arena.begin_frame(&[], &input, 0.016);
        assert_eq!(arena.take_request(), Some(SceneRequest::Load(1)));

        input.advance_frame();
        input.button_state_changed(Key::Escape, true);
        arena.begin_frame(&[], &input, 0.016);
        assert_eq!(arena.take_request(), Some(SceneRequest::Load(MENU_SCENE)));
    }

    #[test]
    fn test_ai_refresh_ticks() {
        let mut arena = director(&["###", "#P#", "###"]);
        let input = InputState::default();
        arena.begin_frame(&[], &input, 0.1);
        assert!(arena.refresh_ai());
        arena.begin_frame(&[], &input, 0.1);
        assert!(!arena.refresh_ai());
        arena.begin_frame(&[], &input, 0.45);
        assert!(arena.refresh_ai());
    }

    #[test]
    fn test_kick_perk_drops_once() {
        let mut arena = director(&["###", "#P#", "###"]);
        let mut rng = fastrand::Rng::with_seed(7);
        let kicks = (0..200)
            .filter(|_| arena.roll_perk(&mut rng) == PerkKind::Kick)
            .count();
        assert_eq!(kicks, 1);
    }

    #[test]
    fn test_chase_path_avoids_boxes() {
        let mut arena = director(&[
            "#####", //
            "#P..#",
            "#.#b#",
            "#...#",
            "#####",
        ]);
        let entities = assigned(vec![
            Player::entity(Vec3::new(1.0, 0.0, 1.0)),
            BoxBlock::entity(Vec3::new(3.0, 0.0, 2.0), false),
        ]);
        arena.refresh_occupancy(&entities);
        let path = arena.chase_path(Cell::new(3, 3)).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(&Cell::new(1, 1)));
        assert!(!path.contains(&Cell::new(3, 2)));
    }

    #[test]
    fn test_menu_keys() {
        let mut menu = MenuDirector::new(1);
        let mut input = InputState::default();
        input.button_state_changed(Key::Enter, true);
        menu.begin_frame(&input);
        assert_eq!(menu.take_request(), Some(SceneRequest::Load(1)));

        input.advance_frame();
        menu.begin_frame(&input);
        assert_eq!(menu.take_request(), None);

        input.button_state_changed(Key::Escape, true);
        menu.begin_frame(&input);
        assert_eq!(menu.take_request(), Some(SceneRequest::Quit));
    }
}
