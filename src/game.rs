//! Game definitions.
//!
//! A [`Game`] tells the engine how many collision layers exist, which layer
//! pairs interact, which scenes it has and how to build each of them. The
//! engine only ever asks for scenes by index; scene building may run on the
//! loader thread, so games must be `Send + Sync`.
//!
//! [`BombArena`] is the bundled game: a main menu built in code and arena
//! levels read from JSON layouts.
use std::path::PathBuf;

use glam::Vec3;
use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::actors::{Actor, BoxBlock, Enemy, EnemyMode, Player, bomb, explosion, perk, player, portal};
use crate::arena::director::{ArenaDirector, MenuDirector};
use crate::arena::layers;
use crate::arena::layout::{LevelLayout, Tile};
use crate::components::appearance::Appearance;
use crate::components::collider::Collider;
use crate::components::transform::Transform;
use crate::entity::Entity;
use crate::error::{ConfigError, SceneLoadError};
use crate::resources::collisiontable::CollisionTable;
use crate::scene::{Camera, Light, Scene, SceneDirector, Skybox};

pub trait Game: Send + Sync {
    /// Number of collision layers; every collider layer must be below it.
    fn layer_count(&self) -> usize;

    /// Switch off the layer pairs that should not interact.
    fn configure_collisions(&self, _table: &mut CollisionTable) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Scene names in index order.
    fn scene_names(&self) -> Vec<String>;

    fn scene_index(&self, name: &str) -> Result<usize, SceneLoadError> {
        self.scene_names()
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| SceneLoadError::UnknownSceneName(name.to_string()))
    }

    /// Build scene `index` from scratch.
    fn load_scene_by_index(&self, index: usize) -> Result<Scene, SceneLoadError>;

    /// Music and sound volume, 0 to 10, used when the config sets none.
    fn starting_volumes(&self) -> (u8, u8) {
        (5, 10)
    }

    /// Sound name to file path.
    fn sounds(&self) -> FxHashMap<String, String> {
        FxHashMap::default()
    }
}

/// Build a collision table sized and configured for `game`.
pub fn collision_table_for(game: &dyn Game) -> Result<CollisionTable, ConfigError> {
    let mut table = CollisionTable::new(game.layer_count())?;
    game.configure_collisions(&mut table)?;
    Ok(table)
}

pub const SCENE_NAMES: [&str; 3] = ["main_menu", "forest", "desert"];
pub const MENU_MUSIC: &str = "assets/music/main_menu.ogg";
const SOUNDS_DIR: &str = "assets/sounds";

/// The bundled arena game.
#[derive(Debug, Clone)]
pub struct BombArena {
    levels_dir: PathBuf,
}

impl BombArena {
    pub fn new(levels_dir: impl Into<PathBuf>) -> Self {
        Self {
            levels_dir: levels_dir.into(),
        }
    }

    pub fn levels_dir(&self) -> &std::path::Path {
        &self.levels_dir
    }

    /// Every sound an arena level may play.
    pub fn arena_sounds() -> impl Iterator<Item = &'static str> {
        player::SOUNDS
            .iter()
            .chain(bomb::SOUNDS)
            .chain(explosion::SOUNDS)
            .chain(perk::SOUNDS)
            .chain(perk::DAMAGE_SOUNDS)
            .chain(portal::SOUNDS)
            .copied()
    }

    fn main_menu(&self) -> Scene {
        let mut scene = Scene::new(0, SCENE_NAMES[0]);
        scene.camera = Camera::looking_at(Vec3::new(0.0, 2.0, 8.0), Vec3::ZERO)
            .with_director(SceneDirector::Menu(MenuDirector::new(1)));
        scene.music = Some(MENU_MUSIC.to_string());
        scene.spawn(Entity::new(
            "Title",
            Transform::at(Vec3::ZERO),
            Collider::rectangle(layers::WALL, 4.0, 1.0),
            Appearance::new("Title"),
            Actor::Wall,
        ));
        scene
    }

    fn level(&self, index: usize, name: &str) -> Result<Scene, SceneLoadError> {
        let path = self.levels_dir.join(format!("{name}.json"));
        let layout = LevelLayout::from_file(&path)?;
        let next_scene = layout
            .next_scene
            .as_deref()
            .map(|next| self.scene_index(next))
            .transpose()?;

        let grid = layout.grid();
        let centre = Vec3::new(
            (grid.width() as f32 - 1.0) / 2.0,
            0.0,
            (grid.height() as f32 - 1.0) / 2.0,
        );
        let span = grid.width().max(grid.height()) as f32;
        let director = ArenaDirector::new(grid, index, next_scene, layout.perk_probability);

        let mut scene = Scene::new(index, name);
        scene.camera = Camera::looking_at(centre + Vec3::new(0.0, span * 0.9, span * 0.6), centre)
            .with_director(SceneDirector::Arena(director));
        scene.light = Light {
            position: centre + Vec3::new(0.0, span, 0.0),
            ..Light::default()
        };
        scene.skybox = Skybox {
            texture: layout.skybox.clone(),
        };
        scene.music = layout.music.clone();
        scene.needed_sounds = Self::arena_sounds().map(String::from).collect();

        for (cell, tile) in layout.tiles() {
            let position = Vec3::new(cell.col as f32, 0.0, cell.row as f32);
            let entity = match tile {
                Tile::Floor => continue,
                Tile::Wall => wall(position),
                Tile::Box => BoxBlock::entity(position, false),
                Tile::PortalBox => BoxBlock::entity(position, true),
                Tile::Player => Player::entity(position),
                Tile::Chaser => Enemy::entity(position, EnemyMode::Chase),
                Tile::Wanderer => Enemy::entity(position, EnemyMode::Wander),
            };
            scene.spawn(entity);
        }
        debug!(
            "level '{}' built from {:?}: {} entities",
            name,
            path,
            scene.entities.len()
        );
        Ok(scene)
    }
}

fn wall(position: Vec3) -> Entity {
    Entity::new(
        "Wall",
        Transform::at(position),
        Collider::rectangle(layers::WALL, 1.0, 1.0),
        Appearance::new("Wall"),
        Actor::Wall,
    )
}

impl Game for BombArena {
    fn layer_count(&self) -> usize {
        layers::COUNT
    }

    fn configure_collisions(&self, table: &mut CollisionTable) -> Result<(), ConfigError> {
        for &(a, b) in layers::DISABLED_PAIRS.iter() {
            table.set_layer_collision(a, b, false)?;
        }
        Ok(())
    }

    fn scene_names(&self) -> Vec<String> {
        SCENE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn load_scene_by_index(&self, index: usize) -> Result<Scene, SceneLoadError> {
        info!("building scene {}", index);
        match SCENE_NAMES.get(index) {
            Some(_) if index == 0 => Ok(self.main_menu()),
            Some(name) => self.level(index, name),
            None => Err(SceneLoadError::UnknownScene(index)),
        }
    }

    fn sounds(&self) -> FxHashMap<String, String> {
        Self::arena_sounds()
            .map(|name| (name.to_string(), format!("{SOUNDS_DIR}/{name}.wav")))
            .collect()
    }
}
