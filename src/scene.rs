//! Scene data: camera, light, skybox and the live entity list.
//!
//! A [`Scene`] is built in one piece, usually on the loader thread, and
//! then handed to the scene manager as a whole. The camera may carry a
//! [`SceneDirector`], the scene-level logic that entities reach as their
//! scene tools.
use glam::Vec3;
use log::debug;

use crate::arena::director::{ArenaDirector, MenuDirector};
use crate::context::Spawner;
use crate::entity::{Entity, EntityId};
use crate::error::SceneLoadError;
use crate::events::scene::SceneRequest;
use crate::platform::RenderFrame;
use crate::resources::collisiontable::CollisionTable;
use crate::resources::input::InputState;
use crate::systems::collision::InitialCollisionMap;

/// Scene-level logic attached to the camera.
#[derive(Debug)]
pub enum SceneDirector {
    Menu(MenuDirector),
    Arena(ArenaDirector),
}

impl SceneDirector {
    /// Runs once per frame before entity updates.
    pub fn begin_frame(&mut self, entities: &[Entity], input: &InputState, dt: f32) {
        match self {
            SceneDirector::Menu(menu) => menu.begin_frame(input),
            SceneDirector::Arena(arena) => arena.begin_frame(entities, input, dt),
        }
    }

    pub fn take_request(&mut self) -> Option<SceneRequest> {
        match self {
            SceneDirector::Menu(menu) => menu.take_request(),
            SceneDirector::Arena(arena) => arena.take_request(),
        }
    }

    pub fn as_arena(&self) -> Option<&ArenaDirector> {
        match self {
            SceneDirector::Arena(arena) => Some(arena),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub director: Option<SceneDirector>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fovy: 45.0,
            director: None,
        }
    }
}

impl Camera {
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Self::default()
        }
    }

    pub fn with_director(mut self, director: SceneDirector) -> Self {
        self.director = Some(director);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 20.0, 0.0),
            color: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skybox {
    pub texture: Option<String>,
}

/// Everything that is live (or staged) together.
#[derive(Debug)]
pub struct Scene {
    pub index: usize,
    pub name: String,
    pub camera: Camera,
    pub light: Light,
    pub skybox: Skybox,
    pub entities: Vec<Entity>,
    pub spawner: Spawner,
    /// Music asset path started when the scene goes live.
    pub music: Option<String>,
    /// Sound names loaded when the scene goes live.
    pub needed_sounds: Vec<String>,
    pub initial_collisions: InitialCollisionMap,
}

impl Scene {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            camera: Camera::default(),
            light: Light::default(),
            skybox: Skybox::default(),
            entities: Vec::new(),
            spawner: Spawner::new(),
            music: None,
            needed_sounds: Vec::new(),
            initial_collisions: InitialCollisionMap::default(),
        }
    }

    /// Add an entity during scene construction. It is live from the first
    /// frame the scene runs.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.spawner.assign_id();
        entity.core.id = id;
        debug!("scene '{}': spawned {:?} #{}", self.name, entity.kind(), id);
        self.entities.push(entity);
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn director(&self) -> Option<&SceneDirector> {
        self.camera.director.as_ref()
    }

    /// Check every collider and damage layer against the table's range.
    pub fn validate(&self, layer_count: usize) -> Result<(), SceneLoadError> {
        self.entities
            .iter()
            .chain(self.spawner.pending())
            .try_for_each(|entity| check_layers(entity, layer_count))
    }

    /// Draw data for the render collaborator.
    pub fn render_frame(&self, frame: u64) -> RenderFrame<'_> {
        RenderFrame {
            frame,
            scene_index: self.index,
            scene_name: &self.name,
            camera: &self.camera,
            light: &self.light,
            skybox: &self.skybox,
            entities: &self.entities,
        }
    }

    /// Validate the scene and record its initial blocking overlaps.
    pub fn prepare(&mut self, table: &CollisionTable) -> Result<(), SceneLoadError> {
        self.validate(table.layer_count())?;
        self.initial_collisions.rebuild(&self.entities, table);
        Ok(())
    }
}

/// Every layer `entity` can occupy, including its damaged layer, must exist.
pub fn check_layers(entity: &Entity, layer_count: usize) -> Result<(), SceneLoadError> {
    let mut layers = vec![entity.collider().layer()];
    if let Some(target) = entity.damageable() {
        layers.push(target.health().base_layer());
        layers.push(target.health().damaged_layer());
    }
    match layers.into_iter().find(|&l| l >= layer_count) {
        Some(layer) => Err(SceneLoadError::InvalidLayer {
            name: entity.name().to_string(),
            layer,
            layer_count,
        }),
        None => Ok(()),
    }
}
