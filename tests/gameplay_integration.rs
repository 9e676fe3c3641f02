//! Arena gameplay integration tests: a full bomb cycle that reveals the
//! portal and clears the level, enemy contact damage, and the restart and
//! menu keys. Everything runs through `GameEngine::tick`.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;
use tempfile::TempDir;

use arenacore::arena::director::ArenaDirector;
use arenacore::engine::GameEngine;
use arenacore::entity::{Entity, EntityId, EntityKind};
use arenacore::game::BombArena;
use arenacore::platform::{HeadlessRenderer, InputEvent, RecordingAudio, ScriptedInput};
use arenacore::resources::gameconfig::GameConfig;
use arenacore::resources::input::Key;
use arenacore::scene::SceneDirector;

const DT: f32 = 0.1;

struct Driver {
    engine: GameEngine,
    input: ScriptedInput,
    audio: RecordingAudio,
    renderer: HeadlessRenderer,
    _levels: TempDir,
}

impl Driver {
    fn new(level: &str) -> Self {
        let levels = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(levels.path().join("forest.json")).unwrap();
        file.write_all(level.as_bytes()).unwrap();

        let mut config = GameConfig::new();
        config.levels_dir = levels.path().to_path_buf();
        config.starting_scene = Some("forest".into());
        config.seed = Some(7);
        let game = BombArena::new(config.levels_dir.clone());
        Self {
            engine: GameEngine::new(Arc::new(game), config).unwrap(),
            input: ScriptedInput::default(),
            audio: RecordingAudio::default(),
            renderer: HeadlessRenderer::new(0),
            _levels: levels,
        }
    }

    /// Key transition applied on the next tick.
    fn key(&mut self, key: Key, pressed: bool) {
        self.input = ScriptedInput::new(vec![InputEvent {
            frame: self.engine.frame_count(),
            key,
            pressed,
        }]);
    }

    fn tick(&mut self, dt: f32) {
        self.engine
            .tick(dt, &mut self.input, &mut self.audio, &mut self.renderer);
    }

    fn ticks(&mut self, count: usize) {
        for _ in 0..count {
            self.tick(DT);
        }
    }

    fn tick_until(&mut self, done: impl Fn(&GameEngine) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(&self.engine) {
            assert!(Instant::now() < deadline, "timed out");
            self.tick(DT);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn count(&self, kind: EntityKind) -> usize {
        self.engine
            .scene()
            .entities
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    fn player(&self) -> &Entity {
        self.engine
            .scene()
            .entities
            .iter()
            .find(|e| e.kind() == EntityKind::Player)
            .unwrap()
    }

    fn player_hp(&self) -> u32 {
        self.player().damageable().unwrap().health().hp()
    }

    fn arena(&self) -> &ArenaDirector {
        self.engine
            .scene()
            .director()
            .and_then(SceneDirector::as_arena)
            .unwrap()
    }

    fn played(&self, name: &str) -> bool {
        self.audio.played_sounds().any(|s| s.starts_with(name))
    }
}

fn level(rows: &[&str]) -> String {
    let rows: Vec<String> = rows.iter().map(|r| format!("\"{r}\"")).collect();
    format!(
        "{{\"rows\": [{}], \"music\": \"assets/music/forest.ogg\", \"perk_probability\": 0}}",
        rows.join(", ")
    )
}

#[test]
fn test_bomb_reveals_portal_and_portal_clears_level() {
    let mut driver = Driver::new(&level(&["#####", "#P.x#", "#####"]));
    assert_eq!(driver.count(EntityKind::Box), 1);

    driver.key(Key::Space, true);
    driver.tick(DT);
    driver.key(Key::Space, false);
    driver.tick(DT);
    assert_eq!(driver.count(EntityKind::Bomb), 1);
    assert!(driver.played("put_bomb"));

    // Fuse, explosion, burning box, portal.
    driver.ticks(60);
    assert_eq!(driver.count(EntityKind::Bomb), 0);
    assert_eq!(driver.count(EntityKind::Explosion), 0);
    assert_eq!(driver.count(EntityKind::Box), 0);
    assert_eq!(driver.count(EntityKind::Portal), 1);
    assert_eq!(driver.player_hp(), 2);
    assert_eq!(driver.arena().hud().hp, 2);
    assert!(driver.played("burn_player"));
    assert!(driver.played("portal_spawn"));

    // Step onto the portal centre.
    let id: EntityId = driver.player().id();
    driver
        .engine
        .manager_mut()
        .scene_mut()
        .entity_mut(id)
        .unwrap()
        .core
        .transform
        .position = Vec3::new(2.95, 0.0, 1.0);
    driver.key(Key::D, true);
    driver.tick(0.05 / 6.0);
    driver.key(Key::D, false);
    assert!(driver.arena().is_level_succeeded());

    driver.tick_until(|engine| engine.scene().name == "main_menu");
}

#[test]
fn test_chaser_hurts_player_once_per_cooldown() {
    let mut driver = Driver::new(&level(&["######", "#P..E#", "######"]));
    driver.tick_until(|engine| {
        engine
            .scene()
            .entities
            .iter()
            .find(|e| e.kind() == EntityKind::Player)
            .and_then(Entity::damageable)
            .is_some_and(|d| d.health().hp() < 3)
    });
    assert_eq!(driver.player_hp(), 2);
    assert!(driver.player().damageable().unwrap().health().is_damaged());

    driver.ticks(5);
    assert_eq!(driver.player_hp(), 2);
    assert_eq!(driver.arena().hud().hp, 2);
}

#[test]
fn test_restart_and_menu_keys() {
    let mut driver = Driver::new(&level(&["#####", "#P..#", "#####"]));
    driver.key(Key::D, true);
    driver.ticks(2);
    assert!(driver.player().position().x > 1.5);

    driver.key(Key::D, false);
    driver.tick(DT);
    driver.key(Key::R, true);
    driver.tick_until(|engine| {
        engine
            .scene()
            .entities
            .iter()
            .any(|e| e.kind() == EntityKind::Player && e.position().x == 1.0)
    });
    assert_eq!(driver.engine.scene().name, "forest");

    driver.key(Key::Escape, true);
    driver.tick(DT);
    driver.tick_until(|engine| engine.scene().name == "main_menu");
}
