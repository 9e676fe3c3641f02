//! arenacore main entry point.
//!
//! Runs the bundled bomb arena game headless:
//! - a logging renderer stands in for the 3D renderer
//! - keyboard input is replayed from an optional JSON script
//! - audio commands go to the audio thread, driving a logging device
//!
//! # Project Structure
//!
//! - [`actors`] – player, bombs, boxes, explosions, perks, portal, enemies
//! - [`arena`] – level grid, level files, scene directors, collision layers
//! - [`components`] – transform, collider, health, appearance
//! - [`engine`] – the game loop
//! - [`scenemanager`] / [`sceneloader`] – live scene frame pass, background loads
//! - [`resources`] – config, input, world time, collision table, audio
//! - [`systems`] – collision resolver, pathfinding, time, input, audio thread
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (defaults when missing) and apply CLI overrides
//! 2. Build the engine; the starting scene is built synchronously
//! 3. Tick until the frame limit, a quit request or the end of input
//! 4. Shut down the audio thread
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --scene forest --frames 300
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use arenacore::engine::GameEngine;
use arenacore::game::{BombArena, Game};
use arenacore::platform::{HeadlessRenderer, LogAudioDevice, ScriptedInput};
use arenacore::resources::audio::{setup_audio, shutdown_audio};
use arenacore::resources::gameconfig::GameConfig;
use arenacore::systems::audio::poll_audio_messages;
use clap::Parser;
use log::{error, info, warn};

/// Headless bomb arena
#[derive(Parser)]
#[command(version, about = "Runs the bomb arena simulation core headless.")]
struct Cli {
    /// Configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Stop after this many frames.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Name of the starting scene.
    #[arg(long, value_name = "NAME")]
    scene: Option<String>,

    /// JSON input script of `{frame, key, pressed}` events.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Simulate a fixed step instead of the measured frame time.
    #[arg(long, value_name = "SECONDS")]
    fixed_dt: Option<f32>,

    /// Seed for gameplay randomness.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the scene names and exit.
    #[arg(long)]
    list_scenes: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    if cli.config.exists() {
        if let Err(e) = config.load_from_file() {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    } else {
        warn!("config file {:?} not found, using defaults", cli.config);
    }
    if cli.scene.is_some() {
        config.starting_scene = cli.scene.clone();
    }
    if cli.fixed_dt.is_some() {
        config.fixed_delta = cli.fixed_dt;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let game = BombArena::new(config.levels_dir.clone());
    if cli.list_scenes {
        for (index, name) in game.scene_names().iter().enumerate() {
            println!("{index}: {name}");
        }
        return ExitCode::SUCCESS;
    }

    let mut input = match &cli.script {
        Some(path) => match ScriptedInput::from_file(path) {
            Ok(script) => script,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => ScriptedInput::default(),
    };

    let mut engine = match GameEngine::new(Arc::new(game), config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut audio = setup_audio(Box::new(LogAudioDevice));
    let mut renderer = HeadlessRenderer::new(60);
    let frames = engine.run(Some(cli.frames), &mut input, &mut audio, &mut renderer);
    poll_audio_messages(&audio);
    shutdown_audio(audio);

    info!(
        "ran {} frames, final scene '{}'",
        frames,
        engine.scene().name
    );
    ExitCode::SUCCESS
}
