//! The game loop.
//!
//! [`GameEngine`] owns the live scene, the background loader and the frame
//! resources. One [`tick`](GameEngine::tick) is one frame:
//!
//! 1. poll input, advance world time
//! 2. run the scene manager's frame pass
//! 3. collect the director's scene request, poll the loader and swap in a
//!    ready scene, start a retained request once the loader is free
//! 4. forward queued audio commands and hand the frame to the renderer
//!
//! The engine has no global state; everything a frame touches is borrowed
//! out of it for the duration of the pass.
use std::sync::Arc;

use log::{debug, info, warn};

use crate::context::FrameServices;
use crate::error::EngineError;
use crate::events::scene::SceneRequest;
use crate::game::{Game, collision_table_for};
use crate::platform::{AudioSink, InputSource, Renderer};
use crate::resources::audio::AudioManager;
use crate::resources::collisiontable::CollisionTable;
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::InputState;
use crate::resources::worldtime::WorldTime;
use crate::scene::Scene;
use crate::sceneloader::{LoadPoll, SceneLoader, build_scene};
use crate::scenemanager::SceneManager;
use crate::systems::audio::forward_audio_cmds;
use crate::systems::input::update_input_state;
use crate::systems::time::{FrameClock, update_world_time};

pub struct GameEngine {
    game: Arc<dyn Game>,
    config: GameConfig,
    table: CollisionTable,
    manager: SceneManager,
    loader: SceneLoader,
    input: InputState,
    time: WorldTime,
    clock: FrameClock,
    audio: AudioManager,
    rng: fastrand::Rng,
    /// Scene requested while the loader was busy.
    pending_request: Option<usize>,
    quit: bool,
}

impl GameEngine {
    /// Build the collision table and make the starting scene live.
    ///
    /// The starting scene is the config's `starting_scene` or index 0. It
    /// is built on the calling thread; later scenes load in the background.
    pub fn new(game: Arc<dyn Game>, config: GameConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let table = collision_table_for(game.as_ref())?;
        let start = match &config.starting_scene {
            Some(name) => game.scene_index(name)?,
            None => 0,
        };
        let scene = build_scene(game.as_ref(), &table, start)?;
        info!("starting scene {} ('{}')", scene.index, scene.name);

        let (music_volume, sound_volume) = game.starting_volumes();
        let audio = AudioManager::new(
            game.sounds(),
            config.music_volume.unwrap_or(music_volume),
            config.sound_volume.unwrap_or(sound_volume),
        );
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        let mut engine = Self {
            game,
            config,
            table,
            manager: SceneManager::new(scene),
            loader: SceneLoader::new(),
            input: InputState::default(),
            time: WorldTime::default(),
            clock: FrameClock::new(),
            audio,
            rng,
            pending_request: None,
            quit: false,
        };
        engine.enter_scene();
        Ok(engine)
    }

    pub fn manager(&self) -> &SceneManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SceneManager {
        &mut self.manager
    }

    pub fn scene(&self) -> &Scene {
        self.manager.scene()
    }

    pub fn loader(&self) -> &SceneLoader {
        &self.loader
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    pub fn world_time(&self) -> &WorldTime {
        &self.time
    }

    pub fn frame_count(&self) -> u64 {
        self.time.frame_count
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    /// The scene waiting for the loader to become free, if any.
    pub fn pending_request(&self) -> Option<usize> {
        self.pending_request
    }

    /// Ask for scene `index` to replace the live one.
    ///
    /// The load starts right away when the loader is free. Otherwise the
    /// request is kept (replacing an older kept one) and issued as soon as
    /// the current load resolves.
    pub fn load_scene_by_index(&mut self, index: usize) {
        if self.loader.is_busy() {
            debug!("loader busy, keeping request for scene {}", index);
            self.pending_request = Some(index);
            return;
        }
        self.pending_request = None;
        self.loader.start(Arc::clone(&self.game), &self.table, index);
    }

    /// Run one frame with an explicit, unscaled delta in seconds.
    pub fn tick(
        &mut self,
        dt: f32,
        input: &mut dyn InputSource,
        audio: &mut dyn AudioSink,
        renderer: &mut dyn Renderer,
    ) {
        update_input_state(&mut self.input, input, self.time.frame_count);
        update_world_time(&mut self.time, dt);

        let mut services = FrameServices {
            time: &self.time,
            input: &self.input,
            keys: &self.config.keys,
            audio: &mut self.audio,
            rng: &mut self.rng,
            table: &self.table,
        };
        self.manager.run_frame(&mut services);

        match self.manager.take_request() {
            Some(SceneRequest::Load(index)) => self.load_scene_by_index(index),
            Some(SceneRequest::Quit) => {
                info!("quit requested by scene '{}'", self.manager.scene().name);
                self.quit = true;
            }
            None => {}
        }
        self.poll_loader();

        forward_audio_cmds(&mut self.audio, audio);
        renderer.submit(&self.manager.scene().render_frame(self.time.frame_count));
    }

    /// Run one frame timed by the monotonic clock.
    pub fn step(
        &mut self,
        input: &mut dyn InputSource,
        audio: &mut dyn AudioSink,
        renderer: &mut dyn Renderer,
    ) {
        let dt = self.config.frame_delta(self.clock.tick());
        self.tick(dt, input, audio, renderer);
    }

    /// Loop until a quit, a close request or `max_frames` frames.
    ///
    /// Returns the number of frames run.
    pub fn run(
        &mut self,
        max_frames: Option<u64>,
        input: &mut dyn InputSource,
        audio: &mut dyn AudioSink,
        renderer: &mut dyn Renderer,
    ) -> u64 {
        let mut frames = 0;
        self.clock = FrameClock::new();
        while !self.quit && !input.should_close() && !renderer.should_close() {
            if max_frames.is_some_and(|max| frames >= max) {
                break;
            }
            self.step(input, audio, renderer);
            frames += 1;
            if self.config.fixed_delta.is_none() {
                if let Some(rest) = self.clock.remaining(self.config.target_fps) {
                    std::thread::sleep(rest);
                }
            }
        }
        info!("stopped after {} frames", frames);
        frames
    }

    fn poll_loader(&mut self) {
        match self.loader.poll() {
            LoadPoll::Idle | LoadPoll::Pending => {}
            LoadPoll::Ready(scene) => {
                let old = self.manager.replace_scene(*scene);
                self.loader.mark_swapped();
                info!(
                    "scene '{}' replaced by {} ('{}')",
                    old.name,
                    self.manager.scene().index,
                    self.manager.scene().name
                );
                self.enter_scene();
            }
            LoadPoll::Failed(err) => {
                warn!("keeping scene '{}' after failed load: {}", self.manager.scene().name, err);
            }
        }
        if let Some(index) = self.pending_request {
            if !self.loader.is_busy() {
                self.load_scene_by_index(index);
            }
        }
    }

    /// Load the live scene's sounds and start or stop its music.
    fn enter_scene(&mut self) {
        let scene = self.manager.scene();
        self.audio
            .prepare_scene(scene.needed_sounds.iter().map(String::as_str));
        match &scene.music {
            Some(music) => self.audio.play_music(music),
            None => self.audio.stop_music(),
        }
    }
}
