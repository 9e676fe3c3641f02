//! Interfaces to the external collaborators and their headless stand-ins.
//!
//! The core never draws, plays audio or reads devices itself. The engine
//! calls these traits at defined points of the frame:
//!
//! - [`InputSource`] is polled at the start of a frame.
//! - [`AudioSink`] receives the frame's queued [`AudioCmd`]s after the
//!   frame pass. [`AudioDevice`] is what the audio thread drives.
//! - [`Renderer`] gets the frame's entity list, camera, light and skybox.
//!
//! The headless implementations back the `arenacore` binary and the tests.
use std::path::Path;

use glam::Vec3;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::components::appearance::AnimationState;
use crate::components::transform::Transform;
use crate::entity::{Entity, EntityId};
use crate::error::ConfigError;
use crate::events::audio::AudioCmd;
use crate::resources::input::{InputState, Key};
use crate::scene::{Camera, Light, Skybox};

/// Source of raw key transitions.
pub trait InputSource {
    /// Report this frame's key transitions into `input`.
    fn poll(&mut self, frame: u64, input: &mut InputState);

    /// Whether the window (or script) asks the loop to stop.
    fn should_close(&self) -> bool {
        false
    }
}

/// Receiver of the commands queued by gameplay audio calls.
pub trait AudioSink {
    fn send(&mut self, cmd: AudioCmd);
}

/// Playback device driven by the audio thread.
pub trait AudioDevice: Send {
    fn load_sound(&mut self, id: &str, path: &str) -> Result<(), String>;
    fn play_sound(&mut self, id: &str);
    fn unload_sounds(&mut self);
    fn load_music(&mut self, id: &str, path: &str) -> Result<(), String>;
    fn play_music(&mut self, id: &str, looped: bool);
    fn stop_music(&mut self);
    fn set_music_volume(&mut self, vol: f32);
    fn set_sound_volume(&mut self, vol: f32);
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub frame: u64,
    pub scene_index: usize,
    pub scene_name: &'a str,
    pub camera: &'a Camera,
    pub light: &'a Light,
    pub skybox: &'a Skybox,
    pub entities: &'a [Entity],
}

/// Draw data extracted from one entity.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub id: EntityId,
    pub model_name: &'a str,
    pub transform: &'a Transform,
    pub color: Option<Vec3>,
    pub animation: &'a AnimationState,
}

impl<'a> RenderFrame<'a> {
    pub fn draw_items(&self) -> impl Iterator<Item = DrawItem<'a>> + 'a {
        let entities: &'a [Entity] = self.entities;
        entities.iter().map(|entity| DrawItem {
            id: entity.id(),
            model_name: &entity.core.appearance.model_name,
            transform: &entity.core.transform,
            color: entity.core.appearance.color,
            animation: &entity.core.appearance.animation,
        })
    }
}

pub trait Renderer {
    fn submit(&mut self, frame: &RenderFrame<'_>);

    fn should_close(&self) -> bool {
        false
    }
}

/// Renderer that only logs what it would draw.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    submitted: u64,
    log_every: u64,
}

impl HeadlessRenderer {
    /// Log a frame summary every `log_every` frames (0 disables it).
    pub fn new(log_every: u64) -> Self {
        Self {
            submitted: 0,
            log_every,
        }
    }

    pub fn frames_submitted(&self) -> u64 {
        self.submitted
    }
}

impl Renderer for HeadlessRenderer {
    fn submit(&mut self, frame: &RenderFrame<'_>) {
        self.submitted += 1;
        if self.log_every != 0 && frame.frame % self.log_every == 0 {
            info!(
                "frame {}: scene '{}' ({}), {} entities",
                frame.frame,
                frame.scene_name,
                frame.scene_index,
                frame.entities.len()
            );
        }
        for item in frame.draw_items() {
            trace!(
                "  #{} {} at {:?} anim={}",
                item.id, item.model_name, item.transform.position, item.animation.name
            );
        }
    }
}

/// One key transition of an input script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub frame: u64,
    pub key: Key,
    pub pressed: bool,
}

/// Replays key transitions at fixed frame numbers.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: Vec<InputEvent>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(mut events: Vec<InputEvent>) -> Self {
        events.sort_by_key(|e| e.frame);
        Self { events, cursor: 0 }
    }

    /// Read a JSON array of `{frame, key, pressed}` objects.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file_error = |reason: String| ConfigError::File {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        let events: Vec<InputEvent> =
            serde_json::from_str(&text).map_err(|e| file_error(e.to_string()))?;
        info!("Loaded {} scripted input events from {:?}", events.len(), path);
        Ok(Self::new(events))
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, frame: u64, input: &mut InputState) {
        while let Some(event) = self.events.get(self.cursor) {
            if event.frame > frame {
                break;
            }
            debug!("input: {:?} pressed={} (frame {})", event.key, event.pressed, frame);
            input.button_state_changed(event.key, event.pressed);
            self.cursor += 1;
        }
    }
}

/// Audio device that only logs.
#[derive(Debug, Default)]
pub struct LogAudioDevice;

impl AudioDevice for LogAudioDevice {
    fn load_sound(&mut self, id: &str, path: &str) -> Result<(), String> {
        debug!("[audio] fx loaded id='{}' path='{}'", id, path);
        Ok(())
    }

    fn play_sound(&mut self, id: &str) {
        debug!("[audio] fx play id='{}'", id);
    }

    fn unload_sounds(&mut self) {
        debug!("[audio] fx unload all");
    }

    fn load_music(&mut self, id: &str, path: &str) -> Result<(), String> {
        debug!("[audio] loaded id='{}' path='{}'", id, path);
        Ok(())
    }

    fn play_music(&mut self, id: &str, looped: bool) {
        info!("[audio] play start id='{}' looped={}", id, looped);
    }

    fn stop_music(&mut self) {
        debug!("[audio] stop");
    }

    fn set_music_volume(&mut self, vol: f32) {
        debug!("[audio] music volume {}", vol);
    }

    fn set_sound_volume(&mut self, vol: f32) {
        debug!("[audio] fx volume {}", vol);
    }
}

/// Sink that keeps every command it receives.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub commands: Vec<AudioCmd>,
}

impl RecordingAudio {
    pub fn played_sounds(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            AudioCmd::PlayFx { id } => Some(id.as_str()),
            _ => None,
        })
    }
}

impl AudioSink for RecordingAudio {
    fn send(&mut self, cmd: AudioCmd) {
        self.commands.push(cmd);
    }
}
