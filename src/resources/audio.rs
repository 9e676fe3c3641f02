//! Audio state owned by the engine and the bridge to the audio thread.
//!
//! [`AudioManager`] is the frame-side half: it knows the game's sound table,
//! which sounds the live scene has loaded, and the configured volumes.
//! Gameplay calls [`AudioManager::play_sound`] and
//! [`AudioManager::play_music`] during the frame; those only queue
//! [`AudioCmd`]s. After the frame the engine drains the queue into an
//! [`AudioSink`](crate::platform::AudioSink), typically the [`AudioBridge`]
//! created by [`setup_audio`].
//!
//! Unknown sound names are a soft miss: a warning is logged once per name
//! and the call is skipped.

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::platform::{AudioDevice, AudioSink};
use crate::systems::audio::audio_thread;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};

/// Highest volume step accepted by the manager.
pub const MAX_VOLUME: u8 = 10;

/// Shared bridge between the engine and the audio thread.
pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (engine -> audio thread).
    pub tx_cmd: Sender<AudioCmd>,
    /// Receiver for [`AudioMessage`] messages (audio thread -> engine).
    pub rx_msg: Receiver<AudioMessage>,
    /// Join handle for the background audio thread.
    pub handle: std::thread::JoinHandle<()>,
}

impl AudioSink for AudioBridge {
    fn send(&mut self, cmd: AudioCmd) {
        // The thread only disappears on shutdown.
        let _ = self.tx_cmd.send(cmd);
    }
}

/// Spawn the audio thread around `device` and return the bridge to it.
pub fn setup_audio(device: Box<dyn AudioDevice>) -> AudioBridge {
    let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
    let (tx_msg, rx_msg) = unbounded::<AudioMessage>();

    let handle = std::thread::spawn(move || audio_thread(rx_cmd, tx_msg, device));

    AudioBridge {
        tx_cmd,
        rx_msg,
        handle,
    }
}

/// Gracefully request shutdown of the audio thread and join it.
pub fn shutdown_audio(bridge: AudioBridge) {
    let _ = bridge.tx_cmd.send(AudioCmd::Shutdown);
    let _ = bridge.handle.join();
}

/// Frame-side audio state.
#[derive(Debug, Clone)]
pub struct AudioManager {
    sounds: FxHashMap<String, String>,
    loaded: FxHashSet<String>,
    warned: FxHashSet<String>,
    music_volume: u8,
    sound_volume: u8,
    current_music: Option<String>,
    queue: Vec<AudioCmd>,
}

impl AudioManager {
    /// `sounds` maps sound names to asset paths.
    pub fn new(sounds: FxHashMap<String, String>, music_volume: u8, sound_volume: u8) -> Self {
        let mut manager = Self {
            sounds,
            loaded: FxHashSet::default(),
            warned: FxHashSet::default(),
            music_volume: 0,
            sound_volume: 0,
            current_music: None,
            queue: Vec::new(),
        };
        manager.set_music_volume(music_volume);
        manager.set_sound_volume(sound_volume);
        manager
    }

    pub fn music_volume(&self) -> u8 {
        self.music_volume
    }

    pub fn sound_volume(&self) -> u8 {
        self.sound_volume
    }

    pub fn set_music_volume(&mut self, volume: u8) {
        self.music_volume = volume.min(MAX_VOLUME);
        self.queue.push(AudioCmd::VolumeMusic {
            vol: f32::from(self.music_volume) / f32::from(MAX_VOLUME),
        });
    }

    pub fn set_sound_volume(&mut self, volume: u8) {
        self.sound_volume = volume.min(MAX_VOLUME);
        self.queue.push(AudioCmd::VolumeFx {
            vol: f32::from(self.sound_volume) / f32::from(MAX_VOLUME),
        });
    }

    pub fn current_music(&self) -> Option<&str> {
        self.current_music.as_deref()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    /// Replace the loaded sound set with the sounds a new scene needs.
    ///
    /// Names missing from the sound table are warned about and skipped.
    pub fn prepare_scene<'a>(&mut self, needed: impl IntoIterator<Item = &'a str>) {
        self.loaded.clear();
        self.queue.push(AudioCmd::UnloadAllFx);
        for name in needed {
            match self.sounds.get(name) {
                Some(path) => {
                    if self.loaded.insert(name.to_string()) {
                        self.queue.push(AudioCmd::LoadFx {
                            id: name.to_string(),
                            path: path.clone(),
                        });
                    }
                }
                None => self.warn_once(name, "sound not found in the sound table"),
            }
        }
    }

    /// Queue a sound effect. Unknown or unloaded names are skipped.
    pub fn play_sound(&mut self, name: &str) {
        if self.loaded.contains(name) {
            debug!("play sound '{}'", name);
            self.queue.push(AudioCmd::PlayFx {
                id: name.to_string(),
            });
        } else if self.sounds.contains_key(name) {
            self.warn_once(name, "sound is not loaded by the current scene");
        } else {
            self.warn_once(name, "sound not found in the sound table");
        }
    }

    /// Queue a music track by asset path, replacing the current one.
    pub fn play_music(&mut self, path: &str) {
        if self.current_music.as_deref() == Some(path) {
            return;
        }
        debug!("play music '{}'", path);
        self.queue.push(AudioCmd::StopMusic);
        self.queue.push(AudioCmd::LoadMusic {
            id: path.to_string(),
            path: path.to_string(),
        });
        self.queue.push(AudioCmd::PlayMusic {
            id: path.to_string(),
            looped: true,
        });
        self.current_music = Some(path.to_string());
    }

    pub fn stop_music(&mut self) {
        if self.current_music.take().is_some() {
            self.queue.push(AudioCmd::StopMusic);
        }
    }

    /// Commands queued since the last drain.
    pub fn pending(&self) -> &[AudioCmd] {
        &self.queue
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, AudioCmd> {
        self.queue.drain(..)
    }

    fn warn_once(&mut self, name: &str, reason: &str) {
        if self.warned.insert(name.to_string()) {
            warn!("audio: '{}': {}", name, reason);
        }
    }
}
