//! Game configuration resource.
//!
//! Manages engine settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [engine]
//! target_fps = 60
//! max_delta = 0.1
//! fixed_delta = 0.016
//! starting_scene = main_menu
//!
//! [audio]
//! music_volume = 5
//! sound_volume = 10
//!
//! [assets]
//! levels_dir = ./assets/levels
//!
//! [game]
//! seed = 42
//!
//! [keys]
//! up = W
//! down = S
//! left = A
//! right = D
//! bomb = Space
//! kick = LeftShift
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::resources::input::{Key, KeyBindings};

/// Default safe values for startup
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_MAX_DELTA: f32 = 0.1;
const DEFAULT_LEVELS_DIR: &str = "./assets/levels";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";
const MAX_VOLUME: u8 = 10;

/// Engine configuration.
///
/// Volumes left as `None` fall back to the starting volumes declared by the
/// game. `fixed_delta` switches the engine to a fixed simulation step.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Target frames per second for the run loop.
    pub target_fps: u32,
    /// Upper clamp for a measured frame delta, in seconds.
    pub max_delta: f32,
    /// Fixed simulation step in seconds, if any.
    pub fixed_delta: Option<f32>,
    /// Name of the scene to load at startup.
    pub starting_scene: Option<String>,
    /// Music volume, 0..=10.
    pub music_volume: Option<u8>,
    /// Sound effects volume, 0..=10.
    pub sound_volume: Option<u8>,
    /// Directory holding level JSON files.
    pub levels_dir: PathBuf,
    /// Seed for gameplay randomness.
    pub seed: Option<u64>,
    pub keys: KeyBindings,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            max_delta: DEFAULT_MAX_DELTA,
            fixed_delta: None,
            starting_scene: None,
            music_volume: None,
            sound_volume: None,
            levels_dir: PathBuf::from(DEFAULT_LEVELS_DIR),
            seed: None,
            keys: KeyBindings::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or a value is malformed.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|reason| self.file_error(reason))?;

        // [engine] section
        if let Some(fps) = self.uint(&config, "engine", "target_fps")? {
            self.target_fps = fps as u32;
        }
        if let Some(max_delta) = self.float(&config, "engine", "max_delta")? {
            self.max_delta = positive_delta("max_delta", max_delta)?;
        }
        if let Some(fixed) = self.float(&config, "engine", "fixed_delta")? {
            // Zero or below turns the fixed step off.
            self.fixed_delta = match fixed {
                f if f.is_finite() && f <= 0.0 => None,
                f => Some(positive_delta("fixed_delta", f)?),
            };
        }
        if let Some(scene) = config.get("engine", "starting_scene") {
            self.starting_scene = Some(scene);
        }

        // [audio] section
        if let Some(volume) = self.uint(&config, "audio", "music_volume")? {
            self.music_volume = Some(volume.min(MAX_VOLUME as u64) as u8);
        }
        if let Some(volume) = self.uint(&config, "audio", "sound_volume")? {
            self.sound_volume = Some(volume.min(MAX_VOLUME as u64) as u8);
        }

        // [assets] section
        if let Some(dir) = config.get("assets", "levels_dir") {
            self.levels_dir = PathBuf::from(dir);
        }

        // [game] section
        if let Some(seed) = self.uint(&config, "game", "seed")? {
            self.seed = Some(seed);
        }

        // [keys] section
        let slots: [(&str, &mut Key); 6] = [
            ("up", &mut self.keys.up),
            ("down", &mut self.keys.down),
            ("left", &mut self.keys.left),
            ("right", &mut self.keys.right),
            ("bomb", &mut self.keys.bomb),
            ("kick", &mut self.keys.kick),
        ];
        for (name, slot) in slots {
            if let Some(value) = config.get("keys", name) {
                *slot = value.parse()?;
            }
        }

        info!(
            "Loaded config: fps={}, max_delta={}, fixed_delta={:?}, levels={:?}, seed={:?}",
            self.target_fps, self.max_delta, self.fixed_delta, self.levels_dir, self.seed
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut config = Ini::new();

        // [engine] section
        config.set("engine", "target_fps", Some(self.target_fps.to_string()));
        config.set("engine", "max_delta", Some(self.max_delta.to_string()));
        if let Some(fixed) = self.fixed_delta {
            config.set("engine", "fixed_delta", Some(fixed.to_string()));
        }
        if let Some(scene) = &self.starting_scene {
            config.set("engine", "starting_scene", Some(scene.clone()));
        }

        // [audio] section
        if let Some(volume) = self.music_volume {
            config.set("audio", "music_volume", Some(volume.to_string()));
        }
        if let Some(volume) = self.sound_volume {
            config.set("audio", "sound_volume", Some(volume.to_string()));
        }

        // [assets] section
        config.set(
            "assets",
            "levels_dir",
            Some(self.levels_dir.display().to_string()),
        );

        // [game] section
        if let Some(seed) = self.seed {
            config.set("game", "seed", Some(seed.to_string()));
        }

        // [keys] section
        config.set("keys", "up", Some(self.keys.up.to_string()));
        config.set("keys", "down", Some(self.keys.down.to_string()));
        config.set("keys", "left", Some(self.keys.left.to_string()));
        config.set("keys", "right", Some(self.keys.right.to_string()));
        config.set("keys", "bomb", Some(self.keys.bomb.to_string()));
        config.set("keys", "kick", Some(self.keys.kick.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| self.file_error(e.to_string()))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Check values that may have been set in code rather than loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_delta("max_delta", self.max_delta as f64)?;
        if let Some(fixed) = self.fixed_delta {
            positive_delta("fixed_delta", fixed as f64)?;
        }
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Delta to simulate for a frame measured as `measured` seconds.
    pub fn frame_delta(&self, measured: f32) -> f32 {
        match self.fixed_delta {
            Some(fixed) => fixed,
            None => measured.clamp(0.0, self.max_delta),
        }
    }

    fn uint(&self, config: &Ini, section: &str, key: &str) -> Result<Option<u64>, ConfigError> {
        config
            .getuint(section, key)
            .map_err(|reason| self.file_error(format!("[{section}] {key}: {reason}")))
    }

    fn float(&self, config: &Ini, section: &str, key: &str) -> Result<Option<f64>, ConfigError> {
        config
            .getfloat(section, key)
            .map_err(|reason| self.file_error(format!("[{section}] {key}: {reason}")))
    }

    fn file_error(&self, reason: String) -> ConfigError {
        ConfigError::File {
            path: self.config_path.clone(),
            reason,
        }
    }
}

fn positive_delta(key: &'static str, value: f64) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value as f32)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected a positive number of seconds",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_safe() {
        let config = GameConfig::new();
        assert_eq!(config.target_fps, 60);
        assert!(config.fixed_delta.is_none());
        assert!(config.music_volume.is_none());
        assert_eq!(config.keys, KeyBindings::default());
    }

    #[test]
    fn test_load_overrides_only_present_values() {
        let file = write_config(
            "[engine]\ntarget_fps = 30\nstarting_scene = desert\n\n[audio]\nmusic_volume = 14\n\n[keys]\nbomb = Enter\n",
        );
        let mut config = GameConfig::with_path(file.path());
        config.load_from_file().unwrap();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.starting_scene.as_deref(), Some("desert"));
        assert_eq!(config.music_volume, Some(10));
        assert_eq!(config.sound_volume, None);
        assert_eq!(config.keys.bomb, Key::Enter);
        assert_eq!(config.keys.up, Key::W);
        assert_eq!(config.max_delta, DEFAULT_MAX_DELTA);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut config = GameConfig::with_path("/definitely/not/here/config.ini");
        assert!(matches!(
            config.load_from_file(),
            Err(ConfigError::File { .. })
        ));
        assert_eq!(config, GameConfig::with_path("/definitely/not/here/config.ini"));
    }

    #[test]
    fn test_unknown_key_name_is_rejected() {
        let file = write_config("[keys]\nkick = Hyper\n");
        let mut config = GameConfig::with_path(file.path());
        assert!(matches!(
            config.load_from_file(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let mut config = GameConfig::with_path(&path);
        config.fixed_delta = Some(0.02);
        config.seed = Some(7);
        config.sound_volume = Some(3);
        config.keys.kick = Key::E;
        config.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_frame_delta_clamps_or_fixes() {
        let mut config = GameConfig::new();
        assert_eq!(config.frame_delta(0.5), DEFAULT_MAX_DELTA);
        assert_eq!(config.frame_delta(0.01), 0.01);
        config.fixed_delta = Some(0.02);
        assert_eq!(config.frame_delta(0.5), 0.02);
    }

    #[test]
    fn test_bad_deltas_are_rejected_at_load() {
        for bad in ["-0.1", "0", "NaN", "inf"] {
            let file = write_config(&format!("[engine]\nmax_delta = {bad}\n"));
            let mut config = GameConfig::with_path(file.path());
            assert!(
                matches!(
                    config.load_from_file(),
                    Err(ConfigError::InvalidValue { key: "max_delta", .. })
                ),
                "max_delta = {bad} was accepted"
            );
            assert_eq!(config.max_delta, DEFAULT_MAX_DELTA);
        }

        let file = write_config("[engine]\nfixed_delta = NaN\n");
        let mut config = GameConfig::with_path(file.path());
        assert!(config.load_from_file().is_err());

        let file = write_config("[engine]\nfixed_delta = 0\n");
        let mut config = GameConfig::with_path(file.path());
        config.load_from_file().unwrap();
        assert_eq!(config.fixed_delta, None);
    }

    #[test]
    fn test_validate_catches_values_set_in_code() {
        let mut config = GameConfig::new();
        assert!(config.validate().is_ok());
        config.max_delta = -0.1;
        assert!(config.validate().is_err());
        config.max_delta = 0.1;
        config.fixed_delta = Some(f32::NAN);
        assert!(config.validate().is_err());
    }
}
