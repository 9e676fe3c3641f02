//! Audio commands and messages exchanged with the audio thread.

/// Commands sent *to* the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    LoadFx { id: String, path: String },
    PlayFx { id: String },
    UnloadAllFx,
    LoadMusic { id: String, path: String },
    PlayMusic { id: String, looped: bool },
    StopMusic,
    /// Volumes are normalised to 0.0..=1.0.
    VolumeMusic { vol: f32 },
    VolumeFx { vol: f32 },
    Shutdown,
}

/// Messages sent *back* from the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioMessage {
    FxLoaded { id: String },
    FxLoadFailed { id: String, error: String },
    FxUnloadedAll,
    MusicLoaded { id: String },
    MusicLoadFailed { id: String, error: String },
    MusicPlayStarted { id: String },
    MusicStopped,
}
