//! Audio thread and the per-frame bridge helpers.
//!
//! - [`audio_thread`] runs on its own OS thread, owns the
//!   [`AudioDevice`] and processes [`AudioCmd`] messages, emitting
//!   [`AudioMessage`] responses.
//! - [`forward_audio_cmds`] drains the frame's queued commands into a sink.
//! - [`poll_audio_messages`] non-blockingly drains the thread's replies.
//!
//! Device calls stay on a single thread; the main loop only talks to it
//! through channels.

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::platform::{AudioDevice, AudioSink};
use crate::resources::audio::{AudioBridge, AudioManager};
use crossbeam_channel::{Receiver, Sender};
use log::{debug, trace, warn};
use rustc_hash::FxHashSet;

/// Send every command queued during the frame to `sink`, in order.
pub fn forward_audio_cmds(audio: &mut AudioManager, sink: &mut dyn AudioSink) {
    for cmd in audio.drain() {
        sink.send(cmd);
    }
}

/// Drain any pending replies from the audio thread.
pub fn poll_audio_messages(bridge: &AudioBridge) -> Vec<AudioMessage> {
    let messages: Vec<AudioMessage> = bridge.rx_msg.try_iter().collect();
    for msg in &messages {
        match msg {
            AudioMessage::FxLoadFailed { id, error } | AudioMessage::MusicLoadFailed { id, error } => {
                warn!("[audio] load failed id='{}' error='{}'", id, error)
            }
            other => trace!("[audio] {:?}", other),
        }
    }
    messages
}

/// Entry point of the dedicated audio thread.
///
/// Blocks on the command channel until it receives [`AudioCmd::Shutdown`]
/// or the sender side is dropped.
pub fn audio_thread(
    rx_cmd: Receiver<AudioCmd>,
    tx_msg: Sender<AudioMessage>,
    mut device: Box<dyn AudioDevice>,
) {
    debug!(
        "[audio] thread starting (id={:?})",
        std::thread::current().id()
    );

    let mut sounds: FxHashSet<String> = FxHashSet::default();
    let mut musics: FxHashSet<String> = FxHashSet::default();
    let mut playing: Option<String> = None;

    for cmd in rx_cmd.iter() {
        match cmd {
            AudioCmd::LoadFx { id, path } => match device.load_sound(&id, &path) {
                Ok(()) => {
                    sounds.insert(id.clone());
                    let _ = tx_msg.send(AudioMessage::FxLoaded { id });
                }
                Err(error) => {
                    let _ = tx_msg.send(AudioMessage::FxLoadFailed { id, error });
                }
            },
            AudioCmd::PlayFx { id } => {
                if sounds.contains(&id) {
                    device.play_sound(&id);
                } else {
                    debug!("[audio] fx play failed id='{}' reason='not loaded'", id);
                }
            }
            AudioCmd::UnloadAllFx => {
                sounds.clear();
                device.unload_sounds();
                let _ = tx_msg.send(AudioMessage::FxUnloadedAll);
            }
            AudioCmd::LoadMusic { id, path } => {
                if musics.contains(&id) {
                    continue;
                }
                match device.load_music(&id, &path) {
                    Ok(()) => {
                        musics.insert(id.clone());
                        let _ = tx_msg.send(AudioMessage::MusicLoaded { id });
                    }
                    Err(error) => {
                        let _ = tx_msg.send(AudioMessage::MusicLoadFailed { id, error });
                    }
                }
            }
            AudioCmd::PlayMusic { id, looped } => {
                if musics.contains(&id) {
                    device.play_music(&id, looped);
                    playing = Some(id.clone());
                    let _ = tx_msg.send(AudioMessage::MusicPlayStarted { id });
                }
            }
            AudioCmd::StopMusic => {
                if playing.take().is_some() {
                    device.stop_music();
                    let _ = tx_msg.send(AudioMessage::MusicStopped);
                }
            }
            AudioCmd::VolumeMusic { vol } => device.set_music_volume(vol),
            AudioCmd::VolumeFx { vol } => device.set_sound_volume(vol),
            AudioCmd::Shutdown => {
                debug!("[audio] shutdown requested");
                break;
            }
        }
    }

    if playing.is_some() {
        device.stop_music();
    }
    device.unload_sounds();
}
