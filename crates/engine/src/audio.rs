use std::collections::HashMap;
use std::path::Path;

use kira::manager::backend::DefaultBackend;
use kira::manager::{AudioManager, AudioManagerSettings};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings};
use kira::Volume;
use tracing::{info, warn};

/// Fire-and-forget sound playback keyed by cue name.
pub trait AudioOutput {
    fn play(&mut self, cue: &str);
    /// Starts looping background music, replacing any current track.
    fn play_music(&mut self, track: &str);
}

/// Output that discards every request. Used when no audio device exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioOutput for SilentAudio {
    fn play(&mut self, _cue: &str) {}

    fn play_music(&mut self, _track: &str) {}
}

struct LoadedSound {
    data: StaticSoundData,
    volume: f32,
}

pub struct KiraAudio {
    manager: AudioManager<DefaultBackend>,
    sounds: HashMap<String, LoadedSound>,
    active_music: Option<StaticSoundHandle>,
}

impl KiraAudio {
    /// Returns `None` when the audio backend cannot be opened.
    pub fn try_new() -> Option<Self> {
        match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(manager) => Some(Self {
                manager,
                sounds: HashMap::new(),
                active_music: None,
            }),
            Err(error) => {
                warn!(error = %error, "audio_unavailable");
                None
            }
        }
    }

    /// Decodes `path` into memory under `name`. A file that cannot be read is
    /// logged and skipped; later `play(name)` calls are silent.
    pub fn load_sound(&mut self, name: &str, path: &Path, volume: f32) {
        match StaticSoundData::from_file(path) {
            Ok(data) => {
                self.sounds
                    .insert(name.to_string(), LoadedSound { data, volume });
            }
            Err(error) => {
                warn!(
                    sound = name,
                    path = %path.display(),
                    error = %error,
                    "sound_load_failed"
                );
            }
        }
    }
}

impl AudioOutput for KiraAudio {
    fn play(&mut self, cue: &str) {
        let Some(sound) = self.sounds.get(cue) else {
            return;
        };
        let mut settings = StaticSoundSettings::new();
        settings.volume = Volume::Amplitude(sound.volume as f64).into();
        if let Err(error) = self.manager.play(sound.data.clone().with_settings(settings)) {
            warn!(sound = cue, error = %error, "sound_play_failed");
        }
    }

    fn play_music(&mut self, track: &str) {
        let Some(sound) = self.sounds.get(track) else {
            return;
        };
        if let Some(mut previous) = self.active_music.take() {
            let _ = previous.stop(Default::default());
        }
        let mut settings = StaticSoundSettings::new().loop_region(0.0..);
        settings.volume = Volume::Amplitude(sound.volume as f64).into();
        match self.manager.play(sound.data.clone().with_settings(settings)) {
            Ok(handle) => {
                info!(track, "music_started");
                self.active_music = Some(handle);
            }
            Err(error) => warn!(track, error = %error, "music_play_failed"),
        }
    }
}

/// Opens the kira backend, falling back to [`SilentAudio`].
pub fn open_audio_output(
    configure: impl FnOnce(&mut KiraAudio),
) -> Box<dyn AudioOutput> {
    match KiraAudio::try_new() {
        Some(mut audio) => {
            configure(&mut audio);
            Box::new(audio)
        }
        None => Box::new(SilentAudio),
    }
}
