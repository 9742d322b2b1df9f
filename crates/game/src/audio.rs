use std::path::Path;

use engine::KiraAudio;

pub const BACKGROUND_MUSIC: &str = "bgm";
const BACKGROUND_MUSIC_VOLUME: f32 = 0.5;

/// One-shot sounds the simulation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Jump,
    Dash,
    Hit,
    Shoot,
}

impl SoundCue {
    pub const ALL: [SoundCue; 4] = [SoundCue::Jump, SoundCue::Dash, SoundCue::Hit, SoundCue::Shoot];

    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Jump => "jump",
            SoundCue::Dash => "dash",
            SoundCue::Hit => "hit",
            SoundCue::Shoot => "shoot",
        }
    }

    pub fn volume(self) -> f32 {
        match self {
            SoundCue::Jump => 0.7,
            SoundCue::Dash => 0.3,
            SoundCue::Hit => 0.8,
            SoundCue::Shoot => 0.3,
        }
    }
}

/// Registers every cue and the background track from `sounds_dir`.
pub fn load_sounds(audio: &mut KiraAudio, sounds_dir: &Path) {
    for cue in SoundCue::ALL {
        let path = sounds_dir.join(format!("{}.mp3", cue.name()));
        audio.load_sound(cue.name(), &path, cue.volume());
    }
    let music = sounds_dir.join(format!("{BACKGROUND_MUSIC}.mp3"));
    audio.load_sound(BACKGROUND_MUSIC, &music, BACKGROUND_MUSIC_VOLUME);
}
