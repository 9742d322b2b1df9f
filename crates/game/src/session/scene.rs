use engine::{AudioOutput, InputSnapshot, Scene, SceneCommand, Surface};
use tracing::{error, info};

use super::SessionState;

/// Plugs a [`SessionState`] into the engine loop and forwards its sound cues
/// to an audio output.
pub struct GameplayScene {
    session: SessionState,
    audio: Box<dyn AudioOutput>,
    announced_win: bool,
}

impl GameplayScene {
    pub fn new(session: SessionState, audio: Box<dyn AudioOutput>) -> Self {
        Self {
            session,
            audio,
            announced_win: false,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }
}

impl Scene for GameplayScene {
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        if let Err(err) = self.session.tick(input) {
            error!(level = self.session.level(), error = %err, "level_load_failed");
            return SceneCommand::Quit;
        }
        for cue in self.session.drain_cues() {
            self.audio.play(cue.name());
        }
        if self.session.is_won() && !self.announced_win {
            self.announced_win = true;
            info!(levels = self.session.level_count(), "win_screen_shown");
        }
        SceneCommand::None
    }

    fn render(&mut self, surface: &mut Surface) {
        self.session.render(surface);
    }

    fn unload(&mut self) {
        info!(level = self.session.level(), "gameplay_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!(
            "level {}/{}",
            self.session.level() + 1,
            self.session.level_count()
        ))
    }
}
