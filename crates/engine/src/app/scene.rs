use super::input::{ActionStates, InputAction, PressEdges};
use super::rendering::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    pressed: PressEdges,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, actions: ActionStates, pressed: PressEdges) -> Self {
        Self {
            quit_requested,
            actions,
            pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the tick the key went from released to pressed.
    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.was_pressed(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.pressed.mark(action);
        self.actions.set(action, true);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

/// A simulation driven by the fixed-timestep loop.
///
/// `update` runs once per tick with that tick's input; `render` runs once per
/// presented frame and must not mutate simulation state.
pub trait Scene {
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, surface: &mut Surface);
    fn unload(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_action_is_also_down() {
        let snapshot = InputSnapshot::empty().with_action_pressed(InputAction::Jump);
        assert!(snapshot.was_pressed(InputAction::Jump));
        assert!(snapshot.is_down(InputAction::Jump));
        assert!(!snapshot.was_pressed(InputAction::Dash));
    }

    #[test]
    fn held_action_has_no_press_edge() {
        let snapshot = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.was_pressed(InputAction::MoveLeft));
    }
}
