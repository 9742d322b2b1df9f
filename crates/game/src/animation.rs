use std::sync::Arc;

use engine::Sprite;

/// Frame cursor over a shared, read-only frame list.
///
/// `frame` counts ticks. The shown image is `frame / frame_duration`. A
/// looping animation wraps; a one-shot animation holds its last tick and
/// reports `done`.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Arc<[Sprite]>,
    frame_duration: f32,
    looping: bool,
    done: bool,
    frame: u32,
}

impl Animation {
    pub fn new(frames: Arc<[Sprite]>, frame_duration: f32, looping: bool) -> Self {
        Self {
            frames,
            frame_duration: frame_duration.max(f32::EPSILON),
            looping,
            done: false,
            frame: 0,
        }
    }

    /// Fresh instance over the same frames, rewound to tick 0.
    pub fn restarted(&self) -> Self {
        Self::new(Arc::clone(&self.frames), self.frame_duration, self.looping)
    }

    /// Fresh instance starting at `frame`, clamped into the valid tick range.
    pub fn starting_at(&self, frame: u32) -> Self {
        let mut animation = self.restarted();
        animation.frame = frame.min(animation.total_ticks() - 1);
        animation
    }

    /// Number of distinct tick positions, never zero.
    pub fn total_ticks(&self) -> u32 {
        ((self.frame_duration * self.frames.len() as f32).ceil() as u32).max(1)
    }

    pub fn update(&mut self) {
        let total = self.total_ticks();
        if self.looping {
            self.frame = (self.frame + 1) % total;
        } else {
            self.frame = (self.frame + 1).min(total - 1);
            if self.frame >= total - 1 {
                self.done = true;
            }
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Image for the current tick; `None` only for an empty frame list.
    pub fn image(&self) -> Option<&Sprite> {
        let last = self.frames.len().checked_sub(1)?;
        let index = (self.frame as f32 / self.frame_duration).floor() as usize;
        self.frames.get(index.min(last))
    }

    pub(crate) fn shares_frames_with(&self, other: &Animation) -> bool {
        Arc::ptr_eq(&self.frames, &other.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(count: usize) -> Arc<[Sprite]> {
        (0..count)
            .map(|index| Sprite::solid(1, 1, [index as u8, 0, 0, 255]))
            .collect()
    }

    #[test]
    fn looping_animation_wraps_after_all_ticks() {
        let mut animation = Animation::new(frames(2), 3.0, true);
        for _ in 0..6 {
            animation.update();
        }
        assert_eq!(animation.frame(), 0);
        assert!(!animation.is_done());
    }

    #[test]
    fn image_index_follows_frame_duration() {
        let mut animation = Animation::new(frames(3), 2.0, true);
        animation.update();
        assert_eq!(animation.image().and_then(|s| s.pixel(0, 0)), Some([0, 0, 0, 255]));
        animation.update();
        assert_eq!(animation.image().and_then(|s| s.pixel(0, 0)), Some([1, 0, 0, 255]));
    }

    #[test]
    fn one_shot_sets_done_on_last_tick_and_holds() {
        let mut animation = Animation::new(frames(2), 2.0, false);
        for _ in 0..3 {
            animation.update();
        }
        assert!(animation.is_done());
        assert_eq!(animation.frame(), 3);
        animation.update();
        assert_eq!(animation.frame(), 3);
        assert!(animation.is_done());
    }

    #[test]
    fn fractional_duration_rounds_tick_count_up() {
        let animation = Animation::new(frames(3), 5.5, true);
        assert_eq!(animation.total_ticks(), 17);
    }

    #[test]
    fn restarted_shares_frames_and_resets_state() {
        let mut template = Animation::new(frames(2), 1.0, false);
        template.update();
        let fresh = template.restarted();
        assert!(fresh.shares_frames_with(&template));
        assert_eq!(fresh.frame(), 0);
        assert!(!fresh.is_done());
    }

    #[test]
    fn starting_frame_is_clamped() {
        let template = Animation::new(frames(2), 2.0, false);
        assert_eq!(template.starting_at(1).frame(), 1);
        assert_eq!(template.starting_at(99).frame(), 3);
    }

    #[test]
    fn empty_frames_have_no_image() {
        let mut animation = Animation::new(frames(0), 4.0, true);
        animation.update();
        assert!(animation.image().is_none());
        assert_eq!(animation.frame(), 0);
    }
}
