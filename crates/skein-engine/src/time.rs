//! Frame timing.
//!
//! A [`FrameClock`] lives next to each window and stamps every redraw
//! with a delta time and a monotonically increasing frame index. The
//! delta is clamped so a window that sat minimized for a minute does not
//! hand animation code a sixty-second step.

use std::time::Instant;

/// Longest delta a single frame will ever report, in seconds.
const MAX_FRAME_DT: f32 = 0.25;

/// Timing snapshot for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped to [`MAX_FRAME_DT`].
    pub dt: f32,
    /// Instant this frame was stamped; debounce logic compares against it.
    pub now: Instant,
    /// 0 for the first frame after clock creation.
    pub frame_index: u64,
}

#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
    next_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: Instant::now(), next_index: 0 }
    }

    /// Stamps a frame and advances the clock.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32().min(MAX_FRAME_DT);
        self.last = now;
        let frame_index = self.next_index;
        self.next_index += 1;
        FrameTime { dt, now, frame_index }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_sequential() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
    }

    #[test]
    fn dt_is_bounded() {
        let mut clock = FrameClock::new();
        let t = clock.tick();
        assert!(t.dt >= 0.0);
        assert!(t.dt <= MAX_FRAME_DT);
    }
}
