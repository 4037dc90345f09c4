use std::time::{Duration, Instant};

/// Frames-per-second averaged over windows of at least one second.
///
/// The readout changes at most once per window, which keeps an on-screen
/// label legible. Until the first window closes it reads `0.0`.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
    window: Duration,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self { window_start: now, frames: 0, fps: 0.0, window: Duration::from_secs(1) }
    }

    /// Records one frame at `now` and returns the current readout.
    pub fn frame(&mut self, now: Instant) -> f32 {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed > self.window {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.window_start = now;
            self.frames = 0;
        }
        self.fps
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn reads_zero_before_first_window() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(t0);
        assert_eq!(fps.frame(t0 + Duration::from_millis(500)), 0.0);
    }

    #[test]
    fn averages_over_elapsed_window() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(t0);
        let step = Duration::from_millis(20);
        let mut last = 0.0;
        for i in 1..=60 {
            last = fps.frame(t0 + step * i);
        }
        // 51 frames by t = 1.02 s closes the first window.
        assert_relative_eq!(fps.fps(), 51.0 / 1.02, max_relative = 1e-4);
        assert_eq!(last, fps.fps());
    }

    #[test]
    fn window_resets_after_update() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(t0);
        fps.frame(t0 + Duration::from_millis(1500));
        assert_relative_eq!(fps.fps(), 1.0 / 1.5, max_relative = 1e-4);

        // One more frame shortly after must not change the readout.
        assert_relative_eq!(fps.frame(t0 + Duration::from_millis(1600)), 1.0 / 1.5, max_relative = 1e-4);
    }
}
