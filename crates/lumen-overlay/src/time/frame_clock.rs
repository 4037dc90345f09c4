use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    /// Timestamp taken at the tick.
    pub now: Instant,
    pub frame_index: u64,
}

/// Produces `FrameTime` snapshots with delta time clamped to `[dt_min, dt_max]`
/// so stalls (debugger, minimized window) do not produce huge steps.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self { last: Instant::now(), frame_index: 0, dt_min, dt_max }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime { dt: dt.as_secs_f32(), now, frame_index: self.frame_index };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
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
    fn delta_is_clamped_both_ways() {
        let start = Instant::now();
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        clock.last = start;

        let ft = clock.tick_at(start);
        assert_eq!(ft.dt, 0.001);

        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(ft.dt, 0.1);
    }

    #[test]
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        let now = Instant::now();
        assert_eq!(clock.tick_at(now).frame_index, 0);
        assert_eq!(clock.tick_at(now).frame_index, 1);
    }
}
