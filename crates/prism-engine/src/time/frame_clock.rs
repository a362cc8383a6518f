use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time since the previous tick in seconds, clamped.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Unclamped time since the clock was created or last reset.
    ///
    /// Animations derive their pose from this value, so a long stall jumps
    /// ahead instead of slowing down.
    pub elapsed: Duration,

    pub frame_index: u64,
}

/// Per-window clock producing [`FrameTime`] snapshots.
///
/// Delta time is clamped so that debugger pauses or minimized windows do not
/// produce huge steps.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
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
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Restarts elapsed time and the delta baseline.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.start = now;
        self.last = now;
    }

    /// Time since the clock started, without advancing it.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            elapsed: now.saturating_duration_since(self.start),
            frame_index: self.frame_index,
        };

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
    fn elapsed_is_measured_from_start() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.reset_at(t0);

        let first = clock.tick_at(t0 + Duration::from_millis(16));
        let second = clock.tick_at(t0 + Duration::from_millis(1000));

        assert_eq!(first.frame_index, 0);
        assert_eq!(second.frame_index, 1);
        assert_eq!(second.elapsed, Duration::from_millis(1000));
    }

    #[test]
    fn dt_is_clamped_but_elapsed_is_not() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        let t0 = Instant::now();
        clock.reset_at(t0);

        let ft = clock.tick_at(t0 + Duration::from_secs(5));
        assert!((ft.dt - 0.1).abs() < 1e-6);
        assert_eq!(ft.elapsed, Duration::from_secs(5));

        let ft = clock.tick_at(t0 + Duration::from_secs(5));
        assert!((ft.dt - 0.001).abs() < 1e-6);
    }
}
