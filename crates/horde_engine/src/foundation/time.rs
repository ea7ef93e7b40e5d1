//! Time management utilities

use std::time::Instant;

/// Per-frame time snapshot handed by value to every system
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds elapsed since the previous frame
    pub delta: f32,

    /// Seconds elapsed since the clock was first updated
    pub since_start: f32,
}

impl FrameTime {
    /// Build a snapshot from explicit values (scripted or test frames)
    pub fn new(delta: f32, since_start: f32) -> Self {
        Self { delta, since_start }
    }
}

/// Monotonic frame clock
///
/// The first `update` after construction or `reset` anchors the start and
/// reports a zero delta.
#[derive(Debug, Default)]
pub struct FrameClock {
    start_time: Option<Instant>,
    last_time: Option<Instant>,
    delta_time: f32,
    time_since_start: f32,
}

impl FrameClock {
    /// Create an unset clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the start and previous frame so the next update starts over
    pub fn reset(&mut self) {
        self.start_time = None;
        self.last_time = None;
        self.delta_time = 0.0;
        self.time_since_start = 0.0;
    }

    /// Sample the wall clock (should be called once per frame)
    pub fn update(&mut self) -> FrameTime {
        self.advance_to(Instant::now())
    }

    fn advance_to(&mut self, now: Instant) -> FrameTime {
        let start = *self.start_time.get_or_insert(now);
        self.time_since_start = now.duration_since(start).as_secs_f32();
        self.delta_time = self
            .last_time
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_time = Some(now);
        self.frame_time()
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the time since the first update in seconds
    pub fn time_since_start(&self) -> f32 {
        self.time_since_start
    }

    /// Snapshot of the last update
    pub fn frame_time(&self) -> FrameTime {
        FrameTime::new(self.delta_time, self.time_since_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::Duration;

    #[test]
    fn test_first_update_has_zero_delta() {
        let mut clock = FrameClock::new();
        let frame = clock.advance_to(Instant::now());
        assert_eq!(frame.delta, 0.0);
        assert_eq!(frame.since_start, 0.0);
    }

    #[test]
    fn test_delta_and_since_start_accumulate() {
        let mut clock = FrameClock::new();
        let origin = Instant::now();
        clock.advance_to(origin);
        clock.advance_to(origin + Duration::from_millis(250));
        let frame = clock.advance_to(origin + Duration::from_millis(400));

        assert_relative_eq!(frame.delta, 0.15, epsilon = 1e-4);
        assert_relative_eq!(frame.since_start, 0.4, epsilon = 1e-4);
        assert_eq!(clock.frame_time(), frame);
    }

    #[test]
    fn test_reset_restarts_the_anchor() {
        let mut clock = FrameClock::new();
        let origin = Instant::now();
        clock.advance_to(origin);
        clock.advance_to(origin + Duration::from_secs(2));
        clock.reset();

        let frame = clock.advance_to(origin + Duration::from_secs(3));
        assert_eq!(frame.delta, 0.0);
        assert_eq!(frame.since_start, 0.0);
        assert_eq!(clock.delta_time(), 0.0);
        assert_eq!(clock.time_since_start(), 0.0);
    }
}
