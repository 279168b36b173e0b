//! Frame pacing for the render loop.
//!
//! Paint callbacks arrive at whatever rate the platform likes (144 Hz
//! displays, batched wakeups after a stall). The pacer turns that stream
//! into draws at a bounded rate: callbacks landing before the target
//! interval has elapsed are no-ops rather than skipped draws, and the
//! last-frame timestamp keeps the division remainder so the cadence does
//! not drift on fast displays.

use std::time::{Duration, Instant};

/// Rate limiter with a rolling last-frame timestamp.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    last_frame: Option<Instant>,
}

impl FramePacer {
    /// Default draw cadence, roughly 60 Hz.
    pub const TARGET_FRAME_INTERVAL: Duration = Duration::from_micros(16_600);

    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_micros(1)),
            last_frame: None,
        }
    }

    /// Builds a pacer from an optional FPS cap; non-positive or absent caps
    /// fall back to [`Self::TARGET_FRAME_INTERVAL`].
    pub fn from_fps(fps: Option<f32>) -> Self {
        match fps.filter(|fps| *fps > 0.0) {
            Some(fps) => Self::new(Duration::from_secs_f32(1.0 / fps)),
            None => Self::new(Self::TARGET_FRAME_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Decides whether a callback at `now` should draw.
    ///
    /// Returns the elapsed time since the previous draw when due, `None`
    /// when the callback should be a no-op. The very first callback always
    /// draws and reports one nominal interval.
    pub fn should_render(&mut self, now: Instant) -> Option<Duration> {
        let Some(last) = self.last_frame else {
            self.last_frame = Some(now);
            return Some(self.interval);
        };

        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.interval {
            return None;
        }

        // Keep the remainder instead of resetting to `now`, so a callback
        // arriving slightly late does not push every later frame back.
        let remainder = elapsed.as_nanos() % self.interval.as_nanos().max(1);
        self.last_frame = Some(now - Duration::from_nanos(remainder as u64));
        Some(elapsed)
    }

    /// Forgets pacing history; the next callback draws immediately.
    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(10);

    #[test]
    fn first_callback_always_draws() {
        let mut pacer = FramePacer::new(INTERVAL);
        assert_eq!(pacer.should_render(Instant::now()), Some(INTERVAL));
    }

    #[test]
    fn early_callbacks_are_noops() {
        let mut pacer = FramePacer::new(INTERVAL);
        let t0 = Instant::now();
        pacer.should_render(t0);
        assert_eq!(pacer.should_render(t0 + Duration::from_millis(4)), None);
        assert_eq!(pacer.should_render(t0 + Duration::from_millis(9)), None);
        assert!(pacer.should_render(t0 + Duration::from_millis(10)).is_some());
    }

    #[test]
    fn cadence_keeps_the_remainder() {
        let mut pacer = FramePacer::new(INTERVAL);
        let t0 = Instant::now();
        pacer.should_render(t0);

        // A late callback (25 ms) draws and anchors the next slot at +20 ms,
        // not +25 ms.
        assert!(pacer
            .should_render(t0 + Duration::from_millis(25))
            .is_some());
        assert_eq!(pacer.should_render(t0 + Duration::from_millis(29)), None);
        assert!(pacer
            .should_render(t0 + Duration::from_millis(30))
            .is_some());
    }

    #[test]
    fn fps_cap_overrides_the_default() {
        let pacer = FramePacer::from_fps(Some(30.0));
        assert!((pacer.interval().as_secs_f32() - 1.0 / 30.0).abs() < 1e-4);

        let pacer = FramePacer::from_fps(Some(-5.0));
        assert_eq!(pacer.interval(), FramePacer::TARGET_FRAME_INTERVAL);

        let pacer = FramePacer::from_fps(None);
        assert_eq!(pacer.interval(), FramePacer::TARGET_FRAME_INTERVAL);
    }

    #[test]
    fn reset_draws_on_the_next_callback() {
        let mut pacer = FramePacer::new(INTERVAL);
        let t0 = Instant::now();
        pacer.should_render(t0);
        pacer.reset();
        assert!(pacer.should_render(t0 + Duration::from_millis(1)).is_some());
    }
}
