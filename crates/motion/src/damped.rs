//! Per-parameter damped interpolation.
//!
//! Scroll progress drives many dependent visual parameters (exit fades,
//! parallax offsets, drift) that each want their own smoothing rate. Instead
//! of a lazily recomputed derived-value graph, every parameter holds explicit
//! `{ current, target, rate }` state stepped once per frame, colocated with
//! the scene instance that owns it.

/// Gap below which a damped parameter snaps onto its target. Parameters are
/// typically normalized, so this is far finer than the pixel-scale epsilon
/// used for scrolling.
const SNAP_EPSILON: f32 = 1e-3;

/// A scalar that chases its target with exponential damping.
#[derive(Debug, Clone, Copy)]
pub struct DampedValue {
    current: f32,
    target: f32,
    rate: f32,
}

impl DampedValue {
    /// Creates a settled value at `initial`. `rate` is the per-frame
    /// interpolation factor in (0, 1]; higher is snappier.
    pub fn new(initial: f32, rate: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            rate: rate.clamp(f32::EPSILON, 1.0),
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Forces the value onto `value` with no interpolation.
    pub fn snap_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    pub fn is_settled(&self) -> bool {
        (self.target - self.current).abs() < SNAP_EPSILON
    }

    /// Advances one frame and returns the new current value.
    pub fn step(&mut self) -> f32 {
        let gap = self.target - self.current;
        if gap.abs() < SNAP_EPSILON {
            self.current = self.target;
        } else {
            self.current += gap * self.rate;
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approaches_target_monotonically() {
        let mut value = DampedValue::new(0.0, 0.2);
        value.set_target(1.0);
        let mut last = 0.0;
        for _ in 0..16 {
            let next = value.step();
            assert!(next >= last);
            assert!(next <= 1.0);
            last = next;
        }
    }

    #[test]
    fn settles_exactly_on_target() {
        let mut value = DampedValue::new(0.0, 0.35);
        value.set_target(0.8);
        for _ in 0..200 {
            value.step();
            if value.is_settled() {
                break;
            }
        }
        value.step();
        assert_eq!(value.current(), 0.8);
    }

    #[test]
    fn snap_bypasses_interpolation() {
        let mut value = DampedValue::new(0.0, 0.1);
        value.set_target(1.0);
        value.step();
        value.snap_to(0.5);
        assert_eq!(value.current(), 0.5);
        assert!(value.is_settled());
    }

    #[test]
    fn degenerate_rates_are_clamped() {
        let mut value = DampedValue::new(0.0, 0.0);
        value.set_target(1.0);
        // Even a zero rate request must still make (tiny) progress rather
        // than dividing the frame loop into an infinite stall.
        let before = value.current();
        value.step();
        assert!(value.current() >= before);

        let mut value = DampedValue::new(0.0, 5.0);
        value.set_target(1.0);
        value.step();
        assert!(value.current() <= 1.0);
    }
}
