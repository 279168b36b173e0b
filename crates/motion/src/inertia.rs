//! Inertial scroll engine.
//!
//! Wheel deltas land in a clamped target position synchronously; the
//! displayed position chases the target with exponential easing, one step per
//! animation frame. The loop stops itself once the gap closes below
//! [`SETTLE_EPSILON`] and restarts on the next consumed wheel event, so an
//! idle region costs nothing.

/// Gap below which the position snaps to the target and the loop stops, in
/// the same units as the scroll offset (pixels for a pixel-based region).
pub const SETTLE_EPSILON: f32 = 0.5;

/// Measurements of one scrollable region.
///
/// `scroll_height` is the full content extent, `client_height` the visible
/// viewport. The scrollable range is their difference, never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRegion {
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollRegion {
    pub fn new(scroll_height: f32, client_height: f32) -> Self {
        Self {
            scroll_height: scroll_height.max(0.0),
            client_height: client_height.max(0.0),
        }
    }

    /// Upper bound for scroll offsets; zero when the content fits.
    pub fn max_scroll(&self) -> f32 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// Tuning handed to [`InertiaEngine::attach`].
#[derive(Debug, Clone, Copy)]
pub struct InertiaOptions {
    /// Master switch; when false the engine never consumes input.
    pub enabled: bool,
    /// Caller-supplied reduced-motion preference; disables the engine.
    pub reduced_motion: bool,
    /// Per-frame interpolation factor in (0, 1).
    pub easing: f32,
    /// Scale applied to vertical wheel deltas before they move the target.
    pub wheel_multiplier: f32,
}

impl Default for InertiaOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            reduced_motion: false,
            easing: 0.14,
            wheel_multiplier: 1.0,
        }
    }
}

/// What the engine did with a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDisposition {
    /// Event absorbed; the caller must suppress the platform's own scroll.
    Consumed,
    /// Event ignored (engine disengaged or horizontal-dominant delta);
    /// native scrolling should proceed untouched.
    PassThrough,
}

/// Result of one animation-frame step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// No animation in flight; nothing to apply.
    Idle,
    /// Position moved; apply it and keep the frame loop scheduled.
    Animating(f32),
    /// Position snapped onto the target; apply it and stop the loop.
    Settled(f32),
}

/// Eases a scroll position toward a wheel-driven target.
///
/// The engine owns the intent state `{ current, target, animating }` for one
/// region. All mutation is cooperative: wheel events and resyncs arrive from
/// input handlers, [`step`](Self::step) runs once per frame. Nothing here
/// touches the platform; the caller applies returned positions to the real
/// scroll container.
#[derive(Debug)]
pub struct InertiaEngine {
    region: ScrollRegion,
    options: InertiaOptions,
    current: f32,
    target: f32,
    animating: bool,
    attached: bool,
}

impl InertiaEngine {
    /// Creates an engine for `region`, starting at `offset`.
    ///
    /// When `enabled` is false or `reduced_motion` is set, the engine comes
    /// up detached: every wheel event reports [`WheelDisposition::PassThrough`]
    /// and stepping is a no-op, leaving native scrolling exactly as it was.
    pub fn attach(region: ScrollRegion, offset: f32, options: InertiaOptions) -> Self {
        let engaged = options.enabled && !options.reduced_motion;
        if !engaged {
            tracing::debug!(
                enabled = options.enabled,
                reduced_motion = options.reduced_motion,
                "inertia engine attached in pass-through mode"
            );
        }
        let start = offset.clamp(0.0, region.max_scroll());
        Self {
            region,
            options,
            current: start,
            target: start,
            animating: false,
            attached: engaged,
        }
    }

    /// Currently displayed position.
    pub fn position(&self) -> f32 {
        self.current
    }

    /// Position the easing loop is converging toward.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True while a frame loop should stay scheduled.
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Feeds one wheel event into the engine.
    ///
    /// Deltas with a larger horizontal than vertical component pass through
    /// untouched so trackpad drift cannot creep the page sideways. Consumed
    /// deltas move the target by `delta_y * wheel_multiplier`, clamped to
    /// `[0, max_scroll]`, and (re)start the animation loop.
    pub fn wheel(&mut self, delta_x: f32, delta_y: f32) -> WheelDisposition {
        if !self.attached {
            return WheelDisposition::PassThrough;
        }
        if delta_x.abs() > delta_y.abs() {
            return WheelDisposition::PassThrough;
        }

        let next = self.target + delta_y * self.options.wheel_multiplier;
        self.target = next.clamp(0.0, self.region.max_scroll());
        self.animating = true;
        WheelDisposition::Consumed
    }

    /// Resynchronizes to a position the user reached by other means
    /// (scrollbar drag, keyboard, touch). The easing loop must never fight a
    /// discrete jump, so both current and target adopt the actual offset and
    /// any in-flight animation ends.
    pub fn sync_to_actual(&mut self, offset: f32) {
        let clamped = offset.clamp(0.0, self.region.max_scroll());
        self.current = clamped;
        self.target = clamped;
        self.animating = false;
    }

    /// Adopts new region measurements (viewport resize, content growth),
    /// re-clamping both positions into the new scrollable range.
    pub fn set_region(&mut self, region: ScrollRegion) {
        self.region = region;
        let max = region.max_scroll();
        self.current = self.current.clamp(0.0, max);
        self.target = self.target.clamp(0.0, max);
    }

    /// Advances the easing loop by one frame.
    ///
    /// While the gap exceeds [`SETTLE_EPSILON`] the position moves by
    /// `(target - current) * easing`; at convergence it snaps exactly onto
    /// the target and the loop self-terminates.
    pub fn step(&mut self) -> StepOutcome {
        if !self.animating {
            return StepOutcome::Idle;
        }

        let gap = self.target - self.current;
        if gap.abs() < SETTLE_EPSILON {
            self.current = self.target;
            self.animating = false;
            return StepOutcome::Settled(self.current);
        }

        self.current += gap * self.options.easing;
        StepOutcome::Animating(self.current)
    }

    /// Cancels the frame loop and stops consuming input.
    ///
    /// Safe to call any number of times and safe under unmount races: a
    /// detached engine answers every call as a no-op.
    pub fn detach(&mut self) {
        self.attached = false;
        self.animating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(easing: f32) -> InertiaEngine {
        let options = InertiaOptions {
            easing,
            ..InertiaOptions::default()
        };
        InertiaEngine::attach(ScrollRegion::new(3000.0, 1000.0), 0.0, options)
    }

    #[test]
    fn defaults_match_contract() {
        let options = InertiaOptions::default();
        assert!(options.enabled);
        assert!(!options.reduced_motion);
        assert!((options.easing - 0.14).abs() < 1e-6);
        assert!((options.wheel_multiplier - 1.0).abs() < 1e-6);
    }

    #[test]
    fn wheel_moves_target_and_converges() {
        // Region 1000 viewport over 3000 content, one wheel of +500 at
        // multiplier 1, easing 0.3.
        let mut engine = engine(0.3);
        assert_eq!(engine.wheel(0.0, 500.0), WheelDisposition::Consumed);
        assert!((engine.target() - 500.0).abs() < f32::EPSILON);

        let mut steps = 0;
        loop {
            match engine.step() {
                StepOutcome::Animating(_) => steps += 1,
                StepOutcome::Settled(position) => {
                    assert!((position - 500.0).abs() < SETTLE_EPSILON);
                    break;
                }
                StepOutcome::Idle => panic!("loop ended without settling"),
            }
            assert!(steps < 200, "easing failed to converge");
        }
        assert!(!engine.is_animating());
        assert_eq!(engine.step(), StepOutcome::Idle);
    }

    #[test]
    fn convergence_is_bounded_by_the_easing_rate() {
        let easing = 0.2_f32;
        let gap = 2000.0_f32;
        let mut engine = engine(easing);
        engine.wheel(0.0, gap);

        // current *= (1 - e) per step, so the step count is proportional to
        // log(eps / gap) / log(1 - e).
        let bound = ((SETTLE_EPSILON / gap).ln() / (1.0 - easing).ln()).ceil() as usize + 1;
        let mut steps = 0;
        while !matches!(engine.step(), StepOutcome::Settled(_)) {
            steps += 1;
            assert!(steps <= bound, "took {steps} steps, bound was {bound}");
        }
    }

    #[test]
    fn horizontal_dominant_wheel_passes_through() {
        let mut engine = engine(0.14);
        assert_eq!(engine.wheel(300.0, 100.0), WheelDisposition::PassThrough);
        assert_eq!(engine.target(), 0.0);
        assert!(!engine.is_animating());
    }

    #[test]
    fn target_never_escapes_the_scrollable_range() {
        let mut engine = engine(0.14);
        let max = ScrollRegion::new(3000.0, 1000.0).max_scroll();
        let deltas = [
            1e6, -1e7, 250.0, -90000.0, 4096.5, f32::MAX / 2.0, -123.0, 1e9,
        ];
        for delta in deltas {
            engine.wheel(0.0, delta);
            assert!(engine.target() >= 0.0);
            assert!(engine.target() <= max);
        }
    }

    #[test]
    fn sync_to_actual_ends_the_animation() {
        let mut engine = engine(0.14);
        engine.wheel(0.0, 800.0);
        assert!(engine.is_animating());

        engine.sync_to_actual(1234.0);
        assert!((engine.position() - 1234.0).abs() < f32::EPSILON);
        assert!((engine.target() - 1234.0).abs() < f32::EPSILON);
        assert!(!engine.is_animating());
        assert_eq!(engine.step(), StepOutcome::Idle);
    }

    #[test]
    fn shrinking_region_reclamps_positions() {
        let mut engine = engine(0.14);
        engine.sync_to_actual(1800.0);
        engine.set_region(ScrollRegion::new(1500.0, 1000.0));
        assert!(engine.position() <= 500.0);
        assert!(engine.target() <= 500.0);
    }

    #[test]
    fn disabled_engine_passes_everything_through() {
        let options = InertiaOptions {
            enabled: false,
            ..InertiaOptions::default()
        };
        let mut engine = InertiaEngine::attach(ScrollRegion::new(3000.0, 1000.0), 0.0, options);
        assert_eq!(engine.wheel(0.0, 500.0), WheelDisposition::PassThrough);
        assert_eq!(engine.step(), StepOutcome::Idle);

        let options = InertiaOptions {
            reduced_motion: true,
            ..InertiaOptions::default()
        };
        let mut engine = InertiaEngine::attach(ScrollRegion::new(3000.0, 1000.0), 0.0, options);
        assert_eq!(engine.wheel(0.0, 500.0), WheelDisposition::PassThrough);
    }

    #[test]
    fn detach_is_idempotent_and_final() {
        let mut engine = engine(0.14);
        engine.wheel(0.0, 500.0);
        engine.detach();
        engine.detach();
        assert!(!engine.is_animating());
        assert_eq!(engine.wheel(0.0, 500.0), WheelDisposition::PassThrough);
        assert_eq!(engine.step(), StepOutcome::Idle);
    }

    #[test]
    fn content_that_fits_never_scrolls() {
        let mut engine = InertiaEngine::attach(
            ScrollRegion::new(500.0, 1000.0),
            0.0,
            InertiaOptions::default(),
        );
        engine.wheel(0.0, 300.0);
        assert_eq!(engine.target(), 0.0);
    }
}
