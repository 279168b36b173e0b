//! Preview window composing the backdrop with scroll physics.
//!
//! The window hosts a simulated scrollable region (content three viewports
//! tall) so the whole chain is exercised end to end: wheel events feed the
//! inertia engine, the eased offset publishes normalized progress into the
//! shared store, and damped scene parameters plus the GPU backdrop consume
//! the result. When the backdrop cannot mount, the haze fallback is written
//! out once and the window keeps running without GPU work.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use motion::{
    DampedValue, InertiaEngine, InertiaOptions, ProgressPublisher, ProgressStore, ScrollRegion,
    StepOutcome,
};
use renderer::{HazeLayer, PillarParams, PillarRenderer, RegionSize, TickOutcome};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

/// Simulated content height, in viewports.
const CONTENT_VIEWPORTS: f32 = 3.0;
/// One wheel "line" in pixels, for line-based mice.
const WHEEL_LINE_PX: f32 = 40.0;
/// Resize propagation into the renderer is debounced by this window.
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);
/// Pointer uniform updates are throttled to roughly one per frame.
const POINTER_THROTTLE: Duration = Duration::from_millis(16);

pub struct ViewerConfig {
    pub scene_id: String,
    pub params: PillarParams,
    pub inertia: InertiaOptions,
    pub size: (u32, u32),
    pub fps: Option<f32>,
    pub reduced_motion: bool,
    pub haze_out: Option<PathBuf>,
}

pub fn run(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.size.0, config.size.1);
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(format!("lightwell: {}", config.scene_id))
            .with_inner_size(window_size)
            .build(&event_loop)
            .context("failed to create viewer window")?,
    );

    let mut state = ViewerState::new(window.clone(), config);
    state.mount();
    state.window.request_redraw();

    event_loop
        .run(move |event, elwt| {
            // Drive redraws via vblank by waiting between events.
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window.id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            state.shutdown();
                            elwt.exit();
                        }
                        WindowEvent::MouseWheel { delta, .. } => state.handle_wheel(delta),
                        WindowEvent::CursorMoved { position, .. } => state.handle_cursor(position),
                        WindowEvent::Resized(new_size) => state.queue_resize(new_size),
                        WindowEvent::RedrawRequested => state.redraw(),
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    state.flush_pending_resize();
                    state.window.request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

struct ViewerState {
    window: Arc<Window>,
    config: ViewerConfig,
    renderer: PillarRenderer,
    engine: InertiaEngine,
    publisher: ProgressPublisher,
    store: ProgressStore,
    /// Progress-driven scene parameters, one damping rate each.
    exit_fade: DampedValue,
    drift: DampedValue,
    region: ScrollRegion,
    pending_resize: Option<(Instant, PhysicalSize<u32>)>,
    last_pointer: Option<Instant>,
    haze_written: bool,
}

impl ViewerState {
    fn new(window: Arc<Window>, config: ViewerConfig) -> Self {
        let viewport = config.size.1 as f32;
        let region = ScrollRegion::new(viewport * CONTENT_VIEWPORTS, viewport);
        let engine = InertiaEngine::attach(region, 0.0, config.inertia);

        let mut store = ProgressStore::new();
        store.subscribe(|scene, value| {
            tracing::debug!(scene, value, "scene progress updated");
        });

        Self {
            window,
            renderer: PillarRenderer::new(),
            engine,
            publisher: ProgressPublisher::new(config.scene_id.clone()),
            store,
            exit_fade: DampedValue::new(0.0, 0.18),
            drift: DampedValue::new(0.0, 0.08),
            region,
            pending_resize: None,
            last_pointer: None,
            haze_written: false,
            config,
        }
    }

    fn mount(&mut self) {
        let (width, height) = self.config.size;
        let mounted = self.renderer.mount(
            self.window.as_ref(),
            RegionSize::new(width, height),
            &self.config.params,
            self.config.reduced_motion,
            self.config.fps,
        );
        if !mounted {
            self.write_haze_once();
        }
        // Seed the shared store so consumers see the scene at rest.
        self.publisher
            .publish(self.region.max_scroll(), 0.0, &mut self.store);
    }

    /// Writes the static fallback bitmap once, at the window size.
    fn write_haze_once(&mut self) {
        if self.haze_written {
            return;
        }
        self.haze_written = true;

        let haze = HazeLayer::from_params(&self.config.params);
        let path = self
            .config
            .haze_out
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("lightwell-haze.png"));
        let (width, height) = self.config.size;
        match haze.write_png(&path, width, height) {
            Ok(()) => tracing::info!(
                path = %path.display(),
                opacity = haze.effective_opacity(),
                "backdrop running on the static haze layer"
            ),
            Err(err) => tracing::warn!(error = %err, "failed to write haze fallback"),
        }
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        // winit reports wheel-down as negative y; the scroll offset grows
        // downward, so the sign flips.
        let (dx, dy) = match delta {
            MouseScrollDelta::LineDelta(x, y) => (x * WHEEL_LINE_PX, -y * WHEEL_LINE_PX),
            MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, -pos.y as f32),
        };
        self.engine.wheel(dx, dy);
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        if !self.config.params.interactive {
            return;
        }
        let now = Instant::now();
        if matches!(self.last_pointer, Some(last) if now.duration_since(last) < POINTER_THROTTLE) {
            return;
        }
        self.last_pointer = Some(now);

        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }
        let x01 = (position.x as f32 / size.width as f32) * 2.0 - 1.0;
        let y01 = -((position.y as f32 / size.height as f32) * 2.0 - 1.0);
        self.renderer.set_pointer(x01, y01);
    }

    fn queue_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.pending_resize = Some((Instant::now(), new_size));
    }

    /// Applies the most recent resize once it has sat still long enough.
    fn flush_pending_resize(&mut self) {
        let Some((queued_at, new_size)) = self.pending_resize else {
            return;
        };
        if queued_at.elapsed() < RESIZE_DEBOUNCE {
            return;
        }
        self.pending_resize = None;

        self.config.size = (new_size.width, new_size.height);
        let viewport = new_size.height as f32;
        self.region = ScrollRegion::new(viewport * CONTENT_VIEWPORTS, viewport);
        self.engine.set_region(self.region);
        self.renderer
            .resize(RegionSize::new(new_size.width, new_size.height));
        tracing::debug!(
            width = new_size.width,
            height = new_size.height,
            "applied debounced resize"
        );
    }

    fn redraw(&mut self) {
        let offset = match self.engine.step() {
            StepOutcome::Animating(position) | StepOutcome::Settled(position) => Some(position),
            StepOutcome::Idle => None,
        };
        if let Some(offset) = offset {
            if let Some(progress) =
                self.publisher
                    .publish(self.region.max_scroll(), offset, &mut self.store)
            {
                self.exit_fade.set_target(progress);
                self.drift.set_target(progress * 2.0 - 1.0);
            }
        }

        let fade = self.exit_fade.step();
        let drift = self.drift.step();
        tracing::trace!(fade, drift, "scene rig stepped");

        if self.renderer.tick(Instant::now()) == TickOutcome::Dead {
            tracing::warn!("backdrop session died; continuing on the haze layer");
            self.write_haze_once();
        }
    }

    fn shutdown(&mut self) {
        self.engine.detach();
        self.renderer.unmount();
    }
}
