//! Backdrop session lifecycle.
//!
//! [`PillarRenderer`] is a small state machine over the GPU resources:
//!
//! ```text
//!   Unmounted ──mount()──▶ Active ──render error──▶ Failed
//!       ▲    ╲ preflight/init │
//!       │     ╲    failure    │ unmount()
//!       │      ▶ Failed       ▼
//!       └──────────────── Unmounted
//! ```
//!
//! The session slot is swapped out *before* its resources drop, so a frame
//! callback that was already scheduled when teardown began observes an empty
//! slot and no-ops instead of touching a disposed surface.

use std::mem;
use std::time::Instant;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;

use crate::capability;
use crate::gpu::context::GpuContext;
use crate::gpu::pipeline;
use crate::gpu::uniforms::PillarUniforms;
use crate::pacing::FramePacer;
use crate::types::{MountError, PillarParams, RegionSize};

/// What one paint callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No live session; nothing to do.
    Idle,
    /// The pacer swallowed an early callback, or the swapchain is being
    /// rebuilt; try again next frame.
    Throttled,
    /// A frame was drawn and presented.
    Rendered,
    /// The draw failed terminally; the session has been torn down and the
    /// caller should treat the backdrop as unmounted.
    Dead,
}

/// Live GPU resources for one mounted backdrop.
///
/// Declaration order doubles as release order: uniform bindings first, then
/// the compiled pipeline, then the surface context. Dropping the struct is
/// the teardown.
struct RenderSession {
    uniform_bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
    context: GpuContext,
    uniforms: PillarUniforms,
    pacer: FramePacer,
    params: PillarParams,
}

enum RenderPhase {
    Unmounted,
    Active(RenderSession),
    Failed,
}

/// Owns at most one [`RenderSession`] and mediates every access to it.
pub struct PillarRenderer {
    phase: RenderPhase,
}

impl Default for PillarRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PillarRenderer {
    pub fn new() -> Self {
        Self {
            phase: RenderPhase::Unmounted,
        }
    }

    /// True while a session is live and ticking.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, RenderPhase::Active(_))
    }

    /// Attempts to bring a session up for `target`.
    ///
    /// Returns false (never an error) when reduced motion is requested,
    /// the region is empty, no 3D acceleration exists, or GPU setup throws;
    /// the caller keeps relying on the always-present haze layer. Mounting
    /// over a live session tears the old one down first (parameter changes
    /// rebuild, they never patch in place).
    pub fn mount<T>(
        &mut self,
        target: &T,
        region: RegionSize,
        params: &PillarParams,
        reduced_motion: bool,
        fps_cap: Option<f32>,
    ) -> bool
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        self.unmount();

        if let Err(reason) = preflight(region, reduced_motion) {
            tracing::info!("backdrop not mounted: {reason}");
            // Reduced motion is a deliberate skip, not a failure.
            if !matches!(reason, MountError::ReducedMotion) {
                self.phase = RenderPhase::Failed;
            }
            return false;
        }

        match init_session(target, region, params, fps_cap) {
            Ok(session) => {
                tracing::info!(
                    width = region.width,
                    height = region.height,
                    blend = %params.blend,
                    "mounted backdrop session"
                );
                self.phase = RenderPhase::Active(session);
                true
            }
            Err(err) => {
                // Anything partially created inside init_session has already
                // dropped on the error path.
                tracing::warn!(error = %err, "backdrop initialisation failed; using haze fallback");
                self.phase = RenderPhase::Failed;
                false
            }
        }
    }

    /// Updates the surface and resolution uniform. Safe at any rate and a
    /// no-op without a live session; callers should debounce (≥100 ms) to
    /// avoid layout thrash.
    pub fn resize(&mut self, region: RegionSize) {
        let RenderPhase::Active(session) = &mut self.phase else {
            return;
        };
        if region.is_empty() {
            return;
        }
        if session.context.resize(region) {
            session
                .uniforms
                .set_resolution(region.width as f32, region.height as f32);
        }
    }

    /// Stores a pointer position in normalized [-1, 1] space. Ignored for
    /// non-interactive sessions; callers throttle to ~60 Hz.
    pub fn set_pointer(&mut self, x01: f32, y01: f32) {
        let RenderPhase::Active(session) = &mut self.phase else {
            return;
        };
        if !session.params.interactive {
            return;
        }
        session.uniforms.set_pointer(x01, y01);
    }

    /// Drives one paint callback.
    ///
    /// Resize and pointer updates applied before this call are reflected in
    /// this frame's draw; updates arriving afterwards land next frame.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let session = match &mut self.phase {
            RenderPhase::Active(session) => session,
            _ => return TickOutcome::Idle,
        };

        let Some(elapsed) = session.pacer.should_render(now) else {
            return TickOutcome::Throttled;
        };

        session
            .uniforms
            .advance(elapsed.as_secs_f32() * session.params.rotation_speed);

        match session.render() {
            Ok(()) => TickOutcome::Rendered,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // The swapchain went stale (resize race, compositor restart);
                // rebuild it and draw on the next callback.
                session.context.reconfigure();
                TickOutcome::Throttled
            }
            Err(err) => {
                tracing::warn!(error = %err, "render failed; tearing the session down");
                self.teardown(RenderPhase::Failed);
                TickOutcome::Dead
            }
        }
    }

    /// Releases the session if one is live: uniform bindings, pipeline,
    /// surface, in that order. Idempotent; every exit path funnels here.
    pub fn unmount(&mut self) {
        self.teardown(RenderPhase::Unmounted);
    }

    fn teardown(&mut self, next: RenderPhase) {
        // Swap first so a callback scheduled for this frame sees no session.
        let previous = mem::replace(&mut self.phase, next);
        if let RenderPhase::Active(session) = previous {
            tracing::debug!("releasing backdrop session");
            drop(session);
        }
    }
}

fn preflight(region: RegionSize, reduced_motion: bool) -> Result<(), MountError> {
    if reduced_motion {
        return Err(MountError::ReducedMotion);
    }
    if region.is_empty() {
        return Err(MountError::EmptyRegion {
            width: region.width,
            height: region.height,
        });
    }
    if !capability::probe() {
        return Err(MountError::CapabilityUnavailable);
    }
    Ok(())
}

fn init_session<T>(
    target: &T,
    region: RegionSize,
    params: &PillarParams,
    fps_cap: Option<f32>,
) -> Result<RenderSession, MountError>
where
    T: HasDisplayHandle + HasWindowHandle,
{
    let context = GpuContext::new(target, region)?;
    let (uniform_layout, pipeline) =
        pipeline::create_pipeline(&context.device, context.format(), params.blend)?;

    let uniforms = PillarUniforms::new(region, params);
    let uniform_buffer = context
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pillar uniform buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

    let uniform_bind_group = context
        .device
        .create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pillar uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

    Ok(RenderSession {
        uniform_bind_group,
        uniform_buffer,
        pipeline,
        context,
        uniforms,
        pacer: FramePacer::from_fps(fps_cap),
        params: params.clone(),
    })
}

impl RenderSession {
    /// Uploads the uniform mirror and submits one draw.
    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let frame = self.context.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pillar encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pillar pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
