/// Compositing mode for the backdrop layer over the page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Standard source-over alpha blending.
    Normal,
    /// Screen compositing; brightens without ever darkening, the stock look.
    Screen,
    /// Plain additive accumulation for hotter scenes.
    Additive,
}

impl Default for BlendMode {
    fn default() -> Self {
        Self::Screen
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlendMode::Normal => f.write_str("normal"),
            BlendMode::Screen => f.write_str("screen"),
            BlendMode::Additive => f.write_str("additive"),
        }
    }
}

/// Layout size of the host region in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSize {
    pub width: u32,
    pub height: u32,
}

impl RegionSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-area region can never host a surface.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Immutable per-session configuration for the pillar backdrop.
///
/// Changing any value means tearing the session down and mounting a fresh
/// one; there is no in-place reconfiguration path.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarParams {
    /// Gradient color at the top of the pillar, unit-range RGB.
    pub top_color: [f32; 3],
    /// Gradient color at the bottom, unit-range RGB.
    pub bottom_color: [f32; 3],
    /// Overall output multiplier, typically 0..1.
    pub intensity: f32,
    /// Scale on the wall-clock advance of the animation.
    pub rotation_speed: f32,
    /// When true the pointer uniform steers the pillar's spin.
    pub interactive: bool,
    /// Tone-map gain; small values keep the glow subtle.
    pub glow: f32,
    /// Strength of the anti-banding dither.
    pub noise: f32,
    /// Radial bound of the pillar column.
    pub pillar_width: f32,
    /// Vertical compression applied before the wave deformation.
    pub pillar_height: f32,
    /// Static rotation of the whole view, in degrees.
    pub pillar_rotation: f32,
    /// Compositing mode over the page content.
    pub blend: BlendMode,
    /// Opacity of the rendered layer, 0..1.
    pub opacity: f32,
    /// Strength of the static haze fallback, 0..1, independent of whether
    /// GPU rendering succeeds.
    pub haze_opacity: f32,
}

impl Default for PillarParams {
    fn default() -> Self {
        Self {
            top_color: [0x29 as f32 / 255.0, 1.0, 0x90 as f32 / 255.0],
            bottom_color: [0xa0 as f32 / 255.0, 0x9e as f32 / 255.0, 1.0],
            intensity: 0.9,
            rotation_speed: 0.25,
            interactive: false,
            glow: 0.005,
            noise: 0.45,
            pillar_width: 3.0,
            pillar_height: 0.4,
            pillar_rotation: 0.0,
            blend: BlendMode::default(),
            opacity: 0.55,
            haze_opacity: 0.55,
        }
    }
}

/// Why a mount attempt produced no session.
///
/// None of these escape [`crate::PillarRenderer::mount`] as errors; they are
/// logged and collapsed into the no-session return so the caller falls back
/// to the haze layer without branching during a render pass.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("caller requested reduced motion")]
    ReducedMotion,
    #[error("render region is empty ({width}x{height})")]
    EmptyRegion { width: u32, height: u32 },
    #[error("3D acceleration is unavailable")]
    CapabilityUnavailable,
    #[error("GPU initialisation failed: {0}")]
    Initialization(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_mirror_the_stock_backdrop() {
        let params = PillarParams::default();
        assert_eq!(params.blend, BlendMode::Screen);
        assert!((params.opacity - 0.55).abs() < 1e-6);
        assert!((params.pillar_width - 3.0).abs() < 1e-6);
        assert!(!params.interactive);
    }

    #[test]
    fn empty_region_detection() {
        assert!(RegionSize::new(0, 720).is_empty());
        assert!(RegionSize::new(1280, 0).is_empty());
        assert!(!RegionSize::new(1, 1).is_empty());
    }
}
