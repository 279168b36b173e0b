use bytemuck::{Pod, Zeroable};

use crate::types::{PillarParams, RegionSize};

/// CPU mirror of the shader's std140 uniform block.
///
/// Every field is a vec4 so the layout is identical under std140 and
/// `repr(C)`; scalar parameters ride in the spare lanes (intensity in
/// `top_color.w`, glow in `bottom_color.w`, noise in `shape.w`, opacity in
/// `pointer.w`). Must stay in lockstep with `PillarUbo` in `pipeline.rs`.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct PillarUniforms {
    resolution: [f32; 4],
    top_color: [f32; 4],
    bottom_color: [f32; 4],
    shape: [f32; 4],
    pointer: [f32; 4],
    clock: [f32; 4],
}

unsafe impl Zeroable for PillarUniforms {}
unsafe impl Pod for PillarUniforms {}

impl PillarUniforms {
    pub fn new(size: RegionSize, params: &PillarParams) -> Self {
        Self {
            resolution: [size.width as f32, size.height as f32, 0.0, 0.0],
            top_color: [
                params.top_color[0],
                params.top_color[1],
                params.top_color[2],
                params.intensity,
            ],
            bottom_color: [
                params.bottom_color[0],
                params.bottom_color[1],
                params.bottom_color[2],
                params.glow,
            ],
            shape: [
                params.pillar_width,
                params.pillar_height,
                params.pillar_rotation,
                params.noise,
            ],
            pointer: [
                0.0,
                0.0,
                if params.interactive { 1.0 } else { 0.0 },
                params.opacity.clamp(0.0, 1.0),
            ],
            clock: [0.0; 4],
        }
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution[0] = width;
        self.resolution[1] = height;
    }

    /// Stores a pointer position in normalized [-1, 1] space.
    pub fn set_pointer(&mut self, x01: f32, y01: f32) {
        self.pointer[0] = x01.clamp(-1.0, 1.0);
        self.pointer[1] = y01.clamp(-1.0, 1.0);
    }

    /// Advances the animation clock; `seconds` is already scaled by the
    /// session's rotation speed.
    pub fn advance(&mut self, seconds: f32) {
        self.clock[0] += seconds;
    }

    #[cfg(test)]
    pub fn time(&self) -> f32 {
        self.clock[0]
    }

    #[cfg(test)]
    pub fn pointer(&self) -> (f32, f32) {
        (self.pointer[0], self.pointer[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_vec4_aligned() {
        assert_eq!(std::mem::size_of::<PillarUniforms>(), 6 * 16);
        assert_eq!(std::mem::align_of::<PillarUniforms>(), 16);
    }

    #[test]
    fn scalars_ride_the_spare_lanes() {
        let mut params = PillarParams::default();
        params.intensity = 0.7;
        params.glow = 0.01;
        params.noise = 0.2;
        params.opacity = 0.4;
        let uniforms = PillarUniforms::new(RegionSize::new(800, 600), &params);
        assert_eq!(uniforms.top_color[3], 0.7);
        assert_eq!(uniforms.bottom_color[3], 0.01);
        assert_eq!(uniforms.shape[3], 0.2);
        assert_eq!(uniforms.pointer[3], 0.4);
        assert_eq!(uniforms.resolution[0], 800.0);
    }

    #[test]
    fn clock_accumulates_scaled_time() {
        let params = PillarParams::default();
        let mut uniforms = PillarUniforms::new(RegionSize::new(1, 1), &params);
        uniforms.advance(0.016);
        uniforms.advance(0.016);
        assert!((uniforms.time() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn pointer_values_clamp_to_unit_square() {
        let params = PillarParams::default();
        let mut uniforms = PillarUniforms::new(RegionSize::new(1, 1), &params);
        uniforms.set_pointer(3.0, -2.0);
        assert_eq!(uniforms.pointer(), (1.0, -1.0));
    }
}
