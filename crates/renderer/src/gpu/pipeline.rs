//! Shader compilation and pipeline assembly.
//!
//! Both shaders ship as embedded GLSL and compile through naga's GLSL
//! frontend at mount time. The fragment stage is the whole visual: a
//! ray-marched signed-distance field forming a rotating, wave-deformed glow
//! pillar, tone-mapped and dithered. The vertex stage is the usual
//! fullscreen triangle, so no geometry buffers exist at all.

use std::borrow::Cow;

use anyhow::Result;
use wgpu::naga::ShaderStage;

use crate::types::BlendMode;

/// Maps the scene's compositing request onto a fixed-function blend state.
pub(crate) fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Normal => wgpu::BlendState::ALPHA_BLENDING,
        // screen(a, b) = a + b - a*b, expressed as src*(1-dst) + dst.
        BlendMode::Screen => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::OneMinusDst,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
        },
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

/// Compiles both shaders and assembles the backdrop pipeline.
///
/// Returns the uniform bind-group layout alongside the pipeline so the
/// session can build its bind group against the same layout object.
pub(crate) fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    blend: BlendMode,
) -> Result<(wgpu::BindGroupLayout, wgpu::RenderPipeline)> {
    let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    });
    let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("pillar fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(PILLAR_FRAGMENT_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    });

    let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("pillar uniform layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pillar pipeline layout"),
        bind_group_layouts: &[&uniform_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("pillar pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some("main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend_state(blend)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    });

    Ok((uniform_layout, pipeline))
}

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// The pillar itself: a bounded ray march through a wave-deformed distance
/// field. The uniform block layout must match `PillarUniforms` in
/// `uniforms.rs`; everything is packed into vec4s so std140 padding cannot
/// bite.
const PILLAR_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform PillarUbo {
    vec4 resolution;   // xy = surface size in px
    vec4 top_color;    // rgb, w = intensity
    vec4 bottom_color; // rgb, w = glow
    vec4 shape;        // x = width, y = height, z = rotation deg, w = noise
    vec4 pointer;      // xy in [-1,1], z = interactive flag, w = opacity
    vec4 clock;        // x = seconds
} ubo;

const float PI = 3.141592653589793;
const float EPSILON = 0.001;
const float E = 2.718281828459045;
const int MARCH_STEPS = 100;
const float MAX_DEPTH = 50.0;

mat2 rot(float a) {
    float s = sin(a);
    float c = cos(a);
    return mat2(c, -s, s, c);
}

// Cheap per-pixel hash used to dither the final color against banding.
float hash_noise(vec2 coord) {
    vec2 r = E * sin(E * coord);
    return fract(r.x * r.y * (1.0 + coord.x));
}

// Four octaves of rotated cosine displacement; gives the pillar its slow,
// liquid wobble.
vec3 wave_deform(vec3 pos, float t) {
    float freq = 1.0;
    float amp = 1.0;
    vec3 d = pos;
    for (int i = 0; i < 4; i++) {
        d.xz = rot(0.4) * d.xz;
        float phase = t * float(i) * 2.0;
        d += cos(d.zxy * freq - phase) * amp;
        freq *= 2.0;
        amp *= 0.5;
    }
    return d;
}

// Polynomial smooth minimum; merges distance fields without a hard seam.
float smin_blend(float a, float b, float k) {
    float kk = k * 4.0;
    float h = max(kk - abs(a - b), 0.0);
    return min(a, b) - h * h * 0.25 / kk;
}

float smax_blend(float a, float b, float k) {
    return -smin_blend(-a, -b, k);
}

void main() {
    vec2 frag = v_uv * ubo.resolution.xy;
    vec2 uv = (frag * 2.0 - ubo.resolution.xy) / ubo.resolution.y;
    uv = rot(ubo.shape.z * PI / 180.0) * uv;

    float time = ubo.clock.x;
    vec3 origin = vec3(0.0, 0.0, -10.0);
    vec3 dir = normalize(vec3(uv, 1.0));

    mat2 spin = rot(time * 0.3);
    if (ubo.pointer.z > 0.5 && length(ubo.pointer.xy) > 0.0) {
        spin = rot(ubo.pointer.x * PI * 2.0);
    }

    float depth = 0.1;
    vec3 col = vec3(0.0);

    for (int i = 0; i < MARCH_STEPS; i++) {
        vec3 pos = origin + dir * depth;
        pos.xz = spin * pos.xz;

        vec3 def = pos;
        def.y *= ubo.shape.y;
        def = wave_deform(def + vec3(0.0, time, 0.0), time);

        float fd = length(cos(def.xz)) - 0.2;
        float rb = length(pos.xz) - ubo.shape.x;
        fd = smax_blend(rb, fd, 1.0);
        fd = abs(fd) * 0.15 + 0.01;

        // Vertical gradient, top color high, bottom color low.
        float g = clamp((pos.y - 15.0) / -30.0, 0.0, 1.0);
        vec3 grad = mix(ubo.bottom_color.rgb, ubo.top_color.rgb, g);
        col += grad / fd;

        if (fd < EPSILON || depth > MAX_DEPTH) {
            break;
        }
        depth += fd;
    }

    float width_norm = ubo.shape.x / 3.0;
    col = tanh(col * ubo.bottom_color.w / width_norm);
    col -= hash_noise(gl_FragCoord.xy) / 15.0 * ubo.shape.w;

    out_color = vec4(col * ubo.top_color.w, ubo.pointer.w);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_blend_never_darkens() {
        let state = blend_state(BlendMode::Screen);
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::OneMinusDst);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn normal_blend_is_source_over() {
        assert_eq!(
            blend_state(BlendMode::Normal),
            wgpu::BlendState::ALPHA_BLENDING
        );
    }

    #[test]
    fn additive_blend_accumulates() {
        let state = blend_state(BlendMode::Additive);
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn shaders_declare_matching_interfaces() {
        // The fragment block must stay in lockstep with PillarUniforms;
        // catch accidental edits to either side.
        for field in [
            "vec4 resolution",
            "vec4 top_color",
            "vec4 bottom_color",
            "vec4 shape",
            "vec4 pointer",
            "vec4 clock",
        ] {
            assert!(
                PILLAR_FRAGMENT_GLSL.contains(field),
                "fragment shader lost uniform field '{field}'"
            );
        }
        assert!(VERTEX_SHADER_GLSL.contains("v_uv"));
        assert!(PILLAR_FRAGMENT_GLSL.contains("MARCH_STEPS = 100"));
    }
}
