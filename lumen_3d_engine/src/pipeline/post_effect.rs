/// Full-screen post-processing effects.
///
/// Each effect carries only what distinguishes it: a fragment shader and a
/// uniform step. The full-screen draw itself is shared and lives in
/// `PostProcessingRenderingStage`.

use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use crate::parameter::{keys, ParameterContainer};

/// Vertex shader shared by every full-screen pass (one oversized triangle)
pub const FULLSCREEN_VERTEX_SOURCE: &str = r#"#version 450
layout(location = 0) out vec2 v_uv;
void main() {
    v_uv = vec2((gl_VertexIndex << 1) & 2, gl_VertexIndex & 2);
    gl_Position = vec4(v_uv * 2.0 - 1.0, 0.0, 1.0);
}
"#;

/// Fragment shader copying its input unchanged
pub const COPY_FRAGMENT_SOURCE: &str = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;
layout(set = 0, binding = 0) uniform sampler2D u_work;
void main() {
    out_color = texture(u_work, v_uv);
}
"#;

const GRAYSCALE_SOURCE: &str = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;
layout(set = 0, binding = 0) uniform sampler2D u_work;
void main() {
    vec4 color = texture(u_work, v_uv);
    float luma = dot(color.rgb, vec3(0.2126, 0.7152, 0.0722));
    out_color = vec4(vec3(luma), color.a);
}
"#;

const INVERT_SOURCE: &str = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;
layout(set = 0, binding = 0) uniform sampler2D u_work;
void main() {
    vec4 color = texture(u_work, v_uv);
    out_color = vec4(1.0 - color.rgb, color.a);
}
"#;

const FXAA_SOURCE: &str = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;
layout(set = 0, binding = 0) uniform sampler2D u_work;
layout(set = 0, binding = 1) uniform Fxaa { vec2 texel_size; };

float luma(vec3 c) { return dot(c, vec3(0.299, 0.587, 0.114)); }

void main() {
    vec3 center = texture(u_work, v_uv).rgb;
    vec3 nw = texture(u_work, v_uv + vec2(-1.0, -1.0) * texel_size).rgb;
    vec3 ne = texture(u_work, v_uv + vec2( 1.0, -1.0) * texel_size).rgb;
    vec3 sw = texture(u_work, v_uv + vec2(-1.0,  1.0) * texel_size).rgb;
    vec3 se = texture(u_work, v_uv + vec2( 1.0,  1.0) * texel_size).rgb;

    float l_nw = luma(nw), l_ne = luma(ne), l_sw = luma(sw), l_se = luma(se);
    float l_c = luma(center);
    float l_min = min(l_c, min(min(l_nw, l_ne), min(l_sw, l_se)));
    float l_max = max(l_c, max(max(l_nw, l_ne), max(l_sw, l_se)));

    vec2 dir = vec2(-((l_nw + l_ne) - (l_sw + l_se)), (l_nw + l_sw) - (l_ne + l_se));
    float reduce = max((l_nw + l_ne + l_sw + l_se) * 0.03125, 1.0 / 128.0);
    float scale = 1.0 / (min(abs(dir.x), abs(dir.y)) + reduce);
    dir = clamp(dir * scale, vec2(-8.0), vec2(8.0)) * texel_size;

    vec3 a = 0.5 * (texture(u_work, v_uv - dir * (1.0 / 6.0)).rgb
                  + texture(u_work, v_uv + dir * (1.0 / 6.0)).rgb);
    vec3 b = a * 0.5 + 0.25 * (texture(u_work, v_uv - dir * 0.5).rgb
                             + texture(u_work, v_uv + dir * 0.5).rgb);
    float l_b = luma(b);
    out_color = vec4((l_b < l_min || l_b > l_max) ? a : b, 1.0);
}
"#;

const TONE_MAPPING_SOURCE: &str = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;
layout(set = 0, binding = 0) uniform sampler2D u_work;
layout(set = 0, binding = 1) uniform ToneMapping { float exposure; };
void main() {
    vec3 hdr = texture(u_work, v_uv).rgb * exposure;
    out_color = vec4(hdr / (hdr + vec3(1.0)), 1.0);
}
"#;

const GAMMA_CORRECTION_SOURCE: &str = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;
layout(set = 0, binding = 0) uniform sampler2D u_work;
layout(set = 0, binding = 1) uniform Gamma { float inverse_gamma; };
void main() {
    vec4 color = texture(u_work, v_uv);
    out_color = vec4(pow(color.rgb, vec3(inverse_gamma)), color.a);
}
"#;

// ===== UNIFORM BLOCKS =====

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FxaaUniforms {
    pub texel_size: [f32; 2],
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ToneMappingUniforms {
    pub exposure: f32,
    pub _padding: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GammaUniforms {
    pub inverse_gamma: f32,
    pub _padding: [f32; 3],
}

// ===== EFFECTS =====

/// Identity of an effect, independent of its settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostEffectKind {
    Grayscale,
    Invert,
    Fxaa,
    ToneMapping,
    GammaCorrection,
}

impl PostEffectKind {
    /// Program label, unique per kind
    pub fn label(&self) -> &'static str {
        match self {
            PostEffectKind::Grayscale => "grayscale",
            PostEffectKind::Invert => "invert",
            PostEffectKind::Fxaa => "fxaa",
            PostEffectKind::ToneMapping => "tone_mapping",
            PostEffectKind::GammaCorrection => "gamma_correction",
        }
    }
}

/// A full-screen effect with its settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostEffect {
    Grayscale,
    Invert,
    Fxaa,
    /// Reinhard tone mapping after scaling by `exposure`
    ToneMapping { exposure: f32 },
    /// Uses the pipeline's published gamma
    GammaCorrection,
}

impl PostEffect {
    pub fn kind(&self) -> PostEffectKind {
        match self {
            PostEffect::Grayscale => PostEffectKind::Grayscale,
            PostEffect::Invert => PostEffectKind::Invert,
            PostEffect::Fxaa => PostEffectKind::Fxaa,
            PostEffect::ToneMapping { .. } => PostEffectKind::ToneMapping,
            PostEffect::GammaCorrection => PostEffectKind::GammaCorrection,
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind().label()
    }

    pub fn fragment_source(&self) -> &'static str {
        match self {
            PostEffect::Grayscale => GRAYSCALE_SOURCE,
            PostEffect::Invert => INVERT_SOURCE,
            PostEffect::Fxaa => FXAA_SOURCE,
            PostEffect::ToneMapping { .. } => TONE_MAPPING_SOURCE,
            PostEffect::GammaCorrection => GAMMA_CORRECTION_SOURCE,
        }
    }

    /// Uniform block bytes for one draw at `width` x `height`
    ///
    /// # Errors
    ///
    /// `Error::PreconditionFailed` if gamma correction runs without a
    /// published gamma.
    pub fn uniforms(&self, parameters: &ParameterContainer, width: u32, height: u32) -> Result<Vec<u8>> {
        let bytes = match self {
            PostEffect::Grayscale | PostEffect::Invert => Vec::new(),
            PostEffect::Fxaa => bytemuck::bytes_of(&FxaaUniforms {
                texel_size: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
                _padding: [0.0; 2],
            }).to_vec(),
            PostEffect::ToneMapping { exposure } => bytemuck::bytes_of(&ToneMappingUniforms {
                exposure: *exposure,
                _padding: [0.0; 3],
            }).to_vec(),
            PostEffect::GammaCorrection => {
                let gamma = *parameters.require(&keys::GAMMA)?;
                bytemuck::bytes_of(&GammaUniforms {
                    inverse_gamma: 1.0 / gamma,
                    _padding: [0.0; 3],
                }).to_vec()
            }
        };
        Ok(bytes)
    }
}

#[cfg(test)]
#[path = "post_effect_tests.rs"]
mod tests;
