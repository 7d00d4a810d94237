use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::error::InstanceError;

/// Parameter names the prelude provides. Loose declarations of these in a
/// variant body are dropped so they do not shadow the uniform block.
const PARAM_NAMES: [&str; 7] = [
    "resolution",
    "time",
    "scroll",
    "randomSeed",
    "speedMultiplier",
    "colorShift",
    "intensity",
];

pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule, InstanceError> {
    scoped(device, "vertex", || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("card vertex"),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Owned(source.to_string()),
                stage: ShaderStage::Vertex,
                defines: &[],
            },
        })
    })
}

/// Wraps a `mainCard` body with the card prelude and compiles it.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    body: &str,
) -> Result<wgpu::ShaderModule, InstanceError> {
    let wrapped = wrap_card_fragment(body);
    scoped(device, "fragment", || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("card fragment"),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Owned(wrapped),
                stage: ShaderStage::Fragment,
                defines: &[],
            },
        })
    })
}

/// Runs `build` inside a validation error scope and turns a captured error
/// into [`InstanceError::Compile`].
pub(crate) fn scoped<T>(
    device: &wgpu::Device,
    stage: &'static str,
    build: impl FnOnce() -> T,
) -> Result<T, InstanceError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(value),
        Some(err) => Err(InstanceError::Compile {
            stage,
            message: err.to_string(),
        }),
    }
}

/// Produces a complete GLSL 450 fragment program from a variant body.
///
/// `#version`, `precision` and `varying` lines are removed, as are `uniform`
/// declarations naming one of the provided parameters. The body is then placed
/// between [`HEADER`] and [`FOOTER`].
pub(crate) fn wrap_card_fragment(body: &str) -> String {
    let mut sanitized = String::with_capacity(body.len());
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#version")
            || trimmed.starts_with("precision ")
            || trimmed.starts_with("varying ")
        {
            continue;
        }
        if trimmed.starts_with("uniform ") && declares_param(trimmed) {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!("{HEADER}\n#line 1\n{sanitized}{FOOTER}")
}

fn declares_param(line: &str) -> bool {
    line.split(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
        .any(|word| PARAM_NAMES.contains(&word))
}

/// Layout must match [`crate::uniforms::CardUniforms`].
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform CardParams {
    vec2 u_resolution;
    float u_time;
    float u_scroll;
    float u_randomSeed;
    float u_speedMultiplier;
    float u_colorShift;
    float u_intensity;
} ubo;

#define resolution ubo.u_resolution
#define time ubo.u_time
#define scroll ubo.u_scroll
#define randomSeed ubo.u_randomSeed
#define speedMultiplier ubo.u_speedMultiplier
#define colorShift ubo.u_colorShift
#define intensity ubo.u_intensity
";

const FOOTER: &str = r"
void main() {
    vec4 fragColor = vec4(0.0, 0.0, 0.0, 1.0);
    mainCard(fragColor, v_uv);
    outColor = fragColor;
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_strips_conflicting_declarations() {
        let body = r#"
            #version 100
            precision mediump float;
            uniform float time;
            uniform vec2 resolution;
            varying vec2 vUv;
            uniform sampler2D extra;
            void mainCard(out vec4 fragColor, in vec2 uv) {
                fragColor = vec4(uv, sin(time), 1.0);
            }
        "#;

        let wrapped = wrap_card_fragment(body);
        assert!(!wrapped.contains("#version 100"));
        assert!(!wrapped.contains("precision mediump"));
        assert!(!wrapped.contains("uniform float time"));
        assert!(!wrapped.contains("uniform vec2 resolution"));
        assert!(!wrapped.contains("varying vec2 vUv"));
        assert!(wrapped.contains("uniform sampler2D extra"));
        assert!(wrapped.starts_with("#version 450"));
        assert!(wrapped.contains("mainCard(fragColor, v_uv)"));
    }

    #[test]
    fn param_match_is_whole_word() {
        assert!(declares_param("uniform float intensity;"));
        assert!(!declares_param("uniform float intensityBoost;"));
        assert!(!declares_param("uniform float timeline;"));
    }

    #[test]
    fn bundled_bodies_keep_every_line() {
        let library = shaderlib::ShaderLibrary::builtin();
        for variant in library.iter() {
            let wrapped = wrap_card_fragment(variant.fragment_source());
            let body_lines = variant.fragment_source().lines().count();
            let kept = wrapped
                .split("#line 1\n")
                .nth(1)
                .map(|rest| rest.lines().count())
                .unwrap_or_default();
            assert_eq!(
                kept,
                body_lines + FOOTER.lines().count(),
                "{} lost lines",
                variant.name()
            );
        }
    }
}
