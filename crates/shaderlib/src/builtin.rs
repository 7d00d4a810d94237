use crate::library::ShaderVariant;

/// Fullscreen triangle shared by every bundled variant.
///
/// Emits `v_uv` in `[0, 1]` with the origin at the bottom-left corner.
pub const FULLSCREEN_VERTEX: &str = r"#version 450
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

const SPIRAL_VORTEX: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = (uv - vec2(0.5)) * 2.0;
    float len = length(p);
    float angle = atan(p.y, p.x);

    float spiral = sin(len * (8.0 + randomSeed * 5.0) - angle * (2.0 + randomSeed * 4.0) - time * speedMultiplier * 2.0);
    float pulse = sin(len * 5.0 - time * speedMultiplier) * 0.5 + 0.5;

    vec3 dark = vec3(0.1, 0.1, 0.15);
    vec3 tint = vec3(
        0.5 + 0.5 * sin(colorShift),
        0.5 + 0.5 * sin(colorShift + 2.0),
        0.5 + 0.5 * sin(colorShift + 4.0)
    ) * 0.7 + vec3(0.3);
    fragColor = vec4(mix(dark, tint, spiral * pulse * intensity), 1.0);
}
";

const GLITCH_MATRIX: &str = r"
float hash(vec2 st) {
    return fract(sin(dot(st, vec2(12.9898, 78.233))) * 43758.5453123);
}

void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 q = uv;
    float glitch = step(0.98, hash(vec2(time * 0.1, floor(q.y * 20.0))));
    q.x += glitch * 0.1 * sin(time * 10.0);

    float scanline = sin(q.y * 100.0 + time * 5.0) * 0.05;

    float rain = hash(vec2(floor(q.x * 30.0), floor(q.y * 40.0 - time * 2.0)));
    rain = step(0.95, rain);

    vec3 base = vec3(0.1, 0.15, 0.1);
    vec3 glow = vec3(0.0, 1.0, 0.2);
    fragColor = vec4(mix(base, glow, rain * 0.8 + scanline), 1.0);
}
";

const COSMIC_NEBULA: &str = r"
float noise(vec2 p) {
    return fract(sin(dot(p, vec2(127.1, 311.7))) * 43758.5453);
}

void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = uv * 3.0;

    float n1 = noise(p + vec2(time * 0.1));
    float n2 = noise(p * 2.0 - vec2(time * 0.15));
    float n3 = noise(p * 4.0 + vec2(time * 0.2));

    float nebula = (n1 + n2 * 0.5 + n3 * 0.25) / 1.75;

    vec3 deep = vec3(0.1, 0.0, 0.3);
    vec3 mid = vec3(0.5, 0.2, 0.8);
    vec3 hot = vec3(0.9, 0.4, 0.6);

    vec3 rgb = mix(deep, mid, nebula);
    rgb = mix(rgb, hot, nebula * nebula);
    fragColor = vec4(rgb, 1.0);
}
";

const PSYCHEDELIC_WAVES: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = uv * 2.0 - vec2(1.0);
    float t = time * speedMultiplier;

    float freq1 = 3.0 + randomSeed * 5.0;
    float freq2 = 2.0 + randomSeed * 4.0;

    float wave1 = sin(p.x * freq1 + t) + sin(p.y * freq1 + t * 1.2);
    float wave2 = cos(p.x * freq2 - t * 0.8) + cos(p.y * freq2 - t);
    float wave3 = sin(length(p) * (6.0 + randomSeed * 4.0) - t * 2.0);

    float combined = (wave1 + wave2 + wave3) / 3.0;

    vec3 rgb = vec3(
        0.5 + 0.5 * sin(combined + t + colorShift),
        0.5 + 0.5 * sin(combined + t + colorShift + 2.0),
        0.5 + 0.5 * sin(combined + t + colorShift + 4.0)
    ) * intensity;
    fragColor = vec4(rgb, 1.0);
}
";

const FRACTAL_ZOOM: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = (uv - vec2(0.5)) * 2.0;
    p *= 1.0 + sin(time * 0.5) * 0.5;

    float fractal = 0.0;
    for (float i = 0.0; i < 5.0; i += 1.0) {
        float scale = pow(2.0, i);
        fractal += abs(sin(p.x * scale + time) * cos(p.y * scale - time)) / scale;
    }

    vec3 low = vec3(0.2, 0.1, 0.3);
    vec3 high = vec3(0.9, 0.7, 0.3);
    fragColor = vec4(mix(low, high, fractal), 1.0);
}
";

const PLASMA_STORM: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = uv * (6.0 + randomSeed * 4.0);
    float t = time * speedMultiplier;

    float plasma = sin(p.x + t);
    plasma += sin(p.y + t * (1.0 + randomSeed * 0.5));
    plasma += sin((p.x + p.y) * 0.5 + t * 0.8);
    plasma += sin(length(p - vec2(3.0 + randomSeed * 2.0)) * (1.5 + randomSeed) - t * 2.0);
    plasma = plasma / 4.0;

    vec3 rgb = vec3(
        0.5 + 0.5 * sin(plasma * 3.14159 + colorShift),
        0.5 + 0.5 * sin(plasma * 3.14159 + colorShift + 2.0),
        0.5 + 0.5 * sin(plasma * 3.14159 + colorShift + 4.0)
    ) * intensity;
    fragColor = vec4(rgb, 1.0);
}
";

const TUNNEL_VISION: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = (uv - vec2(0.5)) * 2.0;
    float r = max(length(p), 0.0001);
    float a = atan(p.y, p.x);

    float tunnel = mod(1.0 / r - time * 0.5, 1.0);
    float rings = sin(a * 8.0 + time * 2.0) * 0.5 + 0.5;

    vec3 inner = vec3(0.1, 0.0, 0.2);
    vec3 outer = vec3(0.8, 0.6, 0.3);
    vec3 rgb = mix(inner, outer, tunnel * rings);
    rgb *= 1.0 - r * 0.5;
    fragColor = vec4(rgb, 1.0);
}
";

const RETRO_STATIC: &str = r"
float hash(vec2 st) {
    return fract(sin(dot(st, vec2(12.9898, 78.233))) * 43758.5453123);
}

void mainCard(out vec4 fragColor, in vec2 uv) {
    float grain = hash(uv + vec2(time));
    float scanline = sin(uv.y * 200.0) * 0.1;
    float vignette = 1.0 - length(uv - vec2(0.5)) * 0.8;

    float value = (grain * 0.3 + scanline + 0.15) * vignette;
    fragColor = vec4(value * 0.9, value * 0.8, value * 0.7, 1.0);
}
";

const KALEIDOSCOPE: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = (uv - vec2(0.5)) * 2.0;
    float radius = length(p);
    float t = time * speedMultiplier;

    float segments = 4.0 + randomSeed * 8.0;
    float wedge = 6.28318 / segments;
    float angle = mod(atan(p.y, p.x), wedge);
    if (mod(floor(atan(p.y, p.x) / wedge), 2.0) == 1.0) {
        angle = wedge - angle;
    }

    vec2 kp = vec2(cos(angle), sin(angle)) * radius;

    float freq = 8.0 + randomSeed * 6.0;
    float pattern = sin(kp.x * freq + t) * cos(kp.y * freq - t);
    pattern += sin(radius * (12.0 + randomSeed * 8.0) - t * 2.0);

    vec3 rgb = vec3(
        0.5 + 0.5 * sin(pattern + colorShift + t * 0.5),
        0.5 + 0.5 * sin(pattern + colorShift + 2.0 + t * 0.5),
        0.5 + 0.5 * sin(pattern + colorShift + 4.0 + t * 0.5)
    ) * intensity;
    fragColor = vec4(rgb, 1.0);
}
";

const DIGITAL_RAIN: &str = r"
float hash(vec2 st) {
    return fract(sin(dot(st, vec2(12.9898, 78.233))) * 43758.5453123);
}

void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 grid = vec2(floor(uv.x * 20.0), floor(uv.y * 30.0));

    float speed = hash(vec2(grid.x, 0.0)) * 2.0 + 1.0;
    float offset = hash(vec2(grid.x, 1.0)) * 10.0;

    float rain = step(0.9, hash(vec2(grid.x, grid.y - time * speed + offset)));
    float trail = step(0.95, hash(vec2(grid.x, grid.y - time * speed + offset + 5.0))) * 0.5;

    fragColor = vec4(vec3(0.0, rain + trail, rain * 0.5 + trail * 0.3) * 0.6, 1.0);
}
";

const VOID_PULSE: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = (uv - vec2(0.5)) * 2.0;
    float dist = length(p);

    float pulse = sin(dist * 10.0 - time * 3.0) * 0.5 + 0.5;
    float ripple = sin(dist * 20.0 - time * 5.0) * 0.3;
    float combined = (pulse + ripple) * (1.0 - dist);

    fragColor = vec4(vec3(0.2, 0.1, 0.3) + vec3(0.5, 0.3, 0.6) * combined, 1.0);
}
";

const CHROMATIC_SHIFT: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    float shift = sin(time * 2.0) * 0.02;
    float band = sin(uv.y * 8.0 - time * 1.3);

    float r = sin(uv.x * 10.0 + time + shift) + band;
    float g = sin(uv.x * 10.0 + time) + band;
    float b = sin(uv.x * 10.0 + time - shift) + band;

    fragColor = vec4(vec3(r, g, b) * 0.3 + vec3(0.1), 1.0);
}
";

const RADIAL_BLUR_DOF: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 centered = uv - vec2(0.5);
    float depth = smoothstep(0.0, 0.7, length(centered));
    float t = time * speedMultiplier;
    float freq = 15.0 + randomSeed * 10.0;

    vec3 rgb = vec3(0.0);
    float blurAmount = depth * 0.03 * (0.5 + randomSeed * 0.5);

    for (float i = 0.0; i < 8.0; i += 1.0) {
        float offset = i / 8.0 - 0.5;
        vec2 sampleUv = uv + centered * offset * blurAmount;

        float pattern = sin(sampleUv.x * freq + t) + cos(sampleUv.y * freq - t);
        rgb += vec3(
            0.5 + 0.5 * sin(pattern + colorShift),
            0.5 + 0.5 * sin(pattern + colorShift + 2.0),
            0.5 + 0.5 * sin(pattern + colorShift + 4.0)
        );
    }

    rgb /= 8.0;
    rgb *= intensity * (1.0 - depth * 0.3);
    fragColor = vec4(rgb, 1.0);
}
";

const BOKEH_HEXAGON: &str = r"
const vec3 HEX_K = vec3(-0.866025404, 0.5, 0.577350269);

float hexagon(vec2 p, float r) {
    p = abs(p);
    p -= 2.0 * min(dot(HEX_K.xy, p), 0.0) * HEX_K.xy;
    p -= vec2(clamp(p.x, -HEX_K.z * r, HEX_K.z * r), r);
    return length(p) * sign(p.y);
}

void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = (uv - vec2(0.5)) * 4.0;
    float t = time * speedMultiplier;
    vec3 rgb = vec3(0.0);

    for (float i = 0.0; i < 3.0; i += 1.0) {
        float layer = i / 3.0;
        vec2 drift = vec2(
            sin(t * (0.5 + layer) + randomSeed * 6.28) * 1.5,
            cos(t * (0.7 + layer) - randomSeed * 6.28) * 1.5
        );

        float size = 0.3 + randomSeed * 0.3 + sin(t + layer * 3.0) * 0.1;
        float bokeh = smoothstep(0.05, 0.0, hexagon(p - drift, size));
        bokeh *= 0.5 + 0.5 * sin(t * 2.0 + layer * 2.0);

        vec3 tint = vec3(
            0.5 + 0.5 * sin(colorShift + layer * 2.0),
            0.5 + 0.5 * sin(colorShift + layer * 2.0 + 2.0),
            0.5 + 0.5 * sin(colorShift + layer * 2.0 + 4.0)
        );
        rgb += tint * bokeh;
    }

    fragColor = vec4(rgb * intensity, 1.0);
}
";

const GAUSSIAN_DREAM: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec3 rgb = vec3(0.0);
    float sigma = 0.02 + randomSeed * 0.03;
    float t = time * speedMultiplier;

    for (float x = -2.0; x <= 2.0; x += 1.0) {
        for (float y = -2.0; y <= 2.0; y += 1.0) {
            vec2 offset = vec2(x, y) * sigma;
            float weight = exp(-(x * x + y * y) / (2.0 * sigma * sigma));
            float band = cos((uv.y + offset.y) * 15.0 - t * 0.7);

            float r = sin((uv.x + offset.x * 1.2) * 20.0 + t + colorShift) + band;
            float g = sin((uv.x + offset.x) * 20.0 + t + colorShift + 2.0) + band;
            float b = sin((uv.x + offset.x * 0.8) * 20.0 + t + colorShift + 4.0) + band;

            rgb += vec3(r, g, b) * weight;
        }
    }

    fragColor = vec4(rgb / 15.0 * intensity * 0.4, 1.0);
}
";

const MOTION_BLUR_TRAIL: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec3 rgb = vec3(0.0);
    float angle = randomSeed * 6.28;
    vec2 direction = vec2(cos(angle), sin(angle));

    for (float i = 0.0; i < 12.0; i += 1.0) {
        float step01 = i / 12.0;
        float lag = step01 * 0.5;
        vec2 sampleUv = uv + direction * step01 * 0.1;
        float t = (time - lag) * speedMultiplier;

        float pattern = sin(sampleUv.x * 15.0 + t) * cos(sampleUv.y * 15.0 - t);
        vec3 trail = vec3(
            0.5 + 0.5 * sin(pattern + colorShift + lag * 3.0),
            0.5 + 0.5 * sin(pattern + colorShift + lag * 3.0 + 2.0),
            0.5 + 0.5 * sin(pattern + colorShift + lag * 3.0 + 4.0)
        );
        rgb += trail * (1.0 - step01);
    }

    rgb /= 12.0 * 0.5;
    fragColor = vec4(rgb * intensity, 1.0);
}
";

const LENS_DISTORTION: &str = r"
vec2 barrel(vec2 uv, float strength) {
    vec2 centered = uv - vec2(0.5);
    float dist = length(centered);
    return centered * (1.0 + dist * dist * strength) + vec2(0.5);
}

void mainCard(out vec4 fragColor, in vec2 uv) {
    float t = time * speedMultiplier;
    float amount = (0.5 + randomSeed * 0.8) * sin(t * 0.5) * 0.3;
    vec2 warped = barrel(uv, amount);

    float pattern = sin(warped.x * 25.0 + t);
    pattern += cos(warped.y * 20.0 - t);
    pattern += sin(length(warped - vec2(0.5)) * 30.0 - t * 2.0);

    float vignette = 1.0 - length(uv - vec2(0.5)) * 0.8;

    vec3 rgb = vec3(
        0.5 + 0.5 * sin(pattern + colorShift),
        0.5 + 0.5 * sin(pattern + colorShift + 2.0),
        0.5 + 0.5 * sin(pattern + colorShift + 4.0)
    );
    fragColor = vec4(rgb * intensity * vignette, 1.0);
}
";

/// Scroll-reactive tunnel used for the full-viewport background layer.
pub const BACKGROUND_FRAGMENT: &str = r"
void mainCard(out vec4 fragColor, in vec2 uv) {
    vec2 p = (uv - vec2(0.5)) * 2.0;
    p.y += scroll * 0.5;

    float len = length(p) * (1.0 + sin(scroll * 0.1) * 0.3);
    float angle = atan(p.y, p.x);

    float spiral1 = sin(len * (8.0 + scroll * 0.05) - angle * 5.0 - time * 0.3 - scroll * 0.2);
    float spiral2 = sin(len * (12.0 + scroll * 0.03) + angle * 3.0 + time * 0.2 + scroll * 0.15);
    float spiral3 = cos(len * (6.0 + scroll * 0.04) - angle * 7.0 + time * 0.25 - scroll * 0.1);
    float spiral = spiral1 * 0.4 + spiral2 * 0.3 + spiral3 * 0.3;

    float rings = sin(len * (20.0 + scroll * 0.1) - time * 0.5 - scroll * 0.3) * 0.5 + 0.5;

    float rays = sin(angle * (12.0 + sin(scroll * 0.05) * 4.0) + time * 0.4 + scroll * 0.1) * 0.5 + 0.5;
    rays *= 1.0 - len * 0.5;

    float turbulence = sin(p.x * 5.0 + scroll * 0.2) * cos(p.y * 5.0 - scroll * 0.15) * 0.1;

    float combined = spiral * (0.4 + mod(scroll * 0.01, 1.0) * 0.2)
                   + rings * (0.3 + sin(scroll * 0.05) * 0.1)
                   + rays * 0.2
                   + turbulence;

    float hue = scroll * 0.002;
    vec3 rgb = vec3(
        0.4 + 0.3 * combined + sin(hue) * 0.1,
        0.35 + 0.25 * combined + sin(hue + 2.0) * 0.1,
        0.5 + 0.4 * combined + sin(hue + 4.0) * 0.15
    );
    rgb *= 1.0 - len * (0.6 + sin(scroll * 0.03) * 0.2);

    float grain = fract(sin(dot(p + vec2(scroll * 0.01), vec2(12.9898, 78.233))) * 43758.5453);
    rgb += vec3(grain * 0.03);

    fragColor = vec4(rgb, 1.0);
}
";

pub(crate) fn variants() -> Vec<ShaderVariant> {
    vec![
        ShaderVariant::bundled("spiralVortex", SPIRAL_VORTEX),
        ShaderVariant::bundled("glitchMatrix", GLITCH_MATRIX),
        ShaderVariant::bundled("cosmicNebula", COSMIC_NEBULA),
        ShaderVariant::bundled("psychedelicWaves", PSYCHEDELIC_WAVES),
        ShaderVariant::bundled("fractalZoom", FRACTAL_ZOOM),
        ShaderVariant::bundled("plasmaStorm", PLASMA_STORM),
        ShaderVariant::bundled("tunnelVision", TUNNEL_VISION),
        ShaderVariant::bundled("retroStatic", RETRO_STATIC),
        ShaderVariant::bundled("kaleidoscope", KALEIDOSCOPE),
        ShaderVariant::bundled("digitalRain", DIGITAL_RAIN),
        ShaderVariant::bundled("voidPulse", VOID_PULSE),
        ShaderVariant::bundled("chromaticShift", CHROMATIC_SHIFT),
        ShaderVariant::bundled("radialBlurDOF", RADIAL_BLUR_DOF),
        ShaderVariant::bundled("bokehHexagon", BOKEH_HEXAGON),
        ShaderVariant::bundled("gaussianDream", GAUSSIAN_DREAM),
        ShaderVariant::bundled("motionBlurTrail", MOTION_BLUR_TRAIL),
        ShaderVariant::bundled("lensDistortion", LENS_DISTORTION),
    ]
}

pub(crate) fn background() -> ShaderVariant {
    ShaderVariant::bundled("twilightTunnel", BACKGROUND_FRAGMENT)
}
