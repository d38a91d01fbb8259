//! GLSL payloads for the gl41 scenes
//!
//! Written against GLSL 1.50 so the same text links on every 3.2+ core
//! context; the rewriter pass may still adjust it before compilation.

// ===== gl41-instancing =====

pub const INSTANCING_VS: &str = r#"#version 150
in vec2 position;
in vec2 instanceOffset;
layout(std140) uniform Matrices { mat4 uMVP; };
void main() {
  vec2 pos = position + instanceOffset;
  gl_Position = uMVP * vec4(pos, 0.0, 1.0);
}
"#;

pub const INSTANCING_FS: &str = r#"#version 150
out vec4 fragColor;
void main() { fragColor = vec4(0.2, 0.8, 1.0, 1.0); }
"#;

// ===== gl41-pipeline =====

pub const PIPELINE_VS: &str = r#"#version 150
out gl_PerVertex { vec4 gl_Position; };
in vec3 position;
in vec3 normal;
layout(std140) uniform SceneBlock { mat4 uVP; vec4 uLightDir; vec4 uTime; };
layout(std140) uniform ModelBlock { vec4 uPosScale[256]; };
out vec3 vN;
out vec3 vWPos;
void main() {
  vec4 ps = uPosScale[gl_InstanceID];
  float t = uTime.x;
  float a = t * 1.2 + float(gl_InstanceID) * 0.11;
  float b = t * 0.7 + float(gl_InstanceID) * 0.07;
  float cy = cos(a), sy = sin(a);
  float cx = cos(b), sx = sin(b);
  mat3 rotY = mat3(cy,0,sy, 0,1,0, -sy,0,cy);
  mat3 rotX = mat3(1,0,0, 0,cx,-sx, 0,sx,cx);
  mat3 rot = rotY * rotX;
  vec3 p = rot * (position * ps.w) + ps.xyz;
  vWPos = p;
  vN = rot * normal;
  gl_Position = uVP * vec4(p, 1.0);
}
"#;

pub const PIPELINE_FS: &str = r#"#version 150
in vec3 vN;
in vec3 vWPos;
layout(std140) uniform SceneBlock { mat4 uVP; vec4 uLightDir; vec4 uTime; };
out vec4 fragColor;
void main() {
  vec3 n = normalize(vN);
  vec3 l = normalize(uLightDir.xyz);
  float ndotl = max(dot(n, l), 0.0);
  vec3 base = 0.35 + 0.35 * sin(vWPos * 2.0);
  vec3 col = base * (0.25 + 0.75 * ndotl);
  fragColor = vec4(col, 1.0);
}
"#;

// ===== gl41-mrt =====

pub const MRT_VS: &str = r#"#version 150
in vec2 position;
out vec2 vUV;
void main() {
  vUV = position * 0.5 + 0.5;
  gl_Position = vec4(position, 0.0, 1.0);
}
"#;

pub const MRT_FS: &str = r#"#version 150
in vec2 vUV;
uniform float uTime;
out vec4 o0;
out vec4 o1;
out vec4 o2;
out vec4 o3;
void main() {
  float w = 0.5 + 0.5 * sin(uTime + vUV.x * 10.0 + vUV.y * 7.0);
  vec4 base = vec4(vUV, w, 0.6);
  o0 = vec4(1.0, 0.2, 0.2, 0.20) + 0.80 * base;
  o1 = vec4(0.2, 1.0, 0.2, 0.30) + 0.70 * base.zyxw;
  o2 = vec4(0.2, 0.2, 1.0, 0.40) + 0.60 * base.yxzw;
  o3 = vec4(1.0, 1.0, 0.2, 0.50) + 0.50 * base;
}
"#;

/// Fragment outputs of `MRT_FS`, bound to colour locations 0..3 before link
pub const MRT_OUTPUTS: [&str; 4] = ["o0", "o1", "o2", "o3"];

// ===== gl41-texarray =====

pub const TEXARRAY_VS: &str = r#"#version 150
in vec2 position;
in vec3 instanceData;
out vec2 vUV;
flat out float vLayer;
layout(std140) uniform Matrices { mat4 uMVP; };
void main() {
  vUV = position * 0.5 + 0.5;
  vLayer = instanceData.z;
  vec2 pos = position * 0.04 + instanceData.xy;
  gl_Position = uMVP * vec4(pos, 0.0, 1.0);
}
"#;

pub const TEXARRAY_FS: &str = r#"#version 150
in vec2 vUV;
flat in float vLayer;
uniform sampler2DArray uTex;
uniform float uBias;
out vec4 fragColor;
void main() {
  vec4 texel = texture(uTex, vec3(vUV, vLayer), uBias);
  fragColor = texel;
}
"#;

// ===== gl41-streaming-sync =====

pub const STREAMING_VS: &str = r#"#version 150
in vec3 position;
uniform mat4 uMVP;
out vec3 vP;
void main() {
  vP = position;
  gl_Position = uMVP * vec4(position, 1.0);
}
"#;

pub const STREAMING_FS: &str = r#"#version 150
in vec3 vP;
out vec4 fragColor;
void main() {
  vec3 c = 0.5 + 0.5 * normalize(vP + vec3(0.2, 0.1, 0.3));
  fragColor = vec4(c, 1.0);
}
"#;

// ===== gl41-geometry =====

pub const GEOMETRY_VS: &str = r#"#version 150
in vec2 position;
out float vId;
void main() {
  vId = position.x * 0.5 + position.y * 0.5;
  gl_Position = vec4(position, 0.0, 1.0);
}
"#;

pub const GEOMETRY_GS: &str = r#"#version 150
layout(points) in;
layout(triangle_strip, max_vertices=4) out;
uniform vec2 uSize;
uniform float uTime;
out vec2 gUV;
void emit(vec2 off, vec2 uv) {
  gl_Position = gl_in[0].gl_Position + vec4(off, 0.0, 0.0);
  gUV = uv;
  EmitVertex();
}
void main() {
  vec2 s = uSize * (0.6 + 0.4 * abs(sin(uTime)));
  emit(vec2(-s.x, -s.y), vec2(0.0, 0.0));
  emit(vec2( s.x, -s.y), vec2(1.0, 0.0));
  emit(vec2(-s.x,  s.y), vec2(0.0, 1.0));
  emit(vec2( s.x,  s.y), vec2(1.0, 1.0));
  EndPrimitive();
}
"#;

pub const GEOMETRY_FS: &str = r#"#version 150
in vec2 gUV;
out vec4 fragColor;
void main() {
  float c = smoothstep(0.0, 0.15, min(min(gUV.x, 1.0-gUV.x), min(gUV.y, 1.0-gUV.y)));
  fragColor = vec4(0.1 + gUV.x, 0.2 + gUV.y, c, 1.0);
}
"#;
