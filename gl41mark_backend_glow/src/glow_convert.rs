/// Conversions between gl41mark device types and raw GL values
///
/// `*_to_gl` functions map core enums to GL enum values. `*_from_gl`
/// functions map values read back from the driver; anything unrecognized
/// falls back to the GL default for that state so a snapshot can always be
/// restored.

use gl41mark_engine::gl41mark::device::{
    BlendEquation, BlendFactor, BufferTarget, BufferUsage, ClearMask, DepthFunc, EnableCap,
    FramebufferStatus, FramebufferTarget, IntegerQuery, MapAccess, PrimitiveMode, ProgramStages,
    ReadBuffer, ShaderStage, StringQuery, TextureFilter, TextureTarget, TextureWrap, WaitResult,
};
use std::num::NonZeroU32;

// ===== HANDLES =====

macro_rules! native_handle {
    ($to:ident, $from:ident, $id:ident, $native:ident) => {
        pub(crate) fn $to(id: gl41mark_engine::gl41mark::device::$id) -> Option<glow::$native> {
            NonZeroU32::new(id.raw()).map(glow::$native)
        }

        pub(crate) fn $from(native: Option<glow::$native>) -> gl41mark_engine::gl41mark::device::$id {
            native.map_or(gl41mark_engine::gl41mark::device::$id::NONE, |n| {
                gl41mark_engine::gl41mark::device::$id(n.0.get())
            })
        }
    };
}

native_handle!(native_shader, shader_id, ShaderId, NativeShader);
native_handle!(native_program, program_id, ProgramId, NativeProgram);
native_handle!(native_buffer, buffer_id, BufferId, NativeBuffer);
native_handle!(native_vertex_array, vertex_array_id, VertexArrayId, NativeVertexArray);
native_handle!(native_texture, texture_id, TextureId, NativeTexture);
native_handle!(native_framebuffer, framebuffer_id, FramebufferId, NativeFramebuffer);
native_handle!(native_renderbuffer, renderbuffer_id, RenderbufferId, NativeRenderbuffer);

/// Object name read back through glGetIntegerv (negative values are bogus)
pub(crate) fn name_from_query(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

// ===== ENUMS =====

pub(crate) fn shader_stage_to_gl(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

pub(crate) fn buffer_target_to_gl(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::Uniform => glow::UNIFORM_BUFFER,
    }
}

/// glGetIntegerv name reporting the buffer bound to `target`
pub(crate) fn buffer_binding_query(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER_BINDING,
        BufferTarget::Uniform => glow::UNIFORM_BUFFER_BINDING,
    }
}

pub(crate) fn buffer_usage_to_gl(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
        BufferUsage::StreamDraw => glow::STREAM_DRAW,
    }
}

pub(crate) fn enable_cap_to_gl(cap: EnableCap) -> u32 {
    match cap {
        EnableCap::DepthTest => glow::DEPTH_TEST,
        EnableCap::CullFace => glow::CULL_FACE,
        EnableCap::Blend => glow::BLEND,
        EnableCap::ScissorTest => glow::SCISSOR_TEST,
        EnableCap::StencilTest => glow::STENCIL_TEST,
    }
}

pub(crate) fn depth_func_to_gl(func: DepthFunc) -> u32 {
    match func {
        DepthFunc::Never => glow::NEVER,
        DepthFunc::Less => glow::LESS,
        DepthFunc::Equal => glow::EQUAL,
        DepthFunc::LessEqual => glow::LEQUAL,
        DepthFunc::Greater => glow::GREATER,
        DepthFunc::NotEqual => glow::NOTEQUAL,
        DepthFunc::GreaterEqual => glow::GEQUAL,
        DepthFunc::Always => glow::ALWAYS,
    }
}

pub(crate) fn depth_func_from_gl(value: u32) -> DepthFunc {
    match value {
        glow::NEVER => DepthFunc::Never,
        glow::EQUAL => DepthFunc::Equal,
        glow::LEQUAL => DepthFunc::LessEqual,
        glow::GREATER => DepthFunc::Greater,
        glow::NOTEQUAL => DepthFunc::NotEqual,
        glow::GEQUAL => DepthFunc::GreaterEqual,
        glow::ALWAYS => DepthFunc::Always,
        // GL_LESS and anything unrecognized
        _ => DepthFunc::Less,
    }
}

pub(crate) fn blend_factor_to_gl(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
    }
}

pub(crate) fn blend_equation_to_gl(equation: BlendEquation) -> u32 {
    match equation {
        BlendEquation::FuncAdd => glow::FUNC_ADD,
        BlendEquation::FuncSubtract => glow::FUNC_SUBTRACT,
        BlendEquation::FuncReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
        BlendEquation::Min => glow::MIN,
        BlendEquation::Max => glow::MAX,
    }
}

pub(crate) fn framebuffer_target_to_gl(target: FramebufferTarget) -> u32 {
    match target {
        FramebufferTarget::Framebuffer => glow::FRAMEBUFFER,
        FramebufferTarget::Read => glow::READ_FRAMEBUFFER,
        FramebufferTarget::Draw => glow::DRAW_FRAMEBUFFER,
    }
}

/// glGetIntegerv name reporting the framebuffer bound to `target`
///
/// GL_FRAMEBUFFER_BINDING aliases the draw binding.
pub(crate) fn framebuffer_binding_query(target: FramebufferTarget) -> u32 {
    match target {
        FramebufferTarget::Framebuffer | FramebufferTarget::Draw => glow::DRAW_FRAMEBUFFER_BINDING,
        FramebufferTarget::Read => glow::READ_FRAMEBUFFER_BINDING,
    }
}

pub(crate) fn primitive_mode_to_gl(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Points => glow::POINTS,
        PrimitiveMode::Triangles => glow::TRIANGLES,
        PrimitiveMode::TriangleStrip => glow::TRIANGLE_STRIP,
    }
}

pub(crate) fn texture_target_to_gl(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2D => glow::TEXTURE_2D,
        TextureTarget::Texture2DArray => glow::TEXTURE_2D_ARRAY,
    }
}

/// glGetIntegerv name reporting the texture bound to `target` on the active unit
pub(crate) fn texture_binding_query(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2D => glow::TEXTURE_BINDING_2D,
        TextureTarget::Texture2DArray => glow::TEXTURE_BINDING_2D_ARRAY,
    }
}

pub(crate) fn texture_filter_to_gl(filter: TextureFilter) -> u32 {
    match filter {
        TextureFilter::Linear => glow::LINEAR,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }
}

pub(crate) fn texture_wrap_to_gl(wrap: TextureWrap) -> u32 {
    match wrap {
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        TextureWrap::Repeat => glow::REPEAT,
    }
}

pub(crate) fn read_buffer_to_gl(buffer: ReadBuffer) -> u32 {
    match buffer {
        ReadBuffer::None => glow::NONE,
        ReadBuffer::Front => glow::FRONT,
        ReadBuffer::Back => glow::BACK,
        ReadBuffer::ColorAttachment(index) => glow::COLOR_ATTACHMENT0 + index,
    }
}

pub(crate) fn read_buffer_from_gl(value: u32) -> ReadBuffer {
    const MAX_ATTACHMENTS: u32 = 16;
    match value {
        glow::NONE => ReadBuffer::None,
        glow::FRONT => ReadBuffer::Front,
        v if (glow::COLOR_ATTACHMENT0..glow::COLOR_ATTACHMENT0 + MAX_ATTACHMENTS).contains(&v) => {
            ReadBuffer::ColorAttachment(v - glow::COLOR_ATTACHMENT0)
        }
        // GL_BACK, the double-buffered default
        _ => ReadBuffer::Back,
    }
}

pub(crate) fn integer_query_to_gl(query: IntegerQuery) -> u32 {
    match query {
        IntegerQuery::ContextProfileMask => glow::CONTEXT_PROFILE_MASK,
        IntegerQuery::NumExtensions => glow::NUM_EXTENSIONS,
    }
}

pub(crate) fn string_query_to_gl(query: StringQuery) -> u32 {
    match query {
        StringQuery::Vendor => glow::VENDOR,
        StringQuery::Renderer => glow::RENDERER,
        StringQuery::Version => glow::VERSION,
        StringQuery::ShadingLanguageVersion => glow::SHADING_LANGUAGE_VERSION,
        StringQuery::Extensions => glow::EXTENSIONS,
    }
}

/// glClientWaitSync result; unknown values count as a failed wait
pub(crate) fn wait_result_from_gl(value: u32) -> WaitResult {
    match value {
        glow::ALREADY_SIGNALED => WaitResult::AlreadySignaled,
        glow::CONDITION_SATISFIED => WaitResult::ConditionSatisfied,
        glow::TIMEOUT_EXPIRED => WaitResult::TimeoutExpired,
        _ => WaitResult::WaitFailed,
    }
}

pub(crate) fn framebuffer_status_from_gl(value: u32) -> FramebufferStatus {
    if value == glow::FRAMEBUFFER_COMPLETE {
        FramebufferStatus::Complete
    } else {
        FramebufferStatus::Incomplete(value)
    }
}

pub(crate) fn clear_mask_to_gl(mask: ClearMask) -> u32 {
    let mut bits = 0;
    if mask.contains(ClearMask::COLOR) {
        bits |= glow::COLOR_BUFFER_BIT;
    }
    if mask.contains(ClearMask::DEPTH) {
        bits |= glow::DEPTH_BUFFER_BIT;
    }
    if mask.contains(ClearMask::STENCIL) {
        bits |= glow::STENCIL_BUFFER_BIT;
    }
    bits
}

pub(crate) fn map_access_to_gl(access: MapAccess) -> u32 {
    let mut bits = 0;
    if access.contains(MapAccess::READ) {
        bits |= glow::MAP_READ_BIT;
    }
    if access.contains(MapAccess::WRITE) {
        bits |= glow::MAP_WRITE_BIT;
    }
    if access.contains(MapAccess::INVALIDATE_RANGE) {
        bits |= glow::MAP_INVALIDATE_RANGE_BIT;
    }
    if access.contains(MapAccess::INVALIDATE_BUFFER) {
        bits |= glow::MAP_INVALIDATE_BUFFER_BIT;
    }
    if access.contains(MapAccess::UNSYNCHRONIZED) {
        bits |= glow::MAP_UNSYNCHRONIZED_BIT;
    }
    bits
}

pub(crate) fn program_stages_to_gl(stages: ProgramStages) -> u32 {
    let mut bits = 0;
    if stages.contains(ProgramStages::VERTEX) {
        bits |= glow::VERTEX_SHADER_BIT;
    }
    if stages.contains(ProgramStages::FRAGMENT) {
        bits |= glow::FRAGMENT_SHADER_BIT;
    }
    if stages.contains(ProgramStages::GEOMETRY) {
        bits |= glow::GEOMETRY_SHADER_BIT;
    }
    bits
}

/// Symbolic name of a glGetError code
pub(crate) fn gl_error_name(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "GL_NO_ERROR",
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown GL error",
    }
}

#[cfg(test)]
#[path = "glow_convert_tests.rs"]
mod tests;
