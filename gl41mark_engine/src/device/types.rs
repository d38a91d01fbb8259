/// Backend-neutral GL enums and small value types

use bitflags::bitflags;
use std::num::NonZeroUsize;

/// Bit set in `GL_CONTEXT_PROFILE_MASK` for core contexts
pub const CONTEXT_CORE_PROFILE_BIT: i32 = 0x0000_0001;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Geometry,
    Fragment,
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Buffer binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    Uniform,
}

/// Buffer data store usage hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

/// Server-side capability toggled by glEnable/glDisable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnableCap {
    DepthTest,
    CullFace,
    Blend,
    ScissorTest,
    StencilTest,
}

impl EnableCap {
    /// Every capability tracked by the ambient state snapshot
    pub const ALL: [EnableCap; 5] = [
        EnableCap::DepthTest,
        EnableCap::CullFace,
        EnableCap::Blend,
        EnableCap::ScissorTest,
        EnableCap::StencilTest,
    ];
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthFunc {
    Never,
    #[default]
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Blend factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// Blend equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendEquation {
    FuncAdd,
    FuncSubtract,
    FuncReverseSubtract,
    Min,
    Max,
}

/// Framebuffer binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    /// Both read and draw
    Framebuffer,
    Read,
    Draw,
}

/// Primitive topology for draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    Points,
    Triangles,
    TriangleStrip,
}

/// Texture binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    Texture2DArray,
}

/// Minification / magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Linear,
    LinearMipmapLinear,
}

/// S/T wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
}

/// Colour buffer selected for reads and blits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadBuffer {
    None,
    Front,
    #[default]
    Back,
    ColorAttachment(u32),
}

/// Integer context queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerQuery {
    ContextProfileMask,
    NumExtensions,
}

/// glGetString / glGetStringi names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringQuery {
    Vendor,
    Renderer,
    Version,
    ShadingLanguageVersion,
    Extensions,
}

/// Outcome of glClientWaitSync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitResult {
    AlreadySignaled,
    ConditionSatisfied,
    TimeoutExpired,
    WaitFailed,
}

impl WaitResult {
    /// The fence has completed and the guarded data is safe to reuse
    pub fn is_signaled(&self) -> bool {
        matches!(self, WaitResult::AlreadySignaled | WaitResult::ConditionSatisfied)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WaitResult::AlreadySignaled => "GL_ALREADY_SIGNALED",
            WaitResult::ConditionSatisfied => "GL_CONDITION_SATISFIED",
            WaitResult::TimeoutExpired => "GL_TIMEOUT_EXPIRED",
            WaitResult::WaitFailed => "GL_WAIT_FAILED",
        }
    }
}

/// Outcome of a write-mapped buffer update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapOutcome {
    /// Mapped, written and unmapped cleanly
    Written,
    /// Written, but glUnmapBuffer reported the store was corrupted
    Corrupted,
    /// glMapBufferRange returned null; nothing was written
    Unavailable,
}

/// Result of glCheckFramebufferStatus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    Incomplete(u32),
}

/// Integer rectangle (viewport, blit regions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }
}

/// Uniform location within a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UniformLocation(pub u32);

/// Resolved entry point address (never null)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcAddress(pub NonZeroUsize);

impl ProcAddress {
    pub fn from_ptr(ptr: *const std::ffi::c_void) -> Option<Self> {
        NonZeroUsize::new(ptr as usize).map(ProcAddress)
    }

    pub fn as_ptr(self) -> *const std::ffi::c_void {
        self.0.get() as *const std::ffi::c_void
    }
}

bitflags! {
    /// Buffers cleared by glClear / copied by glBlitFramebuffer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

bitflags! {
    /// glMapBufferRange access bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MapAccess: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const INVALIDATE_RANGE = 1 << 2;
        const INVALIDATE_BUFFER = 1 << 3;
        const UNSYNCHRONIZED = 1 << 5;
    }
}

bitflags! {
    /// Stages attached to a program pipeline by glUseProgramStages
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProgramStages: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const GEOMETRY = 1 << 2;
    }
}
